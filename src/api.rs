//! Client for the 古籍文献知识图谱 open API (<https://open.cnkgraph.com>).
//!
//! Every operation returns a [`QueryResult`]. Transport failures, timeouts
//! and bad statuses all come back as an [`Error`] value instead of aborting
//! the caller, so callers can treat each query independently.

use reqwest::{
    blocking::{Client, RequestBuilder, Response},
    header::CONTENT_TYPE,
    StatusCode,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::{
    config::ApiConfig,
    error::{Error, QueryResult, Result},
};

const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Search poems by keyword, author, dynasty or title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoetrySearchRequest {
    pub keyword: Option<String>,
    pub author: Option<String>,
    pub dynasty: Option<String>,
    /// Only used as the keyword when no keyword is given.
    pub title: Option<String>,
    pub page: u32,
}

impl PoetrySearchRequest {
    pub fn by_author<S: Into<String>>(author: S) -> Self {
        Self {
            author: Some(author.into()),
            ..Self::default()
        }
    }

    /// Nothing to search for.
    pub fn is_empty(&self) -> bool {
        [&self.keyword, &self.author, &self.dynasty, &self.title]
            .into_iter()
            .all(|field| non_empty(field).is_none())
    }

    fn body(&self) -> PoetryBody<'_> {
        PoetryBody {
            page_no: self.page,
            key: non_empty(&self.keyword).or_else(|| non_empty(&self.title)),
            author: non_empty(&self.author),
            dynasty: non_empty(&self.dynasty),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PoetryBody<'a> {
    page_no: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dynasty: Option<&'a str>,
}

/// Search whole books (titles and hit counts).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookSearchRequest {
    pub keyword: String,
    pub page: u32,
    pub book_id: Option<String>,
}

impl BookSearchRequest {
    pub fn new<S: Into<String>>(keyword: S) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }
}

/// Search passages, returning each hit with the text before and after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassageSearchRequest {
    pub keyword: String,
    pub page: u32,
    /// Restrict the search to these books. Empty means all books.
    pub book_ids: Vec<String>,
}

impl PassageSearchRequest {
    pub fn new<S: Into<String>>(keyword: S) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    fn body(&self) -> PassageBody<'_> {
        PassageBody {
            key: &self.keyword,
            page_no: self.page,
            book_ids: &self.book_ids,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PassageBody<'a> {
    key: &'a str,
    page_no: u32,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    book_ids: &'a [String],
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// The queries the history API answers.
pub trait HistoryApi {
    fn search_poetry(&self, request: &PoetrySearchRequest) -> QueryResult;
    fn search_books(&self, request: &BookSearchRequest) -> QueryResult;
    fn find_passages(&self, request: &PassageSearchRequest) -> QueryResult;
    /// `key` may be a name, a dynasty-qualified key or a numeric id.
    fn lookup_person(&self, key: &str) -> QueryResult;
    fn search_event(&self, keyword: &str) -> QueryResult;
}

/// Blocking [`HistoryApi`] client.
#[derive(Debug, Clone)]
pub struct HistoryApiClient {
    client: Client,
    config: ApiConfig,
}

impl HistoryApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::transport)?;
        Ok(Self { client, config })
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl {
                url: self.config.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn post_json<T: Serialize + ?Sized>(&self, url: Url, body: &T) -> Result<RequestBuilder> {
        let body = serde_json::to_vec(body).map_err(Error::unexpected)?;
        Ok(self
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON_UTF8)
            .body(body))
    }

    fn send(&self, request: RequestBuilder) -> QueryResult {
        let response = request.send().map_err(Error::transport)?;
        read_json(response)
    }
}

/// Turn a response into a payload, or an error for any non-2xx status.
fn read_json(response: Response) -> QueryResult {
    let status = response.status();
    let body = response.text().map_err(Error::transport)?;
    if !status.is_success() {
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| Error::InvalidResponse {
        message: e.to_string(),
    })
}

impl HistoryApi for HistoryApiClient {
    #[instrument(skip(self))]
    fn search_poetry(&self, request: &PoetrySearchRequest) -> QueryResult {
        let url = self.endpoint(&["Writing", "Find"])?;
        let body = request.body();
        debug!(%url, ?body, "POST");
        self.send(self.post_json(url, &body)?)
    }

    #[instrument(skip(self))]
    fn search_books(&self, request: &BookSearchRequest) -> QueryResult {
        let mut url = self.endpoint(&["Book", "Search"])?;
        // 构建查询的url，关键词放在请求体里
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("pageNo", &request.page.to_string());
            if let Some(book_id) = non_empty(&request.book_id) {
                query.append_pair("bookId", book_id);
            }
        }
        debug!(%url, "POST");
        self.send(self.post_json(url, &request.keyword)?)
    }

    #[instrument(skip(self))]
    fn find_passages(&self, request: &PassageSearchRequest) -> QueryResult {
        let url = self.endpoint(&["Book", "Find"])?;
        let body = request.body();
        debug!(%url, ?body, "POST");
        self.send(self.post_json(url, &body)?)
    }

    #[instrument(skip(self))]
    fn lookup_person(&self, key: &str) -> QueryResult {
        // These would be dropped or collapsed by path normalization.
        if matches!(key, "" | "." | "..") {
            return Err(Error::InvalidLookupKey {
                key: key.to_string(),
            });
        }
        let url = self.endpoint(&["People", key])?;
        debug!(%url, "GET");
        self.send(self.client.get(url))
    }

    #[instrument(skip(self))]
    fn search_event(&self, keyword: &str) -> QueryResult {
        let url = self.endpoint(&["Event", "Search"])?;
        // 先用 GET 查询
        let mut get_url = url.clone();
        get_url.query_pairs_mut().append_pair("keyword", keyword);
        debug!(url = %get_url, "GET");
        let response = self
            .client
            .get(get_url)
            .send()
            .map_err(Error::transport)?;

        // The event endpoint is undocumented; some deployments only take POST.
        // Only 405 triggers the fallback.
        if response.status() != StatusCode::METHOD_NOT_ALLOWED {
            return read_json(response);
        }
        debug!(%url, "GET not allowed, retrying as POST");
        self.send(self.post_json(url, keyword)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn client(base: &str) -> HistoryApiClient {
        HistoryApiClient::new(ApiConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn poetry_title_stands_in_for_missing_keyword() {
        let request = PoetrySearchRequest {
            author: Some("李白".to_string()),
            title: Some("静夜思".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(request.body()).unwrap();
        assert_eq!(body, json!({"PageNo": 0, "Key": "静夜思", "Author": "李白"}));
    }

    #[test]
    fn poetry_keyword_wins_over_title() {
        let request = PoetrySearchRequest {
            keyword: Some("月".to_string()),
            title: Some("静夜思".to_string()),
            page: 2,
            ..Default::default()
        };
        let body = serde_json::to_value(request.body()).unwrap();
        assert_eq!(body, json!({"PageNo": 2, "Key": "月"}));
    }

    #[test]
    fn empty_keyword_counts_as_absent() {
        let request = PoetrySearchRequest {
            keyword: Some(String::new()),
            title: Some("将进酒".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(request.body()).unwrap();
        assert_eq!(body, json!({"PageNo": 0, "Key": "将进酒"}));
    }

    #[test]
    fn empty_poetry_request() {
        assert!(PoetrySearchRequest::default().is_empty());
        assert!(PoetrySearchRequest {
            keyword: Some(String::new()),
            ..Default::default()
        }
        .is_empty());
        assert!(!PoetrySearchRequest::by_author("杜甫").is_empty());
    }

    #[test]
    fn passage_body_omits_empty_book_list() {
        let mut request = PassageSearchRequest::new("崔浩");
        let body = serde_json::to_value(request.body()).unwrap();
        assert_eq!(body, json!({"Key": "崔浩", "PageNo": 0}));

        request.book_ids = vec!["wei-shu".to_string()];
        request.page = 1;
        let body = serde_json::to_value(request.body()).unwrap();
        assert_eq!(
            body,
            json!({"Key": "崔浩", "PageNo": 1, "BookIds": ["wei-shu"]})
        );
    }

    #[test]
    fn endpoint_keeps_base_path_and_encodes_segments() {
        let client = client("https://open.cnkgraph.com/api");
        let url = client.endpoint(&["People", "a/b c?"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://open.cnkgraph.com/api/People/a%2Fb%20c%3F"
        );

        let trailing = self::client("https://open.cnkgraph.com/api/");
        let url = trailing.endpoint(&["Writing", "Find"]).unwrap();
        assert_eq!(url.as_str(), "https://open.cnkgraph.com/api/Writing/Find");
    }

    #[test]
    fn rejects_keys_that_collapse_in_paths() {
        let client = client("http://127.0.0.1:9/api");
        for key in ["", ".", ".."] {
            assert!(matches!(
                client.lookup_person(key),
                Err(Error::InvalidLookupKey { .. })
            ));
        }
    }
}
