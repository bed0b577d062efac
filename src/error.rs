//! Error handling.

use std::path::PathBuf;

use serde_json::Value;

/// Our result type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The outcome of one remote query: a JSON payload or the reason it failed.
pub type QueryResult = Result<Value>;

/// Everything that can go wrong while talking to the dictionary tool or the
/// history API. Messages are meant to be shown to the user as they are.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The server did not answer within the configured timeout.
    #[error("请求超时")]
    TransportTimeout,

    /// Connection, DNS, TLS or any other transport failure.
    #[error("网络请求失败: {message}")]
    Transport { message: String },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The server answered 2xx, but the body was not JSON.
    #[error("无法解析响应: {message}")]
    InvalidResponse { message: String },

    /// The external lookup tool is not installed.
    #[error("未找到 {tool} 命令，请运行：{hint}")]
    DependencyMissing { tool: String, hint: String },

    /// The dictionary file is not where we expect it.
    #[error("找不到辞典文件 {}", .path.display())]
    ConfigurationMissing { path: PathBuf },

    /// The lookup tool ran longer than allowed and was killed.
    #[error("查询超时（关键词：{keyword}，{seconds} 秒）")]
    ProcessTimeout { keyword: String, seconds: u64 },

    /// The API base URL cannot have path segments appended to it.
    #[error("无效的 API 地址: {url}")]
    InvalidBaseUrl { url: String },

    /// A person key that cannot be sent as a single path segment.
    #[error("无效的人物查询键: {key:?}")]
    InvalidLookupKey { key: String },

    /// Anything else.
    #[error("查询出错：{message}")]
    Unexpected { message: String },
}

impl Error {
    /// Classify a `reqwest` failure, keeping timeouts distinct.
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::TransportTimeout
        } else {
            Error::Transport {
                message: err.to_string(),
            }
        }
    }

    pub(crate) fn unexpected<S: ToString>(message: S) -> Self {
        Error::Unexpected {
            message: message.to_string(),
        }
    }

    /// Is this one of the two timeout kinds?
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::TransportTimeout | Error::ProcessTimeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_cause() {
        assert_eq!(Error::TransportTimeout.to_string(), "请求超时");
        let missing = Error::DependencyMissing {
            tool: "mdict".to_string(),
            hint: "pip install mdict-utils".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "未找到 mdict 命令，请运行：pip install mdict-utils"
        );
        let status = Error::HttpStatus {
            status: 404,
            body: "not here".to_string(),
        };
        assert_eq!(status.to_string(), "HTTP 404: not here");
    }

    #[test]
    fn both_timeouts_are_timeouts() {
        assert!(Error::TransportTimeout.is_timeout());
        assert!(Error::ProcessTimeout {
            keyword: "李白".to_string(),
            seconds: 30
        }
        .is_timeout());
        assert!(!Error::unexpected("boom").is_timeout());
    }
}
