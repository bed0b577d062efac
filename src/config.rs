//! Where the clients point and how long they wait.

use std::{path::PathBuf, time::Duration};

use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://open.cnkgraph.com/api";
pub const DEFAULT_DICT_PATH: &str = "dict/历史辞典4合1.mdx";
pub const DEFAULT_LOOKUP_TOOL: &str = "mdict";
pub const DEFAULT_LOOKUP_FLAG: &str = "-q";
pub const INSTALL_HINT: &str = "pip install mdict-utils";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for [`crate::api::HistoryApiClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ApiConfig {
    /// Parse `base_url`, refusing URLs we can't append path segments to.
    pub fn new(base_url: &str) -> Result<Self> {
        let invalid = || Error::InvalidBaseUrl {
            url: base_url.to_string(),
        };
        let parsed = Url::parse(base_url).map_err(|_| invalid())?;
        if parsed.cannot_be_a_base() {
            return Err(invalid());
        }
        Ok(Self {
            base_url: parsed,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Settings for [`crate::dictionary::MdictTool`].
#[derive(Debug, Clone)]
pub struct DictionaryConfig {
    /// The lookup executable, found on `PATH` unless absolute.
    pub program: PathBuf,
    /// Flag placed before the keyword.
    pub lookup_flag: String,
    pub dict_path: PathBuf,
    pub timeout: Duration,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_LOOKUP_TOOL),
            lookup_flag: DEFAULT_LOOKUP_FLAG.to_string(),
            dict_path: PathBuf::from(DEFAULT_DICT_PATH),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
