//! Flags and setup shared by the command-line tools.

use std::{path::PathBuf, time::Duration};

use clap::Args;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{
        ApiConfig, DictionaryConfig, DEFAULT_BASE_URL, DEFAULT_DICT_PATH, DEFAULT_LOOKUP_TOOL,
        DEFAULT_TIMEOUT,
    },
    error::Result,
};

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Seconds to wait for each request or dictionary lookup (at least 1).
    #[arg(
        long = "timeout",
        global = true,
        default_value_t = DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Log request URLs and other details to stderr.
    #[arg(long, global = true)]
    pub debug: bool,
}

impl CommonArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Args)]
pub struct ApiArgs {
    /// Base URL of the history API.
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

impl ApiArgs {
    pub fn config(&self, timeout: Duration) -> Result<ApiConfig> {
        Ok(ApiConfig::new(&self.base_url)?.with_timeout(timeout))
    }
}

#[derive(Debug, Args)]
pub struct DictArgs {
    /// Path to the MDict dictionary file.
    #[arg(long, default_value = DEFAULT_DICT_PATH)]
    pub dict_path: PathBuf,

    /// The lookup tool to run.
    #[arg(long, default_value = DEFAULT_LOOKUP_TOOL)]
    pub dict_tool: PathBuf,
}

impl DictArgs {
    pub fn config(&self, timeout: Duration) -> DictionaryConfig {
        DictionaryConfig {
            program: self.dict_tool.clone(),
            dict_path: self.dict_path.clone(),
            timeout,
            ..DictionaryConfig::default()
        }
    }
}

/// Log to stderr so results on stdout stay clean. `RUST_LOG` wins over
/// `--debug`.
pub fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,history_expert={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
