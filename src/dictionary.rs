//! Offline lookups in 《中国历史大辞典》.
//!
//! The dictionary ships as an MDict file which we never parse ourselves.
//! Instead we shell out to the `mdict` tool from
//! [mdict-utils](https://pypi.org/project/mdict-utils/) and take whatever it
//! prints as the entry text.

use std::{
    ffi::OsStr,
    io,
    process::{Output, Stdio},
    time::Duration,
};

use tokio::{process::Command, time::timeout};
use tracing::{debug, instrument, warn};

use crate::{
    config::{DictionaryConfig, INSTALL_HINT},
    error::{Error, Result},
};

/// A matched dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub keyword: String,
    pub text: String,
}

/// What one run of the lookup tool produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupReport {
    pub entry: Option<DictionaryEntry>,
    /// The tool's error stream, when it exited non-zero.
    pub stderr: Option<String>,
}

/// Something that can look up a keyword and return the matching entry.
///
/// `Ok(None)` means "no such entry", which is not an error.
pub trait Dictionary {
    fn lookup(&self, keyword: &str) -> Result<Option<DictionaryEntry>>;
}

/// [`Dictionary`] backed by the external `mdict` process.
#[derive(Debug, Clone, Default)]
pub struct MdictTool {
    config: DictionaryConfig,
}

impl MdictTool {
    pub fn new(config: DictionaryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DictionaryConfig {
        &self.config
    }

    /// Make sure the tool can be started and the dictionary file exists.
    pub fn check_environment(&self) -> Result<()> {
        match self.run(&[OsStr::new("--version")], "--version") {
            Ok(_) => {}
            Err(err @ Error::DependencyMissing { .. }) => return Err(err),
            // Some builds don't know `--version`; we only care that it spawned.
            Err(err) => debug!(%err, "Version probe failed"),
        }
        self.ensure_dict_file()
    }

    fn ensure_dict_file(&self) -> Result<()> {
        if self.config.dict_path.exists() {
            Ok(())
        } else {
            Err(Error::ConfigurationMissing {
                path: self.config.dict_path.clone(),
            })
        }
    }

    /// Run the tool to completion, killing it if it outlives our timeout.
    fn run(&self, args: &[&OsStr], keyword: &str) -> Result<Output> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::unexpected)?;
        runtime.block_on(async {
            let child = Command::new(&self.config.program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|err| self.spawn_error(err))?;
            match timeout(self.config.timeout, child.wait_with_output()).await {
                Ok(output) => output.map_err(Error::unexpected),
                Err(_) => Err(Error::ProcessTimeout {
                    keyword: keyword.to_string(),
                    seconds: whole_seconds(self.config.timeout),
                }),
            }
        })
    }

    /// Look `keyword` up, keeping the tool's error stream when it fails.
    #[instrument(skip(self))]
    pub fn lookup_report(&self, keyword: &str) -> Result<LookupReport> {
        self.ensure_dict_file()?;
        // 调用 mdict -q <关键词> <辞典文件>
        let args = [
            OsStr::new(&self.config.lookup_flag),
            OsStr::new(keyword),
            self.config.dict_path.as_os_str(),
        ];
        let output = self.run(&args, keyword)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = %output.status, %stderr, "Lookup tool failed");
            return Ok(LookupReport {
                entry: None,
                stderr: Some(stderr),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            debug!("No entry");
            return Ok(LookupReport::default());
        }
        Ok(LookupReport {
            entry: Some(DictionaryEntry {
                keyword: keyword.to_string(),
                text,
            }),
            stderr: None,
        })
    }

    fn spawn_error(&self, err: io::Error) -> Error {
        if err.kind() == io::ErrorKind::NotFound {
            Error::DependencyMissing {
                tool: self.config.program.display().to_string(),
                hint: INSTALL_HINT.to_string(),
            }
        } else {
            Error::unexpected(err)
        }
    }
}

impl Dictionary for MdictTool {
    fn lookup(&self, keyword: &str) -> Result<Option<DictionaryEntry>> {
        Ok(self.lookup_report(keyword)?.entry)
    }
}

// 超时秒数向上取整
fn whole_seconds(timeout: Duration) -> u64 {
    let millis = timeout.as_millis();
    u64::try_from((millis + 999) / 1000).unwrap_or(u64::MAX)
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::PathBuf;

    use tempfile::NamedTempFile;

    use super::*;

    // `sh -c <keyword> <dict>` lets each test script the tool's behaviour.
    fn shell_tool(dict: &NamedTempFile) -> MdictTool {
        MdictTool::new(DictionaryConfig {
            program: PathBuf::from("sh"),
            lookup_flag: "-c".to_string(),
            dict_path: dict.path().to_path_buf(),
            timeout: Duration::from_secs(5),
        })
    }

    #[test]
    fn returns_trimmed_output() {
        let dict = NamedTempFile::new().unwrap();
        let tool = shell_tool(&dict);
        let script = "printf '\\n  李白，字太白，号青莲居士。  \\n\\n'";
        let entry = tool.lookup(script).unwrap().unwrap();
        assert_eq!(entry.text, "李白，字太白，号青莲居士。");
        assert_eq!(entry.keyword, script);
    }

    #[test]
    fn empty_output_is_not_found() {
        let dict = NamedTempFile::new().unwrap();
        assert_eq!(shell_tool(&dict).lookup("true").unwrap(), None);
    }

    #[test]
    fn failing_tool_is_not_found() {
        let dict = NamedTempFile::new().unwrap();
        let tool = shell_tool(&dict);
        let report = tool.lookup_report("echo 没有词条 >&2; exit 3").unwrap();
        assert_eq!(report.entry, None);
        assert_eq!(report.stderr.as_deref(), Some("没有词条"));
        assert_eq!(tool.lookup("exit 1").unwrap(), None);
    }

    #[test]
    fn successful_lookup_has_no_stderr() {
        let dict = NamedTempFile::new().unwrap();
        let report = shell_tool(&dict)
            .lookup_report("echo 安史之乱; echo 注意 >&2")
            .unwrap();
        assert_eq!(report.entry.unwrap().text, "安史之乱");
        assert_eq!(report.stderr, None);
    }

    #[test]
    fn slow_tool_times_out() {
        let dict = NamedTempFile::new().unwrap();
        let mut config = shell_tool(&dict).config().clone();
        config.timeout = Duration::from_millis(200);
        let tool = MdictTool::new(config);
        let err = tool.lookup("sleep 5").unwrap_err();
        assert!(
            matches!(err, Error::ProcessTimeout { seconds: 1, .. }),
            "{err:?}"
        );
        assert!(err.to_string().contains("1 秒"));
    }

    #[test]
    fn timeout_seconds_round_up() {
        assert_eq!(whole_seconds(Duration::from_millis(1)), 1);
        assert_eq!(whole_seconds(Duration::from_secs(30)), 30);
        assert_eq!(whole_seconds(Duration::from_millis(30_001)), 31);
    }

    #[test]
    fn missing_dictionary_file() {
        let tool = MdictTool::new(DictionaryConfig {
            dict_path: PathBuf::from("/definitely/not/here.mdx"),
            ..DictionaryConfig::default()
        });
        assert!(matches!(
            tool.lookup("李白"),
            Err(Error::ConfigurationMissing { .. })
        ));
    }

    #[test]
    fn missing_tool() {
        let dict = NamedTempFile::new().unwrap();
        let tool = MdictTool::new(DictionaryConfig {
            program: PathBuf::from("/definitely/not/mdict"),
            dict_path: dict.path().to_path_buf(),
            ..DictionaryConfig::default()
        });
        let err = tool.lookup("李白").unwrap_err();
        match &err {
            Error::DependencyMissing { hint, .. } => {
                assert_eq!(hint, "pip install mdict-utils")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            tool.check_environment(),
            Err(Error::DependencyMissing { .. })
        ));
    }

    #[test]
    fn environment_check_passes_with_tool_and_file() {
        let dict = NamedTempFile::new().unwrap();
        shell_tool(&dict).check_environment().unwrap();
    }
}
