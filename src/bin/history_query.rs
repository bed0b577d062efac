//! 中国历史专家系统 - 综合查询工具
//!
//! Looks a keyword up in the offline dictionary and the history API, one
//! source after another, and says whether anything useful turned up.

use std::{io, process::ExitCode};

use clap::Parser;

use history_expert::{
    cli::{init_logging, ApiArgs, CommonArgs, DictArgs},
    HistoryApiClient, HistoryExpert, MdictTool,
};

const USAGE: &str = "\
用法: history-query <关键词>

示例:
  history-query 李白
  history-query 安史之乱
  history-query 科举制度";

/// 中国历史专家系统 - 综合查询工具
#[derive(Debug, Parser)]
#[command(name = "history-query", version, after_help = USAGE)]
struct Cli {
    /// 要查询的关键词
    keyword: Option<String>,

    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    api: ApiArgs,

    #[command(flatten)]
    dict: DictArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.common.debug);

    let Some(keyword) = cli.keyword.as_deref() else {
        println!("{USAGE}");
        return ExitCode::FAILURE;
    };

    match run(&cli, keyword) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("\n❌ 发生错误: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, keyword: &str) -> anyhow::Result<()> {
    let timeout = cli.common.timeout();
    let dictionary = MdictTool::new(cli.dict.config(timeout));
    let api = HistoryApiClient::new(cli.api.config(timeout)?)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    HistoryExpert::new(&dictionary, &api).query(keyword, &mut out)?;
    Ok(())
}
