//! 中国历史大辞典查询工具

use std::{
    io::{self, Write},
    process::ExitCode,
};

use clap::Parser;
use console::style;
use tracing::warn;

use history_expert::{
    cli::{init_logging, CommonArgs, DictArgs},
    dictionary::LookupReport,
    format::{render_dictionary, rule},
    Error, MdictTool,
};

const USAGE: &str = "\
用法: query-dict <关键词1> [关键词2] ...

示例:
  query-dict 李白
  query-dict 安史之乱 李白 杜甫";

/// 中国历史大辞典查询工具
#[derive(Debug, Parser)]
#[command(name = "query-dict", version, after_help = USAGE)]
struct Cli {
    /// 要查询的关键词，依次查询
    keywords: Vec<String>,

    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    dict: DictArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.common.debug);

    if cli.keywords.is_empty() {
        println!("{USAGE}");
        return ExitCode::FAILURE;
    }

    let tool = MdictTool::new(cli.dict.config(cli.common.timeout()));
    if let Err(err) = tool.check_environment() {
        report_environment(&err);
        return ExitCode::FAILURE;
    }

    match run(&tool, &cli.keywords) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("\n❌ 发生错误: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn report_environment(err: &Error) {
    println!("{} 错误：{}", style("❌").red(), err);
    if let Error::ConfigurationMissing { .. } = err {
        println!("\n请确保在项目根目录运行此工具，或使用 --dict-path 指定辞典文件");
    }
}

fn run(tool: &MdictTool, keywords: &[String]) -> anyhow::Result<()> {
    println!("\n正在查询 {} 个关键词...", keywords.len());

    let mut results = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        print!("查询中：{}... ", keyword);
        io::stdout().flush()?;
        let report = match tool.lookup_report(keyword) {
            Ok(report) => report,
            Err(err) => {
                warn!(%keyword, %err, "Lookup failed");
                print!("{} ", err);
                LookupReport::default()
            }
        };
        if report.entry.is_some() {
            println!("{}", style("✓").green());
        } else {
            println!("{}", style("✗").red());
        }
        // mdict 自身报错时，把错误输出原样告诉用户
        if let Some(stderr) = report.stderr.as_deref().filter(|s| !s.is_empty()) {
            println!("  查询出错：{}", stderr);
        }
        results.push((keyword, report.entry));
    }

    // 打印查询结果
    println!("\n{}", rule());
    println!("查询结果");
    println!("{}", rule());
    for (keyword, entry) in &results {
        print!("{}", render_dictionary(keyword, entry.as_ref()));
    }
    Ok(())
}
