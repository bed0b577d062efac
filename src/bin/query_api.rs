//! 古籍文献知识图谱API查询工具

use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};

use history_expert::{
    cli::{init_logging, ApiArgs, CommonArgs},
    format::{render, render_with_limit, QueryKind, DEFAULT_POETRY_LIMIT},
    BookSearchRequest, HistoryApi, HistoryApiClient, PassageSearchRequest, PoetrySearchRequest,
};

const EXAMPLES: &str = "\
示例：
  # 查询李白关于月的诗
  query-api poetry --author 李白 --keyword 月

  # 查询赤壁相关古籍
  query-api book --keyword 赤壁

  # 检索古籍原文片段（补充时间/地点/人物/起因/经过/结果）
  query-api find --keyword 崔浩

  # 查询苏轼的信息
  query-api people --name 苏轼

  # 查询安史之乱
  query-api event --keyword 安史之乱";

/// 古籍文献知识图谱API查询工具
#[derive(Debug, Parser)]
#[command(name = "query-api", version, after_help = EXAMPLES)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    api: ApiArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 查询诗词
    Poetry {
        /// 关键词
        #[arg(long)]
        keyword: Option<String>,
        /// 作者
        #[arg(long)]
        author: Option<String>,
        /// 朝代
        #[arg(long)]
        dynasty: Option<String>,
        /// 题目（未给出关键词时作为关键词）
        #[arg(long)]
        title: Option<String>,
        /// 最多显示的结果数量
        #[arg(long, default_value_t = DEFAULT_POETRY_LIMIT)]
        limit: usize,
        /// 页码，从 0 开始
        #[arg(long, default_value_t = 0)]
        page: u32,
    },

    /// 查询古籍（书目与命中数）
    Book {
        /// 关键词
        #[arg(long)]
        keyword: String,
        /// 页码，从 0 开始
        #[arg(long, default_value_t = 0)]
        page: u32,
        /// 只在指定古籍中查询
        #[arg(long)]
        book_id: Option<String>,
    },

    /// 检索古籍原文片段（返回 PreviousText/MatchedText/LaterText）
    Find {
        /// 关键词或组合，如 崔浩、暴扬国恶、国史 刊石
        #[arg(long)]
        keyword: String,
        /// 页码，从 0 开始
        #[arg(long, default_value_t = 0)]
        page: u32,
        /// 只在指定古籍中检索，可重复
        #[arg(long = "book-id")]
        book_ids: Vec<String>,
    },

    /// 查询人物
    People {
        /// 人名、朝代键或人物 Id
        #[arg(long)]
        name: String,
    },

    /// 查询事件
    Event {
        /// 关键词
        #[arg(long)]
        keyword: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.common.debug);

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return ExitCode::FAILURE;
    };

    match run(&cli.common, &cli.api, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("\n❌ 发生错误: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(common: &CommonArgs, api: &ApiArgs, command: Command) -> anyhow::Result<()> {
    println!("\n正在查询古籍文献知识图谱API...");
    let client = HistoryApiClient::new(api.config(common.timeout())?)?;

    let text = match command {
        Command::Poetry {
            keyword,
            author,
            dynasty,
            title,
            limit,
            page,
        } => {
            let request = PoetrySearchRequest {
                keyword,
                author,
                dynasty,
                title,
                page,
            };
            render_with_limit(QueryKind::Poetry, &client.search_poetry(&request), limit)
        }
        Command::Book {
            keyword,
            page,
            book_id,
        } => {
            let request = BookSearchRequest {
                keyword,
                page,
                book_id,
            };
            render(QueryKind::Book, &client.search_books(&request))
        }
        Command::Find {
            keyword,
            page,
            book_ids,
        } => {
            let request = PassageSearchRequest {
                keyword,
                page,
                book_ids,
            };
            render(QueryKind::Passage, &client.find_passages(&request))
        }
        Command::People { name } => {
            render(QueryKind::Person, &client.lookup_person(&name))
        }
        Command::Event { keyword } => {
            render(QueryKind::Event, &client.search_event(&keyword))
        }
    };
    print!("{text}");
    Ok(())
}
