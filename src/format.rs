//! Turn query results into text for the terminal.

use std::fmt::Write;

use console::style;
use serde_json::Value;

use crate::{dictionary::DictionaryEntry, error::QueryResult};

/// How many poems we show unless told otherwise.
pub const DEFAULT_POETRY_LIMIT: usize = 5;

const RULE_WIDTH: usize = 60;

/// Which kind of query produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Poetry,
    Book,
    Passage,
    Person,
    Event,
}

impl QueryKind {
    pub fn title(self) -> &'static str {
        match self {
            QueryKind::Poetry => "诗词查询结果",
            QueryKind::Book => "古籍查询结果",
            QueryKind::Passage => "古籍原文片段",
            QueryKind::Person => "人物查询结果",
            QueryKind::Event => "事件查询结果",
        }
    }
}

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", rule());
    let _ = writeln!(out, "{}", style(title).bold());
    let _ = writeln!(out, "{}", rule());
}

/// Render `result` using the default poetry limit.
pub fn render(kind: QueryKind, result: &QueryResult) -> String {
    render_with_limit(kind, result, DEFAULT_POETRY_LIMIT)
}

/// Render `result`, showing at most `poetry_limit` poems.
pub fn render_with_limit(kind: QueryKind, result: &QueryResult, poetry_limit: usize) -> String {
    let payload = match result {
        Ok(payload) => payload,
        Err(err) => return render_failure(err),
    };
    let mut out = String::new();
    section(&mut out, kind.title());
    match (kind, payload) {
        (QueryKind::Poetry, Value::Array(poems)) => render_poems(&mut out, poems, poetry_limit),
        _ => {
            let _ = writeln!(out, "{}", pretty(payload));
        }
    }
    out
}

/// One line, even when the message carries a multi-line error page.
pub fn render_failure(err: &dyn std::error::Error) -> String {
    let message = err.to_string();
    let message = message.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("\n{} 查询失败: {}\n", style("❌").red(), message)
}

fn render_poems(out: &mut String, poems: &[Value], limit: usize) {
    // 打印诗词列表
    for (i, poem) in poems.iter().take(limit).enumerate() {
        let _ = writeln!(out, "\n【{}】", i + 1);
        let _ = writeln!(out, "标题：{}", field(poem, "title").unwrap_or("未知"));
        let _ = writeln!(
            out,
            "作者：{} ({})",
            field(poem, "author").unwrap_or("未知"),
            field(poem, "dynasty").unwrap_or("未知"),
        );
        let _ = writeln!(out, "\n{}", field(poem, "content").unwrap_or("内容缺失"));
        let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    }
    if poems.len() > limit {
        let _ = writeln!(
            out,
            "\n（共 {} 条结果，仅显示前 {} 条）",
            poems.len(),
            limit
        );
    }
}

/// Look up a string field, accepting `title` or `Title`.
fn field<'a>(item: &'a Value, name: &str) -> Option<&'a str> {
    let object = item.as_object()?;
    let mut capitalized = name[..1].to_uppercase();
    capitalized.push_str(&name[1..]);
    object
        .get(name)
        .or_else(|| object.get(&capitalized))
        .and_then(Value::as_str)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Render one dictionary lookup, with suggestions when nothing matched.
pub fn render_dictionary(keyword: &str, entry: Option<&DictionaryEntry>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule());
    let _ = writeln!(out, "关键词：{}", style(keyword).bold().green());
    let _ = writeln!(out, "{}", rule());
    match entry {
        Some(entry) => {
            // 打印辞典原文
            let _ = writeln!(out, "\n根据《中国历史大辞典》：");
            let _ = writeln!(out, "\n「{}」", entry.text);
        }
        None => {
            let _ = writeln!(out, "\n未找到词条“{}”", keyword);
            let _ = writeln!(out, "\n建议：");
            let _ = writeln!(out, "  1. 尝试简化关键词");
            let _ = writeln!(out, "  2. 使用同义词或别称");
            let _ = writeln!(out, "  3. 查询相关的更大类别");
        }
    }
    let _ = writeln!(out, "\n{}", rule());
    out
}
