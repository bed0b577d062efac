//! Comprehensive lookup of one keyword across every source we have.
//!
//! The steps always run in the same order: dictionary, person, poems by that
//! person (only if the person was found), then books. A failing source is
//! reported as a miss and the remaining steps still run.

use std::io::{self, Write};

use console::style;
use serde_json::Value;
use tracing::warn;

use crate::{
    api::{BookSearchRequest, HistoryApi, PoetrySearchRequest},
    dictionary::Dictionary,
    error::QueryResult,
};

/// Which sources had something to say about the keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub dictionary: bool,
    pub person: bool,
    /// `None` when the poetry step was skipped.
    pub poetry: Option<bool>,
    pub books: bool,
}

impl Summary {
    /// Poetry is informational only and does not count here.
    pub fn found(&self) -> bool {
        self.dictionary || self.person || self.books
    }
}

/// Does this result carry real content rather than an error or nothing?
pub fn is_hit(result: &QueryResult) -> bool {
    match result {
        Ok(value) => truthy(value) && !has_error_marker(value),
        Err(_) => false,
    }
}

fn has_error_marker(value: &Value) -> bool {
    value.get("error").map_or(false, truthy)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Runs the comprehensive query against a dictionary and the history API.
pub struct HistoryExpert<'a> {
    dictionary: &'a dyn Dictionary,
    api: &'a dyn HistoryApi,
}

impl<'a> HistoryExpert<'a> {
    pub fn new(dictionary: &'a dyn Dictionary, api: &'a dyn HistoryApi) -> Self {
        Self { dictionary, api }
    }

    /// Query every source for `keyword`, narrating progress to `out`.
    pub fn query<W: Write>(&self, keyword: &str, out: &mut W) -> io::Result<Summary> {
        let wide_rule = "=".repeat(70);
        let thin_rule = "-".repeat(70);
        writeln!(out, "\n{}", wide_rule)?;
        writeln!(out, "{}", style("中国历史专家系统 - 综合查询").bold())?;
        writeln!(out, "{}", wide_rule)?;
        writeln!(out, "\n🔍 查询关键词: {}\n", keyword)?;

        let mut summary = Summary::default();

        // 辞典
        writeln!(out, "📚 步骤1: 查询《中国历史大辞典》...")?;
        match self.dictionary.lookup(keyword) {
            Ok(Some(entry)) => {
                summary.dictionary = true;
                writeln!(out, "{} 找到辞典词条\n", style("✓").green())?;
                writeln!(out, "{}", thin_rule)?;
                writeln!(out, "根据《中国历史大辞典》：\n")?;
                writeln!(out, "「{}」", entry.text)?;
                writeln!(out, "{}", thin_rule)?;
            }
            Ok(None) => {
                writeln!(out, "{} 辞典中未找到此词条", style("✗").red())?;
                writeln!(out, "💡 建议: 尝试使用同义词或简化关键词\n")?;
            }
            Err(err) => {
                warn!(%err, "Dictionary lookup failed");
                writeln!(out, "⚠️  {}", err)?;
                writeln!(out, "{} 辞典中未找到此词条\n", style("✗").red())?;
            }
        }

        // 人物、诗词、古籍依次查询，任何一步失败都不影响后面的步骤
        writeln!(out, "\n📖 步骤2: 查询古籍文献知识图谱API...")?;
        writeln!(out, "\n2.1 尝试作为人物查询...")?;
        let person = self.api.lookup_person(keyword);
        summary.person = self.report(out, "人物", &person, "找到人物信息", "未找到人物信息")?;

        if summary.person {
            let request = PoetrySearchRequest::by_author(keyword);
            if !request.is_empty() {
                writeln!(out, "\n2.2 查询相关诗词作品...")?;
                let poetry = self.api.search_poetry(&request);
                summary.poetry =
                    Some(self.report(out, "诗词", &poetry, "找到相关诗词", "未找到相关诗词")?);
            }
        }

        writeln!(out, "\n2.3 查询相关古籍文献...")?;
        let books = self.api.search_books(&BookSearchRequest::new(keyword));
        summary.books = self.report(out, "古籍", &books, "找到相关古籍", "未找到相关古籍")?;

        // 打印总结
        writeln!(out, "\n{}", wide_rule)?;
        writeln!(out, "查询完成")?;
        writeln!(out, "{}", wide_rule)?;
        if summary.found() {
            writeln!(
                out,
                "\n{} 已找到相关资料，可以基于以上信息回答问题",
                style("✓").green()
            )?;
        } else {
            writeln!(out, "\n{} 未找到相关资料", style("✗").red())?;
            writeln!(out, "\n💡 建议:")?;
            writeln!(out, "  • 检查关键词拼写")?;
            writeln!(out, "  • 尝试使用同义词或别称")?;
            writeln!(out, "  • 简化查询词（如'唐太宗李世民' → '李世民'）")?;
            writeln!(out, "  • 查询相关的更大类别")?;
        }
        writeln!(out)?;
        Ok(summary)
    }

    fn report<W: Write>(
        &self,
        out: &mut W,
        source: &str,
        result: &QueryResult,
        hit: &str,
        miss: &str,
    ) -> io::Result<bool> {
        if let Err(err) = result {
            warn!(source, %err, "API query failed");
            writeln!(out, "⚠️  {}API查询出错: {}", source, err)?;
        }
        let found = is_hit(result);
        if found {
            writeln!(out, "{} {}", style("✓").green(), hit)?;
        } else {
            writeln!(out, "{} {}", style("✗").red(), miss)?;
        }
        Ok(found)
    }
}
