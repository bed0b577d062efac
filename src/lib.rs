//! Look up people, events, poems and books from Chinese history.
//!
//! Two sources are supported: the offline 《中国历史大辞典》 (queried through
//! the external `mdict` tool) and the 古籍文献知识图谱 REST API. The
//! [`expert`] module combines both into a single narrated lookup.

pub mod api;
pub mod cli;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod expert;
pub mod format;

pub use crate::{
    api::{
        BookSearchRequest, HistoryApi, HistoryApiClient, PassageSearchRequest,
        PoetrySearchRequest,
    },
    config::{ApiConfig, DictionaryConfig},
    dictionary::{Dictionary, DictionaryEntry, LookupReport, MdictTool},
    error::{Error, QueryResult, Result},
    expert::{HistoryExpert, Summary},
    format::QueryKind,
};
