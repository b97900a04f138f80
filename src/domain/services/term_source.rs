// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::models::search_term::SearchTerm;

/// 词条加载错误
#[derive(Error, Debug)]
pub enum TermSourceError {
    /// 行内词条与输入文件必须且只能提供一个
    #[error("InputConflict: {0}")]
    InputConflict(&'static str),
    /// 行内词条不是 "职位,地点" 格式
    #[error("MalformedTerm: {input:?} {reason}")]
    MalformedTerm { input: String, reason: String },
    /// 输入文件缺少必需的列
    #[error("MissingColumn: {path} has no '{column}' column")]
    MissingColumn { path: String, column: &'static str },
    /// CSV 读取错误
    #[error("could not read input file {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

const TITLE_COLUMN: &str = "job_title";
const LOCATION_COLUMN: &str = "location";

/// 词条来源
#[derive(Debug, Clone, PartialEq)]
pub enum TermSource {
    /// 命令行上的 `"职位,地点"` 列表
    Inline(Vec<String>),
    /// 带 `job_title`、`location` 表头的 CSV 文件
    File(PathBuf),
}

impl TermSource {
    /// 从命令行参数确定词条来源
    ///
    /// 两者都给或都不给都是配置错误，在任何浏览器或网络活动之前报出
    pub fn from_args(
        terms: Option<Vec<String>>,
        input_file: Option<PathBuf>,
    ) -> Result<Self, TermSourceError> {
        let terms = terms.filter(|t| !t.is_empty());
        match (terms, input_file) {
            (Some(terms), None) => Ok(TermSource::Inline(terms)),
            (None, Some(path)) => Ok(TermSource::File(path)),
            (Some(_), Some(_)) => Err(TermSourceError::InputConflict(
                "expected inline terms or an input file, not both",
            )),
            (None, None) => Err(TermSourceError::InputConflict(
                "expected inline terms or an input file",
            )),
        }
    }

    /// 加载搜索词
    pub fn load(&self) -> Result<Vec<SearchTerm>, TermSourceError> {
        match self {
            TermSource::Inline(raw) => raw.iter().map(|s| parse_inline_term(s)).collect(),
            TermSource::File(path) => load_file(path),
        }
    }
}

/// 解析 `"职位,地点"`，必须恰好是两个非空字段
pub fn parse_inline_term(raw: &str) -> Result<SearchTerm, TermSourceError> {
    let malformed = |reason: &str| TermSourceError::MalformedTerm {
        input: raw.to_string(),
        reason: reason.to_string(),
    };

    let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
    if fields.len() != 2 {
        return Err(malformed("must contain exactly one comma separating title and location"));
    }
    if fields[0].is_empty() || fields[1].is_empty() {
        return Err(malformed("title and location must both be non-empty"));
    }

    Ok(SearchTerm::new(fields[0], fields[1]))
}

fn load_file(path: &Path) -> Result<Vec<SearchTerm>, TermSourceError> {
    let path_str = path.display().to_string();
    let csv_error = |source: csv::Error| TermSourceError::Csv {
        path: path_str.clone(),
        source,
    };

    info!("Reading search terms from {}", path_str);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| TermSourceError::MissingColumn {
                path: path_str.clone(),
                column: name,
            })
    };
    let title_idx = column(TITLE_COLUMN)?;
    let location_idx = column(LOCATION_COLUMN)?;

    let mut terms = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let title = record.get(title_idx).unwrap_or_default();
        let location = record.get(location_idx).unwrap_or_default();

        if title.is_empty() || location.is_empty() {
            // Header is line 1
            warn!(
                line = row + 2,
                job_title = title,
                location = location,
                "skipping input row with an empty job title or location"
            );
            continue;
        }
        terms.push(SearchTerm::new(title, location));
    }

    info!("Loaded {} search terms from {}", terms.len(), path_str);
    Ok(terms)
}
