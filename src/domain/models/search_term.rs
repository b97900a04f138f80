// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 搜索词
///
/// 一次搜索由职位名称和地点唯一确定。批次中允许重复的搜索词，
/// 每次出现都会被单独查询和记录。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchTerm {
    /// 职位名称
    pub job_title: String,
    /// 地点
    pub location: String,
}

impl SearchTerm {
    pub fn new(job_title: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            job_title: job_title.into(),
            location: location.into(),
        }
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" in \"{}\"", self.job_title, self.location)
    }
}
