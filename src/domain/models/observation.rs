// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::search_term::SearchTerm;

/// 观测值
///
/// 某个搜索词在某一时刻的职位数量。每次成功查询只创建一次，
/// 创建后不可修改，写入结果存储后生命周期结束。
///
/// 字段顺序即结果文件的列顺序：`job_title, location, ts, count`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// 职位名称
    pub job_title: String,
    /// 地点
    pub location: String,
    /// 观测时间（UTC，毫秒精度）
    #[serde(with = "ts_millis")]
    pub ts: DateTime<Utc>,
    /// 职位数量
    pub count: u64,
}

impl Observation {
    /// 创建观测值
    ///
    /// 时间戳会被截断到毫秒，保证写入再读回时不丢失精度
    pub fn new(term: &SearchTerm, count: u64, ts: DateTime<Utc>) -> Self {
        Self {
            job_title: term.job_title.clone(),
            location: term.location.clone(),
            ts: ts.trunc_subsecs(3),
            count,
        }
    }

    pub fn term(&self) -> SearchTerm {
        SearchTerm::new(self.job_title.clone(), self.location.clone())
    }
}

/// `ts` 列的序列化格式：`2024-05-01T12:30:45.123Z`
pub mod ts_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}
