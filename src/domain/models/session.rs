// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 持久化的 Cookie
///
/// 与具体浏览器驱动无关的最小 Cookie 表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// 过期时间（Unix 秒），会话 Cookie 为空
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

fn default_path() -> String {
    "/".to_string()
}

impl StoredCookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: default_path(),
            expires: None,
            secure: true,
            http_only: false,
        }
    }

    fn is_well_formed(&self) -> bool {
        !self.name.trim().is_empty() && !self.domain.trim().is_empty()
    }
}

/// 已认证会话
///
/// 要么完整且结构有效（可加载、非空），要么不存在。
/// 通过 [`Session::new`] 构造可保证不会出现空会话。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    cookies: Vec<StoredCookie>,
    saved_at: DateTime<Utc>,
}

impl Session {
    /// 由 Cookie 集合创建会话，空集合或存在残缺 Cookie 时返回 `None`
    pub fn new(cookies: Vec<StoredCookie>) -> Option<Self> {
        let session = Self {
            cookies,
            saved_at: Utc::now(),
        };
        session.is_valid().then_some(session)
    }

    /// 结构校验：非空且每个 Cookie 都有名称和域
    pub fn is_valid(&self) -> bool {
        !self.cookies.is_empty() && self.cookies.iter().all(StoredCookie::is_well_formed)
    }

    pub fn cookies(&self) -> &[StoredCookie] {
        &self.cookies
    }

    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }
}
