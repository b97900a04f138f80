// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::domain::models::search_term::SearchTerm;
use crate::domain::models::session::StoredCookie;
use crate::engines::count_extractor;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 非成功的 HTTP 状态码
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 浏览器驱动错误
    #[error("Browser error: {0}")]
    Browser(String),
    /// 服务端将请求重定向到了登录页
    #[error("Not authenticated (landed on {url})")]
    NotAuthenticated { url: String },
    /// URL 无法构造
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 如果错误是可重试的则返回true，否则返回false
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            EngineError::HttpStatus(code) => *code == 429 || *code >= 500,
            EngineError::Timeout => true,
            EngineError::Browser(_) => true,
            _ => false,
        }
    }
}

/// 搜索后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Chromium 浏览器（chromiumoxide）
    Chrome,
    /// 纯 HTTP 客户端（reqwest + Cookie 罐）
    Http,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Chrome => "chrome",
            BackendKind::Http => "http",
        }
    }

    /// 凭据目录名。HTTP 后端重放 Chrome 登录得到的会话，两者共用一份 Cookie
    pub fn cookie_profile(&self) -> &'static str {
        "chrome"
    }
}

/// 搜索请求
///
/// 同一个搜索词总是生成同一个请求
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub term: SearchTerm,
    /// 目标URL
    pub url: String,
    /// 单次请求超时时间
    pub timeout: Duration,
}

impl SearchRequest {
    /// 根据站点根地址和搜索词构造请求
    pub fn for_term(base_url: &str, term: &SearchTerm, timeout: Duration) -> Result<Self, EngineError> {
        let mut url = Url::parse(base_url)?.join("/jobs/search/")?;
        url.query_pairs_mut()
            .append_pair("keywords", &term.job_title)
            .append_pair("location", &term.location);

        Ok(Self {
            term: term.clone(),
            url: url.to_string(),
            timeout,
        })
    }
}

/// 搜索响应
#[derive(Debug, Clone)]
pub struct SearchResponse {
    /// 请求的URL
    pub requested_url: String,
    /// 跟随重定向之后的最终URL
    pub final_url: String,
    /// HTTP状态码
    pub status_code: u16,
    /// 页面内容
    pub content: String,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

/// 判断 URL 是否是登录、授权墙或安全验证页面
///
/// 只检查路径，查询参数里的搜索关键字不参与判断
pub fn is_login_url(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_ascii_lowercase(),
        Err(_) => url.to_ascii_lowercase(),
    };
    ["login", "authwall", "checkpoint", "signup"]
        .iter()
        .any(|marker| path.contains(marker))
}

/// 搜索能力特质
///
/// 浏览器驱动或重放搜索接口的 HTTP 客户端都可以实现该接口，
/// 站点布局相关的易变逻辑被限制在这一层。
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// 打开页面
    async fn navigate(&self, url: &str) -> Result<(), EngineError>;

    /// 当前上下文是否处于登录状态
    async fn is_authenticated(&self) -> Result<bool, EngineError>;

    /// 执行一次搜索
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, EngineError>;

    /// 从响应中提取职位总数，找不到时返回 `None`
    fn extract_count(&self, response: &SearchResponse) -> Option<u64> {
        count_extractor::extract_count(&response.content)
    }

    /// 注入已保存的 Cookie
    async fn install_cookies(&self, cookies: &[StoredCookie]) -> Result<(), EngineError>;

    /// 导出当前上下文的 Cookie
    async fn export_cookies(&self) -> Result<Vec<StoredCookie>, EngineError>;

    /// 释放浏览器等资源
    async fn close(&self) -> Result<(), EngineError> {
        Ok(())
    }

    /// 引擎名称
    fn name(&self) -> &'static str;
}
