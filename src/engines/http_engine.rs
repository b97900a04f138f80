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
use parking_lot::Mutex;
use reqwest::cookie::{CookieStore, Jar};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use crate::domain::models::session::StoredCookie;
use crate::engines::traits::{
    is_login_url, EngineError, SearchBackend, SearchRequest, SearchResponse,
};

const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// HTTP 搜索引擎
///
/// 基于reqwest实现，用 Cookie 罐承载会话；登录状态由最近一次请求
/// 跟随重定向之后的最终URL判断
pub struct HttpEngine {
    client: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
    current_url: Mutex<Option<String>>,
}

impl HttpEngine {
    /// 创建引擎
    ///
    /// # 参数
    ///
    /// * `base_url` - 站点根地址，Cookie 默认绑定到该主机
    /// * `request_timeout` - 单次请求超时时间
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, EngineError> {
        let base_url = Url::parse(base_url)?;
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .user_agent(DESKTOP_USER_AGENT)
            .timeout(request_timeout)
            .cookie_provider(jar.clone())
            .build()?;

        Ok(Self {
            client,
            jar,
            base_url,
            current_url: Mutex::new(None),
        })
    }

    fn host(&self) -> String {
        self.base_url.host_str().unwrap_or_default().to_string()
    }

    async fn fetch(&self, url: &str) -> Result<SearchResponse, EngineError> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        *self.current_url.lock() = Some(final_url.clone());

        if !response.status().is_success() {
            return Err(EngineError::HttpStatus(status_code));
        }

        let content = response.text().await?;

        Ok(SearchResponse {
            requested_url: url.to_string(),
            final_url,
            status_code,
            content,
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait]
impl SearchBackend for HttpEngine {
    async fn navigate(&self, url: &str) -> Result<(), EngineError> {
        self.fetch(url).await.map(|_| ())
    }

    async fn is_authenticated(&self) -> Result<bool, EngineError> {
        Ok(self
            .current_url
            .lock()
            .as_deref()
            .is_some_and(|url| !is_login_url(url)))
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, EngineError> {
        let response = self.fetch(&request.url).await?;
        if is_login_url(&response.final_url) {
            return Err(EngineError::NotAuthenticated {
                url: response.final_url,
            });
        }
        Ok(response)
    }

    async fn install_cookies(&self, cookies: &[StoredCookie]) -> Result<(), EngineError> {
        let host = self.host();
        for cookie in cookies {
            let mut raw = format!("{}={}; Path={}", cookie.name, cookie.value, cookie.path);
            let domain = cookie.domain.trim_start_matches('.');
            // Host-only when the cookie belongs to the base host itself
            if !domain.eq_ignore_ascii_case(&host) {
                raw.push_str(&format!("; Domain={}", domain));
            }
            if cookie.secure {
                raw.push_str("; Secure");
            }
            if cookie.http_only {
                raw.push_str("; HttpOnly");
            }
            self.jar.add_cookie_str(&raw, &self.base_url);
        }
        tracing::debug!(count = cookies.len(), "cookies installed into HTTP jar");
        Ok(())
    }

    async fn export_cookies(&self) -> Result<Vec<StoredCookie>, EngineError> {
        let Some(header) = self.jar.cookies(&self.base_url) else {
            return Ok(Vec::new());
        };
        let header = header
            .to_str()
            .map_err(|e| EngineError::Other(format!("Invalid cookie header: {}", e)))?;

        let host = self.host();
        let cookies = header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .map(|(name, value)| {
                let mut cookie = StoredCookie::new(name, value, host.clone());
                cookie.secure = self.base_url.scheme() == "https";
                cookie
            })
            .collect();
        Ok(cookies)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
#[path = "http_engine_test.rs"]
mod tests;
