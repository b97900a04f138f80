// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, TimeSinceEpoch};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::domain::models::session::StoredCookie;
use crate::engines::count_extractor;
use crate::engines::traits::{
    is_login_url, EngineError, SearchBackend, SearchRequest, SearchResponse,
};

/// 搜索结果渲染完成前，等待计数元素出现的最长时间
const COUNT_SETTLE_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 浏览器启动选项
#[derive(Debug, Clone)]
pub struct ChromiumOptions {
    /// 是否无头运行
    pub headless: bool,
    /// 浏览器级别的 CDP 请求超时
    pub request_timeout: Duration,
    /// 远程调试地址，设置后连接已有的 Chrome 而不是启动新实例
    pub remote_debugging_url: Option<String>,
}

impl Default for ChromiumOptions {
    fn default() -> Self {
        Self {
            headless: true,
            request_timeout: Duration::from_secs(30),
            remote_debugging_url: std::env::var("CHROMIUM_REMOTE_DEBUGGING_URL").ok(),
        }
    }
}

fn browser_error(e: impl std::fmt::Display) -> EngineError {
    EngineError::Browser(e.to_string())
}

/// Chromium 搜索引擎
///
/// 基于chromiumoxide实现的浏览器自动化后端。整个运行期间复用同一个页面，
/// 也就是同一个已认证的浏览上下文
pub struct ChromiumEngine {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    ready_timeout: Duration,
}

impl ChromiumEngine {
    /// 启动（或连接）浏览器并打开一个空白页
    pub async fn launch(options: ChromiumOptions) -> Result<Self, EngineError> {
        let (browser, mut handler) = if let Some(ref url) = options.remote_debugging_url {
            tracing::info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url.clone())
                .await
                .map_err(|e| EngineError::Browser(format!("Failed to connect to remote Chrome: {}", e)))?
        } else {
            let mut builder = BrowserConfig::builder()
                .request_timeout(options.request_timeout)
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage");
            if !options.headless {
                builder = builder.with_head();
            }

            Browser::launch(builder.build().map_err(EngineError::Browser)?)
                .await
                .map_err(|e| {
                    EngineError::Browser(format!(
                        "Chrome could not be started; make sure it is installed or use --browser http: {}",
                        e
                    ))
                })?
        };

        // Browser events must be drained for CDP calls to resolve
        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(browser_error)?;
        tracing::debug!(headless = options.headless, "chromium page ready");

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
            ready_timeout: options.request_timeout,
        })
    }

    async fn current_url(&self) -> Result<Option<String>, EngineError> {
        self.page.url().await.map_err(browser_error)
    }

    async fn wait_until_ready(&self) -> Result<(), EngineError> {
        let start = Instant::now();
        loop {
            let state: String = self
                .page
                .evaluate("document.readyState")
                .await
                .map_err(browser_error)?
                .into_value()
                .map_err(browser_error)?;
            if state == "complete" {
                return Ok(());
            }
            if start.elapsed() >= self.ready_timeout {
                return Err(EngineError::Timeout);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// 等待计数元素渲染出来，超时后返回当时的页面内容
    async fn settled_content(&self) -> Result<String, EngineError> {
        let start = Instant::now();
        loop {
            let content = self.page.content().await.map_err(browser_error)?;
            if count_extractor::extract_count(&content).is_some()
                || start.elapsed() >= COUNT_SETTLE_TIMEOUT
            {
                return Ok(content);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl SearchBackend for ChromiumEngine {
    async fn navigate(&self, url: &str) -> Result<(), EngineError> {
        self.page.goto(url).await.map_err(browser_error)?;
        self.wait_until_ready().await
    }

    async fn is_authenticated(&self) -> Result<bool, EngineError> {
        Ok(self
            .current_url()
            .await?
            .is_some_and(|url| url != "about:blank" && !is_login_url(&url)))
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, EngineError> {
        let start = Instant::now();

        tokio::time::timeout(request.timeout, async {
            self.navigate(&request.url).await?;

            let final_url = self
                .current_url()
                .await?
                .unwrap_or_else(|| request.url.clone());
            if is_login_url(&final_url) {
                return Err(EngineError::NotAuthenticated { url: final_url });
            }

            let content = self.settled_content().await?;

            Ok(SearchResponse {
                requested_url: request.url.clone(),
                final_url,
                // CDP navigation does not surface the document status here
                status_code: 200,
                content,
                response_time_ms: start.elapsed().as_millis() as u64,
            })
        })
        .await
        .map_err(|_| EngineError::Timeout)?
    }

    async fn install_cookies(&self, cookies: &[StoredCookie]) -> Result<(), EngineError> {
        let mut params = Vec::with_capacity(cookies.len());
        for cookie in cookies {
            let mut builder = CookieParam::builder()
                .name(cookie.name.clone())
                .value(cookie.value.clone())
                .domain(cookie.domain.clone())
                .path(cookie.path.clone())
                .secure(cookie.secure)
                .http_only(cookie.http_only);
            if let Some(expires) = cookie.expires {
                builder = builder.expires(TimeSinceEpoch::new(expires));
            }
            params.push(builder.build().map_err(EngineError::Browser)?);
        }

        self.page.set_cookies(params).await.map_err(browser_error)?;
        tracing::debug!(count = cookies.len(), "cookies installed into browser");
        Ok(())
    }

    async fn export_cookies(&self) -> Result<Vec<StoredCookie>, EngineError> {
        let cookies = self.page.get_cookies().await.map_err(browser_error)?;
        Ok(cookies
            .into_iter()
            .map(|c| StoredCookie {
                name: c.name,
                value: c.value,
                domain: c.domain,
                path: c.path,
                expires: (!c.session).then_some(c.expires),
                secure: c.secure,
                http_only: c.http_only,
            })
            .collect())
    }

    async fn close(&self) -> Result<(), EngineError> {
        let mut browser = self.browser.lock().await;
        let result = browser.close().await.map(|_| ()).map_err(browser_error);
        self.handler.abort();
        result
    }

    fn name(&self) -> &'static str {
        "chrome"
    }
}
