// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use jobcount::domain::models::session::StoredCookie;
use jobcount::engines::factory::BackendProvider;
use jobcount::engines::traits::{
    EngineError, SearchBackend, SearchRequest, SearchResponse,
};

/// 每次搜索按顺序消费一个步骤
pub enum Step {
    /// 结果页显示该数量
    Count(u64),
    /// 结果页上没有计数元素
    NoCount,
    /// 搜索返回错误
    Fail(EngineError),
    /// 会话被服务端撤销，页面被重定向到授权墙
    Revoke,
}

/// 按脚本返回结果的搜索后端
pub struct ScriptedBackend {
    steps: Mutex<VecDeque<Step>>,
    logged_in: AtomicBool,
    /// 登录页上需要检查多少次才算登录成功
    login_after_checks: Mutex<Option<usize>>,
    checks: AtomicUsize,
    pub searched: Mutex<Vec<String>>,
    pub installed: Mutex<Vec<StoredCookie>>,
    pub closed: AtomicBool,
}

impl ScriptedBackend {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            logged_in: AtomicBool::new(true),
            login_after_checks: Mutex::new(None),
            checks: AtomicUsize::new(0),
            searched: Mutex::new(Vec::new()),
            installed: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }

    /// 服务端拒绝已保存的会话
    pub fn reject_session(&self) {
        self.logged_in.store(false, Ordering::SeqCst);
    }

    /// 模拟操作者在第 `checks` 次检查时完成登录
    pub fn complete_login_after(&self, checks: usize) {
        self.logged_in.store(false, Ordering::SeqCst);
        *self.login_after_checks.lock() = Some(checks);
    }

    pub fn searched(&self) -> Vec<String> {
        self.searched.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

fn page(request: &SearchRequest, final_url: String, body: String) -> SearchResponse {
    SearchResponse {
        requested_url: request.url.clone(),
        final_url,
        status_code: 200,
        content: body,
        response_time_ms: 3,
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn navigate(&self, _url: &str) -> Result<(), EngineError> {
        Ok(())
    }

    async fn is_authenticated(&self) -> Result<bool, EngineError> {
        let n = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(after) = *self.login_after_checks.lock() {
            if n >= after {
                self.logged_in.store(true, Ordering::SeqCst);
            }
        }
        Ok(self.logged_in.load(Ordering::SeqCst))
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, EngineError> {
        self.searched
            .lock()
            .push(format!("{},{}", request.term.job_title, request.term.location));

        let step = self.steps.lock().pop_front().unwrap_or(Step::NoCount);
        match step {
            Step::Count(n) => Ok(page(
                request,
                request.url.clone(),
                format!(
                    r#"<div class="jobs-search-results-list__subtitle"><span>{} results</span></div>"#,
                    n
                ),
            )),
            Step::NoCount => Ok(page(
                request,
                request.url.clone(),
                "<main><h2>No matching jobs found.</h2></main>".to_string(),
            )),
            Step::Fail(e) => Err(e),
            Step::Revoke => {
                self.logged_in.store(false, Ordering::SeqCst);
                Ok(page(
                    request,
                    "https://jobs.example.test/authwall".to_string(),
                    "<main>Sign in to continue</main>".to_string(),
                ))
            }
        }
    }

    async fn install_cookies(&self, cookies: &[StoredCookie]) -> Result<(), EngineError> {
        self.installed.lock().extend_from_slice(cookies);
        Ok(())
    }

    async fn export_cookies(&self) -> Result<Vec<StoredCookie>, EngineError> {
        Ok(vec![StoredCookie::new("li_at", "fresh-login", ".example.test")])
    }

    async fn close(&self) -> Result<(), EngineError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// 记录创建次数的后端提供者
pub struct ScriptedProvider {
    backend: Arc<ScriptedBackend>,
    created: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(backend: Arc<ScriptedBackend>) -> Self {
        Self {
            backend,
            created: AtomicUsize::new(0),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendProvider for ScriptedProvider {
    async fn create(&self) -> Result<Arc<dyn SearchBackend>, EngineError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(self.backend.clone())
    }
}
