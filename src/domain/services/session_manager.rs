// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::models::session::Session;
use crate::domain::repositories::credential_repository::{CredentialError, CredentialRepository};
use crate::engines::traits::{EngineError, SearchBackend, SearchRequest, SearchResponse};

const LOGIN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// 会话错误
///
/// `NoSession` 与 `SessionInvalid` 对整个运行都是致命的，提示信息必须告诉操作者重新登录
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("NoSession: no saved session found at {location}. Run `jobcount login` first.")]
    NoSession { location: String },
    #[error("SessionInvalid: the saved session at {location} is no longer logged in ({detail}). Run `jobcount login` to log in again.")]
    SessionInvalid { location: String, detail: String },
    #[error("LoginTimeout: not logged in after {0:?}. Try again or extend --login-timeout.")]
    LoginTimeout(Duration),
    #[error(transparent)]
    Store(#[from] CredentialError),
    #[error("browser error: {0}")]
    Engine(#[from] EngineError),
}

/// 已认证的浏览上下文
///
/// 只能由 [`SessionManager::authenticate`] 创建，持有它就意味着会话已经通过校验
pub struct AuthenticatedContext {
    backend: Arc<dyn SearchBackend>,
}

impl AuthenticatedContext {
    #[cfg(test)]
    pub(crate) fn assume_authenticated(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, EngineError> {
        self.backend.search(request).await
    }

    pub fn extract_count(&self, response: &SearchResponse) -> Option<u64> {
        self.backend.extract_count(response)
    }

    pub async fn is_authenticated(&self) -> Result<bool, EngineError> {
        self.backend.is_authenticated().await
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

/// 会话管理器
///
/// 唯一可以读写凭据存储的组件
pub struct SessionManager {
    store: Arc<dyn CredentialRepository>,
    landing_url: String,
    login_url: String,
}

impl SessionManager {
    /// 创建会话管理器
    ///
    /// # 参数
    ///
    /// * `store` - 凭据存储
    /// * `landing_url` - 登录后才能访问的页面，用于校验会话
    /// * `login_url` - 登录页
    pub fn new(
        store: Arc<dyn CredentialRepository>,
        landing_url: impl Into<String>,
        login_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            landing_url: landing_url.into(),
            login_url: login_url.into(),
        }
    }

    /// 加载已保存的会话，缺失或损坏时返回 `NoSession`
    pub async fn load(&self) -> Result<Session, SessionError> {
        match self.store.load().await? {
            Some(session) => {
                info!(
                    cookies = session.cookies().len(),
                    saved_at = %session.saved_at(),
                    "session restored"
                );
                Ok(session)
            }
            None => Err(SessionError::NoSession {
                location: self.store.location(),
            }),
        }
    }

    /// 将会话绑定到浏览上下文，并在任何查询之前确认已经登录
    #[instrument(skip_all, fields(backend = backend.name()))]
    pub async fn authenticate(
        &self,
        session: &Session,
        backend: Arc<dyn SearchBackend>,
    ) -> Result<AuthenticatedContext, SessionError> {
        // Cookies can only be set once the browser is on the target domain
        backend.navigate(&self.landing_url).await?;
        backend.install_cookies(session.cookies()).await?;
        backend.navigate(&self.landing_url).await?;

        if !backend.is_authenticated().await? {
            warn!("session rejected by the service");
            return Err(SessionError::SessionInvalid {
                location: self.store.location(),
                detail: "redirected to the login page".to_string(),
            });
        }

        info!("logged in with saved session");
        Ok(AuthenticatedContext { backend })
    }

    /// 删除已保存的会话，重复调用不报错
    pub async fn clear(&self) -> Result<bool, SessionError> {
        Ok(self.store.clear().await?)
    }

    /// 打开登录页，等待操作者在浏览器中完成登录，然后保存会话
    #[instrument(skip_all, fields(backend = backend.name(), timeout = ?timeout))]
    pub async fn login(
        &self,
        backend: &dyn SearchBackend,
        timeout: Duration,
    ) -> Result<Session, SessionError> {
        backend.navigate(&self.login_url).await?;
        info!("Waiting for successful login...");

        tokio::time::timeout(timeout, async {
            loop {
                match backend.is_authenticated().await {
                    Ok(true) => return,
                    Ok(false) => {}
                    // The operator may be mid-navigation; keep waiting
                    Err(e) => warn!(error = %e, "login check failed, still waiting"),
                }
                tokio::time::sleep(LOGIN_POLL_INTERVAL).await;
            }
        })
        .await
        .map_err(|_| SessionError::LoginTimeout(timeout))?;

        let cookies = backend.export_cookies().await?;
        let session = Session::new(cookies).ok_or_else(|| SessionError::SessionInvalid {
            location: self.store.location(),
            detail: "login finished but the browser holds no cookies".to_string(),
        })?;
        self.store.save(&session).await?;

        info!("login succeeded");
        Ok(session)
    }

    pub fn credential_location(&self) -> String {
        self.store.location()
    }
}

#[cfg(test)]
#[path = "session_manager_test.rs"]
mod tests;
