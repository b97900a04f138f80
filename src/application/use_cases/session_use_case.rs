// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::application::use_cases::query_use_case::RunError;
use crate::domain::models::session::Session;
use crate::domain::services::session_manager::{SessionError, SessionManager};
use crate::engines::factory::BackendProvider;

/// 登录用例：打开有界面的浏览器，等待操作者手动登录
pub struct LoginUseCase {
    sessions: Arc<SessionManager>,
    backends: Arc<dyn BackendProvider>,
    timeout: Duration,
}

impl LoginUseCase {
    pub fn new(
        sessions: Arc<SessionManager>,
        backends: Arc<dyn BackendProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            sessions,
            backends,
            timeout,
        }
    }

    pub async fn execute(&self) -> Result<Session, RunError> {
        let backend = self.backends.create().await?;
        let result = self.sessions.login(backend.as_ref(), self.timeout).await;

        if let Err(e) = backend.close().await {
            warn!(error = %e, "failed to close search backend");
        }

        let session = result?;
        info!(
            location = %self.sessions.credential_location(),
            cookies = session.cookies().len(),
            "session saved"
        );
        Ok(session)
    }
}

/// 清除凭据用例
pub struct ClearCookiesUseCase {
    sessions: Arc<SessionManager>,
}

impl ClearCookiesUseCase {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// 返回是否确实删除了文件
    pub async fn execute(&self) -> Result<bool, SessionError> {
        let removed = self.sessions.clear().await?;
        if removed {
            info!(location = %self.sessions.credential_location(), "saved session removed");
        } else {
            info!(location = %self.sessions.credential_location(), "no saved session to remove");
        }
        Ok(removed)
    }
}
