// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::models::session::Session;
use crate::domain::repositories::credential_repository::{CredentialError, CredentialRepository};

/// 本地文件凭据存储
///
/// 会话以 JSON 保存。写入先落到同目录的临时文件并 fsync，再重命名覆盖，
/// 读取时任何解析失败都视为没有会话
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CredentialError {
        CredentialError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CredentialRepository for FileCredentialStore {
    async fn load(&self) -> Result<Option<Session>, CredentialError> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        match serde_json::from_slice::<Session>(&data) {
            Ok(session) if session.is_valid() => Ok(Some(session)),
            Ok(_) => {
                tracing::warn!(path = %self.path.display(), "credential file holds no usable cookies, ignoring it");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "credential file is corrupt, ignoring it");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<(), CredentialError> {
        let data = serde_json::to_vec_pretty(session)?;

        // 确保目录存在
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| self.io_error(e))?;
        }

        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(&data).await.map_err(|e| self.io_error(e))?;
        file.sync_all().await.map_err(|e| self.io_error(e))?;
        drop(file);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        tracing::info!(path = %self.path.display(), cookies = session.cookies().len(), "session saved");
        Ok(())
    }

    async fn clear(&self) -> Result<bool, CredentialError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "session cleared");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no session file to clear");
                Ok(false)
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
