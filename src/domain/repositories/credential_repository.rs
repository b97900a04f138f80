// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::models::session::Session;

/// 凭据存储错误类型
#[derive(Error, Debug)]
pub enum CredentialError {
    /// IO错误
    #[error("credential file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 序列化错误
    #[error("could not encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// 凭据仓库特质
///
/// 只有会话管理器可以使用该接口。结构损坏的凭据按“不存在”处理，
/// 而不是作为错误返回。
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// 加载会话，不存在或无法解析时返回 `Ok(None)`
    async fn load(&self) -> Result<Option<Session>, CredentialError>;

    /// 原子覆盖保存会话
    async fn save(&self, session: &Session) -> Result<(), CredentialError>;

    /// 删除凭据，返回是否确实删除了文件；重复调用不报错
    async fn clear(&self) -> Result<bool, CredentialError>;

    /// 凭据所在位置，用于提示信息
    fn location(&self) -> String;
}
