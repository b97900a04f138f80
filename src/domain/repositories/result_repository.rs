// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::observation::Observation;

/// 结果存储错误类型
#[derive(Error, Debug)]
pub enum SinkError {
    /// 目标文件的表头与固定列不一致，拒绝写入
    #[error("SchemaMismatch: {path} has header [{found}], expected [{expected}]")]
    SchemaMismatch {
        path: String,
        expected: String,
        found: String,
    },
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV 编解码错误
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// 后台写入任务异常退出
    #[error("write task failed: {0}")]
    Join(String),
}

/// 结果仓库特质
///
/// 只追加：已有行永不改写或重排，每次 `append` 返回前必须已经落盘
#[async_trait]
pub trait ResultRepository: Send + Sync {
    async fn append(&self, observation: &Observation) -> Result<(), SinkError>;

    /// 批次开始前确认目标可写入（已有文件的表头必须匹配）
    async fn check(&self) -> Result<(), SinkError>;

    /// 存储位置，用于提示信息
    fn location(&self) -> String;
}
