// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;
use uuid::Uuid;

use crate::domain::models::observation::Observation;
use crate::domain::models::search_term::SearchTerm;

/// 单个搜索词的失败类型
#[derive(Debug, Clone, PartialEq)]
pub enum FailureKind {
    /// 响应中找不到职位数量
    ExtractionFailed,
    /// 临时错误在重试后仍然失败
    Transient { attempts: u32, message: String },
    /// 不可重试的请求错误（如 404）
    RequestFailed { message: String },
    /// 会话在批次中途失效，批次剩余部分被中止
    SessionInvalid,
    /// 已查到数量但无法写入结果文件，批次剩余部分被中止
    WriteFailed { message: String },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ExtractionFailed => write!(f, "ExtractionFailed"),
            FailureKind::Transient { attempts, message } => {
                write!(f, "TermFailure after {} attempt(s): {}", attempts, message)
            }
            FailureKind::RequestFailed { message } => write!(f, "RequestFailed: {}", message),
            FailureKind::SessionInvalid => write!(f, "SessionInvalid"),
            FailureKind::WriteFailed { message } => write!(f, "WriteFailed: {}", message),
        }
    }
}

/// 单个搜索词的失败记录
///
/// 失败的搜索词不会产生观测值，但必须出现在运行报告中
#[derive(Debug, Clone, PartialEq)]
pub struct TermFailure {
    /// 在输入批次中的位置（从 0 开始）
    pub index: usize,
    pub term: SearchTerm,
    pub kind: FailureKind,
}

impl fmt::Display for TermFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "term #{} {}: {}", self.index + 1, self.term, self.kind)
    }
}

/// 查询引擎为每个搜索词产出的结果
#[derive(Debug, Clone, PartialEq)]
pub enum TermOutcome {
    Observed(Observation),
    Failed(TermFailure),
}

/// 运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// 所有搜索词均成功
    Completed,
    /// 批次完成，但部分搜索词失败
    CompletedWithFailures { failed: usize, total: usize },
    /// 批次在中途被中止
    Aborted,
}

impl RunStatus {
    /// 进程退出码
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Completed => 0,
            RunStatus::CompletedWithFailures { .. } => 2,
            RunStatus::Aborted => 3,
        }
    }
}

/// 一次批量运行的报告
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub total_terms: usize,
    pub observations: Vec<Observation>,
    pub failures: Vec<TermFailure>,
    /// 中途中止的原因
    pub aborted: Option<String>,
}

impl RunReport {
    pub fn new(total_terms: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            total_terms,
            observations: Vec::new(),
            failures: Vec::new(),
            aborted: None,
        }
    }

    pub fn status(&self) -> RunStatus {
        if self.aborted.is_some() {
            RunStatus::Aborted
        } else if self.failures.is_empty() {
            RunStatus::Completed
        } else {
            RunStatus::CompletedWithFailures {
                failed: self.failures.len(),
                total: self.total_terms,
            }
        }
    }

    /// 未被处理的搜索词数量（仅在中止时大于 0）
    pub fn skipped(&self) -> usize {
        self.total_terms
            .saturating_sub(self.observations.len() + self.failures.len())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status() {
            RunStatus::Completed => write!(
                f,
                "completed: {}/{} terms recorded",
                self.observations.len(),
                self.total_terms
            ),
            RunStatus::CompletedWithFailures { failed, total } => {
                write!(f, "completed with {}/{} terms failed", failed, total)
            }
            RunStatus::Aborted => write!(
                f,
                "aborted after {}/{} terms ({} recorded, {} failed, {} not attempted): {}",
                self.observations.len() + self.failures.len(),
                self.total_terms,
                self.observations.len(),
                self.failures.len(),
                self.skipped(),
                self.aborted.as_deref().unwrap_or("unknown reason")
            ),
        }
    }
}
