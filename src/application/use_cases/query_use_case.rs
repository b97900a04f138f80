// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::domain::models::report::{FailureKind, RunReport, TermFailure, TermOutcome};
use crate::domain::repositories::result_repository::{ResultRepository, SinkError};
use crate::domain::services::query_engine::QueryEngine;
use crate::domain::services::session_manager::{SessionError, SessionManager};
use crate::domain::services::term_source::{TermSource, TermSourceError};
use crate::engines::factory::BackendProvider;
use crate::engines::traits::EngineError;

/// 批次开始前的致命错误，出现时不会执行任何查询
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Input(#[from] TermSourceError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("could not start search backend: {0}")]
    Backend(#[from] EngineError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// 查询用例
///
/// 顺序固定：搜索词 → 结果文件表头 → 会话 → 后端 → 认证 → 逐个查询并立即写入
pub struct QueryUseCase<RR> {
    sessions: Arc<SessionManager>,
    backends: Arc<dyn BackendProvider>,
    engine: QueryEngine,
    sink: Arc<RR>,
}

impl<RR> QueryUseCase<RR>
where
    RR: ResultRepository + 'static,
{
    pub fn new(
        sessions: Arc<SessionManager>,
        backends: Arc<dyn BackendProvider>,
        engine: QueryEngine,
        sink: Arc<RR>,
    ) -> Self {
        Self {
            sessions,
            backends,
            engine,
            sink,
        }
    }

    /// 执行一次批量查询
    ///
    /// `shutdown` 完成时（例如收到 Ctrl-C）停止处理剩余搜索词，
    /// 已写入的观测值保持不变
    #[instrument(skip_all)]
    pub async fn execute<F>(&self, source: &TermSource, shutdown: F) -> Result<RunReport, RunError>
    where
        F: Future<Output = ()>,
    {
        let terms = source.load()?;
        let mut report = RunReport::new(terms.len());
        if terms.is_empty() {
            warn!("no search terms to query");
            return Ok(report);
        }

        self.sink.check().await?;
        let session = self.sessions.load().await?;
        let backend = self.backends.create().await?;

        let ctx = match self.sessions.authenticate(&session, backend.clone()).await {
            Ok(ctx) => ctx,
            Err(e) => {
                if let Err(close_err) = backend.close().await {
                    warn!(error = %close_err, "failed to close search backend");
                }
                return Err(e.into());
            }
        };

        info!(
            run_id = %report.run_id,
            terms = report.total_terms,
            backend = ctx.backend_name(),
            output = %self.sink.location(),
            "starting batch"
        );

        {
            let outcomes = self.engine.run(terms, &ctx);
            tokio::pin!(outcomes);
            tokio::pin!(shutdown);

            loop {
                let outcome = tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        warn!("interrupted, stopping before the remaining terms");
                        report.aborted = Some("interrupted by operator".to_string());
                        break;
                    }
                    next = outcomes.next() => match next {
                        Some(outcome) => outcome,
                        None => break,
                    },
                };

                match outcome {
                    TermOutcome::Observed(observation) => {
                        if let Err(e) = self.sink.append(&observation).await {
                            let failure = TermFailure {
                                index: report.observations.len() + report.failures.len(),
                                term: observation.term(),
                                kind: FailureKind::WriteFailed {
                                    message: e.to_string(),
                                },
                            };
                            error!(error = %e, term = %failure.term, "failed to write observation, aborting batch");
                            report.aborted = Some(format!(
                                "could not write the count for {} to {}: {}",
                                failure.term,
                                self.sink.location(),
                                e
                            ));
                            report.failures.push(failure);
                            break;
                        }
                        report.observations.push(observation);
                    }
                    TermOutcome::Failed(failure) => {
                        warn!("{}", failure);
                        if failure.kind == FailureKind::SessionInvalid {
                            report.aborted = Some(
                                SessionError::SessionInvalid {
                                    location: self.sessions.credential_location(),
                                    detail: format!("revoked while querying {}", failure.term),
                                }
                                .to_string(),
                            );
                        }
                        report.failures.push(failure);
                    }
                }
            }
        }

        if let Err(e) = backend.close().await {
            warn!(error = %e, "failed to close search backend");
        }

        info!(run_id = %report.run_id, "{}", report);
        Ok(report)
    }
}
