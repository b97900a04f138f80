// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, SubsecRound, Utc};
use futures::stream::{self, Stream};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::settings::Settings;
use crate::domain::models::observation::Observation;
use crate::domain::models::report::{FailureKind, TermFailure, TermOutcome};
use crate::domain::models::search_term::SearchTerm;
use crate::domain::services::session_manager::AuthenticatedContext;
use crate::engines::traits::{EngineError, SearchRequest, SearchResponse};
use crate::utils::retry_policy::RetryPolicy;

/// 查询引擎
///
/// 按输入顺序逐个查询搜索词，从不并发。每个搜索词的失败相互隔离，
/// 只有会话失效会提前结束整个批次。
#[derive(Debug, Clone)]
pub struct QueryEngine {
    base_url: String,
    inter_term_delay: Duration,
    request_timeout: Duration,
    retry_policy: RetryPolicy,
}

impl QueryEngine {
    /// 创建查询引擎
    ///
    /// # 参数
    ///
    /// * `base_url` - 站点根地址
    /// * `inter_term_delay` - 相邻两个搜索词之间的等待时间
    /// * `request_timeout` - 单次请求超时时间
    /// * `retry_policy` - 临时错误的重试策略
    pub fn new(
        base_url: &str,
        inter_term_delay: Duration,
        request_timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Result<Self, EngineError> {
        Url::parse(base_url)?;
        Ok(Self {
            base_url: base_url.to_string(),
            inter_term_delay,
            request_timeout,
            retry_policy,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, EngineError> {
        Self::new(
            &settings.site.base_url,
            settings.query.inter_term_delay(),
            settings.query.request_timeout(),
            settings.query.retry_policy(),
        )
    }

    /// 依次查询所有搜索词
    ///
    /// 返回惰性流：下一个搜索词只有在调用方取走上一个结果之后才会开始，
    /// 调用方因此可以在每次查询之间先把结果持久化。
    pub fn run<'a>(
        &'a self,
        terms: Vec<SearchTerm>,
        ctx: &'a AuthenticatedContext,
    ) -> impl Stream<Item = TermOutcome> + 'a {
        let state = RunState {
            terms: terms.into_iter().enumerate(),
            last_ts: None,
            finished: false,
        };

        stream::unfold(state, move |mut state| async move {
            if state.finished {
                return None;
            }
            let (index, term) = state.terms.next()?;

            if index > 0 && !self.inter_term_delay.is_zero() {
                debug!("Waiting {:?} before next term", self.inter_term_delay);
                tokio::time::sleep(self.inter_term_delay).await;
            }

            let outcome = self.query_term(index, &term, ctx, &mut state.last_ts).await;
            if let TermOutcome::Failed(TermFailure {
                kind: FailureKind::SessionInvalid,
                ..
            }) = outcome
            {
                state.finished = true;
            }
            Some((outcome, state))
        })
    }

    #[instrument(skip(self, term, ctx, last_ts), fields(term = %term))]
    async fn query_term(
        &self,
        index: usize,
        term: &SearchTerm,
        ctx: &AuthenticatedContext,
        last_ts: &mut Option<DateTime<Utc>>,
    ) -> TermOutcome {
        let fail = |kind: FailureKind| {
            TermOutcome::Failed(TermFailure {
                index,
                term: term.clone(),
                kind,
            })
        };

        let request = match SearchRequest::for_term(&self.base_url, term, self.request_timeout) {
            Ok(request) => request,
            Err(e) => {
                return fail(FailureKind::RequestFailed {
                    message: e.to_string(),
                })
            }
        };

        let response = match self.search_with_retry(ctx, &request).await {
            Ok(response) => response,
            Err(kind) => return fail(kind),
        };

        let Some(count) = ctx.extract_count(&response) else {
            // A missing count is either a layout change or a silently revoked session
            return match ctx.is_authenticated().await {
                Ok(false) => {
                    warn!("session no longer logged in");
                    fail(FailureKind::SessionInvalid)
                }
                Ok(true) => {
                    warn!(url = %response.final_url, "job count not found on results page");
                    fail(FailureKind::ExtractionFailed)
                }
                Err(e) => {
                    warn!(error = %e, "job count not found and session check failed");
                    fail(FailureKind::ExtractionFailed)
                }
            };
        };

        let ts = next_timestamp(last_ts);
        info!(count, response_time_ms = response.response_time_ms, "term observed");
        TermOutcome::Observed(Observation::new(term, count, ts))
    }

    async fn search_with_retry(
        &self,
        ctx: &AuthenticatedContext,
        request: &SearchRequest,
    ) -> Result<SearchResponse, FailureKind> {
        let mut retries = 0;
        loop {
            let result = match tokio::time::timeout(request.timeout, ctx.search(request)).await {
                Ok(result) => result,
                Err(_) => Err(EngineError::Timeout),
            };

            match result {
                Ok(response) => return Ok(response),
                Err(EngineError::NotAuthenticated { url }) => {
                    warn!(%url, "redirected to login page");
                    return Err(FailureKind::SessionInvalid);
                }
                Err(e) if e.is_retryable() && self.retry_policy.should_retry(retries) => {
                    retries += 1;
                    let backoff = self.retry_policy.calculate_backoff(retries);
                    warn!(error = %e, attempt = retries, "transient failure, retrying in {:?}", backoff);
                    tokio::time::sleep(backoff).await;
                }
                Err(e) if e.is_retryable() => {
                    return Err(FailureKind::Transient {
                        attempts: retries + 1,
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    return Err(FailureKind::RequestFailed {
                        message: e.to_string(),
                    })
                }
            }
        }
    }
}

struct RunState {
    terms: std::iter::Enumerate<std::vec::IntoIter<SearchTerm>>,
    last_ts: Option<DateTime<Utc>>,
    finished: bool,
}

/// 当前时间（毫秒精度），保证在同一次运行内严格递增
fn next_timestamp(last: &mut Option<DateTime<Utc>>) -> DateTime<Utc> {
    let mut ts = Utc::now().trunc_subsecs(3);
    if let Some(prev) = *last {
        if ts <= prev {
            ts = prev + chrono::Duration::milliseconds(1);
        }
    }
    *last = Some(ts);
    ts
}

#[cfg(test)]
#[path = "query_engine_test.rs"]
mod tests;
