use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    domain::{
        entities::usage_logs::InsertUsageLogEntity,
        repositories::{
            subscriptions::SubscriptionRepository, usage_logs::UsageLogRepository,
        },
        value_objects::plan_limits::{PlanLimits, UsageLimit},
    },
    usecases::{
        clock::{Clock, start_of_day, start_of_month},
        plan_resolver::PlanResolver,
    },
};

#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("no active subscription")]
    NoActiveSubscription,
    #[error("daily usage limit reached")]
    DailyLimitExceeded { limit: i64, used: i64 },
    #[error("monthly usage limit reached")]
    MonthlyLimitExceeded { limit: i64, used: i64 },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl QuotaError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            QuotaError::NoActiveSubscription => StatusCode::FORBIDDEN,
            QuotaError::DailyLimitExceeded { .. } | QuotaError::MonthlyLimitExceeded { .. } => {
                StatusCode::TOO_MANY_REQUESTS
            }
            QuotaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code so clients can distinguish "upgrade your plan"
    /// from "your subscription lapsed".
    pub fn code(&self) -> &'static str {
        match self {
            QuotaError::NoActiveSubscription => "NO_ACTIVE_SUBSCRIPTION",
            QuotaError::DailyLimitExceeded { .. } => "DAILY_LIMIT_EXCEEDED",
            QuotaError::MonthlyLimitExceeded { .. } => "MONTHLY_LIMIT_EXCEEDED",
            QuotaError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, QuotaError>;

/// Quota counters after an admission. Limits use the unlimited sentinel.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct QuotaSnapshotDto {
    pub daily_limit: i64,
    pub daily_used: i64,
    pub monthly_limit: i64,
    pub monthly_used: i64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct QuotaWindowDto {
    pub limit: i64,
    pub used: i64,
    pub remaining: i64,
    pub unlimited: bool,
}

impl QuotaWindowDto {
    fn from_window(limit: UsageLimit, used: i64) -> Self {
        Self {
            limit: limit.as_sentinel(),
            used,
            remaining: limit.remaining(used),
            unlimited: limit.is_unlimited(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct QuotaStatusDto {
    pub daily: QuotaWindowDto,
    pub monthly: QuotaWindowDto,
}

/// Per-request admission policy: resolve the caller's plan, count usage in
/// the current windows, and either reject or append to the ledger.
///
/// Count-then-insert is not guarded by a transaction, so two concurrent
/// requests for the same user can both pass the count check before either
/// appends. Enforcement can overshoot a limit by up to concurrency - 1.
pub struct QuotaEnforcer<S, U, C>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageLogRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    plan_resolver: Arc<PlanResolver<S>>,
    usage_log_repo: Arc<U>,
    clock: Arc<C>,
}

impl<S, U, C> QuotaEnforcer<S, U, C>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageLogRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    pub fn new(plan_resolver: Arc<PlanResolver<S>>, usage_log_repo: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            plan_resolver,
            usage_log_repo,
            clock,
        }
    }

    pub async fn check_and_record(
        &self,
        user_id: Uuid,
        tool_name: &str,
        tool_category: &str,
        metadata: Option<serde_json::Value>,
    ) -> UseCaseResult<QuotaSnapshotDto> {
        let limits = self.resolve_limits(user_id).await?;

        if limits.is_fully_unlimited() {
            // Unlimited plans skip the window counts entirely; the entry is
            // still logged for reporting.
            self.append_entry(user_id, tool_name, tool_category, metadata)
                .await?;
            info!(
                %user_id,
                tool_name,
                "quota: unlimited plan admission recorded"
            );
            return Ok(QuotaSnapshotDto {
                daily_limit: limits.daily_usage.as_sentinel(),
                daily_used: 0,
                monthly_limit: limits.monthly_usage.as_sentinel(),
                monthly_used: 0,
            });
        }

        let now = self.clock.now();

        let daily_used = self
            .usage_log_repo
            .count_since(user_id, start_of_day(now))
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "quota: failed to count daily usage");
                QuotaError::Internal(err)
            })?;

        // The daily ceiling is always checked before the monthly one; when
        // both are exhausted the daily rejection wins.
        if limits.daily_usage.is_reached(daily_used) {
            let err = QuotaError::DailyLimitExceeded {
                limit: limits.daily_usage.as_sentinel(),
                used: daily_used,
            };
            warn!(
                %user_id,
                tool_name,
                used = daily_used,
                status = err.status_code().as_u16(),
                "quota: daily limit reached"
            );
            return Err(err);
        }

        let monthly_used = self
            .usage_log_repo
            .count_since(user_id, start_of_month(now))
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "quota: failed to count monthly usage");
                QuotaError::Internal(err)
            })?;

        if limits.monthly_usage.is_reached(monthly_used) {
            let err = QuotaError::MonthlyLimitExceeded {
                limit: limits.monthly_usage.as_sentinel(),
                used: monthly_used,
            };
            warn!(
                %user_id,
                tool_name,
                used = monthly_used,
                status = err.status_code().as_u16(),
                "quota: monthly limit reached"
            );
            return Err(err);
        }

        self.append_entry(user_id, tool_name, tool_category, metadata)
            .await?;

        info!(
            %user_id,
            tool_name,
            daily_used = daily_used + 1,
            monthly_used = monthly_used + 1,
            "quota: admission recorded"
        );

        // Pre-append counts plus the entry just written; not re-queried.
        Ok(QuotaSnapshotDto {
            daily_limit: limits.daily_usage.as_sentinel(),
            daily_used: daily_used + 1,
            monthly_limit: limits.monthly_usage.as_sentinel(),
            monthly_used: monthly_used + 1,
        })
    }

    /// Read-only variant for dashboards. Same resolution and counting, no
    /// ledger write.
    pub async fn current_quota(&self, user_id: Uuid) -> UseCaseResult<QuotaStatusDto> {
        let limits = self.resolve_limits(user_id).await?;

        let now = self.clock.now();

        let daily_used = self
            .usage_log_repo
            .count_since(user_id, start_of_day(now))
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "quota: failed to count daily usage");
                QuotaError::Internal(err)
            })?;
        let monthly_used = self
            .usage_log_repo
            .count_since(user_id, start_of_month(now))
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "quota: failed to count monthly usage");
                QuotaError::Internal(err)
            })?;

        Ok(QuotaStatusDto {
            daily: QuotaWindowDto::from_window(limits.daily_usage, daily_used),
            monthly: QuotaWindowDto::from_window(limits.monthly_usage, monthly_used),
        })
    }

    async fn resolve_limits(&self, user_id: Uuid) -> UseCaseResult<PlanLimits> {
        self.plan_resolver
            .resolve_active_plan(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "quota: failed to resolve active plan");
                QuotaError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = QuotaError::NoActiveSubscription;
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "quota: no active subscription, rejecting"
                );
                err
            })
    }

    async fn append_entry(
        &self,
        user_id: Uuid,
        tool_name: &str,
        tool_category: &str,
        metadata: Option<serde_json::Value>,
    ) -> UseCaseResult<()> {
        self.usage_log_repo
            .append(InsertUsageLogEntity {
                user_id,
                tool_name: tool_name.to_string(),
                tool_category: tool_category.to_string(),
                metadata,
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    tool_name,
                    db_error = ?err,
                    "quota: failed to append usage log entry"
                );
                QuotaError::Internal(err)
            })
    }
}
