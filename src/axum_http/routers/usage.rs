use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{error, info};

use crate::{
    axum_http::auth::AuthUser,
    domain::{
        repositories::{subscriptions::SubscriptionRepository, usage_logs::UsageLogRepository},
        value_objects::enums::usage_periods::UsagePeriod,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        repositories::{subscriptions::SubscriptionPostgres, usage_logs::UsageLogPostgres},
    },
    usecases::{
        clock::{Clock, SystemClock},
        plan_resolver::PlanResolver,
        quota_enforcer::QuotaEnforcer,
        usage_stats::UsageStatsUseCase,
    },
};

#[derive(Debug, Deserialize)]
pub struct RecordUsagePayload {
    pub tool_name: String,
    #[serde(default = "default_tool_category")]
    pub tool_category: String,
    pub metadata: Option<serde_json::Value>,
}

fn default_tool_category() -> String {
    "general".to_string()
}

#[derive(Debug, Deserialize)]
pub struct UsageStatsQuery {
    period: Option<String>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let usage_log_repository = Arc::new(UsageLogPostgres::new(Arc::clone(&db_pool)));
    let clock = Arc::new(SystemClock);

    let plan_resolver = PlanResolver::new(Arc::new(subscription_repository));
    let quota_enforcer = QuotaEnforcer::new(
        Arc::new(plan_resolver),
        Arc::clone(&usage_log_repository),
        Arc::clone(&clock),
    );
    let usage_stats_usecase = UsageStatsUseCase::new(usage_log_repository, clock);

    let quota_routes = Router::new()
        .route("/", post(record_tool_usage))
        .route("/quota", get(current_quota))
        .with_state(Arc::new(quota_enforcer));

    let stats_routes = Router::new()
        .route("/stats", get(usage_stats))
        .with_state(Arc::new(usage_stats_usecase));

    quota_routes.merge(stats_routes)
}

pub async fn record_tool_usage<S, U, C>(
    State(quota_enforcer): State<Arc<QuotaEnforcer<S, U, C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(payload): Json<RecordUsagePayload>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageLogRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    info!(
        %user_id,
        tool_name = %payload.tool_name,
        tool_category = %payload.tool_category,
        "usage: record request received"
    );

    match quota_enforcer
        .check_and_record(
            user_id,
            &payload.tool_name,
            &payload.tool_category,
            payload.metadata,
        )
        .await
    {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn current_quota<S, U, C>(
    State(quota_enforcer): State<Arc<QuotaEnforcer<S, U, C>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageLogRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    info!(%user_id, "usage: quota status request received");

    match quota_enforcer.current_quota(user_id).await {
        Ok(status) => Json(status).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn usage_stats<U, C>(
    State(usage_stats_usecase): State<Arc<UsageStatsUseCase<U, C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Query(query): Query<UsageStatsQuery>,
) -> impl IntoResponse
where
    U: UsageLogRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    info!(%user_id, "usage: statistics request received");

    let period = match query.period.as_deref() {
        None => UsagePeriod::Month,
        Some(raw) => match UsagePeriod::from_str(raw) {
            Some(parsed) => parsed,
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    "period must be one of day, week, month, year".to_string(),
                )
                    .into_response();
            }
        },
    };

    match usage_stats_usecase.get_usage_stats(user_id, period).await {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => {
            error!(%user_id, error = ?err, "usage: failed to load usage statistics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load usage statistics".to_string(),
            )
                .into_response()
        }
    }
}
