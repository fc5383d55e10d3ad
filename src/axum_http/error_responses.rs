use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::usecases::quota_enforcer::QuotaError;

/// Error body with a machine-readable code so the client can render
/// "upgrade your plan" versus "your subscription lapsed" messaging. Quota
/// rejections also carry the ceiling and the current count.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<i64>,
}

impl IntoResponse for QuotaError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let (message, limit, used) = match &self {
            QuotaError::DailyLimitExceeded { limit, used }
            | QuotaError::MonthlyLimitExceeded { limit, used } => {
                (self.to_string(), Some(*limit), Some(*used))
            }
            QuotaError::NoActiveSubscription => (self.to_string(), None, None),
            QuotaError::Internal(_) => {
                // Don't leak internal error detail to client
                ("Internal server error".to_string(), None, None)
            }
        };

        let body = Json(ErrorResponse {
            code,
            message,
            limit,
            used,
        });

        (status, body).into_response()
    }
}
