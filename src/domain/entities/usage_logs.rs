use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::usage_logs;

/// One metered tool invocation. Immutable once written.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = usage_logs)]
pub struct UsageLogEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub tool_name: String,
    pub tool_category: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = usage_logs)]
pub struct InsertUsageLogEntity {
    pub user_id: Uuid,
    pub tool_name: String,
    pub tool_category: String,
    pub metadata: Option<serde_json::Value>,
}
