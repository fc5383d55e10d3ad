use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::usage_logs::{InsertUsageLogEntity, UsageLogEntity};

/// Append-only ledger of metered tool invocations.
#[async_trait]
#[automock]
pub trait UsageLogRepository {
    async fn append(&self, entry: InsertUsageLogEntity) -> Result<()>;

    /// Number of entries for the user with `created_at >= since`.
    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<i64>;

    async fn list_since(&self, user_id: Uuid, since: DateTime<Utc>)
    -> Result<Vec<UsageLogEntity>>;
}
