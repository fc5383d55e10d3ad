use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{dsl::count_star, insert_into, prelude::*};
use uuid::Uuid;

use crate::{
    domain::{
        entities::usage_logs::{InsertUsageLogEntity, UsageLogEntity},
        repositories::usage_logs::UsageLogRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::usage_logs},
};

pub struct UsageLogPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UsageLogPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UsageLogRepository for UsageLogPostgres {
    async fn append(&self, entry: InsertUsageLogEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(usage_logs::table)
            .values(&entry)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = usage_logs::table
            .filter(usage_logs::user_id.eq(user_id))
            .filter(usage_logs::created_at.ge(since))
            .select(count_star())
            .first::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn list_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<UsageLogEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let entries = usage_logs::table
            .filter(usage_logs::user_id.eq(user_id))
            .filter(usage_logs::created_at.ge(since))
            .order(usage_logs::created_at.desc())
            .select(UsageLogEntity::as_select())
            .load::<UsageLogEntity>(&mut conn)?;

        Ok(entries)
    }
}
