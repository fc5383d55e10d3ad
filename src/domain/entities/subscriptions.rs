use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::plan_limits::PlanLimits, infrastructure::postgres::schema::subscriptions,
};

/// A grant of usage limits to a user. Written by the billing collaborator;
/// this subsystem only ever reads it.
#[derive(Debug, Clone)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_tier: String,
    pub limits: PlanLimits,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Raw row used for Diesel queries. Limits stay as JSON and are parsed into
/// PlanLimits.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_tier: String,
    pub limits: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for SubscriptionEntity {
    fn from(value: SubscriptionRow) -> Self {
        let limits = serde_json::from_value(value.limits).unwrap_or_default();

        Self {
            id: value.id,
            user_id: value.user_id,
            plan_tier: value.plan_tier,
            limits,
            status: value.status,
            created_at: value.created_at,
        }
    }
}
