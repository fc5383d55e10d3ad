use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::subscriptions::SubscriptionEntity;

#[async_trait]
#[automock]
pub trait SubscriptionRepository {
    /// All rows for the user with status `active`. More than one row can be
    /// active at once (plan changes append rather than mutate); the resolver
    /// is responsible for picking the authoritative one.
    async fn list_active_subscriptions_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<SubscriptionEntity>>;
}
