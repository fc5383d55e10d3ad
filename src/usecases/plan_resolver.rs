use anyhow::Result;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    repositories::subscriptions::SubscriptionRepository, value_objects::plan_limits::PlanLimits,
};

/// Resolves the limit configuration a user is currently entitled to.
///
/// A user can have more than one `active` subscription row in storage (plan
/// changes append a new row and flip the old one to `canceled`, and nothing
/// enforces uniqueness when two changes race). The most recently created
/// active row wins. There is deliberately no Free-tier fallback here: a user
/// with no resolvable plan gets `None` and the enforcer rejects the request.
pub struct PlanResolver<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
}

impl<S> PlanResolver<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>) -> Self {
        Self { subscription_repo }
    }

    pub async fn resolve_active_plan(&self, user_id: Uuid) -> Result<Option<PlanLimits>> {
        let subscriptions = self
            .subscription_repo
            .list_active_subscriptions_for_user(user_id)
            .await?;

        let current = subscriptions
            .into_iter()
            .max_by_key(|subscription| subscription.created_at);

        match current {
            Some(subscription) => {
                debug!(
                    %user_id,
                    subscription_id = %subscription.id,
                    plan_tier = %subscription.plan_tier,
                    "plan_resolver: using most recent active subscription"
                );
                Ok(Some(subscription.limits))
            }
            None => {
                debug!(%user_id, "plan_resolver: no active subscription");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use mockall::predicate::eq;

    use crate::domain::{
        entities::subscriptions::SubscriptionEntity,
        repositories::subscriptions::MockSubscriptionRepository,
        value_objects::{
            enums::subscription_statuses::SubscriptionStatus,
            plan_limits::{PlanLimits, UsageLimit},
        },
    };

    fn sample_subscription(user_id: Uuid, daily: i64, age_days: i64) -> SubscriptionEntity {
        SubscriptionEntity {
            id: Uuid::new_v4(),
            user_id,
            plan_tier: "pro".to_string(),
            limits: PlanLimits {
                daily_usage: UsageLimit::Limited(daily),
                monthly_usage: UsageLimit::Limited(daily * 10),
            },
            status: SubscriptionStatus::Active.to_string(),
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[tokio::test]
    async fn returns_none_when_user_has_no_active_subscription() {
        let user_id = Uuid::new_v4();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_list_active_subscriptions_for_user()
            .with(eq(user_id))
            .returning(|_| Box::pin(async { Ok(Vec::new()) }));

        let resolver = PlanResolver::new(Arc::new(subscription_repo));

        let plan = resolver.resolve_active_plan(user_id).await.unwrap();
        assert!(plan.is_none());
    }

    #[tokio::test]
    async fn returns_limits_of_single_active_subscription() {
        let user_id = Uuid::new_v4();
        let subscription = sample_subscription(user_id, 10, 1);
        let expected = subscription.limits;

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_list_active_subscriptions_for_user()
            .with(eq(user_id))
            .returning(move |_| {
                let subscription = subscription.clone();
                Box::pin(async move { Ok(vec![subscription]) })
            });

        let resolver = PlanResolver::new(Arc::new(subscription_repo));

        let plan = resolver.resolve_active_plan(user_id).await.unwrap();
        assert_eq!(plan, Some(expected));
    }

    #[tokio::test]
    async fn most_recently_created_active_subscription_wins() {
        let user_id = Uuid::new_v4();
        let older = sample_subscription(user_id, 10, 30);
        let newer = sample_subscription(user_id, 500, 1);
        let expected = newer.limits;

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_list_active_subscriptions_for_user()
            .with(eq(user_id))
            .returning(move |_| {
                let rows = vec![older.clone(), newer.clone()];
                Box::pin(async move { Ok(rows) })
            });

        let resolver = PlanResolver::new(Arc::new(subscription_repo));

        let plan = resolver.resolve_active_plan(user_id).await.unwrap();
        assert_eq!(plan, Some(expected));
    }
}
