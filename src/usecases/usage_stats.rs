use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    domain::{
        repositories::usage_logs::UsageLogRepository,
        value_objects::enums::usage_periods::UsagePeriod,
    },
    usecases::clock::Clock,
};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ToolUsageStatDto {
    pub tool_name: String,
    pub tool_category: String,
    pub count: i64,
    pub last_used_at: DateTime<Utc>,
}

/// Aggregates the usage ledger into per-tool counts for dashboard reporting.
pub struct UsageStatsUseCase<U, C>
where
    U: UsageLogRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    usage_log_repo: Arc<U>,
    clock: Arc<C>,
}

impl<U, C> UsageStatsUseCase<U, C>
where
    U: UsageLogRepository + Send + Sync + 'static,
    C: Clock + 'static,
{
    pub fn new(usage_log_repo: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            usage_log_repo,
            clock,
        }
    }

    /// Entries in the rolling window, grouped by tool name and category,
    /// busiest tools first.
    pub async fn get_usage_stats(
        &self,
        user_id: Uuid,
        period: UsagePeriod,
    ) -> Result<Vec<ToolUsageStatDto>> {
        let since = self.clock.now() - Duration::days(period.days_back());

        let entries = self
            .usage_log_repo
            .list_since(user_id, since)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    period = %period,
                    db_error = ?err,
                    "usage_stats: failed to load ledger entries"
                );
                err
            })?;

        let mut groups: HashMap<(String, String), (i64, DateTime<Utc>)> = HashMap::new();
        for entry in entries {
            let group = groups
                .entry((entry.tool_name, entry.tool_category))
                .or_insert((0, entry.created_at));
            group.0 += 1;
            if entry.created_at > group.1 {
                group.1 = entry.created_at;
            }
        }

        let mut stats: Vec<ToolUsageStatDto> = groups
            .into_iter()
            .map(
                |((tool_name, tool_category), (count, last_used_at))| ToolUsageStatDto {
                    tool_name,
                    tool_category,
                    count,
                    last_used_at,
                },
            )
            .collect();

        stats.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then(b.last_used_at.cmp(&a.last_used_at))
        });

        info!(
            %user_id,
            period = %period,
            tool_count = stats.len(),
            "usage_stats: aggregated usage statistics"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockall::predicate::eq;

    use crate::domain::{
        entities::usage_logs::UsageLogEntity, repositories::usage_logs::MockUsageLogRepository,
    };

    struct FixedClock {
        now: DateTime<Utc>,
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.now
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn entry(
        user_id: Uuid,
        id: i64,
        tool_name: &str,
        tool_category: &str,
        hours_ago: i64,
    ) -> UsageLogEntity {
        UsageLogEntity {
            id,
            user_id,
            tool_name: tool_name.to_string(),
            tool_category: tool_category.to_string(),
            metadata: None,
            created_at: noon() - Duration::hours(hours_ago),
        }
    }

    #[tokio::test]
    async fn groups_by_tool_and_orders_by_count_descending() {
        let user_id = Uuid::new_v4();

        let mut usage_log_repo = MockUsageLogRepository::new();
        usage_log_repo
            .expect_list_since()
            .with(eq(user_id), eq(noon() - Duration::days(7)))
            .returning(move |_, _| {
                let entries = vec![
                    entry(user_id, 1, "qr-generator", "general", 30),
                    entry(user_id, 2, "qr-generator", "general", 5),
                    entry(user_id, 3, "qr-generator", "general", 2),
                    entry(user_id, 4, "password-generator", "security", 10),
                    entry(user_id, 5, "password-generator", "security", 8),
                    entry(user_id, 6, "unit-converter", "calculators", 1),
                ];
                Box::pin(async move { Ok(entries) })
            });

        let usecase = UsageStatsUseCase::new(
            Arc::new(usage_log_repo),
            Arc::new(FixedClock { now: noon() }),
        );

        let stats = usecase
            .get_usage_stats(user_id, UsagePeriod::Week)
            .await
            .unwrap();

        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].tool_name, "qr-generator");
        assert_eq!(stats[0].count, 3);
        assert_eq!(stats[0].last_used_at, noon() - Duration::hours(2));
        assert_eq!(stats[1].tool_name, "password-generator");
        assert_eq!(stats[1].count, 2);
        assert_eq!(stats[2].tool_name, "unit-converter");
        assert_eq!(stats[2].count, 1);
    }

    #[tokio::test]
    async fn period_selects_the_window_start() {
        let user_id = Uuid::new_v4();

        let mut usage_log_repo = MockUsageLogRepository::new();
        usage_log_repo
            .expect_list_since()
            .with(eq(user_id), eq(noon() - Duration::days(365)))
            .returning(|_, _| Box::pin(async { Ok(Vec::new()) }));

        let usecase = UsageStatsUseCase::new(
            Arc::new(usage_log_repo),
            Arc::new(FixedClock { now: noon() }),
        );

        let stats = usecase
            .get_usage_stats(user_id, UsagePeriod::Year)
            .await
            .unwrap();

        assert!(stats.is_empty());
    }

    #[tokio::test]
    async fn equal_counts_break_ties_by_most_recent_use() {
        let user_id = Uuid::new_v4();

        let mut usage_log_repo = MockUsageLogRepository::new();
        usage_log_repo
            .expect_list_since()
            .returning(move |_, _| {
                let entries = vec![
                    entry(user_id, 1, "hash-tool", "security", 20),
                    entry(user_id, 2, "color-picker", "design", 1),
                ];
                Box::pin(async move { Ok(entries) })
            });

        let usecase = UsageStatsUseCase::new(
            Arc::new(usage_log_repo),
            Arc::new(FixedClock { now: noon() }),
        );

        let stats = usecase
            .get_usage_stats(user_id, UsagePeriod::Day)
            .await
            .unwrap();

        assert_eq!(stats[0].tool_name, "color-picker");
        assert_eq!(stats[1].tool_name, "hash-tool");
    }
}
