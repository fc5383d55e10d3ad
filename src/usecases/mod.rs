pub mod clock;
pub mod plan_resolver;
pub mod quota_enforcer;
pub mod usage_stats;
