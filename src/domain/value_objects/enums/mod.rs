pub mod subscription_statuses;
pub mod usage_periods;
