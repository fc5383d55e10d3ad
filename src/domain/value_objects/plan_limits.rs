use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Integer sentinel meaning "no ceiling applies". Only ever seen at the
/// persistence and API boundaries; domain code works with [`UsageLimit`].
pub const UNLIMITED_SENTINEL: i64 = -1;

/// A single usage ceiling. Stored as a plain integer in the `limits` JSONB,
/// with negative values meaning unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLimit {
    Limited(i64),
    Unlimited,
}

impl UsageLimit {
    pub fn from_sentinel(value: i64) -> Self {
        if value < 0 {
            UsageLimit::Unlimited
        } else {
            UsageLimit::Limited(value)
        }
    }

    pub fn as_sentinel(&self) -> i64 {
        match self {
            UsageLimit::Limited(value) => *value,
            UsageLimit::Unlimited => UNLIMITED_SENTINEL,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, UsageLimit::Unlimited)
    }

    /// Whether a window holding `used` entries has exhausted this ceiling.
    /// An unlimited ceiling is never reached.
    pub fn is_reached(&self, used: i64) -> bool {
        match self {
            UsageLimit::Limited(limit) => used >= *limit,
            UsageLimit::Unlimited => false,
        }
    }

    pub fn remaining(&self, used: i64) -> i64 {
        match self {
            UsageLimit::Limited(limit) => (limit - used).max(0),
            UsageLimit::Unlimited => UNLIMITED_SENTINEL,
        }
    }
}

impl Default for UsageLimit {
    fn default() -> Self {
        UsageLimit::Limited(0)
    }
}

impl Serialize for UsageLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_sentinel())
    }
}

impl<'de> Deserialize<'de> for UsageLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Ok(UsageLimit::from_sentinel(value))
    }
}

/// Usage ceilings attached to a subscription. Stored as JSONB on the
/// subscriptions table. Missing fields default to a zero ceiling rather than
/// unlimited, so a malformed row cannot grant more than it should.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PlanLimits {
    #[serde(default)]
    pub daily_usage: UsageLimit,

    #[serde(default)]
    pub monthly_usage: UsageLimit,
}

impl PlanLimits {
    pub fn is_fully_unlimited(&self) -> bool {
        self.daily_usage.is_unlimited() && self.monthly_usage.is_unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_maps_to_unlimited() {
        assert_eq!(UsageLimit::from_sentinel(-1), UsageLimit::Unlimited);
        assert_eq!(UsageLimit::from_sentinel(10), UsageLimit::Limited(10));
        assert_eq!(UsageLimit::Unlimited.as_sentinel(), UNLIMITED_SENTINEL);
    }

    #[test]
    fn limited_ceiling_is_reached_at_limit() {
        let limit = UsageLimit::Limited(10);
        assert!(!limit.is_reached(9));
        assert!(limit.is_reached(10));
        assert!(limit.is_reached(11));
        assert!(!UsageLimit::Unlimited.is_reached(i64::MAX));
    }

    #[test]
    fn remaining_never_goes_negative() {
        assert_eq!(UsageLimit::Limited(10).remaining(3), 7);
        assert_eq!(UsageLimit::Limited(10).remaining(12), 0);
        assert_eq!(UsageLimit::Unlimited.remaining(5), UNLIMITED_SENTINEL);
    }

    #[test]
    fn limits_json_uses_sentinel_encoding() {
        let limits: PlanLimits =
            serde_json::from_value(serde_json::json!({"daily_usage": 10, "monthly_usage": -1}))
                .unwrap();
        assert_eq!(limits.daily_usage, UsageLimit::Limited(10));
        assert_eq!(limits.monthly_usage, UsageLimit::Unlimited);

        let encoded = serde_json::to_value(limits).unwrap();
        assert_eq!(encoded["monthly_usage"], serde_json::json!(-1));
    }

    #[test]
    fn missing_limit_fields_default_closed() {
        let limits: PlanLimits = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(limits.daily_usage, UsageLimit::Limited(0));
        assert_eq!(limits.monthly_usage, UsageLimit::Limited(0));
    }
}
