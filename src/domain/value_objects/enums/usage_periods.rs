use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Reporting window for usage statistics queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UsagePeriod {
    Day,
    Week,
    Month,
    Year,
}

impl Display for UsagePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let period = match self {
            UsagePeriod::Day => "day",
            UsagePeriod::Week => "week",
            UsagePeriod::Month => "month",
            UsagePeriod::Year => "year",
        };
        write!(f, "{}", period)
    }
}

impl UsagePeriod {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "day" => Some(UsagePeriod::Day),
            "week" => Some(UsagePeriod::Week),
            "month" => Some(UsagePeriod::Month),
            "year" => Some(UsagePeriod::Year),
            _ => None,
        }
    }

    /// Rolling window length in days, counted back from the query instant.
    pub fn days_back(&self) -> i64 {
        match self {
            UsagePeriod::Day => 1,
            UsagePeriod::Week => 7,
            UsagePeriod::Month => 30,
            UsagePeriod::Year => 365,
        }
    }
}
