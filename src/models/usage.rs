use super::{null_as_default, require_non_empty, string_enum};
use crate::decode::{FieldSpec, Kind, Record, Schema};
use crate::{Field, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

string_enum! {
    /// The window usage counters are aggregated over.
    #[derive(Default)]
    pub enum UsagePeriod ("period") {
        Day => "day",
        Week => "week",
        #[default]
        Month => "month",
    }
}

/// Query of `GET /usage`: a period, optionally narrowed to a date range.
///
/// A bare [`UsagePeriod`] converts into a query without dates.
///
/// # Examples
///
/// ```
/// use callwhiz::{UsagePeriod, UsageQuery};
///
/// let query = UsageQuery::from(UsagePeriod::Day)
///     .from_date("2025-01-01")
///     .to_date("2025-01-07");
/// assert_eq!(query.period, UsagePeriod::Day);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageQuery {
    pub period: UsagePeriod,
    /// ISO 8601 lower bound.
    pub from_date: Option<String>,
    /// ISO 8601 upper bound.
    pub to_date: Option<String>,
}

impl UsageQuery {
    pub fn from_date(mut self, date: impl Into<String>) -> Self {
        self.from_date = Some(date.into());
        self
    }

    pub fn to_date(mut self, date: impl Into<String>) -> Self {
        self.to_date = Some(date.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(date) = &self.from_date {
            require_non_empty("from_date", date)?;
        }
        if let Some(date) = &self.to_date {
            require_non_empty("to_date", date)?;
        }
        Ok(())
    }
}

impl From<UsagePeriod> for UsageQuery {
    fn from(period: UsagePeriod) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }
}

/// Reply of `GET /usage`.
///
/// Counter groups are passed through as the API sends them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub period: UsagePeriod,
    /// Start of the window the counters cover.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub from_date: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub to_date: Field<String>,
    /// Counter groups keyed by counter name, e.g. `total`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_calls: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub voice_calls: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rate_limits: Map<String, Value>,
}

impl Usage {
    /// Looks up a numeric counter, e.g. `counter("voice_calls", "total")`.
    pub fn counter(&self, group: &str, name: &str) -> Option<f64> {
        let group = match group {
            "api_calls" => &self.api_calls,
            "voice_calls" => &self.voice_calls,
            "rate_limits" => &self.rate_limits,
            _ => return None,
        };
        group.get(name)?.as_f64()
    }
}

static USAGE_SCHEMA: Schema = Schema {
    record: "Usage",
    fields: &[
        FieldSpec::required("period", Kind::Enum(UsagePeriod::VALUES)),
        FieldSpec::optional("from_date", Kind::String),
        FieldSpec::optional("to_date", Kind::String),
        FieldSpec::optional("api_calls", Kind::Object),
        FieldSpec::optional("voice_calls", Kind::Object),
        FieldSpec::optional("rate_limits", Kind::Object),
    ],
};

impl Record for Usage {
    fn schema() -> &'static Schema {
        &USAGE_SCHEMA
    }
}

/// Reply of `GET /usage/limits`: the plan's ceilings next to what has been used.
///
/// Both maps are keyed by limit name (e.g. `agents`, `concurrent_calls`) and passed
/// through as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountLimits {
    /// Plan name, e.g. `starter`.
    pub plan: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub limits: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_usage: Map<String, Value>,
}

impl AccountLimits {
    /// The plan's ceiling for `name`, if it is numeric.
    pub fn limit(&self, name: &str) -> Option<f64> {
        self.limits.get(name)?.as_f64()
    }

    /// Current consumption of `name`, if it is numeric.
    pub fn used(&self, name: &str) -> Option<f64> {
        self.current_usage.get(name)?.as_f64()
    }

    /// How much of `name` is left, floored at zero.
    pub fn remaining(&self, name: &str) -> Option<f64> {
        Some((self.limit(name)? - self.used(name).unwrap_or(0.0)).max(0.0))
    }
}

static ACCOUNT_LIMITS_SCHEMA: Schema = Schema {
    record: "AccountLimits",
    fields: &[
        FieldSpec::required("plan", Kind::String),
        FieldSpec::optional("limits", Kind::Object),
        FieldSpec::optional("current_usage", Kind::Object),
    ],
};

impl Record for AccountLimits {
    fn schema() -> &'static Schema {
        &ACCOUNT_LIMITS_SCHEMA
    }
}
