use crate::decode::{FieldSpec, Kind, Record, Schema, Violation};
use crate::Field;
use serde::{Deserialize, Serialize};

/// How far `usage_percentage` may drift from the derived value before it is rejected.
///
/// The API rounds the percentage it reports, sometimes to a whole number, so anything
/// within half a point of the derived value is accepted.
const USAGE_PERCENTAGE_TOLERANCE: f64 = 0.5;

/// Reply of `GET /credits`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleCredits {
    /// Credits left on the account.
    pub credits_remaining: f64,
}

static SIMPLE_CREDITS_SCHEMA: Schema = Schema {
    record: "SimpleCredits",
    fields: &[FieldSpec::required("credits_remaining", Kind::Number)],
};

impl Record for SimpleCredits {
    fn schema() -> &'static Schema {
        &SIMPLE_CREDITS_SCHEMA
    }
}

/// Reply of `GET /credits/detailed`.
///
/// `usage_percentage` is checked against `total_credits` and `credits_remaining` when
/// decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    pub credits_remaining: f64,
    pub total_credits: f64,
    /// Percentage of `total_credits` already spent, as reported by the API.
    pub usage_percentage: f64,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub credits_used: Field<f64>,
    /// ISO 4217 code, when the account is billed in money rather than credits.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub currency: Field<String>,
}

impl Credits {
    /// Computes `(total - remaining) / total * 100`, or 0 when there are no credits.
    pub fn derived_usage_percentage(&self) -> f64 {
        if self.total_credits == 0.0 {
            0.0
        } else {
            (self.total_credits - self.credits_remaining) / self.total_credits * 100.0
        }
    }
}

static CREDITS_SCHEMA: Schema = Schema {
    record: "Credits",
    fields: &[
        FieldSpec::required("credits_remaining", Kind::Number),
        FieldSpec::required("total_credits", Kind::Number),
        FieldSpec::required("usage_percentage", Kind::Number),
        FieldSpec::optional("credits_used", Kind::Number),
        FieldSpec::optional("currency", Kind::String),
    ],
};

impl Record for Credits {
    fn schema() -> &'static Schema {
        &CREDITS_SCHEMA
    }

    fn check(&self) -> Result<(), Violation> {
        let expected = self.derived_usage_percentage();
        if (self.usage_percentage - expected).abs() > USAGE_PERCENTAGE_TOLERANCE {
            return Err(Violation::new(
                "usage_percentage",
                format!(
                    "expected {:.2} for {} of {} credits remaining, got {}",
                    expected, self.credits_remaining, self.total_credits, self.usage_percentage
                ),
            ));
        }
        Ok(())
    }
}
