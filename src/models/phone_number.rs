use super::null_as_default;
use crate::decode::{FieldSpec, Kind, Record, Schema};
use crate::Field;
use serde::{Deserialize, Serialize};

/// A phone number owned by the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    /// Server-assigned identifier.
    pub id: String,
    /// The number in E.164 format.
    pub phone_number: String,
    /// Label shown in the dashboard.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub friendly_name: Field<String>,
    /// ISO 3166 country code.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub country: Field<String>,
    /// E.g. `voice`, `sms`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub capabilities: Vec<String>,
    /// Provisioning state, e.g. `active`.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub status: Field<String>,
}

static PHONE_NUMBER_SCHEMA: Schema = Schema {
    record: "PhoneNumber",
    fields: &[
        FieldSpec::required("id", Kind::String),
        FieldSpec::required("phone_number", Kind::String),
        FieldSpec::optional("friendly_name", Kind::String),
        FieldSpec::optional("country", Kind::String),
        FieldSpec::optional("capabilities", Kind::Array),
        FieldSpec::optional("status", Kind::String),
    ],
};

impl Record for PhoneNumber {
    fn schema() -> &'static Schema {
        &PHONE_NUMBER_SCHEMA
    }
}
