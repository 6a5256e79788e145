use super::{
    null_as_default, string_enum, validate_http_url, validate_id, validate_paging,
    validate_phone_number,
};
use crate::decode::{FieldSpec, Kind, Record, Schema};
use crate::{Field, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

string_enum! {
    /// Where a call is in its lifecycle.
    pub enum CallStatus ("status") {
        Queued => "queued",
        Initiated => "initiated",
        Connecting => "connecting",
        Active => "active",
        Completed => "completed",
        Failed => "failed",
    }
}

impl CallStatus {
    /// Returns `true` once the call can no longer change state.
    pub fn is_finished(self) -> bool {
        matches!(self, CallStatus::Completed | CallStatus::Failed)
    }
}

/// An outbound call placed by an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Server-assigned identifier.
    pub call_id: String,
    /// The agent handling the call.
    pub agent_id: String,
    /// The number that was dialed.
    pub phone_number: String,
    pub status: CallStatus,
    /// Caller-supplied context, returned untouched.
    #[serde(default, deserialize_with = "null_as_default")]
    pub context: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Map<String, Value>,
    /// ISO 8601 timestamps. `started_at` and `ended_at` stay unset until the call connects
    /// and finishes.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub created_at: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub started_at: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub ended_at: Field<String>,
    /// Duration in seconds.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub duration: Field<u64>,
    /// Credits charged, once the call has finished.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub cost: Field<f64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub estimated_cost: Field<f64>,
    /// Free-form result reported by the agent, e.g. `appointment_confirmed`.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub outcome: Field<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transcript_available: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recording_available: bool,
}

static CALL_SCHEMA: Schema = Schema {
    record: "Call",
    fields: &[
        FieldSpec::required("call_id", Kind::String),
        FieldSpec::required("agent_id", Kind::String),
        FieldSpec::required("phone_number", Kind::String),
        FieldSpec::required("status", Kind::Enum(CallStatus::VALUES)),
        FieldSpec::optional("context", Kind::Object),
        FieldSpec::optional("metadata", Kind::Object),
        FieldSpec::optional("created_at", Kind::String),
        FieldSpec::optional("started_at", Kind::String),
        FieldSpec::optional("ended_at", Kind::String),
        FieldSpec::optional("duration", Kind::Integer),
        FieldSpec::optional("cost", Kind::Number),
        FieldSpec::optional("estimated_cost", Kind::Number),
        FieldSpec::optional("outcome", Kind::String),
        FieldSpec::optional("transcript_available", Kind::Boolean),
        FieldSpec::optional("recording_available", Kind::Boolean),
    ],
};

impl Record for Call {
    fn schema() -> &'static Schema {
        &CALL_SCHEMA
    }
}

/// Body of `POST /calls`.
///
/// # Examples
///
/// ```
/// use callwhiz::StartCallRequest;
///
/// let request = StartCallRequest::new("ag_1", "+1234567890")
///     .context("customer_name", "John Doe")
///     .metadata("source", "crm");
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartCallRequest {
    /// The agent that places the call.
    pub agent_id: String,
    /// Destination in E.164 format.
    pub phone_number: String,
    /// Facts the agent may use during the conversation.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
    /// Caller bookkeeping. The agent never sees it.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Receives call events for this call only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl StartCallRequest {
    /// Creates a request to call `phone_number` with the given agent.
    pub fn new(agent_id: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            phone_number: phone_number.into(),
            context: Map::new(),
            metadata: Map::new(),
            webhook_url: None,
        }
    }

    /// Adds a context entry the agent can use during the call.
    pub fn context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Adds a metadata entry, echoed back on the call record.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sends this call's events to `url` instead of the account default.
    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Checks the request without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) naming the offending field.
    pub fn validate(&self) -> Result<()> {
        validate_id("agent_id", &self.agent_id)?;
        validate_phone_number("phone_number", &self.phone_number)?;
        if let Some(url) = &self.webhook_url {
            validate_http_url("webhook_url", url)?;
        }
        Ok(())
    }
}

/// Query parameters of `GET /calls`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCallsParams {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Items per page, 1 to 100.
    pub limit: Option<u32>,
    /// Only return calls placed by this agent.
    pub agent_id: Option<String>,
    pub status: Option<CallStatus>,
    /// ISO 8601 lower bound.
    pub from_date: Option<String>,
    /// ISO 8601 upper bound.
    pub to_date: Option<String>,
}

impl ListCallsParams {
    pub(crate) fn validate(&self) -> Result<()> {
        validate_paging(self.page, self.limit)?;
        if let Some(agent_id) = &self.agent_id {
            validate_id("agent_id", agent_id)?;
        }
        Ok(())
    }
}
