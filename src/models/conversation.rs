use super::transcript::TRANSCRIPT_ENTRY_SCHEMA;
use super::{null_as_default, validate_id, validate_paging};
use crate::decode::{FieldSpec, Kind, Record, Schema};
use crate::{Field, Result, TranscriptEntry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One conversation as it appears in `GET /conversations`.
///
/// A conversation is the dialogue side of a call: who spoke, how much, and how it ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: String,
    /// The call this conversation took place on.
    pub call_id: String,
    pub agent_id: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub started_at: Field<String>,
    /// Unset while the conversation is still going.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub ended_at: Field<String>,
    /// Length in seconds.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub duration: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub message_count: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub summary: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub outcome: Field<String>,
}

static CONVERSATION_SUMMARY_SCHEMA: Schema = Schema {
    record: "ConversationSummary",
    fields: &[
        FieldSpec::required("conversation_id", Kind::String),
        FieldSpec::required("call_id", Kind::String),
        FieldSpec::required("agent_id", Kind::String),
        FieldSpec::required("phone_number", Kind::String),
        FieldSpec::optional("started_at", Kind::String),
        FieldSpec::optional("ended_at", Kind::String),
        FieldSpec::optional("duration", Kind::Integer),
        FieldSpec::optional("message_count", Kind::Integer),
        FieldSpec::optional("summary", Kind::String),
        FieldSpec::optional("outcome", Kind::String),
    ],
};

impl Record for ConversationSummary {
    fn schema() -> &'static Schema {
        &CONVERSATION_SUMMARY_SCHEMA
    }
}

/// Reply of `GET /conversations/{id}`: the summary plus every message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: ConversationSummary,
    /// Messages in the order they were spoken.
    pub messages: Vec<TranscriptEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Map<String, Value>,
}

impl ConversationDetail {
    /// Joins the messages into `speaker: text` lines.
    pub fn to_plain_text(&self) -> String {
        self.messages
            .iter()
            .map(|message| format!("{}: {}", message.speaker, message.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

static CONVERSATION_DETAIL_SCHEMA: Schema = Schema {
    record: "ConversationDetail",
    fields: &[
        FieldSpec::required("conversation_id", Kind::String),
        FieldSpec::required("call_id", Kind::String),
        FieldSpec::required("agent_id", Kind::String),
        FieldSpec::required("phone_number", Kind::String),
        FieldSpec::optional("started_at", Kind::String),
        FieldSpec::optional("ended_at", Kind::String),
        FieldSpec::optional("duration", Kind::Integer),
        FieldSpec::optional("message_count", Kind::Integer),
        FieldSpec::optional("summary", Kind::String),
        FieldSpec::optional("outcome", Kind::String),
        FieldSpec::required("messages", Kind::ListOf(&TRANSCRIPT_ENTRY_SCHEMA)),
        FieldSpec::optional("metadata", Kind::Object),
    ],
};

impl Record for ConversationDetail {
    fn schema() -> &'static Schema {
        &CONVERSATION_DETAIL_SCHEMA
    }
}

/// Query parameters of `GET /conversations`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListConversationsParams {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Items per page, 1 to 100.
    pub limit: Option<u32>,
    pub agent_id: Option<String>,
    /// ISO 8601 lower bound on `started_at`.
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl ListConversationsParams {
    pub(crate) fn validate(&self) -> Result<()> {
        validate_paging(self.page, self.limit)?;
        if let Some(agent_id) = &self.agent_id {
            validate_id("agent_id", agent_id)?;
        }
        Ok(())
    }
}
