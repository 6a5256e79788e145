use crate::decode::{FieldSpec, Kind, Record, Schema};
use crate::Field;
use serde::{Deserialize, Serialize};

/// One utterance in a call transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Who spoke, e.g. `agent` or `customer`.
    pub speaker: String,
    /// What was said.
    pub text: String,
    /// ISO 8601 time the utterance started.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub timestamp: Field<String>,
    /// Length of the utterance in seconds.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub audio_duration: Field<f64>,
}

pub(crate) static TRANSCRIPT_ENTRY_SCHEMA: Schema = Schema {
    record: "TranscriptEntry",
    fields: &[
        FieldSpec::required("speaker", Kind::String),
        FieldSpec::required("text", Kind::String),
        FieldSpec::optional("timestamp", Kind::String),
        FieldSpec::optional("audio_duration", Kind::Number),
    ],
};

impl Record for TranscriptEntry {
    fn schema() -> &'static Schema {
        &TRANSCRIPT_ENTRY_SCHEMA
    }
}

/// The transcript of a call. Entries are in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub call_id: String,
    /// Sent as `transcript` on the wire.
    #[serde(rename = "transcript")]
    pub entries: Vec<TranscriptEntry>,
    /// Short summary written after the call.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub summary: Field<String>,
    /// Call duration in seconds.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub duration: Field<u64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub word_count: Field<u64>,
}

impl Transcript {
    /// Joins the transcript into `speaker: text` lines.
    pub fn to_plain_text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}: {}", entry.speaker, entry.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

static TRANSCRIPT_SCHEMA: Schema = Schema {
    record: "Transcript",
    fields: &[
        FieldSpec::required("call_id", Kind::String),
        FieldSpec::required("transcript", Kind::ListOf(&TRANSCRIPT_ENTRY_SCHEMA)),
        FieldSpec::optional("summary", Kind::String),
        FieldSpec::optional("duration", Kind::Integer),
        FieldSpec::optional("word_count", Kind::Integer),
    ],
};

impl Record for Transcript {
    fn schema() -> &'static Schema {
        &TRANSCRIPT_SCHEMA
    }
}

/// Where to download a call recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    pub call_id: String,
    /// Signed download URL; see `expires_at`.
    pub recording_url: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub duration: Field<u64>,
    /// Audio container, e.g. `mp3`.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub format: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub size_bytes: Field<u64>,
    /// ISO 8601 time after which `recording_url` stops working.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub expires_at: Field<String>,
}

static RECORDING_SCHEMA: Schema = Schema {
    record: "Recording",
    fields: &[
        FieldSpec::required("call_id", Kind::String),
        FieldSpec::required("recording_url", Kind::String),
        FieldSpec::optional("duration", Kind::Integer),
        FieldSpec::optional("format", Kind::String),
        FieldSpec::optional("size_bytes", Kind::Integer),
        FieldSpec::optional("expires_at", Kind::String),
    ],
};

impl Record for Recording {
    fn schema() -> &'static Schema {
        &RECORDING_SCHEMA
    }
}
