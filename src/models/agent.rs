use super::{
    null_as_default, require_non_empty, string_enum, validate_id, validate_paging,
};
use crate::decode::{FieldSpec, Kind, Record, Schema};
use crate::{Error, Field, Result};
use serde::{Deserialize, Serialize};

string_enum! {
    /// The model tier an agent runs on.
    pub enum ModelTier ("model") {
        /// Cheapest, lowest latency.
        Lite => "lite",
        /// Balanced default.
        Nano => "nano",
        /// Most capable.
        Pro => "pro",
    }
}

string_enum! {
    /// Languages an agent can speak.
    pub enum Language ("language") {
        English => "en",
        Spanish => "es",
        French => "fr",
        German => "de",
        Italian => "it",
        Portuguese => "pt",
        Dutch => "nl",
        Hindi => "hi",
        Japanese => "ja",
        Korean => "ko",
        Chinese => "zh",
        Arabic => "ar",
    }
}

string_enum! {
    /// Lifecycle state of an agent.
    pub enum AgentStatus ("status") {
        Active => "active",
        Inactive => "inactive",
        Draft => "draft",
    }
}

/// One step of a staged conversation.
///
/// Stages run in list order; stage N hands over to stage N+1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallStage {
    /// Stage name.
    pub name: String,
    /// Instructions the agent follows during this stage.
    pub prompt: String,
}

impl CallStage {
    /// Creates a new stage.
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
        }
    }
}

static CALL_STAGE_SCHEMA: Schema = Schema {
    record: "CallStage",
    fields: &[
        FieldSpec::required("name", Kind::String),
        FieldSpec::required("prompt", Kind::String),
    ],
};

impl Record for CallStage {
    fn schema() -> &'static Schema {
        &CALL_STAGE_SCHEMA
    }
}

/// A voice agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Server-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    pub model: ModelTier,
    /// Voice name, e.g. `Calvin`.
    pub voice: String,
    pub language: Language,
    /// Regional accent of the voice, e.g. `British`.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub accent: Field<String>,
    /// Single system prompt. Agents use either this or `stages`.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub prompt: Field<String>,
    /// Ordered conversation flow.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub stages: Field<Vec<CallStage>>,
    /// Ids of the user webhooks this agent may call. The agent does not own them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub webhook_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    /// What the agent says when the callee picks up.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub first_message: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub status: Field<AgentStatus>,
    /// ISO 8601 timestamps, passed through as sent.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub created_at: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub updated_at: Field<String>,
    /// Calls placed with this agent so far.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub call_count: Field<u64>,
}

static AGENT_SCHEMA: Schema = Schema {
    record: "Agent",
    fields: &[
        FieldSpec::required("id", Kind::String),
        FieldSpec::required("name", Kind::String),
        FieldSpec::required("model", Kind::Enum(ModelTier::VALUES)),
        FieldSpec::required("voice", Kind::String),
        FieldSpec::required("language", Kind::Enum(Language::VALUES)),
        FieldSpec::optional("accent", Kind::String),
        FieldSpec::optional("prompt", Kind::String),
        FieldSpec::optional("stages", Kind::ListOf(&CALL_STAGE_SCHEMA)),
        FieldSpec::optional("webhook_ids", Kind::Array),
        FieldSpec::optional("description", Kind::String),
        FieldSpec::optional("first_message", Kind::String),
        FieldSpec::optional("status", Kind::Enum(AgentStatus::VALUES)),
        FieldSpec::optional("created_at", Kind::String),
        FieldSpec::optional("updated_at", Kind::String),
        FieldSpec::optional("call_count", Kind::Integer),
    ],
};

impl Record for Agent {
    fn schema() -> &'static Schema {
        &AGENT_SCHEMA
    }
}

/// Body of `POST /agents`.
///
/// # Examples
///
/// ```
/// use callwhiz::{CreateAgentRequest, Language};
///
/// # fn example() -> Result<(), callwhiz::Error> {
/// let request = CreateAgentRequest::new("Support", "nano".parse()?, "Calvin", Language::English)
///     .accent("American")
///     .prompt("You are a helpful customer service agent.")
///     .first_message("Hello! How can I help you today?");
/// assert!(request.validate().is_ok());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub model: ModelTier,
    pub voice: String,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    /// Required unless `stages` is non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<CallStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub webhook_ids: Vec<String>,
}

impl CreateAgentRequest {
    /// Creates a request with the required fields. Add a prompt or stages before sending.
    pub fn new(
        name: impl Into<String>,
        model: ModelTier,
        voice: impl Into<String>,
        language: Language,
    ) -> Self {
        Self {
            name: name.into(),
            model,
            voice: voice.into(),
            language,
            accent: None,
            prompt: None,
            stages: Vec::new(),
            first_message: None,
            description: None,
            webhook_ids: Vec::new(),
        }
    }

    /// Sets the accent of the voice.
    pub fn accent(mut self, accent: impl Into<String>) -> Self {
        self.accent = Some(accent.into());
        self
    }

    /// Sets a single system prompt for the whole call.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Appends a stage to the conversation flow.
    pub fn stage(mut self, name: impl Into<String>, prompt: impl Into<String>) -> Self {
        self.stages.push(CallStage::new(name, prompt));
        self
    }

    /// Sets the opening line.
    pub fn first_message(mut self, message: impl Into<String>) -> Self {
        self.first_message = Some(message.into());
        self
    }

    /// Sets a free-form description, not shown to callees.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Lets the agent call the given user webhook.
    pub fn webhook_id(mut self, id: impl Into<String>) -> Self {
        self.webhook_ids.push(id.into());
        self
    }

    /// Checks the request without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("name", &self.name)?;
        require_non_empty("voice", &self.voice)?;
        let has_prompt = self
            .prompt
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty());
        if !has_prompt && self.stages.is_empty() {
            return Err(Error::invalid_argument(
                "prompt",
                "an agent needs a prompt or at least one stage",
            ));
        }
        validate_stages(&self.stages)?;
        for id in &self.webhook_ids {
            validate_id("webhook_ids", id)?;
        }
        Ok(())
    }
}

/// Body of `PATCH /agents/{id}`. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateAgentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<CallStage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AgentStatus>,
    /// Replaces the whole list of allowed webhooks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_ids: Option<Vec<String>>,
}

impl UpdateAgentRequest {
    /// Checks the request without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if nothing would change or a set field is invalid.
    pub fn validate(&self) -> Result<()> {
        if *self == Self::default() {
            return Err(Error::invalid_argument(
                "request",
                "an update must change at least one field",
            ));
        }
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(voice) = &self.voice {
            require_non_empty("voice", voice)?;
        }
        if let Some(stages) = &self.stages {
            if stages.is_empty() {
                return Err(Error::invalid_argument("stages", "must not be empty"));
            }
            validate_stages(stages)?;
        }
        if let Some(ids) = &self.webhook_ids {
            for id in ids {
                validate_id("webhook_ids", id)?;
            }
        }
        Ok(())
    }
}

fn validate_stages(stages: &[CallStage]) -> Result<()> {
    for (i, stage) in stages.iter().enumerate() {
        require_non_empty(&format!("stages[{i}].name"), &stage.name)?;
        require_non_empty(&format!("stages[{i}].prompt"), &stage.prompt)?;
    }
    Ok(())
}

/// Query parameters of `GET /agents`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAgentsParams {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Items per page, 1 to 100.
    pub limit: Option<u32>,
    /// Only return agents in this state.
    pub status: Option<AgentStatus>,
}

impl ListAgentsParams {
    pub(crate) fn validate(&self) -> Result<()> {
        validate_paging(self.page, self.limit)
    }
}
