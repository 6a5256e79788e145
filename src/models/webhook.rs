use super::{null_as_default, require_non_empty, string_enum, validate_http_url};
use crate::decode::{FieldSpec, Kind, Record, Schema};
use crate::{Error, Field, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

string_enum! {
    /// HTTP method CallWhiz uses when invoking a user webhook.
    pub enum WebhookMethod ("method") {
        Get => "GET",
        Post => "POST",
        Put => "PUT",
        Patch => "PATCH",
        Delete => "DELETE",
    }
}

string_enum! {
    /// JSON type of a webhook parameter.
    pub enum ParameterType ("type") {
        String => "string",
        Number => "number",
        Integer => "integer",
        Boolean => "boolean",
        Array => "array",
        Object => "object",
    }
}

/// Describes one parameter the agent fills in when calling a user webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    /// Tells the agent what to put here.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    /// Used when the agent leaves an optional parameter out.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub default: Field<Value>,
    /// Closed set of accepted values.
    #[serde(rename = "enum", default, skip_serializing_if = "Field::is_absent")]
    pub allowed_values: Field<Vec<Value>>,
}

impl ParameterDefinition {
    /// Creates an optional parameter of the given type.
    pub fn new(param_type: ParameterType) -> Self {
        Self {
            param_type,
            description: Field::Absent,
            required: false,
            default: Field::Absent,
            allowed_values: Field::Absent,
        }
    }

    /// Sets the description shown to the agent.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Field::Present(description.into());
        self
    }

    /// Marks the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the value used when the agent omits the parameter.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Field::Present(value.into());
        self
    }

    /// Restricts the parameter to the given values.
    pub fn allowed_values(mut self, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.allowed_values = Field::Present(values.into_iter().map(Into::into).collect());
        self
    }
}

static PARAMETER_SCHEMA: Schema = Schema {
    record: "ParameterDefinition",
    fields: &[
        FieldSpec::required("type", Kind::Enum(ParameterType::VALUES)),
        FieldSpec::optional("description", Kind::String),
        FieldSpec::optional("required", Kind::Boolean),
        FieldSpec::optional("enum", Kind::Array),
    ],
};

impl Record for ParameterDefinition {
    fn schema() -> &'static Schema {
        &PARAMETER_SCHEMA
    }
}

/// How CallWhiz authenticates against a user webhook.
///
/// `kind` is the descriptor's `type`; the remaining keys depend on it and are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookAuth {
    /// E.g. `none`, `bearer` or `api_key`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Scheme-specific settings such as `token`.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl WebhookAuth {
    /// No authentication.
    pub fn none() -> Self {
        Self {
            kind: "none".to_string(),
            params: Map::new(),
        }
    }

    /// `Authorization: Bearer <token>`.
    pub fn bearer(token: impl Into<String>) -> Self {
        let mut params = Map::new();
        params.insert("token".to_string(), Value::String(token.into()));
        Self {
            kind: "bearer".to_string(),
            params,
        }
    }

    /// A static key sent in the given header.
    pub fn api_key(header: impl Into<String>, key: impl Into<String>) -> Self {
        let mut params = Map::new();
        params.insert("header".to_string(), Value::String(header.into()));
        params.insert("key".to_string(), Value::String(key.into()));
        Self {
            kind: "api_key".to_string(),
            params,
        }
    }
}

static WEBHOOK_AUTH_SCHEMA: Schema = Schema {
    record: "WebhookAuth",
    fields: &[FieldSpec::required("type", Kind::String)],
};

/// A user webhook ("user function") agents can call during a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    /// Server-assigned identifier.
    pub id: String,
    /// Function name the agent sees.
    pub name: String,
    /// URL CallWhiz calls.
    pub endpoint: String,
    pub method: WebhookMethod,
    /// Parameters by name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: BTreeMap<String, ParameterDefinition>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub auth: Field<WebhookAuth>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub created_at: Field<String>,
}

static WEBHOOK_SCHEMA: Schema = Schema {
    record: "Webhook",
    fields: &[
        FieldSpec::required("id", Kind::String),
        FieldSpec::required("name", Kind::String),
        FieldSpec::required("endpoint", Kind::String),
        FieldSpec::required("method", Kind::Enum(WebhookMethod::VALUES)),
        FieldSpec::optional("parameters", Kind::MapOf(&PARAMETER_SCHEMA)),
        FieldSpec::optional("auth", Kind::Nested(&WEBHOOK_AUTH_SCHEMA)),
        FieldSpec::optional("description", Kind::String),
        FieldSpec::optional("created_at", Kind::String),
    ],
};

impl Record for Webhook {
    fn schema() -> &'static Schema {
        &WEBHOOK_SCHEMA
    }
}

/// Body of `POST /webhooks`.
///
/// # Examples
///
/// ```
/// use callwhiz::{CreateWebhookRequest, ParameterDefinition, ParameterType, WebhookAuth, WebhookMethod};
///
/// let request = CreateWebhookRequest::new("check_order", "https://shop.example.com/orders", WebhookMethod::Post)
///     .description("Looks up an order by id")
///     .parameter(
///         "order_id",
///         ParameterDefinition::new(ParameterType::String)
///             .description("The order number")
///             .required(),
///     )
///     .auth(WebhookAuth::bearer("secret"));
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateWebhookRequest {
    /// Function name the agent sees. Keep it short and descriptive.
    pub name: String,
    /// Absolute `http` or `https` URL.
    pub endpoint: String,
    pub method: WebhookMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ParameterDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<WebhookAuth>,
}

impl CreateWebhookRequest {
    /// Creates a request with no parameters and no authentication.
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, method: WebhookMethod) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            method,
            description: None,
            parameters: BTreeMap::new(),
            auth: None,
        }
    }

    /// Sets the description the agent uses to decide when to call the webhook.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a parameter, replacing any earlier one with the same name.
    pub fn parameter(mut self, name: impl Into<String>, definition: ParameterDefinition) -> Self {
        self.parameters.insert(name.into(), definition);
        self
    }

    /// Sets how CallWhiz authenticates against the endpoint.
    pub fn auth(mut self, auth: WebhookAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Checks the request without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("name", &self.name)?;
        validate_http_url("endpoint", &self.endpoint)?;
        validate_parameters(&self.parameters)?;
        if let Some(auth) = &self.auth {
            require_non_empty("auth.type", &auth.kind)?;
        }
        Ok(())
    }
}

/// Body of `PATCH /webhooks/{id}`. Only the fields that are set are sent.
///
/// # Examples
///
/// ```
/// use callwhiz::{UpdateWebhookRequest, WebhookMethod};
///
/// let update = UpdateWebhookRequest::default()
///     .endpoint("https://shop.example.com/v2/orders")
///     .method(WebhookMethod::Get);
/// assert!(update.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateWebhookRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<WebhookMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replaces the whole parameter map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, ParameterDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<WebhookAuth>,
}

impl UpdateWebhookRequest {
    /// Renames the webhook.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Points the webhook at a new URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn method(mut self, method: WebhookMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a parameter to the replacement map, starting from an empty one.
    pub fn parameter(mut self, name: impl Into<String>, definition: ParameterDefinition) -> Self {
        self.parameters
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), definition);
        self
    }

    pub fn auth(mut self, auth: WebhookAuth) -> Self {
        self.auth = Some(auth);
        self
    }

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
        if let Some(endpoint) = &self.endpoint {
            validate_http_url("endpoint", endpoint)?;
        }
        if let Some(parameters) = &self.parameters {
            validate_parameters(parameters)?;
        }
        if let Some(auth) = &self.auth {
            require_non_empty("auth.type", &auth.kind)?;
        }
        Ok(())
    }
}

fn validate_parameters(parameters: &BTreeMap<String, ParameterDefinition>) -> Result<()> {
    for (name, definition) in parameters {
        require_non_empty("parameters", name)?;
        if definition.required && definition.default.is_present() {
            return Err(Error::invalid_argument(
                &format!("parameters.{name}"),
                "a required parameter cannot have a default",
            ));
        }
    }
    Ok(())
}
