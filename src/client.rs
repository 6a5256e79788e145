//! The CallWhiz API client.
//!
//! [`Client`] exposes one async method per API operation. Every method validates its
//! arguments locally, performs exactly one HTTP exchange through the transport and
//! decodes the reply into a typed record or a typed [`Error`].

use crate::config::ClientConfig;
use crate::decode::{self, Record};
use crate::metadata::{ApiMethod, RequestMetadata};
use crate::models::validate_id;
use crate::transport::Transport;
use crate::{
    AccountLimits, Agent, Call, ConversationDetail, ConversationSummary, CreateAgentRequest,
    CreateWebhookRequest, Credits, Error, ListAgentsParams, ListCallsParams,
    ListConversationsParams, PhoneNumber, RawResponse, Recording, Result, SimpleCredits,
    StartCallRequest, Transcript, UpdateAgentRequest, UpdateWebhookRequest, Usage, UsageQuery,
    Webhook,
};
use http::{HeaderName, HeaderValue};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// A client for the CallWhiz voice-agent API.
///
/// The client owns a connection pool. Dropping it, or calling [`Client::close`],
/// releases the pool. Create one client per workflow and reuse it for all requests in
/// that workflow.
///
/// # Examples
///
/// ```no_run
/// use callwhiz::{Client, CreateAgentRequest, Language, ModelTier, StartCallRequest};
///
/// # async fn example() -> Result<(), callwhiz::Error> {
/// let client = Client::builder()
///     .api_key("cw_test_123")
///     .sandbox(true)
///     .build()?;
///
/// let agent = client
///     .create_agent(
///         &CreateAgentRequest::new("Support", ModelTier::Nano, "Calvin", Language::English)
///             .prompt("You are a friendly support agent."),
///     )
///     .await?;
///
/// let call = client
///     .start_call(&StartCallRequest::new(&agent.id, "+14155550100"))
///     .await?;
/// println!("Call {} is {}", call.call_id, call.status);
///
/// client.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    transport: Transport,
}

impl Client {
    /// Creates a client from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the API key is empty or the base URL, user
    /// agent or timeout cannot be used.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = Transport::new(&config)?;

        tracing::debug!(
            base_url = %transport.base_url(),
            timeout_ms = config.timeout.as_millis() as u64,
            "Created CallWhiz client"
        );

        Ok(Self { transport })
    }

    /// Creates a client configured from `CALLWHIZ_*` environment variables.
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Creates a new `ClientBuilder` for configuring a client.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use callwhiz::Client;
    /// use std::time::Duration;
    ///
    /// # fn example() -> Result<(), callwhiz::Error> {
    /// let client = Client::builder()
    ///     .api_key("cw_live_abc")
    ///     .timeout(Duration::from_secs(10))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.transport.timeout()
    }

    /// Releases the connection pool.
    ///
    /// Equivalent to dropping the client; the client cannot be used afterwards.
    pub fn close(self) {
        tracing::debug!(base_url = %self.transport.base_url(), "Closing CallWhiz client");
    }

    // ----- agents -----

    /// Creates an agent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything if the request is
    /// invalid, and the mapped API error otherwise.
    pub async fn create_agent(&self, request: &CreateAgentRequest) -> Result<Agent> {
        request.validate()?;
        let metadata = RequestMetadata::new(ApiMethod::Post, "/agents");
        self.fetch(metadata, Some(request)).await
    }

    /// Fetches an agent by id.
    pub async fn get_agent(&self, agent_id: &str) -> Result<Agent> {
        validate_id("agent_id", agent_id)?;
        let metadata = RequestMetadata::new(ApiMethod::Get, format!("/agents/{}", agent_id));
        self.fetch::<_, ()>(metadata, None).await
    }

    /// Lists agents, one page at a time.
    pub async fn list_agents(&self, params: &ListAgentsParams) -> Result<Vec<Agent>> {
        params.validate()?;
        let metadata = RequestMetadata::new(ApiMethod::Get, "/agents")
            .with_optional_query_param("page", params.page)
            .with_optional_query_param("limit", params.limit)
            .with_optional_query_param("status", params.status);
        self.fetch_list(metadata).await
    }

    /// Updates the fields set on `request`, leaving the rest untouched.
    pub async fn update_agent(
        &self,
        agent_id: &str,
        request: &UpdateAgentRequest,
    ) -> Result<Agent> {
        validate_id("agent_id", agent_id)?;
        request.validate()?;
        let metadata = RequestMetadata::new(ApiMethod::Patch, format!("/agents/{}", agent_id));
        self.fetch(metadata, Some(request)).await
    }

    /// Deletes an agent.
    pub async fn delete_agent(&self, agent_id: &str) -> Result<()> {
        validate_id("agent_id", agent_id)?;
        let metadata = RequestMetadata::new(ApiMethod::Delete, format!("/agents/{}", agent_id));
        self.execute(metadata).await
    }

    // ----- calls -----

    /// Places an outbound call with the given agent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without dialing if the phone number is not E.164,
    /// and [`Error::RateLimit`] when the API throttles the request.
    pub async fn start_call(&self, request: &StartCallRequest) -> Result<Call> {
        request.validate()?;
        let metadata = RequestMetadata::new(ApiMethod::Post, "/calls");
        self.fetch(metadata, Some(request)).await
    }

    /// Fetches a call by id.
    pub async fn get_call(&self, call_id: &str) -> Result<Call> {
        validate_id("call_id", call_id)?;
        let metadata = RequestMetadata::new(ApiMethod::Get, format!("/calls/{}", call_id));
        self.fetch::<_, ()>(metadata, None).await
    }

    /// Lists calls matching the given filters.
    pub async fn list_calls(&self, params: &ListCallsParams) -> Result<Vec<Call>> {
        params.validate()?;
        let metadata = RequestMetadata::new(ApiMethod::Get, "/calls")
            .with_optional_query_param("page", params.page)
            .with_optional_query_param("limit", params.limit)
            .with_optional_query_param("agent_id", params.agent_id.as_deref())
            .with_optional_query_param("status", params.status)
            .with_optional_query_param("from_date", params.from_date.as_deref())
            .with_optional_query_param("to_date", params.to_date.as_deref());
        self.fetch_list(metadata).await
    }

    /// Fetches the transcript of a call. Entries are in chronological order.
    pub async fn get_call_transcript(&self, call_id: &str) -> Result<Transcript> {
        validate_id("call_id", call_id)?;
        let metadata =
            RequestMetadata::new(ApiMethod::Get, format!("/calls/{}/transcript", call_id));
        self.fetch::<_, ()>(metadata, None).await
    }

    /// Fetches the recording location of a call.
    pub async fn get_call_recording(&self, call_id: &str) -> Result<Recording> {
        validate_id("call_id", call_id)?;
        let metadata =
            RequestMetadata::new(ApiMethod::Get, format!("/calls/{}/recording", call_id));
        self.fetch::<_, ()>(metadata, None).await
    }

    // ----- conversations -----

    /// Lists conversation summaries, one page at a time.
    pub async fn list_conversations(
        &self,
        params: &ListConversationsParams,
    ) -> Result<Vec<ConversationSummary>> {
        params.validate()?;
        let metadata = RequestMetadata::new(ApiMethod::Get, "/conversations")
            .with_optional_query_param("page", params.page)
            .with_optional_query_param("limit", params.limit)
            .with_optional_query_param("agent_id", params.agent_id.as_deref())
            .with_optional_query_param("from_date", params.from_date.as_deref())
            .with_optional_query_param("to_date", params.to_date.as_deref());
        self.fetch_list(metadata).await
    }

    /// Fetches a conversation with all of its messages.
    pub async fn get_conversation(&self, conversation_id: &str) -> Result<ConversationDetail> {
        validate_id("conversation_id", conversation_id)?;
        let metadata = RequestMetadata::new(
            ApiMethod::Get,
            format!("/conversations/{}", conversation_id),
        );
        self.fetch::<_, ()>(metadata, None).await
    }

    // ----- account -----

    /// Fetches the remaining credit balance.
    pub async fn get_credits_simple(&self) -> Result<SimpleCredits> {
        let metadata = RequestMetadata::new(ApiMethod::Get, "/credits");
        self.fetch::<_, ()>(metadata, None).await
    }

    /// Fetches the full credit breakdown.
    pub async fn get_credits_detailed(&self) -> Result<Credits> {
        let metadata = RequestMetadata::new(ApiMethod::Get, "/credits/detailed");
        self.fetch::<_, ()>(metadata, None).await
    }

    /// Fetches usage counters aggregated over a period.
    ///
    /// Pass a [`UsagePeriod`](crate::UsagePeriod) directly, or a [`UsageQuery`] to
    /// narrow the window to a date range.
    pub async fn get_usage(&self, query: impl Into<UsageQuery>) -> Result<Usage> {
        let query = query.into();
        query.validate()?;
        let metadata = RequestMetadata::new(ApiMethod::Get, "/usage")
            .with_query_param("period", query.period)
            .with_optional_query_param("from_date", query.from_date.as_deref())
            .with_optional_query_param("to_date", query.to_date.as_deref());
        self.fetch::<_, ()>(metadata, None).await
    }

    /// Fetches the plan's limits and how much of each is in use.
    pub async fn get_account_limits(&self) -> Result<AccountLimits> {
        let metadata = RequestMetadata::new(ApiMethod::Get, "/usage/limits");
        self.fetch::<_, ()>(metadata, None).await
    }

    /// Lists the phone numbers on the account.
    pub async fn get_user_phone_numbers(&self) -> Result<Vec<PhoneNumber>> {
        let metadata = RequestMetadata::new(ApiMethod::Get, "/phone-numbers");
        self.fetch_list(metadata).await
    }

    // ----- webhooks -----

    /// Registers a user webhook agents can call during conversations.
    pub async fn create_user_webhook(&self, request: &CreateWebhookRequest) -> Result<Webhook> {
        request.validate()?;
        let metadata = RequestMetadata::new(ApiMethod::Post, "/webhooks");
        self.fetch(metadata, Some(request)).await
    }

    /// Lists registered user webhooks.
    pub async fn list_user_webhooks(&self) -> Result<Vec<Webhook>> {
        let metadata = RequestMetadata::new(ApiMethod::Get, "/webhooks");
        self.fetch_list(metadata).await
    }

    /// Fetches a user webhook by id.
    pub async fn get_user_webhook(&self, webhook_id: &str) -> Result<Webhook> {
        validate_id("webhook_id", webhook_id)?;
        let metadata = RequestMetadata::new(ApiMethod::Get, format!("/webhooks/{}", webhook_id));
        self.fetch::<_, ()>(metadata, None).await
    }

    /// Updates the fields set on `request`, leaving the rest untouched.
    pub async fn update_user_webhook(
        &self,
        webhook_id: &str,
        request: &UpdateWebhookRequest,
    ) -> Result<Webhook> {
        validate_id("webhook_id", webhook_id)?;
        request.validate()?;
        let metadata =
            RequestMetadata::new(ApiMethod::Patch, format!("/webhooks/{}", webhook_id));
        self.fetch(metadata, Some(request)).await
    }

    /// Deletes a user webhook.
    pub async fn delete_user_webhook(&self, webhook_id: &str) -> Result<()> {
        validate_id("webhook_id", webhook_id)?;
        let metadata =
            RequestMetadata::new(ApiMethod::Delete, format!("/webhooks/{}", webhook_id));
        self.execute(metadata).await
    }

    // ----- plumbing -----

    async fn send<B>(&self, metadata: RequestMetadata, body: Option<&B>) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        self.transport.request(&metadata, body).await
    }

    async fn fetch<T, B>(&self, metadata: RequestMetadata, body: Option<&B>) -> Result<T>
    where
        T: Record,
        B: Serialize + ?Sized,
    {
        let raw = self.send(metadata, body).await?;
        decode::decode(&raw)
    }

    async fn fetch_list<T: Record>(&self, metadata: RequestMetadata) -> Result<Vec<T>> {
        let raw = self.send::<()>(metadata, None).await?;
        decode::decode_list(&raw)
    }

    async fn execute(&self, metadata: RequestMetadata) -> Result<()> {
        let raw = self.send::<()>(metadata, None).await?;
        decode::decode_empty(&raw)
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use callwhiz::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), callwhiz::Error> {
/// let client = ClientBuilder::new()
///     .api_key("cw_test_123")
///     .base_url("http://localhost:8080/v1")?
///     .timeout(Duration::from_secs(5))
///     .default_header("X-Request-Source", "nightly-batch")?
///     .user_agent("dialer/2.1")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings and no API key.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::new(String::new()),
        }
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = api_key.into();
        self
    }

    /// Overrides the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(url.as_ref())?;
        self.config.base_url = Some(url.to_string());
        Ok(self)
    }

    /// Targets the sandbox deployment unless a base URL is set.
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
        self.config.default_headers.insert(name, value);
        Ok(self)
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key was provided or if the client configuration is
    /// invalid.
    pub fn build(self) -> Result<Client> {
        Client::new(self.config)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
