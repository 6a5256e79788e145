//! Integration tests using wiremock to simulate the CallWhiz API.

use callwhiz::{
    AgentStatus, CallStatus, Client, CreateAgentRequest, CreateWebhookRequest, Error, Field,
    Language, ListAgentsParams, ListCallsParams, ListConversationsParams, ModelTier,
    ParameterDefinition, ParameterType, StartCallRequest, UpdateAgentRequest,
    UpdateWebhookRequest, UsagePeriod, UsageQuery, WebhookMethod,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "cw_test_123";

fn client_for(mock_server: &MockServer) -> Client {
    Client::builder()
        .api_key(API_KEY)
        .base_url(format!("{}/v1", mock_server.uri()))
        .unwrap()
        .build()
        .unwrap()
}

fn agent_json() -> serde_json::Value {
    json!({
        "id": "ag_1",
        "name": "Test",
        "model": "nano",
        "voice": "Calvin",
        "language": "en",
        "accent": "American",
        "prompt": "Hi",
        "status": "active",
        "created_at": "2025-01-15T10:00:00Z"
    })
}

fn call_json(status: &str) -> serde_json::Value {
    json!({
        "call_id": "call_1",
        "agent_id": "ag_1",
        "phone_number": "+1234567890",
        "status": status,
        "context": {"customer_name": "John Doe"},
        "created_at": "2025-01-15T10:05:00Z"
    })
}

#[tokio::test]
async fn test_create_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/agents"))
        .and(header("authorization", "Bearer cw_test_123"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({
            "name": "Test",
            "model": "nano",
            "voice": "Calvin",
            "language": "en",
            "accent": "American",
            "prompt": "Hi"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"success": true, "data": agent_json()})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = CreateAgentRequest::new("Test", "nano".parse().unwrap(), "Calvin", Language::English)
        .accent("American")
        .prompt("Hi");

    let agent = client.create_agent(&request).await.unwrap();

    assert_eq!(agent.id, "ag_1");
    assert_eq!(agent.model, ModelTier::Nano);
    assert_eq!(agent.status, Field::Present(AgentStatus::Active));
    assert!(agent.stages.is_absent());
    assert!(agent.webhook_ids.is_empty());
}

#[tokio::test]
async fn test_invalid_agent_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(agent_json()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    // No prompt and no stages.
    let request = CreateAgentRequest::new("Test", ModelTier::Lite, "Calvin", Language::English);
    let err = client.create_agent(&request).await.unwrap_err();
    assert!(matches!(err, Error::Validation { status: None, .. }));
    assert_eq!(err.field(), Some("prompt"));

    // Unknown model tiers never make it into a request.
    let err = "mega".parse::<ModelTier>().unwrap_err();
    assert_eq!(err.field(), Some("model"));

    let request = CreateAgentRequest::new("Test", ModelTier::Pro, "Calvin", Language::English)
        .stage("greeting", "Say hello")
        .stage("", "Close the call");
    let err = client.create_agent(&request).await.unwrap_err();
    assert_eq!(err.field(), Some("stages[1].name"));
}

#[tokio::test]
async fn test_get_update_and_delete_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/agents/ag_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(agent_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut updated = agent_json();
    updated["status"] = json!("inactive");
    Mock::given(method("PATCH"))
        .and(path("/v1/agents/ag_1"))
        .and(body_json(json!({"status": "inactive"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1/agents/ag_1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let agent = client.get_agent("ag_1").await.unwrap();
    assert_eq!(agent.accent, Field::Present("American".to_string()));

    let update = UpdateAgentRequest {
        status: Some(AgentStatus::Inactive),
        ..Default::default()
    };
    let agent = client.update_agent("ag_1", &update).await.unwrap();
    assert_eq!(agent.status, Field::Present(AgentStatus::Inactive));

    client.delete_agent("ag_1").await.unwrap();
}

#[tokio::test]
async fn test_list_agents_with_filters() {
    let mock_server = MockServer::start().await;

    let mut second = agent_json();
    second["id"] = json!("ag_2");
    Mock::given(method("GET"))
        .and(path("/v1/agents"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "10"))
        .and(query_param("status", "active"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": [agent_json(), second]})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let params = ListAgentsParams {
        page: Some(2),
        limit: Some(10),
        status: Some(AgentStatus::Active),
    };

    let agents = client.list_agents(&params).await.unwrap();
    let ids: Vec<_> = agents.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["ag_1", "ag_2"]);

    let err = client
        .list_agents(&ListAgentsParams {
            limit: Some(500),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("limit"));
}

#[tokio::test]
async fn test_start_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/calls"))
        .and(body_json(json!({
            "agent_id": "ag_1",
            "phone_number": "+1234567890",
            "context": {"customer_name": "John Doe"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(call_json("queued")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let call = client
        .start_call(&StartCallRequest::new("ag_1", "+1234567890").context("customer_name", "John Doe"))
        .await
        .unwrap();

    assert_eq!(call.call_id, "call_1");
    assert_eq!(call.status, CallStatus::Queued);
    assert_eq!(call.context["customer_name"], json!("John Doe"));
    assert!(call.duration.is_absent());
}

#[tokio::test]
async fn test_start_call_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/calls"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "30")
                .insert_header("X-RateLimit-Limit", "60")
                .insert_header("X-RateLimit-Remaining", "0")
                .set_body_json(json!({"error": {"code": "RATE_LIMITED", "message": "Too many calls"}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .start_call(&StartCallRequest::new("ag_1", "+1234567890"))
        .await
        .unwrap_err();

    match &err {
        Error::RateLimit {
            status,
            message,
            retry_after,
            rate_limit_info,
            ..
        } => {
            assert_eq!(status.as_u16(), 429);
            assert_eq!(message, "Too many calls");
            assert_eq!(*retry_after, Some(Duration::from_secs(30)));
            assert_eq!(rate_limit_info.limit, Some(60));
            assert_eq!(rate_limit_info.remaining, Some(0));
        }
        other => panic!("Expected RateLimit, got {:?}", other),
    }
    assert!(err.is_retryable());
    assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
}

#[tokio::test]
async fn test_invalid_phone_number_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(call_json("queued")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    for number in ["1234567890", "+1", "+12345abc890", ""] {
        let err = client
            .start_call(&StartCallRequest::new("ag_1", number))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("phone_number"), "number {:?}", number);
        assert_eq!(err.status(), None);
    }
}

#[tokio::test]
async fn test_status_table() {
    let cases = [
        (401, "Authentication"),
        (403, "Permission"),
        (404, "NotFound"),
        (409, "Conflict"),
        (422, "Validation"),
        (500, "Server"),
        (503, "Server"),
        (418, "Api"),
    ];

    for (status, expected) in cases {
        let mock_server = MockServer::start().await;
        let body = format!(r#"{{"error": "failure {}"}}"#, status);

        Mock::given(method("GET"))
            .and(path("/v1/calls/call_1"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body.clone()))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client.get_call("call_1").await.unwrap_err();

        let kind = match &err {
            Error::Authentication { .. } => "Authentication",
            Error::Permission { .. } => "Permission",
            Error::NotFound { .. } => "NotFound",
            Error::Conflict { .. } => "Conflict",
            Error::Validation { .. } => "Validation",
            Error::Server { .. } => "Server",
            Error::Api { .. } => "Api",
            other => panic!("Unexpected error for {}: {:?}", status, other),
        };
        assert_eq!(kind, expected, "status {}", status);
        assert_eq!(err.status().map(|s| s.as_u16()), Some(status));
        assert_eq!(err.raw_response(), Some(body.as_str()));
    }
}

#[tokio::test]
async fn test_error_message_extraction() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/agents/ag_missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error": {"code": "AGENT_NOT_FOUND", "message": "Agent ag_missing does not exist"}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/agents"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": {"code": "VALIDATION_ERROR", "message": "Unknown voice", "field": "voice"}
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    match client.get_agent("ag_missing").await.unwrap_err() {
        Error::NotFound { message, .. } => assert_eq!(message, "Agent ag_missing does not exist"),
        other => panic!("Expected NotFound, got {:?}", other),
    }

    let request = CreateAgentRequest::new("Test", ModelTier::Nano, "Nobody", Language::English)
        .prompt("Hi");
    let err = client.create_agent(&request).await.unwrap_err();
    assert!(matches!(err, Error::Validation { status: Some(_), .. }));
    assert_eq!(err.field(), Some("voice"));
    assert!(err.to_string().contains("Unknown voice"));
}

#[tokio::test]
async fn test_malformed_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.get_credits_simple().await;

    match result {
        Err(Error::MalformedResponse {
            raw_response,
            status,
            ..
        }) => {
            assert_eq!(status.as_u16(), 200);
            assert_eq!(raw_response, "<html>Bad Gateway</html>");
        }
        _ => panic!("Expected MalformedResponse, got {:?}", result),
    }
}

#[tokio::test]
async fn test_failed_envelope_on_success_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/calls/call_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": {"code": "CUSTOM_ERROR", "message": "Custom error message"}
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    match client.get_call("call_1").await.unwrap_err() {
        Error::Api { code, message, .. } => {
            assert_eq!(code.as_deref(), Some("CUSTOM_ERROR"));
            assert_eq!(message, "Custom error message");
        }
        other => panic!("Expected Api, got {:?}", other),
    }
}

#[tokio::test]
async fn test_response_missing_required_field() {
    let mock_server = MockServer::start().await;

    let mut body = call_json("active");
    body.as_object_mut().unwrap().remove("agent_id");
    Mock::given(method("GET"))
        .and(path("/v1/calls/call_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.get_call("call_1").await.unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(err.field(), Some("agent_id"));
    assert_eq!(err.status().map(|s| s.as_u16()), Some(200));
}

#[tokio::test]
async fn test_credits_are_idempotent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"credits_remaining": 125.5}
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let first = client.get_credits_simple().await.unwrap();
    let second = client.get_credits_simple().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.credits_remaining, 125.5);
}

#[tokio::test]
async fn test_detailed_credits() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/credits/detailed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "credits_remaining": 75.0,
            "total_credits": 100.0,
            "usage_percentage": 25.0,
            "credits_used": 25.0,
            "currency": "USD"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let credits = client.get_credits_detailed().await.unwrap();
    assert_eq!(credits.usage_percentage, 25.0);
    assert_eq!(credits.currency, Field::Present("USD".to_string()));
}

#[tokio::test]
async fn test_list_calls_with_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/calls"))
        .and(query_param("agent_id", "ag_1"))
        .and(query_param("status", "completed"))
        .and(query_param("from_date", "2025-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([call_json("completed")])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let calls = client
        .list_calls(&ListCallsParams {
            agent_id: Some("ag_1".to_string()),
            status: Some(CallStatus::Completed),
            from_date: Some("2025-01-01".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(calls.len(), 1);
    assert!(calls[0].status.is_finished());
}

#[tokio::test]
async fn test_transcript_and_recording() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/calls/call_1/transcript"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "call_id": "call_1",
            "transcript": [
                {"speaker": "agent", "text": "Hello, this is Calvin.", "timestamp": "2025-01-15T10:05:01Z"},
                {"speaker": "customer", "text": "Hi!"},
                {"speaker": "agent", "text": "How can I help?"}
            ],
            "summary": "Greeting only"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/calls/call_1/recording"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "call_id": "call_1",
            "recording_url": "https://cdn.callwhiz.ai/rec/call_1.mp3",
            "duration": 42,
            "format": "mp3"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let transcript = client.get_call_transcript("call_1").await.unwrap();
    let speakers: Vec<_> = transcript.entries.iter().map(|e| e.speaker.as_str()).collect();
    assert_eq!(speakers, ["agent", "customer", "agent"]);
    assert_eq!(transcript.summary, Field::Present("Greeting only".to_string()));

    let recording = client.get_call_recording("call_1").await.unwrap();
    assert_eq!(recording.duration, Field::Present(42));
    assert!(recording.expires_at.is_absent());
}

#[tokio::test]
async fn test_invalid_id_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(call_json("active")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    for id in ["", "call_1/transcript", "call?x=1"] {
        let err = client.get_call(id).await.unwrap_err();
        assert_eq!(err.field(), Some("call_id"));
    }
}

#[tokio::test]
async fn test_dot_segment_ids_never_reach_collection_paths() {
    let mock_server = MockServer::start().await;

    // `/v1/agents/..` would normalize to `/v1/`, and `%2e%2e` decodes to the same thing.
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    for id in ["..", ".", "%2e%2e"] {
        let err = client.delete_agent(id).await.unwrap_err();
        assert!(matches!(err, Error::Validation { status: None, .. }));
        assert_eq!(err.field(), Some("agent_id"));

        let err = client.delete_user_webhook(id).await.unwrap_err();
        assert_eq!(err.field(), Some("webhook_id"));
    }
}

#[tokio::test]
async fn test_usage_and_phone_numbers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/usage"))
        .and(query_param("period", "week"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "period": "week",
                "voice_calls": {"total": 12, "minutes": 30.5},
                "api_calls": {"total": 340}
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/phone-numbers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "pn_1", "phone_number": "+14155550100", "capabilities": ["voice"]},
            {"id": "pn_2", "phone_number": "+442071234567", "country": "GB"}
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let usage = client.get_usage(UsagePeriod::Week).await.unwrap();
    assert_eq!(usage.period, UsagePeriod::Week);
    assert_eq!(usage.counter("api_calls", "total"), Some(340.0));

    let numbers = client.get_user_phone_numbers().await.unwrap();
    assert_eq!(numbers.len(), 2);
    assert_eq!(numbers[0].capabilities, ["voice"]);
    assert_eq!(numbers[1].country, Field::Present("GB".to_string()));
}

#[tokio::test]
async fn test_user_webhooks() {
    let mock_server = MockServer::start().await;

    let webhook = json!({
        "id": "wh_1",
        "name": "check_order",
        "endpoint": "https://shop.example.com/orders",
        "method": "POST",
        "parameters": {
            "order_id": {"type": "string", "description": "Order number", "required": true}
        },
        "auth": {"type": "bearer", "token": "secret"}
    });

    Mock::given(method("POST"))
        .and(path("/v1/webhooks"))
        .and(body_json(json!({
            "name": "check_order",
            "endpoint": "https://shop.example.com/orders",
            "method": "POST",
            "parameters": {
                "order_id": {"type": "string", "description": "Order number", "required": true}
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(webhook.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/webhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([webhook])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1/webhooks/wh_1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": {"message": "deleted"}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = CreateWebhookRequest::new(
        "check_order",
        "https://shop.example.com/orders",
        WebhookMethod::Post,
    )
    .parameter(
        "order_id",
        ParameterDefinition::new(ParameterType::String)
            .description("Order number")
            .required(),
    );

    let created = client.create_user_webhook(&request).await.unwrap();
    assert_eq!(created.id, "wh_1");
    assert!(created.parameters["order_id"].required);
    assert_eq!(
        created.auth.as_option().map(|auth| auth.kind.as_str()),
        Some("bearer")
    );

    let listed = client.list_user_webhooks().await.unwrap();
    assert_eq!(listed, vec![created]);

    client.delete_user_webhook("wh_1").await.unwrap();
}

#[tokio::test]
async fn test_get_and_update_user_webhook() {
    let mock_server = MockServer::start().await;

    let webhook = |endpoint: &str| {
        json!({
            "id": "wh_1",
            "name": "check_order",
            "endpoint": endpoint,
            "method": "GET",
            "description": "Looks up an order",
            "created_at": "2025-01-15T10:00:00Z"
        })
    };

    Mock::given(method("GET"))
        .and(path("/v1/webhooks/wh_1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(webhook("https://shop.example.com/orders")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/v1/webhooks/wh_1"))
        .and(body_json(json!({"endpoint": "https://shop.example.com/v2/orders"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": webhook("https://shop.example.com/v2/orders")
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let fetched = client.get_user_webhook("wh_1").await.unwrap();
    assert_eq!(fetched.method, WebhookMethod::Get);
    assert_eq!(fetched.description, Field::Present("Looks up an order".to_string()));

    let update = UpdateWebhookRequest::default().endpoint("https://shop.example.com/v2/orders");
    let updated = client.update_user_webhook("wh_1", &update).await.unwrap();
    assert_eq!(updated.endpoint, "https://shop.example.com/v2/orders");

    let err = client
        .update_user_webhook("wh_1", &UpdateWebhookRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { status: None, .. }));
}

#[tokio::test]
async fn test_conversations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/conversations"))
        .and(query_param("agent_id", "ag_1"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{
                "conversation_id": "conv_1",
                "call_id": "call_1",
                "agent_id": "ag_1",
                "phone_number": "+1234567890",
                "started_at": "2025-01-15T10:05:00Z",
                "duration": 95,
                "message_count": 2,
                "outcome": "completed"
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/conversations/conv_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_id": "conv_1",
            "call_id": "call_1",
            "agent_id": "ag_1",
            "phone_number": "+1234567890",
            "messages": [
                {"speaker": "agent", "text": "Hello, this is Calvin.", "timestamp": "2025-01-15T10:05:01Z"},
                {"speaker": "customer", "text": "Hi!", "audio_duration": 0.8}
            ],
            "metadata": {"crm_id": "42"}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/conversations/conv_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_id": "conv_2",
            "call_id": "call_2",
            "agent_id": "ag_1",
            "phone_number": "+1234567890",
            "messages": [{"speaker": "agent"}]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let params = ListConversationsParams {
        page: Some(2),
        limit: Some(20),
        agent_id: Some("ag_1".to_string()),
        ..Default::default()
    };
    let conversations = client.list_conversations(&params).await.unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].message_count, Field::Present(2));
    assert!(conversations[0].summary.is_absent());

    let detail = client.get_conversation("conv_1").await.unwrap();
    assert_eq!(detail.conversation.conversation_id, "conv_1");
    assert_eq!(detail.messages.len(), 2);
    assert_eq!(detail.messages[1].audio_duration, Field::Present(0.8));
    assert_eq!(detail.metadata["crm_id"], json!("42"));

    let err = client.get_conversation("conv_2").await.unwrap_err();
    assert_eq!(err.field(), Some("messages[0].text"));
}

#[tokio::test]
async fn test_usage_date_range_and_limits() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/usage"))
        .and(query_param("period", "day"))
        .and(query_param("from_date", "2025-01-01"))
        .and(query_param("to_date", "2025-01-07"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "period": "day",
            "from_date": "2025-01-01",
            "to_date": "2025-01-07",
            "voice_calls": {"total": 4}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/usage/limits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "plan": "starter",
                "limits": {"agents": 5, "concurrent_calls": 2},
                "current_usage": {"agents": 3}
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let query = UsageQuery::from(UsagePeriod::Day)
        .from_date("2025-01-01")
        .to_date("2025-01-07");
    let usage = client.get_usage(query).await.unwrap();
    assert_eq!(usage.from_date, Field::Present("2025-01-01".to_string()));
    assert_eq!(usage.counter("voice_calls", "total"), Some(4.0));

    let limits = client.get_account_limits().await.unwrap();
    assert_eq!(limits.plan, "starter");
    assert_eq!(limits.remaining("agents"), Some(2.0));
    assert_eq!(limits.used("concurrent_calls"), None);
}

#[tokio::test]
async fn test_unknown_call_status_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/calls/call_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(call_json("ringing")))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.get_call("call_1").await.unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(err.field(), Some("status"));
    assert_eq!(err.status(), Some(http::StatusCode::OK));
    assert!(err.raw_response().unwrap().contains("ringing"));
}

#[tokio::test]
async fn test_default_and_custom_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/credits"))
        .and(header("user-agent", "dialer/2.1"))
        .and(header("x-request-source", "nightly-batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"credits_remaining": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .api_key(API_KEY)
        .base_url(format!("{}/v1", mock_server.uri()))
        .unwrap()
        .user_agent("dialer/2.1")
        .default_header("X-Request-Source", "nightly-batch")
        .unwrap()
        .build()
        .unwrap();

    let credits = client.get_credits_simple().await.unwrap();
    assert_eq!(credits.credits_remaining, 1.0);
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/credits"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"credits_remaining": 1}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .api_key(API_KEY)
        .base_url(format!("{}/v1", mock_server.uri()))
        .unwrap()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let err = client.get_credits_simple().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.is_timeout());
    assert!(err.is_retryable());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let client = Client::builder()
        .api_key(API_KEY)
        .base_url("http://127.0.0.1:1/v1")
        .unwrap()
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let err = client.get_credits_simple().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.raw_response(), None);
}

#[tokio::test]
async fn test_close_releases_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"credits_remaining": 3})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let credits = client.get_credits_simple().await.unwrap();
    client.close();

    assert_eq!(credits.credits_remaining, 3.0);
}
