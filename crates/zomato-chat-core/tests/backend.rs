use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zomato_chat_core::conversation::{FALLBACK_ERROR, RESET_GREETING};
use zomato_chat_core::{BackendClient, ChatRequest, ClientError, Conversation, Message, Role};

fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(&format!("{}/api", server.uri()))
}

#[tokio::test]
async fn chat_reply_is_appended() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({ "message": "find pizza", "session_id": "default" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Here are some pizza places",
            "session_id": "default"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut conversation = Conversation::new();
    conversation.send_message(&client, "find pizza").await;

    let messages = conversation.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1], Message::user("find pizza"));
    assert_eq!(messages[2], Message::assistant("Here are some pizza places"));
    assert!(!conversation.is_loading());
}

#[tokio::test]
async fn server_error_becomes_fallback_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "boom" })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut conversation = Conversation::new();
    conversation.send_message(&client, "find pizza").await;

    let last = conversation.last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.content, FALLBACK_ERROR);
    assert!(!conversation.is_loading());
}

#[tokio::test]
async fn unreachable_backend_becomes_fallback_message() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    drop(server);

    let mut conversation = Conversation::new();
    conversation.send_message(&client, "find pizza").await;

    assert_eq!(conversation.last(), Some(&Message::assistant(FALLBACK_ERROR)));
    assert!(!conversation.is_loading());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.chat(&ChatRequest::new("hi")).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn blank_message_never_hits_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut conversation = Conversation::new();
    conversation.send_message(&client, "   ").await;

    assert_eq!(conversation.messages().len(), 1);
    assert!(!conversation.is_loading());
}

#[tokio::test]
async fn dropping_an_in_flight_send_clears_loading() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": "late" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut conversation = Conversation::new();
    let timed_out = tokio::time::timeout(
        Duration::from_millis(100),
        conversation.send_message(&client, "slow"),
    )
    .await;

    assert!(timed_out.is_err());
    assert_eq!(conversation.last(), Some(&Message::user("slow")));
    assert!(!conversation.is_loading());
}

#[tokio::test]
async fn reset_replaces_the_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "conversation reset" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut conversation = Conversation::with_messages(vec![
        Message::assistant("hello"),
        Message::user("find pizza"),
        Message::assistant("Here are some pizza places"),
    ]);
    conversation.reset_conversation(&client).await;

    assert_eq!(conversation.messages(), &[Message::assistant(RESET_GREETING)]);
}

#[tokio::test]
async fn rejected_reset_still_replaces_the_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reset"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "detail": "MCP client not initialized" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.reset().await.is_ok());

    let mut conversation = Conversation::with_messages(vec![Message::user("find pizza")]);
    conversation.reset_conversation(&client).await;

    assert_eq!(conversation.messages(), &[Message::assistant(RESET_GREETING)]);
}

#[tokio::test]
async fn unreachable_reset_keeps_the_conversation() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    drop(server);

    let original = vec![Message::assistant("hello"), Message::user("find pizza")];
    let mut conversation = Conversation::with_messages(original.clone());
    conversation.reset_conversation(&client).await;

    assert_eq!(conversation.messages(), original.as_slice());
}

#[tokio::test]
async fn tools_and_health_are_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tools": [
                {
                    "name": "search_restaurants",
                    "description": "Search for restaurants",
                    "input_schema": { "type": "object" }
                },
                { "name": "get_order_status" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "service": "Zomato MCP API"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let tools = client.list_tools().await.unwrap();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0].name, "search_restaurants");
    assert_eq!(tools[0].description.as_deref(), Some("Search for restaurants"));
    assert_eq!(tools[1].description, None);

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service.as_deref(), Some("Zomato MCP API"));
}
