//! Handler tests for the task agent endpoints.

use actix_web::body::to_bytes;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use futures_util::{StreamExt, stream};
use mockall::predicate::eq;
use serde_json::{Value, json};
use uuid::Uuid;

use super::*;
use crate::domain::ports::{AgentReplyStream, FIXTURE_USER_ID};
use crate::domain::{BranchSuggestion, Error, UserId};
use crate::inbound::http::login::login;
use crate::inbound::http::test_utils::{MockPorts, login_cookie, test_session_middleware};

fn fixture_user() -> UserId {
    UserId::new(FIXTURE_USER_ID).expect("fixture id")
}

fn task_id() -> Uuid {
    Uuid::from_u128(77)
}

async fn send(ports: MockPorts, uri: &str, payload: Value) -> actix_web::dev::ServiceResponse {
    let app = test::init_service(
        App::new()
            .app_data(ports.into_state())
            .wrap(test_session_middleware())
            .service(
                web::scope("/api")
                    .service(login)
                    .service(suggest_branch)
                    .service(chat),
            ),
    )
    .await;
    let cookie = login_cookie(&app).await;
    test::call_service(
        &app,
        test::TestRequest::post()
            .uri(uri)
            .cookie(cookie)
            .set_json(payload)
            .to_request(),
    )
    .await
}

fn reply(chunks: Vec<Result<&'static str, Error>>) -> AgentReplyStream {
    stream::iter(chunks.into_iter().map(|chunk| chunk.map(str::to_owned))).boxed()
}

#[actix_web::test]
async fn branch_suggestion_is_wrapped_in_envelope() {
    let mut ports = MockPorts::default();
    ports
        .agent
        .expect_suggest_branch()
        .with(eq(SuggestBranchRequest {
            user_id: fixture_user(),
            task_id: task_id(),
        }))
        .times(1)
        .returning(|_| {
            Ok(BranchSuggestion {
                commit_message: "feat: add login".into(),
                branch_name: "feature/add-login".into(),
            })
        });

    let response = send(ports, "/api/agent/branch", json!({"taskId": task_id()})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(
        body,
        json!({
            "success": true,
            "data": {"commit_message": "feat: add login", "branch_name": "feature/add-login"}
        })
    );
}

#[actix_web::test]
async fn branch_requires_task_id() {
    let mut ports = MockPorts::default();
    ports.agent.expect_suggest_branch().never();

    let response = send(ports, "/api/agent/branch", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "Missing required field: taskId");
}

#[actix_web::test]
async fn empty_history_is_a_client_error() {
    let mut ports = MockPorts::default();
    ports.agent.expect_suggest_branch().times(1).returning(|_| {
        Err(Error::invalid_request(
            "No chat history available for this task",
        ))
    });

    let response = send(ports, "/api/agent/branch", json!({"taskId": task_id()})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn chat_streams_reply_as_plain_text() {
    let mut ports = MockPorts::default();
    ports
        .agent
        .expect_chat()
        .with(eq(AgentChatRequest {
            user_id: fixture_user(),
            task_id: task_id(),
            message: "How do I start?".into(),
        }))
        .times(1)
        .returning(|_| Ok(reply(vec![Ok("Run "), Ok("cargo "), Ok("new.")])));

    let response = send(
        ports,
        "/api/agent",
        json!({"taskId": task_id(), "message": "How do I start?"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some(STREAM_CONTENT_TYPE)
    );
    assert_eq!(test::read_body(response).await, "Run cargo new.");
}

#[actix_web::test]
async fn chat_validation_errors_are_json() {
    let mut ports = MockPorts::default();
    ports
        .agent
        .expect_chat()
        .times(1)
        .returning(|_| Err(Error::invalid_request("Missing required field: message")));

    let response = send(ports, "/api/agent", json!({"taskId": task_id()})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn model_failure_mid_stream_aborts_body() {
    let mut ports = MockPorts::default();
    ports.agent.expect_chat().times(1).returning(|_| {
        Ok(reply(vec![
            Ok("partial"),
            Err(Error::failed("Failed to get agent response")),
        ]))
    });

    let response = send(
        ports,
        "/api/agent",
        json!({"taskId": task_id(), "message": "hi"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(to_bytes(response.into_body()).await.is_err());
}
