//! Handler tests for task endpoints.

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use super::*;
use crate::domain::{Error, UserId};
use crate::domain::ports::{FIXTURE_USER_ID, MockTaskCommand};
use crate::inbound::http::login::login;
use crate::inbound::http::test_utils::{MockPorts, login_cookie, test_session_middleware};

async fn delete(tasks: MockTaskCommand, task_id: &str, logged_in: bool) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(MockPorts { tasks, ..MockPorts::default() }.into_state())
            .wrap(test_session_middleware())
            .service(web::scope("/api").service(login).service(delete_task)),
    )
    .await;
    let mut request = test::TestRequest::delete().uri(&format!("/api/tasks/{task_id}"));
    if logged_in {
        request = request.cookie(login_cookie(&app).await);
    }
    let response = test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = test::read_body(response).await;
    (status, serde_json::from_slice(&body).expect("JSON body"))
}

#[actix_web::test]
async fn deletes_task_for_session_user() {
    let task_id = Uuid::from_u128(9);
    let mut tasks = MockTaskCommand::new();
    tasks
        .expect_delete_task()
        .with(eq(DeleteTaskRequest {
            user_id: UserId::new(FIXTURE_USER_ID).expect("fixture id"),
            task_id,
        }))
        .times(1)
        .returning(|_| Ok(()));

    let (status, body) = delete(tasks, &task_id.to_string(), true).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Task deleted successfully"})
    );
}

#[actix_web::test]
async fn anonymous_delete_is_unauthorised() {
    let mut tasks = MockTaskCommand::new();
    tasks.expect_delete_task().never();

    let (status, body) = delete(tasks, "not-a-uuid", false).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn malformed_task_id_is_rejected() {
    let mut tasks = MockTaskCommand::new();
    tasks.expect_delete_task().never();

    let (status, body) = delete(tasks, "not-a-uuid", true).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "taskId");
}

#[rstest]
#[case(Error::not_found("Task not found"), StatusCode::NOT_FOUND)]
#[case(Error::forbidden("Access denied"), StatusCode::FORBIDDEN)]
#[actix_web::test]
async fn service_errors_map_to_status(#[case] error: Error, #[case] expected: StatusCode) {
    let mut tasks = MockTaskCommand::new();
    let message = error.message().to_owned();
    tasks
        .expect_delete_task()
        .times(1)
        .returning(move |_| Err(error.clone()));

    let (status, body) = delete(tasks, &Uuid::from_u128(1).to_string(), true).await;

    assert_eq!(status, expected);
    assert_eq!(body["error"], message);
}
