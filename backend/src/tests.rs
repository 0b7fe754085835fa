//! Tests for the backend application bootstrap, covering readiness
//! signalling and route wiring.

use actix_web::cookie::{Key, SameSite};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use uuid::Uuid;

use hive_backend::domain::TRACE_ID_HEADER;
use hive_backend::inbound::http::health::HealthState;
use hive_backend::inbound::http::state::HttpState;
use hive_backend::test_support::TestHarness;

use crate::server::{AppDependencies, ServerConfig, build_app, create_server};

#[fixture]
fn health_state() -> web::Data<HealthState> {
    web::Data::new(HealthState::new())
}

#[fixture]
fn session_key() -> Key {
    Key::generate()
}

#[fixture]
fn http_state() -> HttpState {
    TestHarness::new().http_state()
}

fn dependencies(health_state: web::Data<HealthState>, http_state: HttpState) -> AppDependencies {
    AppDependencies {
        health_state,
        http_state: web::Data::new(http_state),
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    }
}

#[rstest]
#[actix_rt::test]
async fn create_server_marks_ready(
    health_state: web::Data<HealthState>,
    session_key: Key,
    http_state: HttpState,
) {
    assert!(!health_state.is_ready(), "state should start unready");

    let config = ServerConfig::new(
        session_key,
        false,
        SameSite::Lax,
        "127.0.0.1:0".parse().expect("socket address"),
        http_state,
    );
    assert_eq!(config.bind_addr().port(), 0);

    let _server = create_server(health_state.clone(), config).expect("server should build");

    assert!(
        health_state.is_ready(),
        "server creation should mark readiness"
    );
}

#[rstest]
#[actix_rt::test]
async fn health_probes_sit_outside_the_api_scope(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
) {
    let app = test::init_service(build_app(dependencies(health_state.clone(), http_state))).await;

    let response =
        test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request()).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    health_state.mark_ready();
    let response =
        test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[rstest]
#[actix_rt::test]
async fn api_routes_require_a_session_and_carry_trace_ids(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
) {
    let app = test::init_service(build_app(dependencies(health_state, http_state))).await;

    let request = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", Uuid::from_u128(1)))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(TRACE_ID_HEADER));
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_rt::test]
async fn login_session_reaches_mounted_handlers(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
) {
    let app = test::init_service(build_app(dependencies(health_state, http_state))).await;

    let login = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({"username": "admin", "password": "password"}))
        .to_request();
    let response = test::call_service(&app, login).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned();

    let request = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", Uuid::from_u128(1)))
        .cookie(cookie)
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[cfg(debug_assertions)]
#[rstest]
#[actix_rt::test]
async fn debug_builds_serve_the_openapi_document(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
) {
    let app = test::init_service(build_app(dependencies(health_state, http_state))).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get().uri("/api-docs/openapi.json").to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let doc: Value = test::read_body_json(response).await;
    assert!(doc["paths"]["/api/tasks/{taskId}"].is_object());
}
