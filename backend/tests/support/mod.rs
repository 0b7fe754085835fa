//! Shared helpers for end-to-end handler tests.
//!
//! Integration tests compile as separate crates, so each one pulls this module
//! in with `mod support;` and uses the subset it needs.
#![allow(dead_code)]

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::HeaderMap;
use actix_web::{App, test, web};
use serde_json::{Value, json};
use uuid::Uuid;

use hive_backend::Trace;
use hive_backend::domain::ports::FIXTURE_USER_ID;
use hive_backend::domain::{Task, UserId, Workspace, WorkspaceRole};
use hive_backend::inbound::http::agent::{chat, suggest_branch};
use hive_backend::inbound::http::login::login;
use hive_backend::inbound::http::pool_manager::{claim_pod, create_pool};
use hive_backend::inbound::http::tasks::delete_task;
use hive_backend::inbound::http::validation::json_config;
use hive_backend::inbound::http::workspace_images::{
    confirm_logo_upload, delete_logo, get_logo, request_logo_upload,
};
use hive_backend::test_support::{TestHarness, workspace};

/// The account `POST /api/login` signs in as.
pub fn session_user() -> UserId {
    UserId::new(FIXTURE_USER_ID).expect("fixture user id")
}

/// API routes as mounted by the server, backed by `harness`.
pub async fn init_app(
    harness: &TestHarness,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    test::init_service(
        App::new()
            .app_data(web::Data::new(harness.http_state()))
            .wrap(Trace)
            .service(
                web::scope("/api")
                    .wrap(session)
                    .app_data(json_config())
                    .service(login)
                    .service(delete_task)
                    .service(request_logo_upload)
                    .service(confirm_logo_upload)
                    .service(get_logo)
                    .service(delete_logo)
                    .service(create_pool)
                    .service(claim_pod)
                    .service(suggest_branch)
                    .service(chat),
            ),
    )
    .await
}

/// Sign in with the fixture account and return the session cookie.
pub async fn login_cookie<S, B>(app: &S) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({"username": "admin", "password": "password"}))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "fixture login");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

/// Status, headers, and raw body of a response.
pub struct Captured {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: web::Bytes,
}

impl Captured {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("UTF-8 body")
    }
}

/// Send `request`, attaching `cookie` when given.
pub async fn send<S, B>(
    app: &S,
    request: test::TestRequest,
    cookie: Option<&Cookie<'static>>,
) -> Captured
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = match cookie {
        Some(cookie) => request.cookie(cookie.clone()),
        None => request,
    };
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status();
    let headers = response.headers().clone();
    let body = test::read_body(response).await;
    Captured {
        status,
        headers,
        body,
    }
}

/// Workspace owned by the session user, stored in the harness.
pub fn owned_workspace(harness: &TestHarness, slug: &str) -> Workspace {
    let workspace = workspace(slug, &session_user());
    harness.store.insert_workspace(workspace.clone());
    workspace
}

/// Workspace owned by someone else where the session user holds `role`.
pub fn shared_workspace(
    harness: &TestHarness,
    slug: &str,
    role: Option<WorkspaceRole>,
) -> Workspace {
    let workspace = workspace(slug, &hive_backend::test_support::user());
    harness.store.insert_workspace(workspace.clone());
    if let Some(role) = role {
        harness
            .store
            .add_member(workspace.id, &session_user(), role);
    }
    workspace
}

/// Active task stored under `workspace`.
pub fn task_in(harness: &TestHarness, workspace: &Workspace) -> Task {
    let task = Task {
        id: Uuid::new_v4(),
        workspace_id: workspace.id,
        title: "Wire up login".to_owned(),
        status: "TODO".to_owned(),
        deleted: false,
        deleted_at: None,
    };
    harness.store.insert_task(task.clone());
    task
}
