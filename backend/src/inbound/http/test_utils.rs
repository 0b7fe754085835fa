//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web};

use crate::domain::ports::{
    FixtureLoginService, MockAgentCommand, MockPoolCommand, MockTaskCommand,
    MockWorkspaceLogoCommand, MockWorkspaceLogoQuery,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Session middleware with a fresh key, cookie `session`, and no `Secure` flag.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Log in with the fixture account and return the session cookie.
pub async fn login_cookie<S, B>(app: &S) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(serde_json::json!({"username": "admin", "password": "password"}))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success(), "fixture login succeeds");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Mocked driving ports; set expectations on the field a test exercises.
#[derive(Default)]
pub struct MockPorts {
    pub tasks: MockTaskCommand,
    pub logos: MockWorkspaceLogoCommand,
    pub logo_urls: MockWorkspaceLogoQuery,
    pub pools: MockPoolCommand,
    pub agent: MockAgentCommand,
}

impl MockPorts {
    /// Handler state using the fixture login and these mocks.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            login: Arc::new(FixtureLoginService),
            tasks: Arc::new(self.tasks),
            logos: Arc::new(self.logos),
            logo_urls: Arc::new(self.logo_urls),
            pools: Arc::new(self.pools),
            agent: Arc::new(self.agent),
        }))
    }
}
