//! Development login.
//!
//! ```text
//! POST /api/login {"username":"admin","password":"password"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::{Error, LoginCredentials, LoginValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "password")]
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Authenticate and establish a session cookie.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Blank username or password", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    info!(user_id = %user_id, "session established");
    Ok(HttpResponse::Ok().finish())
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyUsername => ("username", "empty_username"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::inbound::http::test_utils::{MockPorts, test_session_middleware};

    async fn post_login(username: &str, password: &str) -> (StatusCode, bool, Option<Value>) {
        let app = test::init_service(
            App::new()
                .app_data(MockPorts::default().into_state())
                .wrap(test_session_middleware())
                .service(web::scope("/api").service(login)),
        )
        .await;
        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/login")
                .set_json(json!({"username": username, "password": password}))
                .to_request(),
        )
        .await;
        let status = response.status();
        let has_cookie = response
            .response()
            .cookies()
            .any(|cookie| cookie.name() == "session");
        let body = test::read_body(response).await;
        (status, has_cookie, serde_json::from_slice(&body).ok())
    }

    #[actix_web::test]
    async fn valid_credentials_set_session_cookie() {
        let (status, has_cookie, _) = post_login("admin", "password").await;
        assert_eq!(status, StatusCode::OK);
        assert!(has_cookie);
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorised() {
        let (status, has_cookie, body) = post_login("admin", "nope").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(!has_cookie);
        assert_eq!(body.expect("error body")["code"], "unauthorized");
    }

    #[rstest]
    #[case("   ", "password", "username", "empty_username")]
    #[case("admin", "", "password", "empty_password")]
    #[actix_web::test]
    async fn blank_fields_are_rejected(
        #[case] username: &str,
        #[case] password: &str,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let (status, _, body) = post_login(username, password).await;
        let body = body.expect("error body");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], field);
        assert_eq!(body["details"]["code"], code);
    }
}
