//! OpenAPI documentation.
//!
//! [`ApiDoc`] registers every HTTP endpoint, the error envelope schemas, and
//! the session cookie security scheme. Swagger UI serves it in debug builds;
//! `cargo run --bin openapi-dump` prints it for external tooling.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private session cookie issued by POST /api/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Hive backend API",
        description = "Tasks, workspace logos, pool provisioning, and the task agent."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::login::login,
        crate::inbound::http::tasks::delete_task,
        crate::inbound::http::workspace_images::request_logo_upload,
        crate::inbound::http::workspace_images::confirm_logo_upload,
        crate::inbound::http::workspace_images::get_logo,
        crate::inbound::http::workspace_images::delete_logo,
        crate::inbound::http::pool_manager::create_pool,
        crate::inbound::http::pool_manager::claim_pod,
        crate::inbound::http::agent::suggest_branch,
        crate::inbound::http::agent::chat,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "auth", description = "Session login"),
        (name = "tasks", description = "Task lifecycle"),
        (name = "workspaces", description = "Workspace logo storage"),
        (name = "pool-manager", description = "Pool provisioning and pod claims"),
        (name = "agent", description = "Task agent chat and branch suggestions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
