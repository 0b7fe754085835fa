//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use hive_backend::Trace;
#[cfg(debug_assertions)]
use hive_backend::doc::ApiDoc;
use hive_backend::inbound::http::agent::{chat, suggest_branch};
use hive_backend::inbound::http::health::{HealthState, live, ready};
use hive_backend::inbound::http::login::login;
use hive_backend::inbound::http::pool_manager::{claim_pod, create_pool};
use hive_backend::inbound::http::state::HttpState;
use hive_backend::inbound::http::tasks::delete_task;
use hive_backend::inbound::http::validation::json_config;
use hive_backend::inbound::http::workspace_images::{
    confirm_logo_upload, delete_logo, get_logo, request_logo_upload,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Lifetime of the session cookie.
const SESSION_TTL_HOURS: i64 = 2;

#[derive(Clone)]
pub(crate) struct AppDependencies {
    pub(crate) health_state: web::Data<HealthState>,
    pub(crate) http_state: web::Data<HttpState>,
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
}

pub(crate) fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default()
                .session_ttl(actix_web::cookie::time::Duration::hours(SESSION_TTL_HOURS)),
        )
        .build();

    let api = web::scope("/api")
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
        .service(chat);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Readiness is flipped once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        http_state,
    } = config;
    let http_state = web::Data::new(http_state);

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?;

    for addr in server.addrs() {
        info!(%addr, "listening");
    }
    let server = server.run();

    health_state.mark_ready();
    Ok(server)
}
