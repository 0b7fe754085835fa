//! Request tracing middleware.
//!
//! Every request runs inside a [`TraceId`] scope and a `request` span. The
//! identifier is echoed in the `trace-id` response header and captured by
//! domain errors. A well-formed `trace-id` request header is reused so calls
//! can be correlated across services.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, error, info, info_span};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware factory; wrap the whole app with it.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use hive_backend::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

fn inbound_trace_id(req: &ServiceRequest) -> Option<TraceId> {
    req.headers()
        .get(TRACE_ID_HEADER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = inbound_trace_id(&req).unwrap_or_else(TraceId::generate);
        let span = info_span!(
            "request",
            %trace_id,
            method = %req.method(),
            path = %req.path(),
        );
        let started = Instant::now();
        let fut = self.service.call(req);
        let traced = async move {
            let mut res = fut.await?;
            match HeaderValue::from_str(&trace_id.to_string()) {
                Ok(value) => {
                    res.response_mut()
                        .headers_mut()
                        .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                }
                Err(error) => error!(%error, "failed to encode trace identifier header"),
            }
            info!(
                status = res.status().as_u16(),
                elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "request completed"
            );
            Ok(res)
        };
        Box::pin(TraceId::scope(trace_id, traced.instrument(span)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    async fn echo_current() -> HttpResponse {
        HttpResponse::Ok().body(
            TraceId::current()
                .map(|id| id.to_string())
                .unwrap_or_default(),
        )
    }

    async fn call(request: test::TestRequest) -> (Option<String>, String) {
        let app = test::init_service(
            App::new()
                .wrap(Trace)
                .route("/", web::get().to(echo_current)),
        )
        .await;
        let response = test::call_service(&app, request.uri("/").to_request()).await;
        let header = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = test::read_body(response).await;
        (header, String::from_utf8_lossy(&body).into_owned())
    }

    #[actix_web::test]
    async fn handler_sees_the_echoed_trace_id() {
        let (header, body) = call(test::TestRequest::get()).await;
        let header = header.expect("trace-id header");
        assert!(header.parse::<TraceId>().is_ok());
        assert_eq!(header, body);
    }

    #[actix_web::test]
    async fn inbound_trace_id_is_reused() {
        let inbound = "7c9e6679-7425-40de-944b-e07fc1f90ae7";
        let (header, body) =
            call(test::TestRequest::get().insert_header((TRACE_ID_HEADER, inbound))).await;
        assert_eq!(header.as_deref(), Some(inbound));
        assert_eq!(body, inbound);
    }

    #[actix_web::test]
    async fn malformed_inbound_trace_id_is_replaced() {
        let (header, _) =
            call(test::TestRequest::get().insert_header((TRACE_ID_HEADER, "not-a-uuid"))).await;
        let header = header.expect("trace-id header");
        assert_ne!(header, "not-a-uuid");
        assert!(header.parse::<TraceId>().is_ok());
    }
}
