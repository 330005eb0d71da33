//! HTTP middleware that emits one wide event per request.
//!
//! [`CanonicalLogLayer`] wraps any `tower` service over `http` requests and
//! responses, so it composes with `axum::Router::layer` or a bare hyper
//! stack. Per request it initializes a [`LogContext`], stores a clone in the
//! request extensions for handlers to annotate, records the standard
//! `http.request.*` / `http.response.*` fields, and hands the rendered JSON
//! to the sink exactly once after the inner service resolves.
//!
//! Handlers reach the context either through `Request::extensions` or, under
//! axum, by taking `LogContext` as an extractor argument:
//!
//! ```
//! use axum::{Router, routing::get};
//! use widelog::{CanonicalLogLayer, LogContext};
//!
//! async fn handler(ctx: LogContext) -> &'static str {
//!     ctx.set_string("user.id", "u-123");
//!     "OK"
//! }
//!
//! let app: Router = Router::new()
//!     .route("/", get(handler))
//!     .layer(CanonicalLogLayer::new(|line| println!("{line}")));
//! ```

use std::{
    convert::Infallible,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Instant,
};

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, Request, Response, header::CONTENT_LENGTH, request::Parts},
};
use tower::{Layer, Service};

use crate::context::LogContext;

/// Callback receiving the rendered wide event, once per request.
pub type Sink = Arc<dyn Fn(String) + Send + Sync>;

/// Layer producing [`CanonicalLog`] middleware around an inner service.
#[derive(Clone)]
pub struct CanonicalLogLayer {
    sink: Sink,
}

impl CanonicalLogLayer {
    /// Creates a layer that emits each request's wide event to `sink`.
    pub fn new(sink: impl Fn(String) + Send + Sync + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }
}

impl<S> Layer<S> for CanonicalLogLayer {
    type Service = CanonicalLog<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CanonicalLog {
            inner,
            sink: Arc::clone(&self.sink),
        }
    }
}

/// Middleware service that accumulates and emits one wide event per request.
#[derive(Clone)]
pub struct CanonicalLog<S> {
    inner: S,
    sink: Sink,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CanonicalLog<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let ctx = LogContext::new().init();
        ctx.set_string("http.request.method", req.method().as_str());
        ctx.set_string("http.request.path", req.uri().path());
        req.extensions_mut().insert(ctx.clone());

        let request_bytes = content_length(req.headers());
        let sink = Arc::clone(&self.sink);
        let start = Instant::now();

        // Readiness was established on `self`, so the original service must
        // take the call; the fresh clone stays behind for the next one.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let response = inner.call(req).await?;

            ctx.set_int(
                "http.response.duration_ms",
                start.elapsed().as_millis() as i64,
            );
            ctx.set_int("http.request.body_bytes", request_bytes);
            ctx.set_int("http.response.body_bytes", content_length(response.headers()));
            ctx.set_int(
                "http.response.status_code",
                i64::from(response.status().as_u16()),
            );
            sink(ctx.to_json_string());

            Ok(response)
        })
    }
}

/// Reads a declared `Content-Length`, treating absent or malformed values
/// as zero. Body sizes come from the declared header, not from counting
/// streamed bytes.
fn content_length(headers: &HeaderMap) -> i64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// Axum extractor for the request's logging context.
///
/// Never rejects: if the layer is not installed the handler receives an
/// inert, uninitialized context and its annotations become no-ops.
impl<S> FromRequestParts<S> for LogContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<LogContext>()
            .cloned()
            .unwrap_or_default())
    }
}
