//! The authentication and validation gate.
//!
//! [`Gate::evaluate`] decides a single request from its [`RawRequest`] view.
//! [`GateLayer`] wraps any tower service with that decision: rejected
//! requests never reach the inner service, accepted ones reach it exactly
//! once with a [`RequestContext`] in their extensions.
//!
//! ```rust,ignore
//! use chatgate::{GateLayer, RequestContext, RoleRegistry};
//!
//! async fn chatbot(Extension(ctx): Extension<RequestContext>) -> String {
//!     format!("hello, {}", ctx.role())
//! }
//!
//! let app = axum::Router::new().route(
//!     "/api/chatbot",
//!     axum::routing::post(chatbot).route_layer(GateLayer::new(RoleRegistry::reference())),
//! );
//! ```

use crate::{
    audit::{AuditEntry, AuditSink, TracingAudit},
    context::RequestContext,
    error::GateError,
    registry::CredentialStore,
    request::{JsonBody, RawRequest},
    validate::validate_prompt,
};
use axum::{
    body::{Body, Bytes},
    response::IntoResponse,
};
use futures::future::BoxFuture;
use http::{Request, Response};
use std::task::{Context, Poll};

/// Credential store plus audit sink: everything needed to decide a request.
#[derive(Clone, Debug)]
pub struct Gate<C, A = TracingAudit> {
    store: C,
    audit: A,
}

impl<C> Gate<C> {
    pub fn new(store: C) -> Self {
        Self {
            store,
            audit: TracingAudit,
        }
    }
}

impl<C, A> Gate<C, A> {
    /// Replace the audit sink.
    pub fn with_audit<B>(self, audit: B) -> Gate<C, B> {
        Gate {
            store: self.store,
            audit,
        }
    }
}

impl<C, A> Gate<C, A>
where
    C: CredentialStore,
    A: AuditSink,
{
    /// Authenticate the caller and validate the prompt.
    ///
    /// Short-circuits on the first failure. Records exactly one audit entry
    /// whatever the outcome, before returning.
    pub fn evaluate<R>(&self, request: &R) -> Result<RequestContext, GateError>
    where
        R: RawRequest + ?Sized,
    {
        let role = match request.credential() {
            "" => None,
            credential => self.store.resolve(credential),
        };
        let Some(role) = role else {
            self.audit.record(&AuditEntry::Unauthorized);
            return Err(GateError::Unauthorized);
        };

        let prompt = request.prompt();
        if !validate_prompt(prompt) {
            self.audit.record(&AuditEntry::InvalidInput { prompt });
            return Err(GateError::InvalidInput);
        }

        self.audit.record(&AuditEntry::Accepted { role, prompt });
        Ok(RequestContext::authenticated(role))
    }
}

/// Tower [`Layer`](tower::Layer) that applies [`GateService`].
#[derive(Clone, Debug)]
pub struct GateLayer<C, A = TracingAudit> {
    gate: Gate<C, A>,
}

impl<C> GateLayer<C> {
    pub fn new(store: C) -> Self {
        Self {
            gate: Gate::new(store),
        }
    }
}

impl<C, A> GateLayer<C, A> {
    /// Send audit entries to `audit` instead of `tracing`.
    pub fn with_audit<B>(self, audit: B) -> GateLayer<C, B> {
        GateLayer {
            gate: self.gate.with_audit(audit),
        }
    }
}

impl<C, A> From<Gate<C, A>> for GateLayer<C, A> {
    fn from(gate: Gate<C, A>) -> Self {
        Self { gate }
    }
}

impl<C, A, S> tower::Layer<S> for GateLayer<C, A>
where
    C: Clone,
    A: Clone,
{
    type Service = GateService<C, A, S>;

    fn layer(&self, inner: S) -> Self::Service {
        GateService {
            gate: self.gate.clone(),
            inner,
        }
    }
}

/// Tower service that gates requests before forwarding them.
#[derive(Clone, Debug)]
pub struct GateService<C, A, S> {
    gate: Gate<C, A>,
    inner: S,
}

impl<C, A, S> tower::Service<Request<Body>> for GateService<C, A, S>
where
    C: CredentialStore,
    A: AuditSink,
    S: tower::Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let gate = self.gate.clone();
        let mut inner = self.inner.clone();
        // swap to ensure poll_ready state is preserved
        std::mem::swap(&mut self.inner, &mut inner);

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();

            // An unreadable body is just another malformed body.
            let bytes = axum::body::to_bytes(body, usize::MAX)
                .await
                .unwrap_or_else(|err| {
                    tracing::debug!(%err, "failed to read request body");
                    Bytes::new()
                });
            let raw = JsonBody::from_headers(&parts.headers, &bytes);

            match gate.evaluate(&raw) {
                Ok(context) => {
                    parts.extensions.insert(context);
                    inner.call(Request::from_parts(parts, Body::from(bytes))).await
                }
                Err(err) => Ok(err.into_response()),
            }
        })
    }
}
