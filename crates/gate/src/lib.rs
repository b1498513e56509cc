//! # chatgate
//!
//! Authentication and input validation middleware for a single prompt
//! endpoint, built as a [tower](https://docs.rs/tower) layer for
//! [axum](https://docs.rs/axum).
//!
//! For each request the gate:
//!
//! 1. reads `auth_token` and `prompt` from a JSON body (both empty if the
//!    body is missing or not a JSON object),
//! 2. resolves the token to a [`Role`] through a [`CredentialStore`], or
//!    rejects with `401 {"error": "Unauthorized access"}`,
//! 3. checks the prompt against an allow-list, or rejects with
//!    `400 {"error": "Invalid input detected"}`,
//! 4. records one audit entry for the decision,
//! 5. forwards the request with a [`RequestContext`] extension to the inner
//!    service and returns its response unchanged.
//!
//! ```rust,ignore
//! use axum::Extension;
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
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub use axum;

pub mod audit;
pub mod context;
pub mod error;
pub mod gate;
pub mod registry;
pub mod request;
pub mod validate;

pub use audit::{AuditEntry, AuditSink, TracingAudit};
pub use context::RequestContext;
pub use error::GateError;
pub use gate::{Gate, GateLayer, GateService};
pub use registry::{CredentialStore, RegistryError, Role, RoleRegistry};
pub use request::{JsonBody, RawRequest};
pub use validate::validate_prompt;
