//! Reference chatbot endpoint served behind [`chatgate`].
//!
//! The handler itself is trivial: it picks a greeting for the caller's role.
//! All authentication and input checks happen in the gate layered on the
//! route.

use axum::{Extension, Json, Router, routing::post};
use chatgate::{AuditSink, CredentialStore, GateLayer, RequestContext, Role, TracingAudit};
use serde::{Deserialize, Serialize};

/// Path of the single gated endpoint.
pub const CHATBOT_PATH: &str = "/api/chatbot";

/// Successful reply body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Greeting for each role. Every role has its own message.
pub fn reply_for(role: Role) -> &'static str {
    match role {
        Role::Admin => "Welcome, admin. How can I assist you?",
        Role::Student => "Hello, student. What do you need help with?",
        Role::Teacher => "Hello, teacher. How can I support your class today?",
        Role::Staff => "Hello, staff member. What can I help you with today?",
    }
}

pub async fn chatbot(Extension(ctx): Extension<RequestContext>) -> Json<ChatReply> {
    tracing::debug!(role = %ctx.role(), "dispatching chatbot reply");
    Json(ChatReply {
        response: reply_for(ctx.role()).to_string(),
    })
}

/// Router with the gated chatbot endpoint, auditing through `tracing`.
pub fn app<C>(store: C) -> Router
where
    C: CredentialStore,
{
    app_with_audit(store, TracingAudit)
}

/// Router with the gated chatbot endpoint and a custom audit sink.
pub fn app_with_audit<C, A>(store: C, audit: A) -> Router
where
    C: CredentialStore,
    A: AuditSink,
{
    let gate = GateLayer::new(store).with_audit(audit);
    // route_layer keeps other methods on axum's 405 fallback, outside the gate.
    Router::new().route(CHATBOT_PATH, post(chatbot).route_layer(gate))
}

#[cfg(test)]
mod tests {
    use crate::{CHATBOT_PATH, ChatReply, app, app_with_audit, reply_for};
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chatgate::{AuditEntry, AuditSink, Role, RoleRegistry};
    use serde_json::{Value, json};
    use std::{
        collections::HashSet,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };
    use tower::ServiceExt;

    #[derive(Clone, Default)]
    struct CountingAudit(Arc<AtomicUsize>);

    impl AuditSink for CountingAudit {
        fn record(&self, _entry: &AuditEntry<'_>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn post(app: Router, body: Value) -> (StatusCode, Value) {
        let req = Request::post(CHATBOT_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn replies_are_distinct_per_role() {
        let replies: HashSet<_> = Role::ALL.into_iter().map(reply_for).collect();
        assert_eq!(replies.len(), Role::ALL.len());
    }

    #[tokio::test]
    async fn admin_gets_admin_reply() {
        let (status, body) = post(
            app(RoleRegistry::reference()),
            json!({ "auth_token": "admin_token", "prompt": "How do I reset my password?" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let reply: ChatReply = serde_json::from_value(body).unwrap();
        assert_eq!(reply.response, reply_for(Role::Admin));
    }

    #[tokio::test]
    async fn every_role_is_served() {
        for role in Role::ALL {
            let (status, body) = post(
                app(RoleRegistry::reference()),
                json!({ "auth_token": format!("{role}_token"), "prompt": "hi" }),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({ "response": reply_for(role) }));
        }
    }

    #[tokio::test]
    async fn bad_token_is_unauthorized() {
        let (status, body) = post(
            app(RoleRegistry::reference()),
            json!({ "auth_token": "bad_token", "prompt": "hi" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Unauthorized access" }));
    }

    #[tokio::test]
    async fn script_prompt_is_rejected() {
        let (status, body) = post(
            app(RoleRegistry::reference()),
            json!({ "auth_token": "student_token", "prompt": "What's <script>?" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid input detected" }));
    }

    #[tokio::test]
    async fn one_audit_entry_per_request() {
        let audit = CountingAudit::default();
        let bodies = [
            json!({ "auth_token": "admin_token", "prompt": "hi" }),
            json!({ "auth_token": "bad_token", "prompt": "hi" }),
            json!({ "auth_token": "staff_token", "prompt": "a;b" }),
            json!({}),
        ];
        for (n, body) in bodies.into_iter().enumerate() {
            post(app_with_audit(RoleRegistry::reference(), audit.clone()), body).await;
            assert_eq!(audit.0.load(Ordering::SeqCst), n + 1);
        }
    }

    #[tokio::test]
    async fn get_is_not_routed_through_the_gate() {
        let audit = CountingAudit::default();
        let req = Request::get(CHATBOT_PATH).body(Body::empty()).unwrap();
        let response = app_with_audit(RoleRegistry::reference(), audit.clone())
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(audit.0.load(Ordering::SeqCst), 0);
    }
}
