//! Per-request authenticated context.

use crate::registry::Role;
use serde::Serialize;

/// Resolved identity handed to the downstream handler.
///
/// The gate only builds one after authentication succeeded, so a
/// `RequestContext` is always authenticated. It travels in the request's
/// extensions and is dropped with the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    role: Role,
    #[serde(rename = "isAuthenticated")]
    authenticated: bool,
}

impl RequestContext {
    pub(crate) fn authenticated(role: Role) -> Self {
        Self {
            role,
            authenticated: true,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
