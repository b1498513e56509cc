//! Credential to role resolution.
//!
//! The gate never decides who a caller is on its own: it asks a
//! [`CredentialStore`]. [`RoleRegistry`] is the static, read-only store used
//! by the reference deployment. It is built once before serving and shared
//! by every request without locking.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, path::Path, str::FromStr, sync::Arc};
use thiserror::Error;

/// Caller privilege, drawn from a closed set.
///
/// There is no anonymous role: a credential that does not map to one of
/// these is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Staff,
    Admin,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Role; 4] = [Role::Student, Role::Teacher, Role::Staff, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role name outside the closed set.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Lookup contract the gate depends on.
///
/// Implementations must match credentials exactly (case-sensitive) and must
/// not change their answers while requests are being served.
pub trait CredentialStore: Clone + Send + Sync + 'static {
    /// Resolve a credential to its role, or `None` if it is not recognised.
    fn resolve(&self, credential: &str) -> Option<Role>;
}

/// Errors from loading a [`RoleRegistry`].
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read registry: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid registry document: {0}")]
    Json(#[from] serde_json::Error),

    /// An empty credential can never authenticate, so it is refused up front.
    #[error("registry contains an empty credential")]
    EmptyCredential,
}

/// Static credential to role mapping.
///
/// Cloning is cheap; all clones share the same immutable table.
#[derive(Clone, Debug, Default)]
pub struct RoleRegistry {
    roles: Arc<HashMap<String, Role>>,
}

impl RoleRegistry {
    /// Build a registry from `(credential, role)` pairs. Later duplicates win.
    pub fn from_entries<I, K>(entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (K, Role)>,
        K: Into<String>,
    {
        let mut roles = HashMap::new();
        for (credential, role) in entries {
            let credential = credential.into();
            if credential.is_empty() {
                return Err(RegistryError::EmptyCredential);
            }
            roles.insert(credential, role);
        }
        Ok(Self {
            roles: Arc::new(roles),
        })
    }

    /// The reference mapping: `<role>_token` for each role.
    pub fn reference() -> Self {
        let roles = Role::ALL
            .into_iter()
            .map(|role| (format!("{role}_token"), role))
            .collect();
        Self {
            roles: Arc::new(roles),
        }
    }

    /// Parse a JSON object of `"credential": "role"` pairs.
    pub fn from_json(document: &str) -> Result<Self, RegistryError> {
        let roles: HashMap<String, Role> = serde_json::from_str(document)?;
        Self::from_entries(roles)
    }

    /// Read and parse a JSON registry file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let document = std::fs::read_to_string(path)?;
        Self::from_json(&document)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Iterate over the roles that at least one credential maps to.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL
            .into_iter()
            .filter(|role| self.roles.values().any(|r| r == role))
    }
}

impl CredentialStore for RoleRegistry {
    fn resolve(&self, credential: &str) -> Option<Role> {
        self.roles.get(credential).copied()
    }
}
