//! Role identifiers.
//!
//! # Purpose
//! Wraps role names so they cannot be confused with resource ids, org ids,
//! or class names when tuples are assembled.
//!
//! # Key invariants
//! - Roles are opaque; two roles are equal iff their strings are equal.
//! - `Display` and `as_str` return the stored value untouched.
//!
//! # Examples
//! ```rust
//! use lin_authz::Role;
//!
//! let role = Role::admin();
//! assert_eq!(role.as_str(), "admin");
//! assert_eq!(Role::new("admin"), role);
//! ```
use serde::{Deserialize, Serialize};

/// Well-known role names of the built-in hierarchy.
pub mod roles {
    pub const LIN: &str = "lin";
    pub const ADMIN: &str = "admin";
    pub const EDITOR: &str = "editor";
    pub const VIEWER: &str = "viewer";
    pub const ANONYMOUS: &str = "anonymous";
}

/// Named permission level.
///
/// # Example
/// ```rust
/// use lin_authz::Role;
///
/// let role = Role::new("auditor");
/// assert_eq!(role.to_string(), "auditor");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn lin() -> Self {
        Self::new(roles::LIN)
    }

    pub fn admin() -> Self {
        Self::new(roles::ADMIN)
    }

    pub fn editor() -> Self {
        Self::new(roles::EDITOR)
    }

    pub fn viewer() -> Self {
        Self::new(roles::VIEWER)
    }

    pub fn anonymous() -> Self {
        Self::new(roles::ANONYMOUS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
