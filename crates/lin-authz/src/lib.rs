//! Lin authorization vocabulary shared by the access-control engine.
//!
//! # Purpose
//! Centralizes the role hierarchy, the static policy table, the resource
//! identifiers, and the tuple schema the engine stores and evaluates.
//!
//! # How it fits
//! `accessd` seeds [`RoleGraph`] edges and [`default_policies`] into its
//! policy store, encodes [`ResourceAclParam`] values as fine-grained rows, and
//! evaluates requests against the casbin models defined here.
//!
//! # Key invariants
//! - The role graph is acyclic and validated at construction.
//! - Stored forms (`as_str`, `to_rule`) are stable; renaming a variant's string
//!   orphans existing rows.
//!
//! # Examples
//! ```rust
//! use lin_authz::{Action, Policy, ResourceClass, Role, RoleGraph};
//!
//! let graph = RoleGraph::reference();
//! assert_eq!(graph.extends_of(&Role::lin()), Some(&Role::admin()));
//!
//! let policy = Policy::new(Role::admin(), ResourceClass::AdminAccess, Action::Write);
//! assert_eq!(policy.to_rule(), vec!["admin", "AdminAccessResource", "write"]);
//! ```
//!
//! # Common pitfalls
//! - Checking an unknown role is an error, not a deny.
//! - Org ids are stored in decimal; never pad or reformat them.

mod action;
mod casbin_model;
mod errors;
mod policy;
mod resource;
mod role;
mod role_graph;
mod rule;

pub use action::Action;
pub use casbin_model::{api_model, resource_model};
pub use errors::{AuthzError, AuthzResult};
pub use policy::{Policy, ResourceAclParam, default_policies};
pub use resource::{ResourceCategory, ResourceClass};
pub use role::{Role, roles};
pub use role_graph::{RoleDefinition, RoleGraph};
pub use rule::{PolicyType, filter_is_constrained, filter_matches};
