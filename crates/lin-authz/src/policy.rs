//! Coarse policies and fine-grained ACL parameters.
//!
//! # Purpose
//! Defines the baseline `(role, class, action)` grants seeded at startup and
//! the per-tenant `(role, org, category, resource, action)` ACL parameter, plus
//! their encoding to and from stored rules.
//!
//! # How it fits
//! The synchronizer writes [`default_policies`] as `p` rules; the ACL manager
//! writes [`ResourceAclParam`] values as `p2` rules and decodes them back when
//! listing.
//!
//! # Key invariants
//! - `to_rule` output always passes [`PolicyType::validate_rule`] for its table
//!   as long as role and resource id are non-empty.
//! - `from_rule(to_rule(x)) == x`.
//!
//! # Examples
//! ```rust
//! use lin_authz::{Action, ResourceAclParam, ResourceCategory, Role};
//!
//! let param = ResourceAclParam::new(Role::admin(), 7, ResourceCategory::Component, "nav-1", Action::Write);
//! assert_eq!(param.to_rule(), vec!["admin", "7", "Component", "nav-1", "write"]);
//! ```
use crate::{Action, AuthzError, AuthzResult, PolicyType, ResourceCategory, ResourceClass, Role};
use serde::{Deserialize, Serialize};

/// Baseline grant: `role` may perform `action` on every resource of `class`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Policy {
    pub role: Role,
    pub class: ResourceClass,
    pub action: Action,
}

impl Policy {
    pub fn new(role: Role, class: ResourceClass, action: Action) -> Self {
        Self {
            role,
            class,
            action,
        }
    }

    /// Encode as a `p` rule.
    pub fn to_rule(&self) -> Vec<String> {
        vec![
            self.role.to_string(),
            self.class.as_str().to_string(),
            self.action.as_str().to_string(),
        ]
    }

    /// Decode a `p` rule.
    ///
    /// # Errors
    /// - [`AuthzError::InvalidRule`] on wrong arity or unknown class.
    /// - [`AuthzError::InvalidAction`] on unknown action.
    pub fn from_rule<S: AsRef<str>>(rule: &[S]) -> AuthzResult<Self> {
        PolicyType::Api.validate_rule(rule)?;
        Ok(Self {
            role: Role::new(rule[0].as_ref()),
            class: rule[1].as_ref().parse()?,
            action: rule[2].as_ref().parse()?,
        })
    }
}

/// The static policy table seeded by the synchronizer.
///
/// Grants are attached to the lowest role that should hold them; inheritance
/// makes them visible to every role above.
pub fn default_policies() -> Vec<Policy> {
    use Action::{Read, Write};
    use ResourceClass::*;

    let admin = Role::admin;
    let editor = Role::editor;
    let viewer = Role::viewer;

    vec![
        // Access tiers.
        Policy::new(admin(), AdminAccess, Read),
        Policy::new(admin(), AdminAccess, Write),
        Policy::new(editor(), EditorAccess, Read),
        Policy::new(editor(), EditorAccess, Write),
        Policy::new(viewer(), ViewerAccess, Read),
        // Tenant administration.
        Policy::new(viewer(), Organizations, Read),
        Policy::new(Role::lin(), Organizations, Write),
        Policy::new(viewer(), Teams, Read),
        Policy::new(admin(), Teams, Write),
        Policy::new(viewer(), Users, Read),
        Policy::new(admin(), Users, Write),
        Policy::new(viewer(), Datasources, Read),
        Policy::new(admin(), Datasources, Write),
        // Content.
        Policy::new(viewer(), Dashboards, Read),
        Policy::new(editor(), Dashboards, Write),
        Policy::new(viewer(), Charts, Read),
        Policy::new(editor(), Charts, Write),
        // Navigation and component tree.
        Policy::new(viewer(), Navigation, Read),
        Policy::new(admin(), Navigation, Write),
        Policy::new(viewer(), Components, Read),
        Policy::new(admin(), Components, Write),
        Policy::new(viewer(), DataQuery, Read),
    ]
}

/// One fine-grained ACL row: within tenant `org_id`, `role` may perform
/// `action` on the resource `resource_id` of `category`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceAclParam {
    pub role: Role,
    pub org_id: i64,
    pub category: ResourceCategory,
    pub resource_id: String,
    pub action: Action,
}

impl ResourceAclParam {
    pub fn new(
        role: Role,
        org_id: i64,
        category: ResourceCategory,
        resource_id: impl Into<String>,
        action: Action,
    ) -> Self {
        Self {
            role,
            org_id,
            category,
            resource_id: resource_id.into(),
            action,
        }
    }

    /// Encode as a `p2` rule.
    pub fn to_rule(&self) -> Vec<String> {
        vec![
            self.role.to_string(),
            self.org_id.to_string(),
            self.category.as_str().to_string(),
            self.resource_id.clone(),
            self.action.as_str().to_string(),
        ]
    }

    /// Decode a `p2` rule.
    ///
    /// # Errors
    /// - [`AuthzError::InvalidRule`] on wrong arity or a non-numeric org id.
    /// - [`AuthzError::InvalidCategory`] / [`AuthzError::InvalidAction`] on
    ///   unknown column values.
    pub fn from_rule<S: AsRef<str>>(rule: &[S]) -> AuthzResult<Self> {
        PolicyType::Resource.validate_rule(rule)?;
        let org = rule[1].as_ref();
        let org_id = org
            .parse::<i64>()
            .map_err(|_| AuthzError::InvalidRule(format!("org id is not an integer: {org}")))?;
        Ok(Self {
            role: Role::new(rule[0].as_ref()),
            org_id,
            category: rule[2].as_ref().parse()?,
            resource_id: rule[3].as_ref().to_string(),
            action: rule[4].as_ref().parse()?,
        })
    }

    /// Filter values selecting every row of this param's tenant and category,
    /// starting at column `v1`.
    pub fn scope_filter(org_id: i64, category: ResourceCategory) -> Vec<String> {
        vec![org_id.to_string(), category.as_str().to_string()]
    }

    pub fn in_scope(&self, org_id: i64, category: ResourceCategory) -> bool {
        self.org_id == org_id && self.category == category
    }
}
