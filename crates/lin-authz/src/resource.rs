//! Resource identifiers for coarse and fine-grained checks.
//!
//! # Purpose
//! Names the resource classes used by API-level checks and the resource
//! categories that carry per-instance ACL rows.
//!
//! # Key invariants
//! - `as_str` values are the stored form and must stay stable.
//! - Classes are not subdivided by instance; categories always are.
//!
//! # Examples
//! ```rust
//! use lin_authz::{ResourceCategory, ResourceClass};
//!
//! assert_eq!(ResourceClass::AdminAccess.as_str(), "AdminAccessResource");
//! assert_eq!(ResourceCategory::Component.to_string(), "Component");
//! ```
use crate::AuthzError;
use serde::{Deserialize, Serialize};

/// Class-level resource used by API authorization.
///
/// The three access tiers gate whole areas of the product; the remaining
/// variants map one-to-one onto API resource families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceClass {
    AdminAccess,
    EditorAccess,
    ViewerAccess,
    Organizations,
    Teams,
    Users,
    Datasources,
    Dashboards,
    Charts,
    Navigation,
    Components,
    DataQuery,
}

impl ResourceClass {
    pub const ALL: [ResourceClass; 12] = [
        ResourceClass::AdminAccess,
        ResourceClass::EditorAccess,
        ResourceClass::ViewerAccess,
        ResourceClass::Organizations,
        ResourceClass::Teams,
        ResourceClass::Users,
        ResourceClass::Datasources,
        ResourceClass::Dashboards,
        ResourceClass::Charts,
        ResourceClass::Navigation,
        ResourceClass::Components,
        ResourceClass::DataQuery,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceClass::AdminAccess => "AdminAccessResource",
            ResourceClass::EditorAccess => "EditorAccessResource",
            ResourceClass::ViewerAccess => "ViewerAccessResource",
            ResourceClass::Organizations => "OrgResource",
            ResourceClass::Teams => "TeamResource",
            ResourceClass::Users => "UserResource",
            ResourceClass::Datasources => "DatasourceResource",
            ResourceClass::Dashboards => "DashboardResource",
            ResourceClass::Charts => "ChartResource",
            ResourceClass::Navigation => "NavResource",
            ResourceClass::Components => "ComponentResource",
            ResourceClass::DataQuery => "DataQueryResource",
        }
    }
}

impl std::fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ResourceClass {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::str::FromStr for ResourceClass {
    type Err = AuthzError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ResourceClass::ALL
            .into_iter()
            .find(|class| class.as_str() == value)
            .ok_or_else(|| AuthzError::InvalidRule(format!("unknown resource class: {value}")))
    }
}

/// Family of resource instances that carry per-tenant, per-instance ACL rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceCategory {
    Dashboard,
    Component,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 2] = [ResourceCategory::Dashboard, ResourceCategory::Component];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceCategory::Dashboard => "Dashboard",
            ResourceCategory::Component => "Component",
        }
    }
}

impl std::fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceCategory {
    type Err = AuthzError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Dashboard" => Ok(ResourceCategory::Dashboard),
            "Component" => Ok(ResourceCategory::Component),
            _ => Err(AuthzError::InvalidCategory(value.to_string())),
        }
    }
}
