//! Role inheritance graph.
//!
//! # Purpose
//! Holds the static single-parent "extends" relation between roles and
//! expands a role into the ordered list of roles whose grants apply to it.
//!
//! # How it fits
//! The synchronizer seeds one grouping row per edge. The evaluator never reads
//! those rows back: it expands each requested role with
//! [`RoleGraph::ancestors`], both to narrow the permission rows it loads and to
//! link the role to its ancestors inside the enforcer.
//!
//! # Key invariants
//! - Every role is defined once and every parent is itself defined.
//! - The relation is acyclic; this is checked in [`RoleGraph::new`], never at
//!   query time.
//! - `ancestors(r)` starts with `r` and ends at the root of its chain.
//!
//! # Examples
//! ```rust
//! use lin_authz::{Role, RoleGraph};
//!
//! let graph = RoleGraph::reference();
//! let chain = graph.ancestors(&Role::editor()).unwrap();
//! assert_eq!(chain, vec![Role::editor(), Role::viewer(), Role::anonymous()]);
//! ```
use crate::{AuthzError, AuthzResult, Role};
use std::collections::{BTreeMap, HashSet};

/// One role and the role it extends, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    pub role: Role,
    pub extends: Option<Role>,
}

impl RoleDefinition {
    pub fn new(role: Role, extends: Option<Role>) -> Self {
        Self { role, extends }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGraph {
    parents: BTreeMap<Role, Option<Role>>,
}

impl RoleGraph {
    /// Build a graph from role definitions.
    ///
    /// # Errors
    /// - [`AuthzError::DuplicateRole`] when a role is defined twice.
    /// - [`AuthzError::UnknownParent`] when a role extends an undefined role.
    /// - [`AuthzError::CyclicRoleGraph`] when following `extends` revisits a role.
    pub fn new(definitions: impl IntoIterator<Item = RoleDefinition>) -> AuthzResult<Self> {
        let mut parents = BTreeMap::new();
        for definition in definitions {
            let name = definition.role.to_string();
            if parents.insert(definition.role, definition.extends).is_some() {
                return Err(AuthzError::DuplicateRole(name));
            }
        }

        for (role, parent) in &parents {
            if let Some(parent) = parent {
                if !parents.contains_key(parent) {
                    return Err(AuthzError::UnknownParent {
                        role: role.to_string(),
                        parent: parent.to_string(),
                    });
                }
            }
        }

        let graph = Self { parents };
        for role in graph.parents.keys() {
            graph.walk(role)?;
        }
        Ok(graph)
    }

    /// The built-in chain `lin -> admin -> editor -> viewer -> anonymous`.
    pub fn reference() -> Self {
        let chain = [
            Role::lin(),
            Role::admin(),
            Role::editor(),
            Role::viewer(),
            Role::anonymous(),
        ];
        let parents = chain
            .iter()
            .enumerate()
            .map(|(idx, role)| (role.clone(), chain.get(idx + 1).cloned()))
            .collect();
        Self { parents }
    }

    pub fn contains(&self, role: &Role) -> bool {
        self.parents.contains_key(role)
    }

    pub fn extends_of(&self, role: &Role) -> Option<&Role> {
        self.parents.get(role).and_then(Option::as_ref)
    }

    /// Expand `role` into itself followed by every transitive parent.
    ///
    /// # Errors
    /// - [`AuthzError::UnknownRole`] if `role` is not part of the graph.
    pub fn ancestors(&self, role: &Role) -> AuthzResult<Vec<Role>> {
        if !self.contains(role) {
            return Err(AuthzError::UnknownRole(role.to_string()));
        }
        self.walk(role)
    }

    /// `(child, parent)` pairs, one per `extends` edge.
    pub fn edges(&self) -> impl Iterator<Item = (&Role, &Role)> {
        self.parents
            .iter()
            .filter_map(|(role, parent)| parent.as_ref().map(|parent| (role, parent)))
    }

    fn walk(&self, role: &Role) -> AuthzResult<Vec<Role>> {
        let mut seen = HashSet::new();
        let mut chain = Vec::new();
        let mut current = Some(role);
        while let Some(next) = current {
            if !seen.insert(next) {
                return Err(AuthzError::CyclicRoleGraph(next.to_string()));
            }
            chain.push(next.clone());
            current = self.extends_of(next);
        }
        Ok(chain)
    }
}

impl Default for RoleGraph {
    fn default() -> Self {
        Self::reference()
    }
}
