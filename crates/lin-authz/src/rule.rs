//! Stored tuple schema.
//!
//! # Purpose
//! Describes the three tuple tables shared by the policy store and the
//! evaluator, and the casbin-style filter used to select rows from them.
//!
//! # Key invariants
//! - Every stored rule has exactly [`PolicyType::arity`] columns.
//! - A filter is `(field_index, values)`; an empty value matches any column
//!   value, as in casbin's `*_filtered_*` APIs.
use crate::{AuthzError, AuthzResult};
use serde::{Deserialize, Serialize};

/// Table a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PolicyType {
    /// `(child role, parent role)`.
    Grouping,
    /// `(role, resource class, action)`.
    Api,
    /// `(role, org id, category, resource id, action)`.
    Resource,
}

impl PolicyType {
    /// Casbin section name for this table.
    pub fn ptype(self) -> &'static str {
        match self {
            PolicyType::Grouping => "g",
            PolicyType::Api => "p",
            PolicyType::Resource => "p2",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            PolicyType::Grouping => 2,
            PolicyType::Api => 3,
            PolicyType::Resource => 5,
        }
    }

    /// Check that `rule` has the right number of non-empty columns.
    pub fn validate_rule<S: AsRef<str>>(self, rule: &[S]) -> AuthzResult<()> {
        if rule.len() != self.arity() {
            return Err(AuthzError::InvalidRule(format!(
                "{} rule expects {} columns, got {}",
                self.ptype(),
                self.arity(),
                rule.len()
            )));
        }
        if let Some(idx) = rule.iter().position(|value| value.as_ref().is_empty()) {
            return Err(AuthzError::InvalidRule(format!(
                "{} rule column v{idx} is empty",
                self.ptype()
            )));
        }
        Ok(())
    }

    /// Check that a filter fits inside this table's columns.
    pub fn validate_filter<S: AsRef<str>>(self, field_index: usize, values: &[S]) -> AuthzResult<()> {
        if field_index + values.len() > self.arity() {
            return Err(AuthzError::InvalidRule(format!(
                "{} filter at v{field_index} with {} values exceeds {} columns",
                self.ptype(),
                values.len(),
                self.arity()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for PolicyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ptype())
    }
}

/// Whether `rule` satisfies a casbin-style field filter.
pub fn filter_matches<R: AsRef<str>, V: AsRef<str>>(
    rule: &[R],
    field_index: usize,
    values: &[V],
) -> bool {
    values.iter().enumerate().all(|(offset, value)| {
        let value = value.as_ref();
        value.is_empty()
            || rule
                .get(field_index + offset)
                .is_some_and(|column| column.as_ref() == value)
    })
}

/// Whether a filter constrains at least one column.
pub fn filter_is_constrained<V: AsRef<str>>(values: &[V]) -> bool {
    values.iter().any(|value| !value.as_ref().is_empty())
}
