use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("invalid action: {0}")]
    InvalidAction(String),
    #[error("invalid resource category: {0}")]
    InvalidCategory(String),
    #[error("invalid rule: {0}")]
    InvalidRule(String),
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("role {0} is defined more than once")]
    DuplicateRole(String),
    #[error("role {role} extends undefined role {parent}")]
    UnknownParent { role: String, parent: String },
    #[error("role graph contains a cycle through {0}")]
    CyclicRoleGraph(String),
    #[error("acl param out of scope: expected org {org_id} category {category}, got {actual}")]
    ScopeMismatch {
        org_id: i64,
        category: String,
        actual: String,
    },
}

pub type AuthzResult<T> = Result<T, AuthzError>;
