//! ACL error types.

use thiserror::Error;

/// ACL result type.
pub type AclResult<T> = Result<T, AclError>;

/// ACL errors.
///
/// Every variant is a configuration mistake made by the caller: the engine
/// never reports "unknown" for a well-formed query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AclError {
    /// Role already registered.
    #[error("Role id '{0}' already exists in the registry")]
    DuplicateRole(String),

    /// Parent role not registered.
    #[error("Parent role id '{0}' does not exist")]
    UnknownParentRole(String),

    /// Role not registered.
    #[error("Role '{0}' not found")]
    RoleNotFound(String),

    /// Resource already registered.
    #[error("Resource id '{0}' already exists in the ACL")]
    DuplicateResource(String),

    /// Parent resource not registered.
    #[error("Parent resource id '{0}' does not exist")]
    UnknownParentResource(String),

    /// Resource not registered.
    #[error("Resource '{0}' not found")]
    ResourceNotFound(String),
}

impl AclError {
    /// Returns the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateRole(_) => "DUPLICATE_ROLE",
            Self::UnknownParentRole(_) => "UNKNOWN_PARENT_ROLE",
            Self::RoleNotFound(_) => "ROLE_NOT_FOUND",
            Self::DuplicateResource(_) => "DUPLICATE_RESOURCE",
            Self::UnknownParentResource(_) => "UNKNOWN_PARENT_RESOURCE",
            Self::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
        }
    }

    /// Returns true if the error names an identifier that was never registered.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RoleNotFound(_)
                | Self::ResourceNotFound(_)
                | Self::UnknownParentRole(_)
                | Self::UnknownParentResource(_)
        )
    }
}
