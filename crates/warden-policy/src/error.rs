//! Policy error types.

use thiserror::Error;
use warden_acl::AclError;

/// Policy result type.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Policy errors.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// ACL rejected a declaration or query.
    #[error(transparent)]
    Acl(#[from] AclError),

    /// Policy file could not be read or deserialized.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Policy is structurally invalid.
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// Role declarations form a cycle through the named role.
    #[error("Cyclic role inheritance through '{0}'")]
    CyclicRoleInheritance(String),
}

impl PolicyError {
    /// Returns the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Acl(err) => err.code(),
            Self::Config(_) => "CONFIGURATION_ERROR",
            Self::InvalidPolicy(_) => "INVALID_POLICY",
            Self::CyclicRoleInheritance(_) => "CYCLIC_ROLE_INHERITANCE",
        }
    }
}
