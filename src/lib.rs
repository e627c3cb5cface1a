//! Warden: role/resource access control.
//!
//! Re-exports the engine ([`acl`]) and the policy layer ([`policy`]).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use warden_acl as acl;
pub use warden_policy as policy;

pub use warden_acl::{Acl, AclError, AclResult, Assertion, Privileges, Targets};
pub use warden_policy::{AclVoter, Policy, PolicyConfig, PolicyDefinition, PolicyError, StaticPolicy};
