//! Declarative access policies for Warden.
//!
//! This crate provides:
//! - Policy files declaring roles, resources and rules
//! - The [`PolicyDefinition`] hook for programmatic rules
//! - A [`Policy`] that builds its ACL once and shares it
//! - An [`AclVoter`] answering attribute checks for a principal

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod definition;
pub mod error;
pub mod voter;

pub use crate::config::{FileFormat, PolicyConfig, ResourceConfig, RoleConfig, RuleConfig};
pub use definition::{Policy, PolicyDefinition, StaticPolicy};
pub use error::{PolicyError, PolicyResult};
pub use voter::{AclVoter, Principal, User, Vote};
