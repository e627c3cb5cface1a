//! Role/resource access control lists.
//!
//! This crate provides:
//! - A role registry with multiple, prioritized inheritance
//! - A single-parent resource tree
//! - Allow/deny rules per role, resource and privilege
//! - Conditional rules through assertions
//!
//! ```
//! use warden_acl::{Acl, Privileges};
//!
//! let mut acl = Acl::new();
//! acl.add_role("guest", Vec::<String>::new()).unwrap();
//! acl.add_role("member", ["guest"]).unwrap();
//! acl.add_resource("forum", None).unwrap();
//! acl.allow("guest", "forum", "read").unwrap();
//! acl.allow("member", "forum", Privileges::ALL).unwrap();
//!
//! assert!(acl.is_allowed(Some("member"), Some("forum"), Some("read")).unwrap());
//! assert!(!acl.is_allowed(Some("guest"), Some("forum"), Some("post")).unwrap());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod acl;
pub mod assertion;
pub mod error;
pub mod resource;
pub mod role;
pub mod rule;

pub use acl::{Acl, Privileges, Targets};
pub use assertion::{assert_fn, AccessQuery, Assertion, Never, PrivilegeIn};
pub use error::{AclError, AclResult};
pub use resource::ResourceTree;
pub use role::RoleRegistry;
pub use rule::{Operation, Rule, RuleTable, RuleType, Scope};
