//! ACL engine integration tests.

pub mod resolution;
pub mod rules;
