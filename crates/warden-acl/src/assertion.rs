//! Conditional rule predicates.

use crate::Acl;
use std::fmt;

/// The query being resolved, exactly as passed to [`Acl::is_allowed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessQuery<'a> {
    /// Queried role, `None` for "any role".
    pub role: Option<&'a str>,
    /// Queried resource, `None` for "any resource".
    pub resource: Option<&'a str>,
    /// Queried privilege, `None` for "all privileges".
    pub privilege: Option<&'a str>,
}

impl<'a> AccessQuery<'a> {
    /// Creates a query.
    #[must_use]
    pub fn new(role: Option<&'a str>, resource: Option<&'a str>, privilege: Option<&'a str>) -> Self {
        Self {
            role,
            resource,
            privilege,
        }
    }
}

impl fmt::Display for AccessQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}:{}",
            self.role.unwrap_or("*"),
            self.resource.unwrap_or("*"),
            self.privilege.unwrap_or("*")
        )
    }
}

/// Runtime predicate gating a rule.
///
/// A failing assertion makes a scoped rule inapplicable. On the global rule
/// (all resources, all roles, all privileges) a failing assertion inverts the
/// rule type instead.
pub trait Assertion: Send + Sync {
    /// Returns true if the rule applies to `query`.
    fn assert(&self, acl: &Acl, query: &AccessQuery<'_>) -> bool;
}

impl<F> Assertion for F
where
    F: Fn(&Acl, &AccessQuery<'_>) -> bool + Send + Sync,
{
    fn assert(&self, acl: &Acl, query: &AccessQuery<'_>) -> bool {
        self(acl, query)
    }
}

/// Wraps a closure as an [`Assertion`], pinning down its signature.
pub fn assert_fn<F>(f: F) -> F
where
    F: Fn(&Acl, &AccessQuery<'_>) -> bool + Send + Sync,
{
    f
}

/// Assertion that never holds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl Assertion for Never {
    fn assert(&self, _acl: &Acl, _query: &AccessQuery<'_>) -> bool {
        false
    }
}

/// Assertion holding only for the listed privileges.
#[derive(Debug, Clone, Default)]
pub struct PrivilegeIn(pub Vec<String>);

impl Assertion for PrivilegeIn {
    fn assert(&self, _acl: &Acl, query: &AccessQuery<'_>) -> bool {
        query
            .privilege
            .is_some_and(|privilege| self.0.iter().any(|p| p == privilege))
    }
}
