//! Authorization voter.
//!
//! Turns an (attribute, subject) check made by application code into an ACL
//! query for every role held by the current principal.

use crate::{Policy, PolicyDefinition, PolicyResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use warden_acl::Acl;

/// Default super-admin role.
pub const ROLE_SUPER_ADMIN: &str = "ROLE_SUPER_ADMIN";

/// Default prefix marking a resource that names a role.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Attributes the voter leaves to the authentication layer.
pub const FRAMEWORK_ATTRIBUTES: [&str; 4] = [
    "IS_AUTHENTICATED",
    "IS_AUTHENTICATED_FULLY",
    "IS_REMEMBERED",
    "PUBLIC_ACCESS",
];

/// Authenticated caller as seen by the voter.
pub trait Principal {
    /// Roles held by the principal.
    fn roles(&self) -> &[String];

    /// Returns false for disabled accounts.
    fn is_active(&self) -> bool {
        true
    }
}

/// Plain principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Held roles.
    pub roles: Vec<String>,
    /// Account enabled flag.
    pub active: bool,
}

impl User {
    /// Creates an active user holding `roles`.
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            active: true,
        }
    }

    /// Marks the user as disabled.
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

impl Principal for User {
    fn roles(&self) -> &[String] {
        &self.roles
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Voter decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    /// Access granted.
    Granted,
    /// Access denied.
    Denied,
    /// Attribute not handled by this voter.
    Abstain,
}

impl Vote {
    fn from_bool(granted: bool) -> Self {
        if granted {
            Self::Granted
        } else {
            Self::Denied
        }
    }
}

/// Votes on access checks using a [`Policy`].
pub struct AclVoter<D> {
    policy: Arc<Policy<D>>,
    super_admin_role: String,
    role_prefix: String,
    ignored_attributes: Vec<String>,
}

impl<D: PolicyDefinition> AclVoter<D> {
    /// Creates a voter with the default super-admin role, role prefix and
    /// ignored attributes.
    #[must_use]
    pub fn new(policy: Arc<Policy<D>>) -> Self {
        Self {
            policy,
            super_admin_role: ROLE_SUPER_ADMIN.to_string(),
            role_prefix: ROLE_PREFIX.to_string(),
            ignored_attributes: FRAMEWORK_ATTRIBUTES.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    /// Sets the role that bypasses every check.
    #[must_use]
    pub fn with_super_admin_role(mut self, role: impl Into<String>) -> Self {
        self.super_admin_role = role.into();
        self
    }

    /// Sets the prefix marking role-named resources.
    #[must_use]
    pub fn with_role_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.role_prefix = prefix.into();
        self
    }

    /// Adds an attribute to abstain on.
    #[must_use]
    pub fn with_ignored_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.ignored_attributes.push(attribute.into());
        self
    }

    /// Returns true if the voter decides on `attribute`.
    #[must_use]
    pub fn supports(&self, attribute: &str) -> bool {
        !self.ignored_attributes.iter().any(|a| a == attribute)
    }

    /// Votes on `attribute`, optionally about `subject`.
    ///
    /// With a subject, the subject is the resource and the attribute the
    /// privilege. Without one, the attribute is the resource.
    pub fn vote(
        &self,
        principal: &impl Principal,
        attribute: &str,
        subject: Option<&str>,
    ) -> PolicyResult<Vote> {
        if !self.supports(attribute) {
            return Ok(Vote::Abstain);
        }

        let roles = principal.roles();
        if roles.iter().any(|role| role == &self.super_admin_role) {
            debug!(attribute = %attribute, "Granted to super admin");
            return Ok(Vote::Granted);
        }
        if !principal.is_active() {
            debug!(attribute = %attribute, "Denied to inactive principal");
            return Ok(Vote::Denied);
        }

        let (resource, privilege) = match subject {
            Some(subject) => (subject, Some(attribute)),
            None => (attribute, None),
        };

        let acl = self.policy.acl()?;
        let known: Vec<&str> = roles
            .iter()
            .map(String::as_str)
            .filter(|role| acl.has_role(role))
            .collect();

        let granted = if resource.starts_with(&self.role_prefix) {
            holds_role(&acl, &known, roles, resource)?
                && match privilege {
                    Some(privilege) => any_allowed(&acl, &known, resource, Some(privilege))?,
                    None => true,
                }
        } else {
            any_allowed(&acl, &known, resource, privilege)?
        };

        debug!(
            attribute = %attribute,
            subject = ?subject,
            granted,
            "Voted on access"
        );
        Ok(Vote::from_bool(granted))
    }
}

fn holds_role(acl: &Acl, known: &[&str], held: &[String], role: &str) -> PolicyResult<bool> {
    if held.iter().any(|r| r == role) {
        return Ok(true);
    }
    if !acl.has_role(role) {
        return Ok(false);
    }
    for &candidate in known {
        if acl.inherits_role(candidate, role, false)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn any_allowed(
    acl: &Acl,
    roles: &[&str],
    resource: &str,
    privilege: Option<&str>,
) -> PolicyResult<bool> {
    for &role in roles {
        if acl.is_allowed(Some(role), Some(resource), privilege)? {
            return Ok(true);
        }
    }
    Ok(false)
}

impl<D: std::fmt::Debug> std::fmt::Debug for AclVoter<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AclVoter")
            .field("policy", &self.policy)
            .field("super_admin_role", &self.super_admin_role)
            .field("role_prefix", &self.role_prefix)
            .field("ignored_attributes", &self.ignored_attributes)
            .finish()
    }
}
