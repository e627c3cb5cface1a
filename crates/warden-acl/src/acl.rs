//! Access control list engine.

use crate::rule::{Operation, RuleTable, RuleType, Scope};
use crate::{AccessQuery, AclResult, Assertion, ResourceTree, RoleRegistry};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Role or resource targets of a rule mutation.
///
/// An empty target list stands for the wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets(Vec<Scope>);

impl Targets {
    /// Every role, or every resource.
    pub const ALL: Self = Self(Vec::new());

    /// Creates targets from explicit scopes.
    #[must_use]
    pub fn new(scopes: Vec<Scope>) -> Self {
        Self(scopes)
    }

    fn into_scopes(self) -> Vec<Scope> {
        if self.0.is_empty() {
            vec![Scope::Wildcard]
        } else {
            self.0
        }
    }
}

impl From<Scope> for Targets {
    fn from(scope: Scope) -> Self {
        Self(vec![scope])
    }
}

impl From<&str> for Targets {
    fn from(id: &str) -> Self {
        Self(vec![Scope::from(id)])
    }
}

impl From<String> for Targets {
    fn from(id: String) -> Self {
        Self(vec![Scope::from(id)])
    }
}

impl From<Option<&str>> for Targets {
    fn from(id: Option<&str>) -> Self {
        Self(vec![Scope::from(id)])
    }
}

impl From<&[&str]> for Targets {
    fn from(ids: &[&str]) -> Self {
        Self(ids.iter().map(|id| Scope::from(*id)).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Targets {
    fn from(ids: [&str; N]) -> Self {
        Self(ids.into_iter().map(Scope::from).collect())
    }
}

impl From<Vec<&str>> for Targets {
    fn from(ids: Vec<&str>) -> Self {
        Self(ids.into_iter().map(Scope::from).collect())
    }
}

impl From<Vec<String>> for Targets {
    fn from(ids: Vec<String>) -> Self {
        Self(ids.into_iter().map(Scope::from).collect())
    }
}

/// Privileges of a rule mutation.
///
/// An empty list stands for "all privileges".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Privileges(Vec<String>);

impl Privileges {
    /// All privileges.
    pub const ALL: Self = Self(Vec::new());

    /// Returns the named privileges, empty for "all privileges".
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for Privileges {
    fn from(privilege: &str) -> Self {
        Self(vec![privilege.to_string()])
    }
}

impl From<String> for Privileges {
    fn from(privilege: String) -> Self {
        Self(vec![privilege])
    }
}

impl From<Option<&str>> for Privileges {
    fn from(privilege: Option<&str>) -> Self {
        Self(privilege.map(str::to_string).into_iter().collect())
    }
}

impl From<&[&str]> for Privileges {
    fn from(privileges: &[&str]) -> Self {
        Self(privileges.iter().map(|p| (*p).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Privileges {
    fn from(privileges: [&str; N]) -> Self {
        Self(privileges.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<&str>> for Privileges {
    fn from(privileges: Vec<&str>) -> Self {
        Self(privileges.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Privileges {
    fn from(privileges: Vec<String>) -> Self {
        Self(privileges)
    }
}

/// Role/resource access control list.
///
/// Setup happens through `&mut self`; once built, an `Acl` is usually frozen
/// in an `Arc` and queried concurrently.
#[derive(Debug, Clone, Default)]
pub struct Acl {
    roles: RoleRegistry,
    resources: ResourceTree,
    rules: RuleTable,
}

impl Acl {
    /// Creates an empty ACL that denies everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a role inheriting from `parents`, lowest priority first.
    pub fn add_role<I, S>(&mut self, role: impl Into<String>, parents: I) -> AclResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.add(role, parents)?;
        Ok(self)
    }

    /// Checks if a role is registered.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.has(role)
    }

    /// Returns the direct parents of `role`, lowest priority first.
    pub fn role_parents(&self, role: &str) -> AclResult<&[String]> {
        self.roles.parents(role)
    }

    /// Checks whether `role` inherits from `ancestor`.
    pub fn inherits_role(&self, role: &str, ancestor: &str, only_direct: bool) -> AclResult<bool> {
        self.roles.inherits(role, ancestor, only_direct)
    }

    /// Removes a role and every rule scoped to it.
    pub fn remove_role(&mut self, role: &str) -> AclResult<&mut Self> {
        self.roles.remove(role)?;
        self.rules.purge_role(role);
        Ok(self)
    }

    /// Removes every role and every role-scoped rule.
    pub fn remove_role_all(&mut self) -> &mut Self {
        self.roles.remove_all();
        self.rules.purge_all_roles();
        self
    }

    /// Registers a resource under `parent`, or as a root.
    pub fn add_resource(
        &mut self,
        resource: impl Into<String>,
        parent: Option<&str>,
    ) -> AclResult<&mut Self> {
        self.resources.add(resource, parent)?;
        Ok(self)
    }

    /// Checks if a resource is registered.
    #[must_use]
    pub fn has_resource(&self, resource: &str) -> bool {
        self.resources.has(resource)
    }

    /// Returns the parent of `resource`.
    pub fn resource_parent(&self, resource: &str) -> AclResult<Option<&str>> {
        self.resources.parent_of(resource)
    }

    /// Checks whether `resource` descends from `ancestor`.
    pub fn inherits_resource(
        &self,
        resource: &str,
        ancestor: &str,
        only_direct: bool,
    ) -> AclResult<bool> {
        self.resources.inherits(resource, ancestor, only_direct)
    }

    /// Removes a resource, its descendants, and every rule scoped to them.
    pub fn remove_resource(&mut self, resource: &str) -> AclResult<&mut Self> {
        for removed in self.resources.remove(resource)? {
            self.rules.purge_resource(&removed);
        }
        Ok(self)
    }

    /// Removes every resource and every resource-scoped rule.
    pub fn remove_resource_all(&mut self) -> &mut Self {
        self.resources.remove_all();
        self.rules.purge_all_resources();
        self
    }

    /// Role identifiers in registration order.
    #[must_use]
    pub fn roles(&self) -> Vec<&str> {
        self.roles.roles()
    }

    /// Resource identifiers in registration order.
    #[must_use]
    pub fn resources(&self) -> Vec<&str> {
        self.resources.resources()
    }

    /// Returns the role registry.
    #[must_use]
    pub fn role_registry(&self) -> &RoleRegistry {
        &self.roles
    }

    /// Returns the resource tree.
    #[must_use]
    pub fn resource_tree(&self) -> &ResourceTree {
        &self.resources
    }

    /// Returns the rule table.
    #[must_use]
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Adds an allow rule.
    pub fn allow(
        &mut self,
        roles: impl Into<Targets>,
        resources: impl Into<Targets>,
        privileges: impl Into<Privileges>,
    ) -> AclResult<&mut Self> {
        self.set_rule(
            Operation::Add,
            RuleType::Allow,
            roles.into(),
            resources.into(),
            privileges.into(),
            None,
        )
    }

    /// Adds an allow rule gated by `assertion`.
    pub fn allow_if(
        &mut self,
        roles: impl Into<Targets>,
        resources: impl Into<Targets>,
        privileges: impl Into<Privileges>,
        assertion: impl Assertion + 'static,
    ) -> AclResult<&mut Self> {
        self.set_rule(
            Operation::Add,
            RuleType::Allow,
            roles.into(),
            resources.into(),
            privileges.into(),
            Some(Arc::new(assertion)),
        )
    }

    /// Adds a deny rule.
    pub fn deny(
        &mut self,
        roles: impl Into<Targets>,
        resources: impl Into<Targets>,
        privileges: impl Into<Privileges>,
    ) -> AclResult<&mut Self> {
        self.set_rule(
            Operation::Add,
            RuleType::Deny,
            roles.into(),
            resources.into(),
            privileges.into(),
            None,
        )
    }

    /// Adds a deny rule gated by `assertion`.
    pub fn deny_if(
        &mut self,
        roles: impl Into<Targets>,
        resources: impl Into<Targets>,
        privileges: impl Into<Privileges>,
        assertion: impl Assertion + 'static,
    ) -> AclResult<&mut Self> {
        self.set_rule(
            Operation::Add,
            RuleType::Deny,
            roles.into(),
            resources.into(),
            privileges.into(),
            Some(Arc::new(assertion)),
        )
    }

    /// Removes allow rules.
    pub fn remove_allow(
        &mut self,
        roles: impl Into<Targets>,
        resources: impl Into<Targets>,
        privileges: impl Into<Privileges>,
    ) -> AclResult<&mut Self> {
        self.set_rule(
            Operation::Remove,
            RuleType::Allow,
            roles.into(),
            resources.into(),
            privileges.into(),
            None,
        )
    }

    /// Removes deny rules.
    pub fn remove_deny(
        &mut self,
        roles: impl Into<Targets>,
        resources: impl Into<Targets>,
        privileges: impl Into<Privileges>,
    ) -> AclResult<&mut Self> {
        self.set_rule(
            Operation::Remove,
            RuleType::Deny,
            roles.into(),
            resources.into(),
            privileges.into(),
            None,
        )
    }

    /// Adds or removes rules.
    ///
    /// Every identifier is checked before the rule table changes. Removing
    /// with only the wildcard resource also clears the matching slots of
    /// every registered resource.
    pub fn set_rule(
        &mut self,
        operation: Operation,
        rule_type: RuleType,
        roles: Targets,
        resources: Targets,
        privileges: Privileges,
        assertion: Option<Arc<dyn Assertion>>,
    ) -> AclResult<&mut Self> {
        let roles = roles.into_scopes();
        let resources = resources.into_scopes();

        for id in roles.iter().filter_map(Scope::id) {
            self.roles.get(id)?;
        }
        for id in resources.iter().filter_map(Scope::id) {
            self.resources.get(id)?;
        }

        let targets = if operation == Operation::Remove && resources == [Scope::Wildcard] {
            let mut expanded = vec![Scope::Wildcard];
            expanded.extend(self.resources.resources().into_iter().map(Scope::from));
            expanded
        } else {
            resources.clone()
        };

        let changed = self.rules.set_rule(
            operation,
            rule_type,
            &roles,
            &targets,
            privileges.names(),
            assertion,
        );
        if operation == Operation::Remove && changed == 0 {
            warn!(
                roles = ?roles,
                resources = ?resources,
                privileges = ?privileges.names(),
                rule_type = %rule_type,
                "No matching rule to remove"
            );
        }
        Ok(self)
    }

    /// Decides whether `role` may exercise `privilege` on `resource`.
    ///
    /// `None` stands for "any role", "any resource", or "all privileges".
    /// Fails with [`crate::AclError::RoleNotFound`] or
    /// [`crate::AclError::ResourceNotFound`] for unregistered identifiers.
    pub fn is_allowed(
        &self,
        role: Option<&str>,
        resource: Option<&str>,
        privilege: Option<&str>,
    ) -> AclResult<bool> {
        if let Some(role) = role {
            self.roles.get(role)?;
        }

        let mut levels = Vec::new();
        if let Some(resource) = resource {
            levels.push(Scope::from(resource));
            levels.extend(self.resources.ancestors(resource)?.into_iter().map(Scope::from));
        }
        levels.push(Scope::Wildcard);

        let query = AccessQuery::new(role, resource, privilege);

        for level in &levels {
            if let Some(rule_type) = self.resolve_level(level, role, privilege, &query) {
                trace!(query = %query, level = %level, decision = %rule_type, "Access resolved");
                return Ok(rule_type.is_allow());
            }
        }

        let rule_type = self.rules.global_rule_type(self, &query);
        trace!(query = %query, decision = %rule_type, "Access resolved by global rule");
        Ok(rule_type.is_allow())
    }

    fn resolve_level(
        &self,
        level: &Scope,
        role: Option<&str>,
        privilege: Option<&str>,
        query: &AccessQuery<'_>,
    ) -> Option<RuleType> {
        if let Some(role) = role {
            if let Some(rule_type) = self.visit_roles(level, role, privilege, query) {
                return Some(rule_type);
            }
        }
        self.visit(level, &Scope::Wildcard, privilege, query)
    }

    fn visit_roles(
        &self,
        level: &Scope,
        role: &str,
        privilege: Option<&str>,
        query: &AccessQuery<'_>,
    ) -> Option<RuleType> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = vec![role];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }

            let scope = Scope::from(current);
            if self.rules.has_rules(level, &scope) {
                if let Some(rule_type) = self.visit(level, &scope, privilege, query) {
                    debug!(role = %current, level = %level, rule_type = %rule_type, "Rule matched");
                    return Some(rule_type);
                }
            }

            // Parents are registered before children and removal detaches
            // links, so every id reached here is registered.
            let parents = self.roles.parents(current);
            debug_assert!(parents.is_ok(), "unregistered role '{current}' reached");
            if let Ok(parents) = parents {
                stack.extend(parents.iter().map(String::as_str));
            }
        }

        None
    }

    fn visit(
        &self,
        level: &Scope,
        role: &Scope,
        privilege: Option<&str>,
        query: &AccessQuery<'_>,
    ) -> Option<RuleType> {
        match privilege {
            Some(privilege) => self
                .rules
                .rule_type_at(level, role, Some(privilege), self, query)
                .or_else(|| self.rules.rule_type_at(level, role, None, self, query)),
            None => {
                if self.rules.any_privilege_denied(level, role, self, query) {
                    Some(RuleType::Deny)
                } else {
                    self.rules.rule_type_at(level, role, None, self, query)
                }
            }
        }
    }
}
