//! Rule storage.
//!
//! Rules are stored sparsely, keyed by a (resource scope, role scope) pair.
//! Each pair owns one "all privileges" slot and one slot per named privilege.

use crate::{AccessQuery, Acl, Assertion};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Rule type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// Grant access.
    Allow,
    /// Refuse access.
    Deny,
}

impl RuleType {
    /// Returns the opposite type.
    #[must_use]
    pub fn inverted(self) -> Self {
        match self {
            Self::Allow => Self::Deny,
            Self::Deny => Self::Allow,
        }
    }

    /// Returns true for [`RuleType::Allow`].
    #[must_use]
    pub fn is_allow(self) -> bool {
        self == Self::Allow
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

/// Rule table mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Add or replace rules.
    Add,
    /// Remove rules of a matching type.
    Remove,
}

/// Resource or role scope of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Applies to every resource (or role).
    Wildcard,
    /// Applies to one identifier.
    Specific(String),
}

impl Scope {
    /// Returns the identifier, `None` for the wildcard.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Wildcard => None,
            Self::Specific(id) => Some(id),
        }
    }

    /// Returns true for the wildcard scope.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

impl From<Option<&str>> for Scope {
    fn from(id: Option<&str>) -> Self {
        id.map_or(Self::Wildcard, |id| Self::Specific(id.to_string()))
    }
}

impl From<&str> for Scope {
    fn from(id: &str) -> Self {
        Self::Specific(id.to_string())
    }
}

impl From<String> for Scope {
    fn from(id: String) -> Self {
        Self::Specific(id)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => write!(f, "*"),
            Self::Specific(id) => write!(f, "{id}"),
        }
    }
}

/// A stored rule.
#[derive(Clone)]
pub struct Rule {
    /// Rule type.
    pub rule_type: RuleType,
    /// Optional assertion gating the rule.
    pub assertion: Option<Arc<dyn Assertion>>,
}

impl Rule {
    /// Creates an unconditional rule.
    #[must_use]
    pub fn new(rule_type: RuleType) -> Self {
        Self {
            rule_type,
            assertion: None,
        }
    }

    /// Attaches an assertion.
    #[must_use]
    pub fn with_assertion(mut self, assertion: Arc<dyn Assertion>) -> Self {
        self.assertion = Some(assertion);
        self
    }

    /// Returns true if the rule carries an assertion.
    #[must_use]
    pub fn is_conditional(&self) -> bool {
        self.assertion.is_some()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("rule_type", &self.rule_type)
            .field("conditional", &self.is_conditional())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
struct RuleSet {
    all_privileges: Option<Rule>,
    by_privilege: IndexMap<String, Rule>,
}

impl RuleSet {
    fn is_empty(&self) -> bool {
        self.all_privileges.is_none() && self.by_privilege.is_empty()
    }

    fn len(&self) -> usize {
        usize::from(self.all_privileges.is_some()) + self.by_privilege.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RuleKey {
    resource: Scope,
    role: Scope,
}

impl RuleKey {
    fn new(resource: &Scope, role: &Scope) -> Self {
        Self {
            resource: resource.clone(),
            role: role.clone(),
        }
    }

    fn is_global(&self) -> bool {
        self.resource.is_wildcard() && self.role.is_wildcard()
    }
}

/// Sparse rule storage.
///
/// The global rule (all resources, all roles, all privileges) always exists
/// and starts as an unconditional deny.
#[derive(Debug, Clone)]
pub struct RuleTable {
    global: Rule,
    entries: HashMap<RuleKey, RuleSet>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleTable {
    /// Creates a table holding only the default global deny.
    #[must_use]
    pub fn new() -> Self {
        Self {
            global: Rule::new(RuleType::Deny),
            entries: HashMap::new(),
        }
    }

    /// Applies `operation` to every (resource, role) pair and returns the
    /// number of slots written or removed.
    ///
    /// An empty `privileges` list targets the "all privileges" slot. Scopes
    /// are taken as given: a wildcard is one wildcard entry, never an
    /// expansion over registered identifiers.
    pub fn set_rule(
        &mut self,
        operation: Operation,
        rule_type: RuleType,
        roles: &[Scope],
        resources: &[Scope],
        privileges: &[String],
        assertion: Option<Arc<dyn Assertion>>,
    ) -> usize {
        let mut changed = 0;
        for resource in resources {
            for role in roles {
                let key = RuleKey::new(resource, role);
                changed += match operation {
                    Operation::Add => {
                        let mut rule = Rule::new(rule_type);
                        rule.assertion = assertion.clone();
                        self.add(key, privileges, rule)
                    }
                    Operation::Remove => self.remove(&key, privileges, rule_type),
                };
            }
        }
        changed
    }

    fn add(&mut self, key: RuleKey, privileges: &[String], rule: Rule) -> usize {
        debug!(
            resource = %key.resource,
            role = %key.role,
            privileges = ?privileges,
            rule_type = %rule.rule_type,
            conditional = rule.is_conditional(),
            "Setting rule"
        );

        if privileges.is_empty() && key.is_global() {
            self.global = rule;
            return 1;
        }

        let set = self.entries.entry(key).or_default();
        if privileges.is_empty() {
            set.all_privileges = Some(rule);
            1
        } else {
            for privilege in privileges {
                set.by_privilege.insert(privilege.clone(), rule.clone());
            }
            privileges.len()
        }
    }

    fn remove(&mut self, key: &RuleKey, privileges: &[String], rule_type: RuleType) -> usize {
        if privileges.is_empty() && key.is_global() {
            if self.global.rule_type != rule_type {
                return 0;
            }
            debug!(rule_type = %rule_type, "Resetting global rule to default deny");
            self.global = Rule::new(RuleType::Deny);
            self.entries.remove(key);
            return 1;
        }

        let Some(set) = self.entries.get_mut(key) else {
            return 0;
        };

        let mut removed = 0;
        if privileges.is_empty() {
            if set
                .all_privileges
                .as_ref()
                .is_some_and(|rule| rule.rule_type == rule_type)
            {
                set.all_privileges = None;
                removed += 1;
            }
        } else {
            for privilege in privileges {
                if set
                    .by_privilege
                    .get(privilege)
                    .is_some_and(|rule| rule.rule_type == rule_type)
                {
                    set.by_privilege.shift_remove(privilege);
                    removed += 1;
                }
            }
        }

        if set.is_empty() {
            self.entries.remove(key);
        }
        if removed > 0 {
            debug!(resource = %key.resource, role = %key.role, removed, "Removed rules");
        }
        removed
    }

    /// Returns the stored rule for the exact scope triple, without evaluating
    /// its assertion.
    #[must_use]
    pub fn get(&self, resource: &Scope, role: &Scope, privilege: Option<&str>) -> Option<&Rule> {
        let key = RuleKey::new(resource, role);
        if privilege.is_none() && key.is_global() {
            return Some(&self.global);
        }
        let set = self.entries.get(&key)?;
        match privilege {
            None => set.all_privileges.as_ref(),
            Some(privilege) => set.by_privilege.get(privilege),
        }
    }

    /// Returns true if any rule is stored for the (resource, role) pair.
    #[must_use]
    pub fn has_rules(&self, resource: &Scope, role: &Scope) -> bool {
        let key = RuleKey::new(resource, role);
        key.is_global() || self.entries.contains_key(&key)
    }

    /// Resolves the rule type at the exact scope triple.
    ///
    /// Returns `None` when nothing is stored there, or when a scoped rule's
    /// assertion fails. A failing assertion on the global rule inverts it.
    #[must_use]
    pub fn rule_type_at(
        &self,
        resource: &Scope,
        role: &Scope,
        privilege: Option<&str>,
        acl: &Acl,
        query: &AccessQuery<'_>,
    ) -> Option<RuleType> {
        let rule = self.get(resource, role, privilege)?;
        let Some(assertion) = &rule.assertion else {
            return Some(rule.rule_type);
        };

        if assertion.assert(acl, query) {
            Some(rule.rule_type)
        } else if resource.is_wildcard() && role.is_wildcard() && privilege.is_none() {
            Some(rule.rule_type.inverted())
        } else {
            None
        }
    }

    /// Resolves the global rule, which always yields a type.
    #[must_use]
    pub fn global_rule_type(&self, acl: &Acl, query: &AccessQuery<'_>) -> RuleType {
        match &self.global.assertion {
            Some(assertion) if !assertion.assert(acl, query) => self.global.rule_type.inverted(),
            _ => self.global.rule_type,
        }
    }

    /// Returns true if any named privilege at the exact (resource, role) pair
    /// resolves to [`RuleType::Deny`].
    #[must_use]
    pub fn any_privilege_denied(
        &self,
        resource: &Scope,
        role: &Scope,
        acl: &Acl,
        query: &AccessQuery<'_>,
    ) -> bool {
        let Some(set) = self.entries.get(&RuleKey::new(resource, role)) else {
            return false;
        };
        set.by_privilege.keys().any(|privilege| {
            self.rule_type_at(resource, role, Some(privilege), acl, query) == Some(RuleType::Deny)
        })
    }

    /// Drops every rule scoped to `role`.
    pub fn purge_role(&mut self, role: &str) {
        self.entries.retain(|key, _| key.role.id() != Some(role));
    }

    /// Drops every rule scoped to any specific role.
    pub fn purge_all_roles(&mut self) {
        self.entries.retain(|key, _| key.role.is_wildcard());
    }

    /// Drops every rule scoped to `resource`.
    pub fn purge_resource(&mut self, resource: &str) {
        self.entries.retain(|key, _| key.resource.id() != Some(resource));
    }

    /// Drops every rule scoped to any specific resource.
    pub fn purge_all_resources(&mut self) {
        self.entries.retain(|key, _| key.resource.is_wildcard());
    }

    /// Returns the number of stored rules, the global rule included.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        1 + self.entries.values().map(RuleSet::len).sum::<usize>()
    }
}
