//! Declarative policy configuration.
//!
//! A policy file declares roles, a resource tree and an optional list of
//! rules. TOML, JSON and YAML are accepted, the format being taken from the
//! file extension.

use crate::{PolicyError, PolicyResult};
use config::{Config, File};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;
use warden_acl::{Acl, AclError, AclResult, Operation, Privileges, RuleType, Targets};

pub use config::FileFormat;

/// Declared role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoleConfig {
    /// Role identifier.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Parent roles, lowest priority first.
    #[serde(default)]
    pub inherits: Vec<String>,
}

impl RoleConfig {
    /// Returns the display name, falling back to the identifier.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Declared resource with its nested children.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceConfig {
    /// Resource identifier.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Child resources.
    #[serde(default)]
    pub children: Vec<ResourceConfig>,
}

impl ResourceConfig {
    /// Returns the display name, falling back to the identifier.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Declared rule. Empty lists stand for the wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleConfig {
    /// Allow or deny.
    pub effect: RuleType,

    /// Roles the rule applies to.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Resources the rule applies to.
    #[serde(default)]
    pub resources: Vec<String>,

    /// Privileges the rule applies to.
    #[serde(default)]
    pub privileges: Vec<String>,
}

/// Policy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Role declarations, in any order.
    #[serde(default)]
    pub roles: Vec<RoleConfig>,

    /// Root resources.
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,

    /// Rules, applied in order.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Clone, Copy)]
enum Mark {
    Visiting,
    Done,
}

impl PolicyConfig {
    /// Loads and validates a policy file.
    pub fn load(path: impl AsRef<Path>) -> PolicyResult<Self> {
        Self::load_layered(&[path])
    }

    /// Loads and validates layered policy files.
    ///
    /// The first file is required, later ones are skipped when missing.
    /// Later files override the sections they declare.
    pub fn load_layered<P: AsRef<Path>>(paths: &[P]) -> PolicyResult<Self> {
        if paths.is_empty() {
            return Err(PolicyError::InvalidPolicy("no policy file given".into()));
        }

        let mut builder = Config::builder();
        for (index, path) in paths.iter().enumerate() {
            debug!(path = %path.as_ref().display(), required = index == 0, "Adding policy source");
            builder = builder.add_source(File::from(path.as_ref()).required(index == 0));
        }

        let policy: Self = builder.build()?.try_deserialize()?;
        policy.validate()?;
        Ok(policy)
    }

    /// Parses and validates a policy from a string.
    pub fn from_str(source: &str, format: FileFormat) -> PolicyResult<Self> {
        let policy: Self = Config::builder()
            .add_source(File::from_str(source, format))
            .build()?
            .try_deserialize()?;
        policy.validate()?;
        Ok(policy)
    }

    /// Validates the declarations.
    ///
    /// Rejects empty or duplicate identifiers, undeclared parents, cyclic
    /// role inheritance and rules naming undeclared roles or resources.
    pub fn validate(&self) -> PolicyResult<()> {
        let mut role_ids = HashSet::new();
        for role in &self.roles {
            if role.id.trim().is_empty() {
                return Err(PolicyError::InvalidPolicy("role with an empty id".into()));
            }
            if !role_ids.insert(role.id.as_str()) {
                return Err(AclError::DuplicateRole(role.id.clone()).into());
            }
        }
        self.roles_in_dependency_order()?;

        let mut resource_ids = HashSet::new();
        for (resource, _) in self.flatten_resources() {
            if resource.id.trim().is_empty() {
                return Err(PolicyError::InvalidPolicy("resource with an empty id".into()));
            }
            if !resource_ids.insert(resource.id.as_str()) {
                return Err(AclError::DuplicateResource(resource.id.clone()).into());
            }
        }

        for rule in &self.rules {
            if let Some(role) = rule.roles.iter().find(|r| !role_ids.contains(r.as_str())) {
                return Err(AclError::RoleNotFound(role.clone()).into());
            }
            if let Some(resource) = rule
                .resources
                .iter()
                .find(|r| !resource_ids.contains(r.as_str()))
            {
                return Err(AclError::ResourceNotFound(resource.clone()).into());
            }
        }

        Ok(())
    }

    /// Returns the roles ordered so that parents precede their children.
    ///
    /// Declaration order is kept wherever the inheritance allows it.
    pub fn roles_in_dependency_order(&self) -> PolicyResult<Vec<&RoleConfig>> {
        let by_id: HashMap<&str, &RoleConfig> =
            self.roles.iter().map(|role| (role.id.as_str(), role)).collect();
        let mut marks = HashMap::new();
        let mut ordered = Vec::with_capacity(self.roles.len());

        for role in &self.roles {
            visit_role(role, &by_id, &mut marks, &mut ordered)?;
        }

        Ok(ordered)
    }

    /// Returns every resource with its parent, parents first.
    #[must_use]
    pub fn flatten_resources(&self) -> Vec<(&ResourceConfig, Option<&str>)> {
        let mut flattened = Vec::new();
        let mut stack: Vec<(&ResourceConfig, Option<&str>)> =
            self.resources.iter().rev().map(|r| (r, None)).collect();

        while let Some((resource, parent)) = stack.pop() {
            flattened.push((resource, parent));
            stack.extend(
                resource
                    .children
                    .iter()
                    .rev()
                    .map(|child| (child, Some(resource.id.as_str()))),
            );
        }

        flattened
    }

    /// Builds an ACL from the declarations and declarative rules.
    pub fn build_acl(&self) -> PolicyResult<Acl> {
        self.validate()?;

        let mut acl = Acl::new();
        for role in self.roles_in_dependency_order()? {
            acl.add_role(role.id.clone(), role.inherits.iter().cloned())?;
        }
        for (resource, parent) in self.flatten_resources() {
            acl.add_resource(resource.id.clone(), parent)?;
        }
        self.apply_rules(&mut acl)?;

        debug!(
            roles = acl.roles().len(),
            resources = acl.resources().len(),
            rules = self.rules.len(),
            "Built ACL from policy"
        );
        Ok(acl)
    }

    /// Applies the declarative rules to `acl`, in order.
    pub fn apply_rules(&self, acl: &mut Acl) -> AclResult<()> {
        for rule in &self.rules {
            acl.set_rule(
                Operation::Add,
                rule.effect,
                Targets::from(rule.roles.clone()),
                Targets::from(rule.resources.clone()),
                Privileges::from(rule.privileges.clone()),
                None,
            )?;
        }
        Ok(())
    }

    /// Role identifiers mapped to their display names.
    #[must_use]
    pub fn roles_list(&self) -> IndexMap<String, String> {
        self.roles
            .iter()
            .map(|role| (role.id.clone(), role.display_name().to_string()))
            .collect()
    }

    /// Resource identifiers mapped to their display names, parents first.
    #[must_use]
    pub fn resources_list(&self) -> IndexMap<String, String> {
        self.flatten_resources()
            .into_iter()
            .map(|(resource, _)| (resource.id.clone(), resource.display_name().to_string()))
            .collect()
    }
}

/// Post-order walk over the parents of `root`, with an explicit stack.
fn visit_role<'a>(
    root: &'a RoleConfig,
    by_id: &HashMap<&'a str, &'a RoleConfig>,
    marks: &mut HashMap<&'a str, Mark>,
    ordered: &mut Vec<&'a RoleConfig>,
) -> PolicyResult<()> {
    if marks.contains_key(root.id.as_str()) {
        return Ok(());
    }

    marks.insert(root.id.as_str(), Mark::Visiting);
    let mut stack: Vec<(&'a RoleConfig, usize)> = vec![(root, 0)];

    while let Some(top) = stack.last_mut() {
        let role = top.0;
        let next = role.inherits.get(top.1);
        top.1 += 1;

        let Some(parent) = next else {
            marks.insert(role.id.as_str(), Mark::Done);
            ordered.push(role);
            stack.pop();
            continue;
        };

        match marks.get(parent.as_str()) {
            Some(Mark::Done) => {}
            Some(Mark::Visiting) => {
                return Err(PolicyError::CyclicRoleInheritance(parent.clone()));
            }
            None => {
                let parent_role = by_id
                    .get(parent.as_str())
                    .copied()
                    .ok_or_else(|| AclError::UnknownParentRole(parent.clone()))?;
                marks.insert(parent_role.id.as_str(), Mark::Visiting);
                stack.push((parent_role, 0));
            }
        }
    }

    Ok(())
}
