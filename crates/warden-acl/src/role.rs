//! Role registry.
//!
//! Roles form a directed acyclic graph. Each role keeps its parents in the
//! order they were declared: the first parent has the lowest priority and the
//! last parent the highest when inherited rules conflict.

use crate::{AclError, AclResult};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Default)]
struct RoleNode {
    parents: Vec<String>,
    children: Vec<String>,
}

/// Registry of roles and their inheritance links.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    roles: IndexMap<String, RoleNode>,
}

impl RoleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a role inheriting from `parents`.
    ///
    /// Every parent must already be registered. Repeated parents collapse onto
    /// their first position.
    pub fn add<I, S>(&mut self, role: impl Into<String>, parents: I) -> AclResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let role = role.into();
        if self.has(&role) {
            return Err(AclError::DuplicateRole(role));
        }

        let mut ordered: Vec<String> = Vec::new();
        for parent in parents {
            let parent = parent.into();
            if !self.has(&parent) {
                return Err(AclError::UnknownParentRole(parent));
            }
            if !ordered.contains(&parent) {
                ordered.push(parent);
            }
        }

        for parent in &ordered {
            if let Some(node) = self.roles.get_mut(parent) {
                node.children.push(role.clone());
            }
        }

        debug!(role = %role, parents = ?ordered, "Registered role");
        self.roles.insert(
            role,
            RoleNode {
                parents: ordered,
                children: Vec::new(),
            },
        );

        Ok(())
    }

    /// Returns the registered identifier for `role`.
    pub fn get(&self, role: &str) -> AclResult<&str> {
        self.roles
            .get_key_value(role)
            .map(|(id, _)| id.as_str())
            .ok_or_else(|| AclError::RoleNotFound(role.to_string()))
    }

    /// Checks if a role is registered.
    #[must_use]
    pub fn has(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    /// Returns the direct parents of `role` in ascending priority order.
    pub fn parents(&self, role: &str) -> AclResult<&[String]> {
        self.node(role).map(|node| node.parents.as_slice())
    }

    /// Returns the roles that directly inherit from `role`.
    pub fn children(&self, role: &str) -> AclResult<&[String]> {
        self.node(role).map(|node| node.children.as_slice())
    }

    /// Checks whether `role` inherits from `ancestor`.
    ///
    /// With `only_direct` only the direct parents are considered, otherwise
    /// every ancestor reachable through any parent chain.
    pub fn inherits(&self, role: &str, ancestor: &str, only_direct: bool) -> AclResult<bool> {
        let node = self.node(role)?;
        let ancestor = self.get(ancestor)?;

        if node.parents.iter().any(|p| p == ancestor) {
            return Ok(true);
        }
        if only_direct {
            return Ok(false);
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = node.parents.iter().map(String::as_str).collect();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if current == ancestor {
                return Ok(true);
            }
            if let Some(parent_node) = self.roles.get(current) {
                stack.extend(parent_node.parents.iter().map(String::as_str));
            }
        }

        Ok(false)
    }

    /// Removes a role, detaching it from its parents and children.
    pub fn remove(&mut self, role: &str) -> AclResult<()> {
        let node = self
            .roles
            .shift_remove(role)
            .ok_or_else(|| AclError::RoleNotFound(role.to_string()))?;

        for child in &node.children {
            if let Some(child_node) = self.roles.get_mut(child) {
                child_node.parents.retain(|p| p != role);
            }
        }
        for parent in &node.parents {
            if let Some(parent_node) = self.roles.get_mut(parent) {
                parent_node.children.retain(|c| c != role);
            }
        }

        debug!(role = %role, "Removed role");
        Ok(())
    }

    /// Removes every role.
    pub fn remove_all(&mut self) {
        self.roles.clear();
    }

    /// Returns role identifiers in registration order.
    #[must_use]
    pub fn roles(&self) -> Vec<&str> {
        self.roles.keys().map(String::as_str).collect()
    }

    /// Returns the number of registered roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns true if no role is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    fn node(&self, role: &str) -> AclResult<&RoleNode> {
        self.roles
            .get(role)
            .ok_or_else(|| AclError::RoleNotFound(role.to_string()))
    }
}
