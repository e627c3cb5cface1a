//! Resource tree.

use crate::{AclError, AclResult};
use indexmap::IndexMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
struct ResourceNode {
    parent: Option<String>,
    children: Vec<String>,
}

/// Single-parent hierarchy of resources.
#[derive(Debug, Clone, Default)]
pub struct ResourceTree {
    resources: IndexMap<String, ResourceNode>,
}

impl ResourceTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource under `parent`, or as a root when `parent` is `None`.
    pub fn add(&mut self, resource: impl Into<String>, parent: Option<&str>) -> AclResult<()> {
        let resource = resource.into();
        if self.has(&resource) {
            return Err(AclError::DuplicateResource(resource));
        }

        let parent = match parent {
            Some(parent_id) => {
                let node = self
                    .resources
                    .get_mut(parent_id)
                    .ok_or_else(|| AclError::UnknownParentResource(parent_id.to_string()))?;
                node.children.push(resource.clone());
                Some(parent_id.to_string())
            }
            None => None,
        };

        debug!(resource = %resource, parent = ?parent, "Registered resource");
        self.resources.insert(
            resource,
            ResourceNode {
                parent,
                children: Vec::new(),
            },
        );

        Ok(())
    }

    /// Returns the registered identifier for `resource`.
    pub fn get(&self, resource: &str) -> AclResult<&str> {
        self.resources
            .get_key_value(resource)
            .map(|(id, _)| id.as_str())
            .ok_or_else(|| AclError::ResourceNotFound(resource.to_string()))
    }

    /// Checks if a resource is registered.
    #[must_use]
    pub fn has(&self, resource: &str) -> bool {
        self.resources.contains_key(resource)
    }

    /// Returns the parent of `resource`, `None` for a root.
    pub fn parent_of(&self, resource: &str) -> AclResult<Option<&str>> {
        self.node(resource).map(|node| node.parent.as_deref())
    }

    /// Returns the direct children of `resource`.
    pub fn children(&self, resource: &str) -> AclResult<&[String]> {
        self.node(resource).map(|node| node.children.as_slice())
    }

    /// Checks whether `resource` descends from `ancestor`.
    pub fn inherits(&self, resource: &str, ancestor: &str, only_direct: bool) -> AclResult<bool> {
        let mut current = self.node(resource)?.parent.as_deref();
        let ancestor = self.get(ancestor)?;

        if only_direct {
            return Ok(current == Some(ancestor));
        }

        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.resources.get(id).and_then(|node| node.parent.as_deref());
        }

        Ok(false)
    }

    /// Returns the ancestors of `resource`, nearest first.
    pub fn ancestors(&self, resource: &str) -> AclResult<Vec<&str>> {
        let mut lineage = Vec::new();
        let mut current = self.node(resource)?.parent.as_deref();
        while let Some(id) = current {
            lineage.push(id);
            current = self.resources.get(id).and_then(|node| node.parent.as_deref());
        }
        Ok(lineage)
    }

    /// Removes `resource` and its whole subtree.
    ///
    /// Returns the removed identifiers, the requested resource first.
    pub fn remove(&mut self, resource: &str) -> AclResult<Vec<String>> {
        let root = self.get(resource)?.to_string();

        if let Some(parent) = self.resources.get(&root).and_then(|n| n.parent.clone()) {
            if let Some(parent_node) = self.resources.get_mut(&parent) {
                parent_node.children.retain(|c| c != &root);
            }
        }

        let mut removed = Vec::new();
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.resources.shift_remove(&id) {
                pending.extend(node.children);
                removed.push(id);
            }
        }

        debug!(resource = %resource, removed = removed.len(), "Removed resource subtree");
        Ok(removed)
    }

    /// Removes every resource, returning the removed identifiers.
    pub fn remove_all(&mut self) -> Vec<String> {
        self.resources.drain(..).map(|(id, _)| id).collect()
    }

    /// Returns resource identifiers in registration order.
    #[must_use]
    pub fn resources(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }

    /// Returns the number of registered resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn node(&self, resource: &str) -> AclResult<&ResourceNode> {
        self.resources
            .get(resource)
            .ok_or_else(|| AclError::ResourceNotFound(resource.to_string()))
    }
}
