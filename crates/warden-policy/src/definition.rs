//! Policy definitions and the cached ACL built from them.

use crate::{PolicyConfig, PolicyResult};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use warden_acl::{Acl, AclResult};

/// Source of an application's access policy.
///
/// The declared topology and declarative rules come from [`PolicyConfig`];
/// rules that need code (assertions, computed targets) go in
/// [`PolicyDefinition::load_rules`], which runs after the declarative rules.
pub trait PolicyDefinition: Send + Sync {
    /// Returns the declared roles, resources and rules.
    fn config(&self) -> &PolicyConfig;

    /// Adds programmatic rules.
    fn load_rules(&self, acl: &mut Acl) -> AclResult<()> {
        let _ = acl;
        Ok(())
    }
}

/// Definition backed only by a policy file.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicy {
    config: PolicyConfig,
}

impl StaticPolicy {
    /// Creates a definition from an already loaded configuration.
    #[must_use]
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Loads the definition from a policy file.
    pub fn load(path: impl AsRef<Path>) -> PolicyResult<Self> {
        PolicyConfig::load(path).map(Self::new)
    }
}

impl PolicyDefinition for StaticPolicy {
    fn config(&self) -> &PolicyConfig {
        &self.config
    }
}

/// Policy whose ACL is built on first use and shared afterwards.
pub struct Policy<D> {
    definition: D,
    acl: OnceCell<Arc<Acl>>,
}

impl<D: PolicyDefinition> Policy<D> {
    /// Creates a policy. Nothing is built until the first query.
    #[must_use]
    pub fn new(definition: D) -> Self {
        Self {
            definition,
            acl: OnceCell::new(),
        }
    }

    /// Returns the definition.
    #[must_use]
    pub fn definition(&self) -> &D {
        &self.definition
    }

    /// Returns the ACL, building it on first call.
    ///
    /// A failed build is returned to the caller and attempted again on the
    /// next call.
    pub fn acl(&self) -> PolicyResult<Arc<Acl>> {
        self.acl
            .get_or_try_init(|| self.build().map(Arc::new))
            .map(Arc::clone)
    }

    /// Returns true once the ACL has been built.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.acl.get().is_some()
    }

    /// Decides whether `role` may exercise `privilege` on `resource`.
    ///
    /// `None` stands for "any role", "any resource", or "all privileges".
    pub fn is_allowed(
        &self,
        role: Option<&str>,
        resource: Option<&str>,
        privilege: Option<&str>,
    ) -> PolicyResult<bool> {
        Ok(self.acl()?.is_allowed(role, resource, privilege)?)
    }

    /// Checks whether `role` inherits from `ancestor`.
    pub fn inherits_role(&self, role: &str, ancestor: &str, only_direct: bool) -> PolicyResult<bool> {
        Ok(self.acl()?.inherits_role(role, ancestor, only_direct)?)
    }

    /// Role identifiers mapped to display names, without building the ACL.
    #[must_use]
    pub fn roles_list(&self) -> IndexMap<String, String> {
        self.definition.config().roles_list()
    }

    fn build(&self) -> PolicyResult<Acl> {
        let mut acl = self.definition.config().build_acl()?;
        self.definition.load_rules(&mut acl)?;
        info!(
            roles = acl.roles().len(),
            resources = acl.resources().len(),
            rules = acl.rules().rule_count(),
            "Access control list built"
        );
        Ok(acl)
    }
}

impl<D: std::fmt::Debug> std::fmt::Debug for Policy<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Policy")
            .field("definition", &self.definition)
            .field("built", &self.acl.get().is_some())
            .finish()
    }
}
