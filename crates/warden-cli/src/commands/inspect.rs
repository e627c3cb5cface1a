//! Policy inspection commands.

use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;
use warden_policy::{Policy, PolicyDefinition, StaticPolicy};

use crate::output::{
    print_list, print_output, success, CliError, ListRow, OutputFormat, TableDisplay,
};

/// Validate a policy.
#[derive(Args)]
pub struct ValidateCommand {}

/// Validation summary.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    /// Declared roles.
    pub roles: usize,
    /// Declared resources.
    pub resources: usize,
    /// Declarative rules.
    pub rules: usize,
    /// Rules stored in the built list, the global rule included.
    pub stored_rules: usize,
}

impl TableDisplay for ValidationReport {
    fn print_table(&self) {
        success("Policy is valid");
        println!("{}: {}", "Roles".bold(), self.roles);
        println!("{}: {}", "Resources".bold(), self.resources);
        println!("{}: {}", "Rules".bold(), self.rules);
        println!("{}: {}", "Stored rules".bold(), self.stored_rules);
    }

    fn print_plain(&self) {
        println!("valid");
    }
}

impl ValidateCommand {
    /// Runs the command.
    pub fn run(self, policy: &Policy<StaticPolicy>, format: OutputFormat) -> Result<(), CliError> {
        let acl = policy.acl()?;
        let config = policy.definition().config();

        let report = ValidationReport {
            roles: config.roles.len(),
            resources: config.flatten_resources().len(),
            rules: config.rules.len(),
            stored_rules: acl.rules().rule_count(),
        };
        print_output(&report, format)
    }
}

/// List roles.
#[derive(Args)]
pub struct RolesCommand {}

/// Role listing row.
#[derive(Debug, Serialize, Tabled)]
pub struct RoleRow {
    /// Role identifier.
    #[tabled(rename = "ID")]
    pub id: String,
    /// Display name.
    #[tabled(rename = "NAME")]
    pub name: String,
    /// Parents, lowest priority first.
    #[tabled(rename = "INHERITS", display_with = "join")]
    pub inherits: Vec<String>,
}

impl ListRow for RoleRow {
    fn plain(&self) -> String {
        self.id.clone()
    }
}

impl RolesCommand {
    /// Runs the command.
    pub fn run(self, policy: &Policy<StaticPolicy>, format: OutputFormat) -> Result<(), CliError> {
        let rows: Vec<RoleRow> = policy
            .definition()
            .config()
            .roles
            .iter()
            .map(|role| RoleRow {
                id: role.id.clone(),
                name: role.display_name().to_string(),
                inherits: role.inherits.clone(),
            })
            .collect();

        print_list(&rows, format)
    }
}

/// List resources.
#[derive(Args)]
pub struct ResourcesCommand {}

/// Resource listing row.
#[derive(Debug, Serialize, Tabled)]
pub struct ResourceRow {
    /// Resource identifier.
    #[tabled(rename = "ID")]
    pub id: String,
    /// Display name.
    #[tabled(rename = "NAME")]
    pub name: String,
    /// Parent resource.
    #[tabled(rename = "PARENT", display_with = "display_parent")]
    pub parent: Option<String>,
}

impl ListRow for ResourceRow {
    fn plain(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{} {parent}", self.id),
            None => self.id.clone(),
        }
    }
}

impl ResourcesCommand {
    /// Runs the command.
    pub fn run(self, policy: &Policy<StaticPolicy>, format: OutputFormat) -> Result<(), CliError> {
        let rows: Vec<ResourceRow> = policy
            .definition()
            .config()
            .flatten_resources()
            .into_iter()
            .map(|(resource, parent)| ResourceRow {
                id: resource.id.clone(),
                name: resource.display_name().to_string(),
                parent: parent.map(str::to_string),
            })
            .collect();

        print_list(&rows, format)
    }
}

fn join(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

fn display_parent(parent: &Option<String>) -> String {
    parent.clone().unwrap_or_else(|| "-".to_string())
}
