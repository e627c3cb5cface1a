//! CLI command definitions and implementations.

mod inspect;
mod query;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use warden_policy::{Policy, PolicyConfig, StaticPolicy};

use crate::output::{CliError, OutputFormat};

pub use inspect::{ResourcesCommand, RolesCommand, ValidateCommand};
pub use query::{CheckCommand, InheritsCommand, VoteCommand};

/// Warden CLI
///
/// Validates and queries role/resource access control policies.
#[derive(Parser)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Policy file; repeat to layer overrides on top of the first file
    #[arg(long, short, env = "WARDEN_POLICY", global = true, value_delimiter = ',')]
    pub policy: Vec<PathBuf>,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Validate a policy file and build its access control list
    Validate(ValidateCommand),

    /// List declared roles
    Roles(RolesCommand),

    /// List declared resources
    #[command(alias = "res")]
    Resources(ResourcesCommand),

    /// Check whether a role may use a privilege on a resource
    Check(CheckCommand),

    /// Check whether a role inherits from another
    Inherits(InheritsCommand),

    /// Vote on an attribute for a principal
    Vote(VoteCommand),
}

impl Cli {
    /// Runs the CLI command.
    pub fn run(self) -> Result<(), CliError> {
        if self.no_color {
            colored::control::set_override(false);
        }

        let policy = self.load_policy()?;

        match self.command {
            Commands::Validate(cmd) => cmd.run(&policy, self.format),
            Commands::Roles(cmd) => cmd.run(&policy, self.format),
            Commands::Resources(cmd) => cmd.run(&policy, self.format),
            Commands::Check(cmd) => cmd.run(&policy, self.format),
            Commands::Inherits(cmd) => cmd.run(&policy, self.format),
            Commands::Vote(cmd) => cmd.run(policy, self.format),
        }
    }

    fn load_policy(&self) -> Result<Policy<StaticPolicy>, CliError> {
        let config = PolicyConfig::load_layered(&self.policy)?;
        Ok(Policy::new(StaticPolicy::new(config)))
    }
}

/// Maps the `*` placeholder to "any".
fn scope(arg: &str) -> Option<&str> {
    (arg != "*").then_some(arg)
}
