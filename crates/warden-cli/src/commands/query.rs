//! Access query commands.

use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use serde::Serialize;
use warden_policy::voter::ROLE_SUPER_ADMIN;
use warden_policy::{AclVoter, Policy, PolicyError, StaticPolicy, User, Vote};

use super::scope;
use crate::output::{print_output, CliError, OutputFormat, TableDisplay};

/// Check a (role, resource, privilege) triple.
#[derive(Args)]
pub struct CheckCommand {
    /// Role identifier, `*` for any role
    pub role: String,

    /// Resource identifier, `*` for any resource
    #[arg(default_value = "*")]
    pub resource: String,

    /// Privilege, `*` for all privileges
    #[arg(default_value = "*")]
    pub privilege: String,

    /// Exit with status 1 when access is denied
    #[arg(long)]
    pub fail_on_deny: bool,
}

/// Access decision.
#[derive(Debug, Serialize)]
pub struct Decision {
    /// Queried role.
    pub role: String,
    /// Queried resource.
    pub resource: String,
    /// Queried privilege.
    pub privilege: String,
    /// Whether access is allowed.
    pub allowed: bool,
}

impl TableDisplay for Decision {
    fn print_table(&self) {
        let verdict = if self.allowed {
            "ALLOWED".green().bold()
        } else {
            "DENIED".red().bold()
        };
        println!(
            "{verdict} {} -> {}:{}",
            self.role, self.resource, self.privilege
        );
    }

    fn print_plain(&self) {
        println!("{}", if self.allowed { "allow" } else { "deny" });
    }
}

impl CheckCommand {
    /// Runs the command.
    pub fn run(self, policy: &Policy<StaticPolicy>, format: OutputFormat) -> Result<(), CliError> {
        let acl = policy.acl()?;
        let allowed = acl
            .is_allowed(scope(&self.role), scope(&self.resource), scope(&self.privilege))
            .map_err(PolicyError::from)?;

        let decision = Decision {
            role: self.role,
            resource: self.resource,
            privilege: self.privilege,
            allowed,
        };
        print_output(&decision, format)?;

        if self.fail_on_deny && !allowed {
            return Err(CliError::denied(format!(
                "{} may not use {} on {}",
                decision.role, decision.privilege, decision.resource
            )));
        }
        Ok(())
    }
}

/// Check role inheritance.
#[derive(Args)]
pub struct InheritsCommand {
    /// Inheriting role
    pub role: String,

    /// Ancestor role
    pub ancestor: String,

    /// Only consider direct parents
    #[arg(long)]
    pub direct: bool,
}

/// Inheritance answer.
#[derive(Debug, Serialize)]
pub struct Inheritance {
    /// Inheriting role.
    pub role: String,
    /// Ancestor role.
    pub ancestor: String,
    /// Direct parents only.
    pub direct: bool,
    /// Whether `role` inherits from `ancestor`.
    pub inherits: bool,
}

impl TableDisplay for Inheritance {
    fn print_table(&self) {
        let verdict = if self.inherits {
            "inherits from".green()
        } else {
            "does not inherit from".red()
        };
        println!("{} {verdict} {}", self.role.bold(), self.ancestor.bold());
    }

    fn print_plain(&self) {
        println!("{}", self.inherits);
    }
}

impl InheritsCommand {
    /// Runs the command.
    pub fn run(self, policy: &Policy<StaticPolicy>, format: OutputFormat) -> Result<(), CliError> {
        let inherits = policy.inherits_role(&self.role, &self.ancestor, self.direct)?;

        print_output(
            &Inheritance {
                role: self.role,
                ancestor: self.ancestor,
                direct: self.direct,
                inherits,
            },
            format,
        )
    }
}

/// Vote on an attribute for a principal.
#[derive(Args)]
pub struct VoteCommand {
    /// Attribute, used as the resource when no subject is given
    pub attribute: String,

    /// Subject resource; the attribute becomes the privilege
    pub subject: Option<String>,

    /// Role held by the principal
    #[arg(long = "role", short = 'r', required = true)]
    pub roles: Vec<String>,

    /// Treat the principal as disabled
    #[arg(long)]
    pub inactive: bool,

    /// Role bypassing every check
    #[arg(long, default_value = ROLE_SUPER_ADMIN)]
    pub super_admin: String,
}

/// Voter answer.
#[derive(Debug, Serialize)]
pub struct Ballot {
    /// Attribute voted on.
    pub attribute: String,
    /// Subject, if any.
    pub subject: Option<String>,
    /// Vote.
    pub vote: Vote,
}

impl TableDisplay for Ballot {
    fn print_table(&self) {
        let vote = match self.vote {
            Vote::Granted => "GRANTED".green().bold(),
            Vote::Denied => "DENIED".red().bold(),
            Vote::Abstain => "ABSTAIN".yellow().bold(),
        };
        match &self.subject {
            Some(subject) => println!("{vote} {} on {subject}", self.attribute),
            None => println!("{vote} {}", self.attribute),
        }
    }

    fn print_plain(&self) {
        let vote = match self.vote {
            Vote::Granted => "granted",
            Vote::Denied => "denied",
            Vote::Abstain => "abstain",
        };
        println!("{vote}");
    }
}

impl VoteCommand {
    /// Runs the command.
    pub fn run(self, policy: Policy<StaticPolicy>, format: OutputFormat) -> Result<(), CliError> {
        let voter = AclVoter::new(Arc::new(policy)).with_super_admin_role(self.super_admin);
        let mut user = User::new(self.roles);
        if self.inactive {
            user = user.inactive();
        }

        let vote = voter.vote(&user, &self.attribute, self.subject.as_deref())?;
        print_output(
            &Ballot {
                attribute: self.attribute,
                subject: self.subject,
                vote,
            },
            format,
        )
    }
}
