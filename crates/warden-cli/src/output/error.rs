//! CLI error types and handling.

use std::process::ExitCode;

use colored::Colorize;
use warden_policy::PolicyError;

/// CLI error type.
#[derive(Debug)]
pub struct CliError {
    /// Error kind.
    pub kind: ErrorKind,
    /// Error message.
    pub message: String,
    /// Underlying cause.
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Access denied by the policy.
    Denied,
    /// Policy file missing or unreadable.
    Config,
    /// Policy declarations or query identifiers rejected.
    Validation,
    /// Output/formatting error.
    Output,
}

impl CliError {
    /// Creates a new CLI error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a new CLI error with a cause.
    pub fn with_cause<E>(kind: ErrorKind, message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            kind,
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates an access denied error.
    pub fn denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Denied, message)
    }

    /// Creates an output error.
    pub fn output(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Output, message)
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self.kind {
            ErrorKind::Denied => ExitCode::from(1),
            ErrorKind::Config => ExitCode::from(2),
            ErrorKind::Validation => ExitCode::from(4),
            ErrorKind::Output => ExitCode::from(6),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref cause) = self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<PolicyError> for CliError {
    fn from(error: PolicyError) -> Self {
        let (kind, message) = match &error {
            PolicyError::Config(_) => (ErrorKind::Config, "Failed to load policy"),
            PolicyError::Acl(_) => (ErrorKind::Validation, "Rejected by the access control list"),
            PolicyError::InvalidPolicy(_) | PolicyError::CyclicRoleInheritance(_) => {
                (ErrorKind::Validation, "Invalid policy")
            }
        };

        Self::with_cause(kind, format!("{message} [{}]", error.code()), error)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::with_cause(ErrorKind::Output, "JSON error", error)
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::with_cause(ErrorKind::Output, "YAML error", error)
    }
}

/// Prints an error to stderr.
pub fn print_error(error: &CliError) {
    let prefix = match error.kind {
        ErrorKind::Denied => "Denied",
        ErrorKind::Config => "Configuration error",
        ErrorKind::Validation => "Validation error",
        ErrorKind::Output => "Output error",
    };

    eprintln!("{} {}", format!("{prefix}:").red().bold(), error.message);

    if let Some(ref cause) = error.cause {
        eprintln!("  {}", format!("Caused by: {cause}").dimmed());
    }

    if error.kind == ErrorKind::Config {
        eprintln!();
        eprintln!("{}", "Hint: Point to a policy file with:".dimmed());
        eprintln!("{}", "  warden --policy policy.toml validate".dimmed());
        eprintln!("{}", "  export WARDEN_POLICY=policy.toml".dimmed());
    }
}
