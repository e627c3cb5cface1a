//! Output format options.

use clap::ValueEnum;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
    /// Compact JSON (single line).
    #[value(name = "json-compact", alias = "jsoncompact")]
    JsonCompact,
    /// YAML format.
    #[value(alias = "yml")]
    Yaml,
    /// Plain text format (for scripting).
    #[value(alias = "text")]
    Plain,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::JsonCompact => write!(f, "json-compact"),
            Self::Yaml => write!(f, "yaml"),
            Self::Plain => write!(f, "plain"),
        }
    }
}
