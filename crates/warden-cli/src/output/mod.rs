//! Output formatting and display utilities.

mod error;
mod format;
mod table;

pub use error::{print_error, CliError, ErrorKind};
pub use format::OutputFormat;
pub use table::{render_table, ListRow, TableDisplay};

use colored::Colorize;
use serde::Serialize;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints formatted output based on the selected format.
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => data.print_table(),
        OutputFormat::Plain => data.print_plain(),
        _ => print_serialized(data, format)?,
    }
    Ok(())
}

/// Prints a list of items.
pub fn print_list<T: ListRow>(items: &[T], format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => println!("{}", render_table(items)),
        OutputFormat::Plain => items.iter().for_each(|item| println!("{}", item.plain())),
        _ => print_serialized(items, format)?,
    }
    Ok(())
}

fn print_serialized<T: Serialize + ?Sized>(data: &T, format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::JsonCompact => println!("{}", serde_json::to_string(data)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(data)?),
        OutputFormat::Table | OutputFormat::Plain => {
            return Err(CliError::output(format!("{format} output is not serialized")));
        }
    }
    Ok(())
}
