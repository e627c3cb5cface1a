//! Table formatting utilities.

use tabled::{settings::Style, Table, Tabled};

/// Trait for types that can be displayed as a table.
pub trait TableDisplay: serde::Serialize {
    /// Prints as a formatted table.
    fn print_table(&self);

    /// Prints as plain text.
    fn print_plain(&self);
}

/// Row of a listing. Tables are rendered through [`render_table`].
pub trait ListRow: Tabled + serde::Serialize {
    /// Plain-text form of the row.
    fn plain(&self) -> String;
}

/// Renders rows as a table.
pub fn render_table<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return "No data to display.".to_string();
    }
    Table::new(rows).with(Style::sharp()).to_string()
}
