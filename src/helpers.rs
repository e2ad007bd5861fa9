use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Whole cause chain on one line, e.g. `Error in deleting bucket `a`: DeleteBucket failed: ...`
pub fn fmt_error(error: &anyhow::Error) -> String {
    format!("{error:#}").red().bold().to_string()
}

pub fn print_table<T: Tabled>(rows: &[T]) {
    let mut table = Table::new(rows);
    table.with(Style::rounded());

    println!("{table}");
}
