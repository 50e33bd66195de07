//! Terminal output formatting for the templist CLI.
//!
//! Provides consistent, colored output using the [`console`] crate.

use console::style;

use templist_core::validate::{Issue, Severity};

/// Print a bold cyan header with an underline separator.
pub fn print_header(text: &str) {
    println!("\n{}", style(text).bold().cyan());
    println!("{}", style("=".repeat(text.len())).dim());
}

/// Print a success message prefixed with green `[OK]`.
pub fn print_success(text: &str) {
    println!("{} {}", style("[OK]").green().bold(), text);
}

/// Print a warning message prefixed with yellow `[WARN]`.
pub fn print_warning(text: &str) {
    println!("{} {}", style("[WARN]").yellow().bold(), text);
}

/// Print an error message prefixed with red `[ERROR]`.
pub fn print_error(text: &str) {
    println!("{} {}", style("[ERROR]").red().bold(), text);
}

/// Print a validation issue with the prefix matching its severity.
pub fn print_issue(issue: &Issue) {
    match issue.severity {
        Severity::Error => print_error(&issue.to_string()),
        Severity::Warning => print_warning(&issue.to_string()),
    }
}

/// Print a key-value pair with dimmed key formatting.
pub fn print_key_value(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Print one catalog row: bold name, dimmed author, then the description.
pub fn print_entry(name: &str, author: &str, description: &str) {
    println!(
        "  {} {} {}",
        style(name).bold(),
        style(format!("({author})")).dim(),
        description
    );
}
