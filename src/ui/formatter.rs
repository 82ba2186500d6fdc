//! Pure formatting functions for console output.

use crate::ledger::BranchLedger;
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Format and print a warning with a yellow warning icon.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// One line per known remote branch: `remote/branch  type  result  version`
pub fn format_ledger_lines(ledger: &BranchLedger) -> Vec<String> {
    let width = ledger
        .remote_branches()
        .map(|b| b.remote_alias().len() + b.branch_name().len() + 1)
        .max()
        .unwrap_or(0);

    ledger
        .remote_branches()
        .map(|branch| {
            let name = format!("{}/{}", branch.remote_alias(), branch.branch_name());
            format!(
                "{:<width$}  {:<8}  {:<9}  {}",
                name,
                branch.branch_type().as_str(),
                branch.last_build_result().map_or("-", |r| r.as_str()),
                branch.last_build_version().unwrap_or("-"),
                width = width
            )
        })
        .collect()
}

/// Display the remote branches recorded in a ledger snapshot.
///
/// # Arguments
/// * `build_number` - Build the snapshot belongs to
/// * `ledger` - The snapshot to display
pub fn display_ledger(build_number: u64, ledger: &BranchLedger) {
    let dry_run = if ledger.is_dry_run() { " (dry run)" } else { "" };
    println!(
        "{}",
        style(format!("Ledger of build #{}{}", build_number, dry_run)).bold()
    );

    if ledger.is_empty() {
        println!("  no remote branches recorded");
        return;
    }

    for line in format_ledger_lines(ledger) {
        println!("  {}", line);
    }
}
