//! Output formatting utilities for the CLI
//!
//! Tables for published tunnels and colored status messages.

use tabled::{settings::Style, Table, Tabled};

use tg_protocol::PublishedTunnelSet;

/// Format a published tunnel set as a table
///
/// Returns "No tunnels published" when the set is empty.
pub fn format_tunnels(set: &PublishedTunnelSet) -> String {
    if set.is_empty() {
        return "No tunnels published".to_string();
    }

    #[derive(Tabled)]
    struct TunnelRow {
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "PUBLIC URL")]
        url: String,
        #[tabled(rename = "LOCAL ADDRESS")]
        addr: String,
        #[tabled(rename = "ID")]
        id: String,
    }

    let rows: Vec<TunnelRow> = set
        .iter()
        .map(|t| TunnelRow {
            name: t.name.clone(),
            url: t.url.clone(),
            addr: t.addr.clone(),
            id: truncate(&t.id, 16),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Truncate a string with ellipsis if too long
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix to stderr
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow to stderr
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
