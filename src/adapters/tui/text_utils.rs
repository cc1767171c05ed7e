use chrono::{DateTime, Local, Utc};
use ratatui::text::Line;

pub(crate) const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(crate) const HEADER_KEY_HELP: &str =
    "[:]command [/]filter [R]refresh [Esc]back [?]help [Ctrl+C]quit";

const HELP_TEXT: &[&str] = &[
    "Global:",
    "  :            : Open the command palette (switch service)",
    "  /            : Filter the current table",
    "  r / R        : Refresh the current level",
    "  ?            : Toggle this help",
    "  Ctrl+L       : Toggle the log viewer",
    "  Ctrl+C       : Quit",
    "",
    "Tables:",
    "  Up/Down, k/j : Move selection",
    "  PgUp/PgDown  : Move selection by a page",
    "  Home/End     : First / last row",
    "  Enter        : Open the selected item",
    "  Esc          : Back to the previous level",
    "",
    "Filter field:",
    "  Enter        : Apply filter",
    "  Esc          : Discard typed text",
    "",
    "Command palette:",
    "  Tab/Down     : Next suggestion",
    "  Shift+Tab/Up : Previous suggestion",
    "  Enter        : Switch to typed or highlighted service",
    "",
    "ECR:",
    "  c / y        : Copy repository or image URI",
    "",
    "Route53 records:",
    "  e            : Edit record (Tab moves between fields, Ctrl+S saves)",
    "  Ctrl+D       : Delete record",
];

pub(crate) fn help_lines() -> Vec<Line<'static>> {
    HELP_TEXT.iter().map(|&s| Line::from(s)).collect()
}

/// Human readable byte count: B below 1 KiB, then KB/MB/GB with two decimals.
pub(crate) fn format_size(bytes: i64) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if value < KIB * KIB {
        format!("{:.2}KB", value / KIB)
    } else if value < KIB * KIB * KIB {
        format!("{:.2}MB", value / KIB / KIB)
    } else {
        format!("{:.2}GB", value / KIB / KIB / KIB)
    }
}

pub(crate) fn format_timestamp(value: Option<&DateTime<Utc>>) -> String {
    value
        .map(|t| {
            t.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}
