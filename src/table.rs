//! Plain-text column layout for terminal output.

use std::fmt::Write as _;

/// Converts a 1-based column position into its spreadsheet letter
/// (1 -> A, 26 -> Z, 27 -> AA).
pub fn column_letter(position: usize) -> String {
    let mut remaining = position;
    let mut letters = Vec::new();
    while remaining > 0 {
        let rem = (remaining - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        remaining = (remaining - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Lays out rows under a header line and a dashed rule, padding every column
/// to its widest cell. Trailing padding is dropped.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| cell_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", join_padded(headers, &widths));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", join_padded(&rule, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", join_padded(row, &widths));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let flat = flatten(cell);
        let pad = width.saturating_sub(cell_width(&flat));
        line.push_str(&flat);
        line.push_str(&" ".repeat(pad));
    }
    line.trim_end().to_string()
}

fn cell_width(value: &str) -> usize {
    flatten(value).chars().filter(|c| !c.is_control()).count()
}

fn flatten(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect()
}
