//! Result sets
//!
//! The materialized output of one statement and its rendering as a
//! bordered text table.

use serde::Serialize;
use std::fmt;

use crate::types::{Row, Value};

/// Rendered in place of a table when a result has no rows
pub const EMPTY_RESULT_SET: &str = "Empty Result Set";

/// Query result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    /// Column names, in the engine's declared order
    pub columns: Vec<String>,
    /// Result rows, in the order the engine produced them
    pub rows: Vec<Row>,
    /// Number of rows inserted, updated or deleted
    pub affected_rows: u64,
}

impl ResultSet {
    /// Create a result with no columns and no rows
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            affected_rows: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column called `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at (`row`, `column`)
    pub fn get(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Serialize the result as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Format the result as a bordered table
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return EMPTY_RESULT_SET.to_string();
        }

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.values().iter().map(Value::to_string).collect())
            .collect();

        // Calculate column widths
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header = format_line(self.columns.iter(), &widths);
        let rule = "-".repeat(header.chars().count() - 2);

        let mut lines = Vec::with_capacity(cells.len() + 4);
        lines.push(format!("┌{}┐", rule));
        lines.push(header);
        lines.push(format!("|{}|", rule));
        for row in &cells {
            lines.push(format_line(row.iter(), &widths));
        }
        lines.push(format!("└{}┘", rule));

        lines.join("\n")
    }
}

/// Pad each cell to its column width: `| a   | bb  |`
fn format_line<'a>(cells: impl Iterator<Item = &'a String>, widths: &[usize]) -> String {
    let mut line: String = cells
        .zip(widths)
        .map(|(cell, w)| format!("| {:<width$} ", cell, width = *w))
        .collect();
    line.push_str(" |");
    line
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
