// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared table renderer for list views.
//!
//! Columns auto-size to their widest cell, long values are truncated with
//! an ellipsis, and styling is applied after padding so alignment is not
//! thrown off by ANSI escapes.

use crate::color;
use std::io::Write;

/// Column text alignment.
pub enum Align {
    Left,
    Right,
}

/// How a cell's text is styled after padding.
pub enum CellStyle {
    Plain,
    /// Apply [`color::muted()`].
    Muted,
    /// Apply [`color::status()`].
    Status,
}

/// A column definition in a [`Table`].
pub struct Column {
    pub name: &'static str,
    pub align: Align,
    pub style: CellStyle,
    /// Values longer than this are truncated (`None` = unlimited).
    pub max_width: Option<usize>,
}

impl Column {
    pub fn left(name: &'static str) -> Self {
        Self {
            name,
            align: Align::Left,
            style: CellStyle::Plain,
            max_width: None,
        }
    }

    pub fn right(name: &'static str) -> Self {
        Self {
            name,
            align: Align::Right,
            style: CellStyle::Plain,
            max_width: None,
        }
    }

    pub fn muted(name: &'static str) -> Self {
        Self {
            name,
            align: Align::Left,
            style: CellStyle::Muted,
            max_width: None,
        }
    }

    pub fn status(name: &'static str) -> Self {
        Self {
            name,
            align: Align::Left,
            style: CellStyle::Status,
            max_width: None,
        }
    }

    pub fn truncated(mut self, max_width: usize) -> Self {
        self.max_width = Some(max_width);
        self
    }
}

/// Column-aligned table with a header row.
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn render(&self, out: &mut impl Write) {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let widest_cell = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| self.display_len(i, cell))
                    .max()
                    .unwrap_or(0);
                widest_cell.max(col.name.len())
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, width)| pad(col.name, *width, &col.align))
            .collect();
        let _ = writeln!(out, "{}", header.join("  ").trim_end());

        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .enumerate()
                .zip(&widths)
                .map(|((i, col), width)| {
                    let raw = row.get(i).map(String::as_str).unwrap_or("");
                    let text = truncate(raw, col.max_width);
                    let padded = pad(&text, *width, &col.align);
                    match col.style {
                        CellStyle::Plain => padded,
                        CellStyle::Muted => color::muted(&padded),
                        CellStyle::Status => color::status(&padded),
                    }
                })
                .collect();
            let _ = writeln!(out, "{}", cells.join("  ").trim_end());
        }
    }

    fn display_len(&self, column: usize, cell: &str) -> usize {
        let max = self.columns.get(column).and_then(|c| c.max_width);
        truncate(cell, max).chars().count()
    }
}

fn truncate(text: &str, max_width: Option<usize>) -> String {
    let Some(max) = max_width else {
        return text.to_string();
    };
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", keep)
}

fn pad(text: &str, width: usize, align: &Align) -> String {
    let len = text.chars().count();
    let fill = width.saturating_sub(len);
    match align {
        Align::Left => format!("{}{}", text, " ".repeat(fill)),
        Align::Right => format!("{}{}", " ".repeat(fill), text),
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
