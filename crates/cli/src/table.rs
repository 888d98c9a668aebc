// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Column-aligned text tables for terminal output.
//!
//! Cells may carry ANSI color; widths are measured on visible characters.

use std::io::{self, Write};

use crate::color;

const GAP: &str = "  ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Paint {
    Plain,
    Muted,
    Status,
}

#[derive(Clone, Debug)]
pub struct Column {
    title: String,
    align: Align,
    paint: Paint,
    max: Option<usize>,
}

impl Column {
    fn new(title: &str, align: Align, paint: Paint) -> Self {
        Self { title: title.to_string(), align, paint, max: None }
    }

    pub fn left(title: &str) -> Self {
        Self::new(title, Align::Left, Paint::Plain)
    }

    pub fn right(title: &str) -> Self {
        Self::new(title, Align::Right, Paint::Plain)
    }

    /// Left-aligned, rendered in the muted color (ids, secondary fields).
    pub fn muted(title: &str) -> Self {
        Self::new(title, Align::Left, Paint::Muted)
    }

    /// Left-aligned, colored by job state.
    pub fn status(title: &str) -> Self {
        Self::new(title, Align::Left, Paint::Status)
    }

    /// Cap the column at `max` visible characters, eliding longer cells.
    pub fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    fn fit(&self, cell: &str) -> String {
        match self.max {
            Some(max) if max > 0 && color::visible_width(cell) > max && !cell.contains('\x1b') => {
                let mut cut: String = cell.chars().take(max - 1).collect();
                cut.push('…');
                cut
            }
            _ => cell.to_string(),
        }
    }

    fn paint(&self, cell: &str) -> String {
        match self.paint {
            Paint::Plain => cell.to_string(),
            Paint::Muted => color::muted(cell),
            Paint::Status => color::status(cell),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Append a row. Missing trailing cells render empty; extra cells are dropped.
    pub fn row(&mut self, cells: Vec<String>) {
        let mut fitted: Vec<String> = self
            .columns
            .iter()
            .zip(cells.iter())
            .map(|(col, cell)| col.fit(cell))
            .collect();
        fitted.resize(self.columns.len(), String::new());
        self.rows.push(fitted);
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .map(|row| color::visible_width(&row[i]))
                    .chain(std::iter::once(color::visible_width(&col.title)))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    pub fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        let widths = self.widths();

        let titles: Vec<String> = self.columns.iter().map(|c| c.title.clone()).collect();
        self.write_line(out, &widths, &titles, |_, cell| color::header(cell))?;
        for row in &self.rows {
            self.write_line(out, &widths, row, |col, cell| col.paint(cell))?;
        }
        Ok(())
    }

    fn write_line(
        &self,
        out: &mut dyn Write,
        widths: &[usize],
        cells: &[String],
        paint: impl Fn(&Column, &str) -> String,
    ) -> io::Result<()> {
        let last = self.columns.len().saturating_sub(1);
        let mut line = String::new();
        for (i, (col, cell)) in self.columns.iter().zip(cells).enumerate() {
            if i > 0 {
                line.push_str(GAP);
            }
            let pad = " ".repeat(widths[i].saturating_sub(color::visible_width(cell)));
            let painted = paint(col, cell);
            match col.align {
                Align::Right => {
                    line.push_str(&pad);
                    line.push_str(&painted);
                }
                Align::Left => {
                    line.push_str(&painted);
                    if i != last {
                        line.push_str(&pad);
                    }
                }
            }
        }
        writeln!(out, "{}", line.trim_end())
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
