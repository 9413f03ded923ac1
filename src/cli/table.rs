//! Table formatting for CLI list commands
//!
//! Rows are built from typed cells so that each output format (aligned
//! columns, CSV, Markdown, bare IDs) can render the same data its own way.

use chrono::{DateTime, Utc};
use console::style;

use crate::cli::helpers::{escape_csv, format_date, highlight, truncate_str};
use crate::cli::OutputFormat;
use crate::entities::ProductType;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Record id (cyan)
    Id(i64),
    /// Plain text, truncated to the column width
    Text(String),
    /// Text with the span matching the search query emphasized
    Match { text: String, query: String },
    /// Product type, shown by label with color coding
    Type(ProductType),
    /// Right-aligned integer
    Number(i64),
    /// Timestamp displayed as a human date (`Feb 15, 2026`)
    Date(DateTime<Utc>),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Text cell, or `Empty` when absent or blank
    pub fn optional(value: Option<&str>) -> Self {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => CellValue::Text(v.to_string()),
            None => CellValue::Empty,
        }
    }

    /// Searchable cell; plain text when no query is active
    pub fn matched(text: &str, query: Option<&str>) -> Self {
        match query {
            Some(q) if !q.trim().is_empty() => CellValue::Match {
                text: text.to_string(),
                query: q.to_string(),
            },
            _ => CellValue::Text(text.to_string()),
        }
    }

    /// Format for aligned terminal output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(id).cyan(), width = width),
            CellValue::Text(s) => {
                format!("{:<width$}", truncate_str(s, width), width = width)
            }
            CellValue::Match { text, query } => {
                let shown = truncate_str(text, width);
                let visible = shown.chars().count();
                let rendered = if shown == *text {
                    highlight(text, query)
                } else {
                    shown
                };
                format!("{}{}", rendered, " ".repeat(width.saturating_sub(visible)))
            }
            CellValue::Type(t) => {
                let label = t.label();
                let styled = match t {
                    ProductType::AirFilter => style(label).cyan(),
                    ProductType::OilFilter => style(label).yellow(),
                    ProductType::AirOilSeparator => style(label).magenta(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::Date(dt) => format!("{:<width$}", format_date(dt), width = width),
            CellValue::Empty => format!("{:<width$}", style("-").dim(), width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Date(dt) => dt.to_rfc3339(),
            other => escape_csv(&other.raw()),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Type(t) => t.label().to_string(),
            CellValue::Date(dt) => format_date(dt),
            CellValue::Empty => "-".to_string(),
            other => other.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(id) => id.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Match { text, .. } => text.clone(),
            CellValue::Type(t) => t.as_str().to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(dt) => format_date(dt),
            CellValue::Empty => String::new(),
        }
    }

    /// Display width of this cell's content (for column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Type(t) => t.label().len(),
            CellValue::Empty => 1,
            other => other.raw().chars().count(),
        }
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub id: i64,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            show_summary: true,
        }
    }

    /// Toggle the "N record(s) found" line after aligned output
    pub fn with_summary(mut self, show: bool) -> Self {
        self.show_summary = show;
        self
    }

    /// Render rows in the specified format
    ///
    /// JSON and YAML are serialized from the records themselves by the
    /// caller; here they fall back to aligned columns.
    pub fn render(&self, rows: &[TableRow], format: OutputFormat, visible: &[&str]) -> String {
        match format {
            OutputFormat::Csv => self.render_csv(rows, visible),
            OutputFormat::Md => self.render_md(rows, visible),
            OutputFormat::Id => rows.iter().map(|r| format!("{}\n", r.id)).collect(),
            _ => self.render_tsv(rows, visible),
        }
    }

    /// Print rows in the specified format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat, visible: &[&str]) {
        print!("{}", self.render(rows, format, visible));
    }

    fn visible_columns<'c>(
        &'c self,
        visible: &'c [&'c str],
    ) -> impl Iterator<Item = &'c ColumnDef> {
        self.columns.iter().filter(move |c| visible.contains(&c.key))
    }

    /// Size each column to its content, capped at the column's width
    fn calculate_widths(&self, rows: &[TableRow], visible: &[&str]) -> Vec<usize> {
        let id_width = rows
            .iter()
            .map(|r| r.id.to_string().len())
            .max()
            .unwrap_or(0)
            .max(2);

        let mut widths = vec![id_width];
        for col in self.visible_columns(visible) {
            let content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(CellValue::display_width)
                .max()
                .unwrap_or(0);
            widths.push(col.header.len().max(content).min(col.width));
        }
        widths
    }

    fn render_tsv(&self, rows: &[TableRow], visible: &[&str]) -> String {
        let widths = self.calculate_widths(rows, visible);
        let mut out = String::new();

        let mut header = vec![format!(
            "{:<width$}",
            style("ID").bold().dim(),
            width = widths[0]
        )];
        for (col, w) in self.visible_columns(visible).zip(&widths[1..]) {
            header.push(format!("{:<width$}", style(col.header).bold(), width = *w));
        }
        out.push_str(header.join(" ").trim_end());
        out.push('\n');

        let total: usize = widths.iter().sum::<usize>() + widths.len() - 1;
        out.push_str(&"-".repeat(total));
        out.push('\n');

        for row in rows {
            let mut parts = vec![CellValue::Id(row.id).format_tsv(widths[0])];
            for (col, w) in self.visible_columns(visible).zip(&widths[1..]) {
                let cell = row.get(col.key).unwrap_or(&CellValue::Empty);
                parts.push(cell.format_tsv(*w));
            }
            out.push_str(parts.join(" ").trim_end());
            out.push('\n');
        }

        if self.show_summary {
            out.push('\n');
            out.push_str(&format!(
                "{} {}(s) found.\n",
                style(rows.len()).cyan(),
                self.entity_name
            ));
        }
        out
    }

    fn render_csv(&self, rows: &[TableRow], visible: &[&str]) -> String {
        let mut out = String::new();
        let mut headers = vec!["id"];
        headers.extend(self.visible_columns(visible).map(|c| c.key));
        out.push_str(&headers.join(","));
        out.push('\n');

        for row in rows {
            let mut values = vec![row.id.to_string()];
            for col in self.visible_columns(visible) {
                values.push(row.get(col.key).map(CellValue::format_csv).unwrap_or_default());
            }
            out.push_str(&values.join(","));
            out.push('\n');
        }
        out
    }

    fn render_md(&self, rows: &[TableRow], visible: &[&str]) -> String {
        let mut out = String::new();
        let mut headers = vec!["ID"];
        headers.extend(self.visible_columns(visible).map(|c| c.header));
        out.push_str(&format!("| {} |\n", headers.join(" | ")));
        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        out.push_str(&format!("|{}|\n", separators.join("|")));

        for row in rows {
            let mut values = vec![row.id.to_string()];
            for col in self.visible_columns(visible) {
                values.push(
                    row.get(col.key)
                        .map(CellValue::format_md)
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            out.push_str(&format!("| {} |\n", values.join(" | ")));
        }
        out
    }
}
