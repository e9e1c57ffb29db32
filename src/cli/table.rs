//! Table formatting for the pipeable list commands
//!
//! TSV output carries color and dynamic column widths for terminals; CSV
//! and Markdown stay plain for machines. The interactive views use tabled
//! pretty tables instead (see the browse/favorites commands).

use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::entities::NutritionGrade;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Numeric id
    Id(i64),
    /// Plain text, truncated to the column width
    Text(String),
    /// Nutrition grade with color coding (A/B green, C yellow, D/E red)
    Grade(NutritionGrade),
    /// Numeric value
    Number(i64),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(id).cyan(), width = width),
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Grade(grade) => {
                let s = grade.to_string();
                let styled = match grade {
                    NutritionGrade::A | NutritionGrade::B => style(&s).green(),
                    NutritionGrade::C => style(&s).yellow(),
                    NutritionGrade::D | NutritionGrade::E => style(&s).red(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Id(id) => id.to_string(),
            CellValue::Text(s) => escape_csv(s),
            CellValue::Grade(grade) => grade.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Id(id) => id.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Grade(grade) => grade.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Empty => "-".to_string(),
        };
        raw.replace('|', "\\|")
    }

    /// Get the display width of this cell's content (for dynamic sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Id(id) => id.to_string().len(),
            CellValue::Text(s) => s.chars().count(),
            CellValue::Grade(_) => 1,
            CellValue::Number(n) => n.to_string().len(),
            CellValue::Empty => 1,
        }
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(header: &'static str, width: usize) -> Self {
        Self { header, width }
    }
}

/// A row of cell values for table output
#[derive(Debug, Default)]
pub struct TableRow {
    pub cells: Vec<CellValue>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(mut self, value: CellValue) -> Self {
        self.cells.push(value);
        self
    }
}

/// Table formatter that outputs rows in the selected format
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
        }
    }

    pub fn output(&self, rows: Vec<TableRow>, format: OutputFormat, quiet: bool) {
        match format {
            OutputFormat::Csv => self.output_csv(&rows),
            OutputFormat::Md => self.output_md(&rows),
            _ => self.output_tsv(&rows, quiet),
        }
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.cells.get(i))
                    .map(|v| v.display_width())
                    .max()
                    .unwrap_or(0);
                // +2 truncation buffer, capped at the defined width
                col.header.len().max(max_content + 2).min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow], quiet: bool) {
        let widths = self.calculate_widths(rows);

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = w))
            .collect();
        println!("{}", header.join(" "));

        let total: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total));

        for row in rows {
            let parts: Vec<String> = row
                .cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| cell.format_tsv(*w))
                .collect();
            println!("{}", parts.join(" "));
        }

        if !quiet {
            println!();
            println!("{} {}(s) found.", style(rows.len()).cyan(), self.entity_name);
        }
    }

    fn output_csv(&self, rows: &[TableRow]) {
        let headers: Vec<String> = self
            .columns
            .iter()
            .map(|c| c.header.to_lowercase())
            .collect();
        println!("{}", headers.join(","));
        for row in rows {
            let values: Vec<String> = row.cells.iter().map(|c| c.format_csv()).collect();
            println!("{}", values.join(","));
        }
    }

    fn output_md(&self, rows: &[TableRow]) {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.header).collect();
        println!("| {} |", headers.join(" | "));
        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        println!("|{}|", separators.join("|"));
        for row in rows {
            let values: Vec<String> = row.cells.iter().map(|c| c.format_md()).collect();
            println!("| {} |", values.join(" | "));
        }
    }
}

/// Render a pretty boxed table for the interactive views.
pub fn pretty_table<H, R>(header: H, rows: Vec<R>) -> String
where
    H: IntoIterator,
    H::Item: Into<String>,
    R: IntoIterator,
    R::Item: Into<String>,
{
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }
    builder.build().with(Style::sharp()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_text_format() {
        let cell = CellValue::Text("Hello World".to_string());
        let tsv = cell.format_tsv(20);
        assert!(tsv.contains("Hello World"));
        assert_eq!(cell.format_csv(), "Hello World");
        assert_eq!(cell.format_md(), "Hello World");
    }

    #[test]
    fn test_cell_value_grade_format() {
        let cell = CellValue::Grade(NutritionGrade::B);
        assert_eq!(cell.format_csv(), "B");
        assert_eq!(cell.format_md(), "B");
        assert_eq!(cell.display_width(), 1);
    }

    #[test]
    fn test_cell_value_md_escapes_pipes() {
        let cell = CellValue::Text("a|b|c".to_string());
        assert_eq!(cell.format_md(), "a\\|b\\|c");
    }

    #[test]
    fn test_table_row_builder() {
        let row = TableRow::new()
            .cell(CellValue::Id(3))
            .cell(CellValue::Text("Yaourt".into()));
        assert_eq!(row.cells.len(), 2);
    }

    #[test]
    fn test_pretty_table_contains_cells() {
        let table = pretty_table(
            ["#", "Name"],
            vec![vec!["1".to_string(), "Yaourt nature".to_string()]],
        );
        assert!(table.contains("Yaourt nature"));
        assert!(table.contains("Name"));
    }
}
