//! Tabular list output
//!
//! Commands build a [`Table`] of display strings; it renders as an aligned
//! table, TSV, CSV or bare IDs depending on the output format.

use std::io;

use miette::{IntoDiagnostic, Result};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

/// Rows of display cells keyed by record ID
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<(String, Vec<String>)>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Append a row; `cells` must line up with the headers
    pub fn row(&mut self, id: impl ToString, cells: Vec<String>) {
        debug_assert_eq!(cells.len(), self.headers.len());
        self.rows.push((id.to_string(), cells));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render to stdout; `format` must already be resolved from `Auto`
    pub fn print(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Id => {
                for (id, _) in &self.rows {
                    println!("{}", id);
                }
            }
            OutputFormat::Csv => {
                let mut out = csv::Writer::from_writer(io::stdout());
                out.write_record(&self.headers).into_diagnostic()?;
                for (_, cells) in &self.rows {
                    out.write_record(cells).into_diagnostic()?;
                }
                out.flush().into_diagnostic()?;
            }
            OutputFormat::Table => println!("{}", self.render_table()),
            _ => print!("{}", self.render_tsv()),
        }
        Ok(())
    }

    fn render_table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers.iter().map(|h| h.to_string()));
        for (_, cells) in &self.rows {
            builder.push_record(cells.iter().cloned());
        }
        let mut table = builder.build();
        table.with(Style::sharp());
        table.to_string()
    }

    fn render_tsv(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.headers.join("\t"));
        out.push('\n');
        for (_, cells) in &self.rows {
            let cleaned: Vec<String> = cells
                .iter()
                .map(|c| c.replace(['\t', '\n'], " "))
                .collect();
            out.push_str(&cleaned.join("\t"));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(&["CODE", "NAME"]);
        table.row("ITM-1", vec!["A1".to_string(), "Oak\tboard".to_string()]);
        table.row("ITM-2", vec!["B2".to_string(), "Glue".to_string()]);
        table
    }

    #[test]
    fn test_tsv_escapes_tabs() {
        let tsv = sample().render_tsv();
        assert_eq!(tsv, "CODE\tNAME\nA1\tOak board\nB2\tGlue\n");
    }

    #[test]
    fn test_table_contains_headers_and_cells() {
        let rendered = sample().render_table();
        assert!(rendered.contains("CODE"));
        assert!(rendered.contains("Glue"));
    }

    #[test]
    fn test_len() {
        let table = sample();
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
        assert!(Table::new(&["X"]).is_empty());
    }
}
