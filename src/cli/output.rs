//! Tabular output for list commands
//!
//! A [`Listing`] holds display rows plus the serializable records behind
//! them, and renders either according to the selected [`OutputFormat`].

use console::Term;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::escape_csv;
use crate::cli::OutputFormat;

pub struct Listing {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Listing {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.rows.push(row.into_iter().map(|c| c.to_string()).collect());
    }

    /// Render the listing; `records` backs the json format
    pub fn render<T: Serialize>(&self, format: OutputFormat, records: &T) -> miette::Result<String> {
        let out = match resolve(format) {
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(records)
                    .map_err(|e| miette::miette!("JSON serialization failed: {}", e))?;
                json.push('\n');
                json
            }
            OutputFormat::Csv => self.delimited(",", escape_csv),
            OutputFormat::Md => {
                let mut table = self.builder().build();
                table.with(Style::markdown());
                format!("{}\n", table)
            }
            OutputFormat::Id => {
                let mut out = String::new();
                for row in &self.rows {
                    if let Some(first) = row.first() {
                        out.push_str(first);
                        out.push('\n');
                    }
                }
                out
            }
            OutputFormat::Auto => {
                let mut table = self.builder().build();
                table.with(Style::rounded());
                format!("{}\n", table)
            }
            OutputFormat::Tsv => self.delimited("\t", |s| s.replace(['\t', '\n'], " ")),
        };
        Ok(out)
    }

    pub fn print<T: Serialize>(&self, format: OutputFormat, records: &T) -> miette::Result<()> {
        print!("{}", self.render(format, records)?);
        Ok(())
    }

    fn builder(&self) -> Builder {
        let mut builder = Builder::default();
        builder.push_record(self.headers.iter().copied());
        for row in &self.rows {
            builder.push_record(row.iter().map(String::as_str));
        }
        builder
    }

    fn delimited(&self, sep: &str, escape: impl Fn(&str) -> String) -> String {
        let mut out = String::new();
        out.push_str(&self.headers.join(sep).to_uppercase());
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| escape(c)).collect();
            out.push_str(&cells.join(sep));
            out.push('\n');
        }
        out
    }
}

/// Auto prints a table on a terminal and tsv otherwise; every other format
/// is returned unchanged
pub fn resolve(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto if Term::stdout().is_term() => OutputFormat::Auto,
        OutputFormat::Auto => OutputFormat::Tsv,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Listing {
        let mut listing = Listing::new(&["id", "type", "quantity"]);
        listing.push(["1", "USB-C Cable", "5"]);
        listing.push(["2", "HDMI, 2m", "1"]);
        listing
    }

    #[test]
    fn test_tsv_and_csv() {
        let listing = sample();
        let tsv = listing.render(OutputFormat::Tsv, &()).unwrap();
        assert_eq!(tsv, "ID\tTYPE\tQUANTITY\n1\tUSB-C Cable\t5\n2\tHDMI, 2m\t1\n");

        let csv = listing.render(OutputFormat::Csv, &()).unwrap();
        assert!(csv.contains("2,\"HDMI, 2m\",1\n"));
    }

    #[test]
    fn test_id_and_json() {
        let listing = sample();
        assert_eq!(listing.render(OutputFormat::Id, &()).unwrap(), "1\n2\n");

        let json = listing
            .render(OutputFormat::Json, &vec![("USB-C Cable", 5)])
            .unwrap();
        assert!(json.contains("\"USB-C Cable\""));
    }

    #[test]
    fn test_markdown_has_header_row() {
        let md = sample().render(OutputFormat::Md, &()).unwrap();
        assert!(md.lines().next().unwrap().contains("quantity"));
        assert!(md.contains("| USB-C Cable"));
    }
}
