use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// JSON document written for every one-shot command.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub command: &'static str,
    pub generated_at: String,
    pub latency_ms: u64,
    pub warnings: Vec<String>,
    pub data: Value,
}

/// Display rows for `--format table`, with `label: value` lines underneath.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    summary: Vec<(String, String)>,
}

impl Table {
    pub fn new<const N: usize>(headers: [&str; N]) -> Self {
        Self {
            headers: headers.iter().map(|header| (*header).to_owned()).collect(),
            ..Self::default()
        }
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Vec<String>>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn with_summary(mut self, label: &str, value: &str) -> Self {
        self.summary.push((label.to_owned(), value.to_owned()));
        self
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths = self
            .headers
            .iter()
            .map(|header| header.chars().count())
            .collect::<Vec<_>>();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                let width = cell.chars().count();
                match widths.get_mut(index) {
                    Some(current) => *current = (*current).max(width),
                    None => widths.push(width),
                }
            }
        }
        widths
    }

    fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        let widths = self.widths();
        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .enumerate()
                .map(|(index, cell)| {
                    let pad = widths[index].saturating_sub(cell.chars().count());
                    format!("{cell}{}", " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_owned()
        };

        writeln!(out, "{}", line(&self.headers))?;
        let rule = widths.iter().map(|width| "-".repeat(*width)).collect::<Vec<_>>();
        writeln!(out, "{}", rule.join("  "))?;
        for row in &self.rows {
            writeln!(out, "{}", line(row))?;
        }

        if !self.summary.is_empty() {
            writeln!(out)?;
            let label_width = self
                .summary
                .iter()
                .map(|(label, _)| label.chars().count())
                .max()
                .unwrap_or(0);
            for (label, value) in &self.summary {
                let pad = label_width - label.chars().count();
                writeln!(out, "{label}{} : {value}", " ".repeat(pad))?;
            }
        }
        Ok(())
    }
}

pub fn render(
    envelope: &Envelope,
    table: Option<&Table>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => {
            let stdout = io::stdout();
            render_table(envelope, table, &mut stdout.lock())?;
        }
    }

    Ok(())
}

fn render_table(
    envelope: &Envelope,
    table: Option<&Table>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    writeln!(out, "command     : {}", envelope.command)?;
    writeln!(out, "generated_at: {}", envelope.generated_at)?;
    writeln!(out, "latency_ms  : {}", envelope.latency_ms)?;

    if !envelope.warnings.is_empty() {
        writeln!(out, "warnings:")?;
        for warning in &envelope.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    writeln!(out)?;
    match table {
        Some(table) => table.write_to(out)?,
        None => {
            let pretty_data = serde_json::to_string_pretty(&envelope.data)?;
            for line in pretty_data.lines() {
                writeln!(out, "  {line}")?;
            }
        }
    }

    Ok(())
}
