//! Implementation of the `adgap inspect` command.
//!
//! Quick column exploration over a session CSV: table shape, distinct
//! values of a column, and case-insensitive exact matching. Handy for
//! discovering how a provider's name is actually spelled in the data
//! before running an analysis against it.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use regex::RegexBuilder;

use crate::loader::{self, LoadError};

pub fn run<W: Write>(
    writer: &mut W,
    input: &Path,
    column: Option<&str>,
    find: Option<&str>,
) -> Result<()> {
    let mut reader = loader::open_table(input)?;
    let headers = reader.headers()?.clone();
    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;

    let Some(column) = column else {
        writeln!(writer, "Rows: {}", rows.len())?;
        writeln!(writer, "Columns ({}):", headers.len())?;
        for header in headers.iter() {
            writeln!(writer, "- {header}")?;
        }
        return Ok(());
    };

    let values = unique_values(&headers, &rows, column)?;

    if let Some(word) = find {
        let matches = find_exact_ignore_case(&values, word)?;
        writeln!(
            writer,
            "Values in {column} matching {word:?} (case-insensitive): {}",
            matches.len()
        )?;
        for value in matches {
            writeln!(writer, "- {value}")?;
        }
    } else {
        writeln!(writer, "Distinct values in {column}: {}", values.len())?;
        for value in values {
            writeln!(writer, "- {value}")?;
        }
    }

    Ok(())
}

/// Distinct values of a column in first-seen order.
fn unique_values(
    headers: &csv::StringRecord,
    rows: &[csv::StringRecord],
    column: &str,
) -> Result<Vec<String>, LoadError> {
    let index = headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| LoadError::MissingColumn(column.to_string()))?;

    let mut seen = std::collections::HashSet::new();
    let mut values = Vec::new();
    for row in rows {
        let value = row.get(index).unwrap_or("");
        if seen.insert(value.to_string()) {
            values.push(value.to_string());
        }
    }
    Ok(values)
}

/// Values matching `word` exactly, ignoring case.
fn find_exact_ignore_case(values: &[String], word: &str) -> Result<Vec<String>> {
    let pattern = RegexBuilder::new(&format!("^{}$", regex::escape(word)))
        .case_insensitive(true)
        .build()?;

    Ok(values
        .iter()
        .filter(|value| pattern.is_match(value))
        .cloned()
        .collect())
}
