//! Delimited-text parser for NAMASTE code files.
//!
//! Total by construction: any input, however malformed, yields a (possibly
//! empty) list of rows. Deciding that zero rows is an error belongs to the
//! processor.

use std::collections::BTreeMap;

use serde::Serialize;

use super::format::{detect_delimiter, Delimiter};
use crate::models::NormalizedRow;

/// Parser output with the metadata needed for logging and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedTable {
    pub delimiter: Delimiter,
    pub headers: Vec<String>,
    pub rows: Vec<NormalizedRow>,
    /// Data lines dropped for having fewer than two cells or only empty cells.
    pub skipped_lines: usize,
}

/// Parse delimited text into normalized rows.
pub fn parse(content: &str) -> Vec<NormalizedRow> {
    parse_table(content).rows
}

/// Parse delimited text, keeping the detected delimiter and headers.
pub fn parse_table(content: &str) -> ParsedTable {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return ParsedTable {
            delimiter: Delimiter::Comma,
            headers: Vec::new(),
            rows: Vec::new(),
            skipped_lines: 0,
        };
    };

    let delimiter = detect_delimiter(header_line);
    let headers = split_line(header_line, delimiter);
    let mut rows = Vec::new();
    let mut skipped_lines = 0;

    // Row index counts non-empty lines with the header at 0, so the first
    // data line gets placeholders NAM001 / "Term 1".
    for (index, line) in lines.enumerate().map(|(i, l)| (i + 1, l)) {
        let values = split_line(line, delimiter);
        match normalize_row(index, &headers, values) {
            Some(row) => rows.push(row),
            None => skipped_lines += 1,
        }
    }

    tracing::debug!(
        delimiter = delimiter.as_str(),
        columns = headers.len(),
        rows = rows.len(),
        skipped = skipped_lines,
        "Parsed delimited input"
    );

    ParsedTable {
        delimiter,
        headers,
        rows,
        skipped_lines,
    }
}

/// Split one line on `delimiter`, honoring double-quoted fields.
///
/// A `"` toggles the quoted state; `""` inside a quoted field is a literal
/// quote. Fields are trimmed after splitting.
pub fn split_line(line: &str, delimiter: Delimiter) -> Vec<String> {
    let sep = delimiter.as_char();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == sep && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    fields.push(current.trim().to_string());

    fields
}

fn normalize_row(index: usize, headers: &[String], mut values: Vec<String>) -> Option<NormalizedRow> {
    if values.len() < 2 || values.iter().all(|v| v.is_empty()) {
        return None;
    }

    let mut extra_fields = BTreeMap::new();
    if headers.len() > 2 && values.len() > 2 {
        for (header, value) in headers.iter().zip(values.iter()).skip(2) {
            if !header.is_empty() && !value.is_empty() {
                extra_fields.insert(header.clone(), value.clone());
            }
        }
    }

    let mut cells = values.drain(..2);
    let code = cells.next().unwrap_or_default();
    let term = cells.next().unwrap_or_default();

    Some(NormalizedRow {
        source_code: if code.is_empty() { placeholder_code(index) } else { code },
        source_term: if term.is_empty() { placeholder_term(index) } else { term },
        extra_fields,
    })
}

fn placeholder_code(index: usize) -> String {
    format!("NAM{index:03}")
}

fn placeholder_term(index: usize) -> String {
    format!("Term {index}")
}
