use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ImportError;

/// Field separator of a delimited file, detected once from its first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    pub fn as_char(&self) -> char {
        match self {
            Self::Comma => ',',
            Self::Semicolon => ';',
            Self::Tab => '\t',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comma => "comma",
            Self::Semicolon => "semicolon",
            Self::Tab => "tab",
        }
    }
}

/// Pick the delimiter for a file from its first line.
///
/// Semicolon wins only when it outnumbers both commas and tabs, tab only
/// when it outnumbers both commas and semicolons. Everything else,
/// including ties, falls back to comma.
pub fn detect_delimiter(first_line: &str) -> Delimiter {
    let (mut commas, mut semicolons, mut tabs) = (0usize, 0usize, 0usize);
    for c in first_line.chars() {
        match c {
            ',' => commas += 1,
            ';' => semicolons += 1,
            '\t' => tabs += 1,
            _ => {}
        }
    }

    if semicolons > commas && semicolons > tabs {
        Delimiter::Semicolon
    } else if tabs > commas && tabs > semicolons {
        Delimiter::Tab
    } else {
        Delimiter::Comma
    }
}

/// A delimited text file read from disk.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub filename: String,
    pub content: String,
    pub size_bytes: u64,
}

/// Read an input file as UTF-8 text, enforcing the size limit.
/// A leading byte-order mark is dropped.
pub fn read_input(path: &Path, max_bytes: u64) -> Result<InputFile, ImportError> {
    let size_bytes = std::fs::metadata(path)?.len();
    if size_bytes > max_bytes {
        return Err(ImportError::FileTooLarge {
            size_mb: size_bytes as f64 / (1024.0 * 1024.0),
            max_mb: max_bytes as f64 / (1024.0 * 1024.0),
        });
    }

    let bytes = std::fs::read(path)?;
    let content = String::from_utf8(bytes).map_err(|e| ImportError::NotText(e.to_string()))?;
    let content = match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    };

    Ok(InputFile {
        filename: sanitize_filename(&path.to_string_lossy()),
        content,
        size_bytes,
    })
}

/// Strip path components and limit length. Falls back to `upload.csv`.
pub fn sanitize_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.csv");

    let clean: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .take(255)
        .collect();

    if clean.is_empty() {
        "upload.csv".to_string()
    } else {
        clean
    }
}
