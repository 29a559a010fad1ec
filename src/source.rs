//! Dataset sources
//!
//! The backing load-and-parse operation behind the [`DataStore`](crate::DataStore).
//! A source turns a [`DatasetKind`] into a parsed [`Dataset`]; it holds no
//! cache of its own, caching and request coalescing happen in the store.
//!
//! Input files are delimiter-separated text: one header row, then data rows.
//! Each record gets exactly one entry per header column. Empty cells and the
//! missing tail of a short row become `None`, never an absent key. A quoted
//! cell may span line breaks, so everything the CSV export writes reads back.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::{Dataset, DatasetKind, Record, RecordId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing header row")]
    MissingHeader,
    /// Line on which the row holding the open quote starts.
    #[error("unterminated quoted cell in row starting on line {0}")]
    UnterminatedQuote(usize),
}

#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn load(&self, kind: DatasetKind) -> Result<Dataset>;
}

/// Parse delimiter-separated text into a dataset.
pub fn parse_delimited(
    kind: DatasetKind,
    text: &str,
    delimiter: char,
) -> std::result::Result<Dataset, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = split_rows(text, delimiter)?.into_iter();

    let columns: Vec<String> = rows
        .next()
        .ok_or(ParseError::MissingHeader)?
        .into_iter()
        .map(|c| c.unwrap_or_default())
        .collect();

    let records = rows
        .enumerate()
        .map(|(row, cells)| {
            let mut cells = cells.into_iter();
            let fields: Vec<(String, Option<String>)> = columns
                .iter()
                .map(|column| (column.clone(), cells.next().flatten()))
                .collect();
            Record::new(RecordId::new(kind, row), fields)
        })
        .collect();

    Ok(Dataset::new(kind, columns, records))
}

/// Split text into rows of cells. Double-quoted cells may contain the
/// delimiter and line breaks, and `""` inside quotes is a literal quote.
/// Empty cells are `None`. Whitespace-only lines are skipped.
fn split_rows(
    text: &str,
    delimiter: char,
) -> std::result::Result<Vec<Vec<Option<String>>>, ParseError> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut blank = true;
    let mut line_no = 1;
    let mut row_start = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if quoted {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => quoted = false,
                '\n' => {
                    line_no += 1;
                    cell.push(c);
                }
                _ => cell.push(c),
            }
            continue;
        }

        match c {
            '"' if cell.is_empty() => {
                quoted = true;
                blank = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(finish_cell(&mut cell));
                let finished = std::mem::take(&mut row);
                if !blank {
                    rows.push(finished);
                }
                line_no += 1;
                row_start = line_no;
                blank = true;
            }
            c if c == delimiter => {
                row.push(finish_cell(&mut cell));
                blank = false;
            }
            c => {
                if !c.is_whitespace() {
                    blank = false;
                }
                cell.push(c);
            }
        }
    }

    if quoted {
        return Err(ParseError::UnterminatedQuote(row_start));
    }
    row.push(finish_cell(&mut cell));
    if !blank {
        rows.push(row);
    }
    Ok(rows)
}

fn finish_cell(cell: &mut String) -> Option<String> {
    let value = std::mem::take(cell);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Reads the three dataset files from a directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    paths: HashMap<DatasetKind, PathBuf>,
    delimiter: char,
}

impl DirSource {
    pub fn from_config(config: &Config) -> Self {
        let paths = DatasetKind::ALL
            .iter()
            .map(|&kind| (kind, config.path_for(kind)))
            .collect();
        Self {
            paths,
            delimiter: config.delimiter,
        }
    }
}

#[async_trait]
impl DatasetSource for DirSource {
    async fn load(&self, kind: DatasetKind) -> Result<Dataset> {
        let path = self
            .paths
            .get(&kind)
            .ok_or_else(|| Error::load(kind.name(), "no file configured"))?;

        tracing::debug!(dataset = %kind, path = %path.display(), "Reading dataset file");

        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::load(kind.name(), format!("{}: {}", path.display(), e)))?;
        parse_delimited(kind, &text, self.delimiter).map_err(|e| Error::load(kind.name(), e))
    }
}

/// Serves datasets from in-memory text. Missing kinds fail to load.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    texts: HashMap<DatasetKind, String>,
    delimiter: Option<char>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(mut self, kind: DatasetKind, text: impl Into<String>) -> Self {
        self.texts.insert(kind, text.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

#[async_trait]
impl DatasetSource for MemorySource {
    async fn load(&self, kind: DatasetKind) -> Result<Dataset> {
        let text = self
            .texts
            .get(&kind)
            .ok_or_else(|| Error::load(kind.name(), "dataset not available"))?;
        parse_delimited(kind, text, self.delimiter.unwrap_or(','))
            .map_err(|e| Error::load(kind.name(), e))
    }
}
