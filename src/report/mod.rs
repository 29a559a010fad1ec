//! Export of selected records
//!
//! This module writes a table selection to disk in one of three formats:
//!
//! - **HTML**: standalone page with the selection rendered as a table
//! - **JSON**: array of field maps, nulls kept
//! - **CSV**: header row plus one row per record, spreadsheet-compatible
//!
//! # Usage
//!
//! ```ignore
//! use ledform::report;
//!
//! // Automatically picks format based on extension
//! report::generate("selection.html", &keys, &records)?;  // HTML
//! report::generate("selection.json", &keys, &records)?;  // JSON
//! report::generate("selection.csv", &keys, &records)?;   // CSV
//! ```

pub mod csv;
pub mod html;
pub mod json;

use crate::record::Record;
use serde::Serialize;
use std::io;
use std::path::Path;

/// Generate an export in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, keys: &[String], records: &[Record]) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;

    tracing::debug!(path = %path.display(), rows = records.len(), format = %ext, "Writing export");

    match ext.as_str() {
        "html" | "htm" => html::write(&mut file, keys, records),
        "json" => json::write(&mut file, keys, records),
        _ => csv::write(&mut file, keys, records),
    }
}

/// Row counts per distinct value of one field, in first-occurrence order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub groups: Vec<(String, usize)>,
}

impl Summary {
    pub fn from_records(records: &[Record], field: &str) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };

        for r in records {
            let value = r.value(field);
            match summary.groups.iter_mut().find(|(name, _)| name == value) {
                Some((_, count)) => *count += 1,
                None => summary.groups.push((value.to_string(), 1)),
            }
        }

        summary
    }

    /// One-line description, e.g. `3 rows (Sofia: 2, Plovdiv: 1)`
    pub fn describe(&self) -> String {
        if self.groups.is_empty() {
            return format!("{} rows", self.total);
        }
        let groups: Vec<String> = self
            .groups
            .iter()
            .map(|(name, count)| format!("{}: {}", name, count))
            .collect();
        format!("{} rows ({})", self.total, groups.join(", "))
    }
}
