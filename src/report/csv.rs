//! CSV export

use crate::record::Record;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, keys: &[String], records: &[Record]) -> io::Result<()> {
    let header: Vec<String> = keys.iter().map(|k| escape(k)).collect();
    writeln!(writer, "{}", header.join(","))?;

    for r in records {
        let row: Vec<String> = keys.iter().map(|k| escape(r.value(k))).collect();
        writeln!(writer, "{}", row.join(","))?;
    }

    Ok(())
}

/// Quote a cell when it contains a delimiter, quote or line break.
fn escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
