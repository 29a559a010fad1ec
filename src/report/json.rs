//! JSON export

use crate::record::Record;
use serde_json::{Map, Value};
use std::io::{self, Write};

/// Write records as an array of objects restricted to `keys`, in key order.
/// Null cells stay `null`.
pub fn write<W: Write>(writer: &mut W, keys: &[String], records: &[Record]) -> io::Result<()> {
    let rows: Vec<Value> = records
        .iter()
        .map(|r| {
            let mut row = Map::new();
            for key in keys {
                let value = r.get(key).map(|v| Value::String(v.to_string())).unwrap_or(Value::Null);
                row.insert(key.clone(), value);
            }
            Value::Object(row)
        })
        .collect();

    serde_json::to_writer_pretty(&mut *writer, &rows)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DatasetKind, RecordId};

    #[test]
    fn test_writes_declared_keys_with_nulls() {
        let r = Record::new(
            RecordId::new(DatasetKind::Locations, 0),
            [("city", Some("Sofia")), ("addr", None), ("gps", Some("42.69,23.32"))],
        );
        let keys = vec!["city".to_string(), "addr".to_string()];
        let mut out = Vec::new();
        write(&mut out, &keys, &[r]).unwrap();

        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, serde_json::json!([{"city": "Sofia", "addr": null}]));
    }

    #[test]
    fn test_empty_selection() {
        let mut out = Vec::new();
        write(&mut out, &[], &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), "[]");
    }
}
