//! Records and datasets
//!
//! A [`Record`] is one row of a loaded dataset: an ordered mapping from field
//! name to an optional string value. Empty cells are kept as `None` so that
//! every record of a dataset has the same field set.
//!
//! Every record carries a [`RecordId`] assigned at load time. Widgets track
//! selections by this id instead of by position, so a selection survives
//! sorting and can be carried across a data replacement.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// The three reference collections behind the forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// LED pixel pitch specifications
    Pixels,
    /// Video clip durations
    Durations,
    /// Screen installation locations
    Locations,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [
        DatasetKind::Pixels,
        DatasetKind::Durations,
        DatasetKind::Locations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DatasetKind::Pixels => "pixels",
            DatasetKind::Durations => "durations",
            DatasetKind::Locations => "locations",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stable identity of a record: the collection it came from plus its row
/// ordinal in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    pub kind: DatasetKind,
    pub row: usize,
}

impl RecordId {
    pub fn new(kind: DatasetKind, row: usize) -> Self {
        Self { kind, row }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.row)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: RecordId,
    fields: Vec<(String, Option<String>)>,
}

impl Record {
    pub fn new<K, V, I>(id: RecordId, fields: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, Option<V>)>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.map(Into::into)))
            .collect();
        Self { id, fields }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Value of `field`, `None` when the cell is null or the field is absent.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Value of `field` with null and absent both reading as the empty string.
    pub fn value(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// Serialized as a plain field map; the id is an in-process identity only.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A loaded collection. Immutable once built; shared through `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    kind: DatasetKind,
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(kind: DatasetKind, columns: Vec<String>, records: Vec<Record>) -> Self {
        Self {
            kind,
            columns,
            records,
        }
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// Header columns in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
