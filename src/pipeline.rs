//! Filtered views over the cached datasets
//!
//! The pipeline derives everything the widgets display: option lists for the
//! selects and dropdowns, and the location rows for the table. The derivations
//! themselves are plain functions over record slices; [`FilterPipeline`] only
//! adds the lazy load in front of them.

use crate::config::FieldNames;
use crate::error::Result;
use crate::record::{DatasetKind, Record};
use crate::store::DataStore;
use std::collections::HashSet;
use std::sync::Arc;

/// Distinct display strings in first-occurrence order.
pub type OptionList = Vec<String>;

/// First record for every distinct value of `field`, in source order.
/// Null and absent values count as the empty string.
pub fn unique_records_by_field<'a, I>(records: I, field: &str) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut seen: HashSet<&'a str> = HashSet::new();
    let mut unique = Vec::new();
    for record in records {
        if seen.insert(record.value(field)) {
            unique.push(record);
        }
    }
    unique
}

/// Project `field` across `records`, dropping repeats.
pub fn unique_by_field<'a, I>(records: I, field: &str) -> OptionList
where
    I: IntoIterator<Item = &'a Record>,
{
    unique_records_by_field(records, field)
        .into_iter()
        .map(|r| r.value(field).to_string())
        .collect()
}

/// Records whose `field` equals `value`, in source order.
pub fn filter_by_field<'a, I>(records: I, field: &str, value: &str) -> Vec<Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|r| r.value(field) == value)
        .cloned()
        .collect()
}

/// Records whose `field` is a member of `values`, in source order.
pub fn filter_by_field_in<'a, I>(records: I, field: &str, values: &HashSet<&str>) -> Vec<Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|r| values.contains(r.value(field)))
        .cloned()
        .collect()
}

#[derive(Debug, Clone)]
pub struct FilterPipeline {
    store: Arc<DataStore>,
    fields: FieldNames,
}

impl FilterPipeline {
    pub fn new(store: Arc<DataStore>, fields: FieldNames) -> Self {
        Self { store, fields }
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    pub fn fields(&self) -> &FieldNames {
        &self.fields
    }

    pub async fn unique_cities(&self) -> Result<OptionList> {
        let locations = self.store.load_locations().await?;
        Ok(unique_by_field(locations.records(), &self.fields.city))
    }

    pub async fn locations_by_city(&self, city: &str) -> Result<Vec<Record>> {
        let locations = self.store.load_locations().await?;
        Ok(filter_by_field(locations.records(), &self.fields.city, city))
    }

    /// Address of every location in `city`, in source order. Two screens at
    /// the same address are listed twice.
    pub async fn addresses_by_city(&self, city: &str) -> Result<OptionList> {
        let rows = self.locations_by_city(city).await?;
        Ok(rows
            .iter()
            .map(|r| r.value(&self.fields.address).to_string())
            .collect())
    }

    pub async fn locations_by_cities<I, S>(&self, cities: I) -> Result<Vec<Record>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cities: Vec<S> = cities.into_iter().collect();
        let wanted: HashSet<&str> = cities.iter().map(|c| c.as_ref()).collect();
        let locations = self.store.load_locations().await?;

        let matched = filter_by_field_in(locations.records(), &self.fields.city, &wanted);
        tracing::debug!(cities = wanted.len(), rows = matched.len(), "Filtered locations");
        Ok(matched)
    }

    /// Column names of the location dataset, in file order.
    pub async fn location_columns(&self) -> Result<Vec<String>> {
        let locations = self.store.load_locations().await?;
        Ok(locations.columns().to_vec())
    }

    pub async fn pixel_pitch_options(&self) -> Result<OptionList> {
        let pixels = self.store.load(DatasetKind::Pixels).await?;
        Ok(unique_by_field(pixels.records(), &self.fields.pixel_pitch))
    }

    pub async fn duration_options(&self) -> Result<OptionList> {
        let durations = self.store.load(DatasetKind::Durations).await?;
        Ok(unique_by_field(durations.records(), &self.fields.duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    const LOCATIONS: &str = "city,addr\nSofia,A1\nSofia,A2\nPlovdiv,B1\n";

    fn pipeline() -> FilterPipeline {
        let source = MemorySource::new()
            .with_dataset(DatasetKind::Locations, LOCATIONS)
            .with_dataset(DatasetKind::Pixels, "pitch,price\nP2.5,100\nP3.9,80\nP2.5,110\n")
            .with_dataset(DatasetKind::Durations, "sec\n10\n15\n10\n30\n");
        let fields = FieldNames {
            city: "city".into(),
            address: "addr".into(),
            pixel_pitch: "pitch".into(),
            duration: "sec".into(),
        };
        FilterPipeline::new(Arc::new(DataStore::new(source)), fields)
    }

    fn addrs(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.value("addr")).collect()
    }

    // ==========================================================================
    // UNIQUE-BY-FIELD TESTS
    // ==========================================================================
    //
    // Option lists are built by keeping the first record for every distinct
    // value. The output never repeats a value and keeps the order in which
    // values first appear in the source.
    // ==========================================================================

    #[test]
    fn test_unique_preserves_first_occurrence_order() {
        let ds = crate::source::parse_delimited(
            DatasetKind::Locations,
            "city\nVarna\nSofia\nVarna\nBurgas\nSofia\n",
            ',',
        )
        .unwrap();
        assert_eq!(
            unique_by_field(ds.records(), "city"),
            vec!["Varna", "Sofia", "Burgas"]
        );
    }

    #[test]
    fn test_unique_records_keep_first_row() {
        let ds = crate::source::parse_delimited(DatasetKind::Locations, LOCATIONS, ',').unwrap();
        let unique = unique_records_by_field(ds.records(), "city");
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].value("addr"), "A1");
        assert_eq!(unique[1].value("addr"), "B1");
    }

    #[test]
    fn test_unique_nulls_collapse_to_empty() {
        let ds = crate::source::parse_delimited(DatasetKind::Locations, "city,x\n,1\nSofia,2\n,3\n", ',')
            .unwrap();
        assert_eq!(unique_by_field(ds.records(), "city"), vec!["", "Sofia"]);
    }

    #[test]
    fn test_unique_of_empty_input() {
        let records: Vec<Record> = Vec::new();
        assert!(unique_by_field(&records, "city").is_empty());
    }

    // ==========================================================================
    // LOCATION FILTER TESTS
    // ==========================================================================

    #[tokio::test]
    async fn test_addresses_by_city() {
        let p = pipeline();
        assert_eq!(p.addresses_by_city("Sofia").await.unwrap(), vec!["A1", "A2"]);
        assert!(p.addresses_by_city("Varna").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unique_cities() {
        let cities = pipeline().unique_cities().await.unwrap();
        assert_eq!(cities, vec!["Sofia", "Plovdiv"]);
    }

    #[tokio::test]
    async fn test_locations_by_city() {
        let rows = pipeline().locations_by_city("Sofia").await.unwrap();
        assert_eq!(addrs(&rows), vec!["A1", "A2"]);
    }

    #[tokio::test]
    async fn test_locations_by_cities_keeps_source_order() {
        let rows = pipeline().locations_by_cities(["Sofia"]).await.unwrap();
        assert_eq!(addrs(&rows), vec!["A1", "A2"]);

        let rows = pipeline()
            .locations_by_cities(vec!["Plovdiv".to_string(), "Sofia".to_string()])
            .await
            .unwrap();
        assert_eq!(addrs(&rows), vec!["A1", "A2", "B1"]);
    }

    #[tokio::test]
    async fn test_locations_by_unknown_city_is_empty() {
        let p = pipeline();
        assert!(p.locations_by_city("Ruse").await.unwrap().is_empty());
        assert!(p.locations_by_cities(Vec::<String>::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_location_columns() {
        let columns = pipeline().location_columns().await.unwrap();
        assert_eq!(columns, vec!["city", "addr"]);
    }

    // ==========================================================================
    // SELECT OPTION TESTS
    // ==========================================================================

    #[tokio::test]
    async fn test_pixel_and_duration_options() {
        let p = pipeline();
        assert_eq!(p.pixel_pitch_options().await.unwrap(), vec!["P2.5", "P3.9"]);
        assert_eq!(p.duration_options().await.unwrap(), vec!["10", "15", "30"]);
    }

    #[tokio::test]
    async fn test_load_failure_surfaces_to_caller() {
        let store = Arc::new(DataStore::new(MemorySource::new()));
        let p = FilterPipeline::new(store, FieldNames::default());
        assert!(p.unique_cities().await.unwrap_err().is_retryable());
    }
}
