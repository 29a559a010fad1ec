//! City → location cascades
//!
//! [`Cascade`] wires the city dropdown to the location table: every city
//! toggle filters the locations by the full city selection and hands the
//! result to the table, keeping any rows the user already picked even if
//! their city has been deselected since.
//!
//! [`AddressCascade`] is the single-city variant: a city select feeding an
//! address select. Each refill picks the first option, so choosing a city
//! also lands on its first address.

use crate::error::Result;
use crate::pipeline::FilterPipeline;
use crate::record::Record;
use crate::widget::{DataTable, DynamicSelect, MultiselectDropdown};

pub const ADDRESS_CITY_ID: &str = "campaign-address-city";
pub const ADDRESS_ID: &str = "campaign-address";

#[derive(Debug)]
pub struct Cascade {
    pipeline: FilterPipeline,
    cities: MultiselectDropdown,
    locations: DataTable,
}

impl Cascade {
    pub fn new(pipeline: FilterPipeline) -> Self {
        Self {
            pipeline,
            cities: MultiselectDropdown::new(),
            locations: DataTable::new(),
        }
    }

    /// Fill the dropdown with the known cities and declare the table columns.
    pub async fn attach(&mut self) -> Result<()> {
        let cities = self.pipeline.unique_cities().await?;
        let columns = self.pipeline.location_columns().await?;

        self.cities.set_options(cities);
        self.locations.set_keys(columns);
        Ok(())
    }

    /// Check or uncheck a city and refresh the table. The dropdown's own
    /// listeners fire before the table is touched. If the locations cannot be
    /// loaded the error is returned and the table keeps its previous rows.
    pub async fn toggle_city(&mut self, city: &str, checked: bool) -> Result<()> {
        self.cities.toggle(city, checked);
        self.refresh().await
    }

    /// Re-run the location filter for the current city selection.
    pub async fn refresh(&mut self) -> Result<()> {
        let rows = self
            .pipeline
            .locations_by_cities(self.cities.selected())
            .await?;
        self.locations.set_data_retaining_selection(rows);
        Ok(())
    }

    pub fn dropdown(&self) -> &MultiselectDropdown {
        &self.cities
    }

    pub fn dropdown_mut(&mut self) -> &mut MultiselectDropdown {
        &mut self.cities
    }

    pub fn table(&self) -> &DataTable {
        &self.locations
    }

    pub fn table_mut(&mut self) -> &mut DataTable {
        &mut self.locations
    }

    pub fn selected_locations(&self) -> Vec<Record> {
        self.locations.selected_records()
    }
}

#[derive(Debug)]
pub struct AddressCascade {
    pipeline: FilterPipeline,
    city: DynamicSelect,
    address: DynamicSelect,
}

impl AddressCascade {
    pub fn new(pipeline: FilterPipeline) -> Self {
        Self {
            pipeline,
            city: DynamicSelect::new(ADDRESS_CITY_ID),
            address: DynamicSelect::new(ADDRESS_ID),
        }
    }

    /// Fill the city select, which lands on the first city, then fill the
    /// addresses for it.
    pub async fn attach(&mut self) -> Result<()> {
        let cities = self.pipeline.unique_cities().await?;
        self.city.set_options(cities);
        self.refresh().await
    }

    /// Pick a city and refill the addresses. Unknown cities are ignored by
    /// the select, leaving the current city in place.
    pub async fn select_city(&mut self, city: &str) -> Result<()> {
        self.city.select(city);
        self.refresh().await
    }

    /// Refill the address select for the current city.
    pub async fn refresh(&mut self) -> Result<()> {
        let addresses = match self.city.value().map(str::to_string) {
            Some(city) => self.pipeline.addresses_by_city(&city).await?,
            None => Vec::new(),
        };
        self.address.set_options(addresses);
        Ok(())
    }

    pub fn city(&self) -> &DynamicSelect {
        &self.city
    }

    pub fn address(&self) -> &DynamicSelect {
        &self.address
    }

    pub fn address_mut(&mut self) -> &mut DynamicSelect {
        &mut self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldNames;
    use crate::record::DatasetKind;
    use crate::source::MemorySource;
    use crate::store::DataStore;
    use std::sync::Arc;

    fn cascade() -> Cascade {
        let source = MemorySource::new().with_dataset(
            DatasetKind::Locations,
            "city,addr\nSofia,A1\nSofia,A2\nPlovdiv,B1\nVarna,C1\n",
        );
        let fields = FieldNames {
            city: "city".into(),
            ..FieldNames::default()
        };
        Cascade::new(FilterPipeline::new(Arc::new(DataStore::new(source)), fields))
    }

    fn addrs(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.value("addr")).collect()
    }

    #[tokio::test]
    async fn test_attach_populates_widgets() {
        let mut c = cascade();
        c.attach().await.unwrap();
        assert_eq!(c.dropdown().options(), &["Sofia", "Plovdiv", "Varna"]);
        assert_eq!(c.table().keys(), &["city", "addr"]);
        assert!(c.table().is_empty());
    }

    #[tokio::test]
    async fn test_city_selection_filters_table() {
        let mut c = cascade();
        c.attach().await.unwrap();

        c.toggle_city("Sofia", true).await.unwrap();
        assert_eq!(addrs(c.table().data()), vec!["A1", "A2"]);

        c.toggle_city("Varna", true).await.unwrap();
        assert_eq!(addrs(c.table().data()), vec!["A1", "A2", "C1"]);
    }

    #[tokio::test]
    async fn test_picked_rows_survive_city_changes() {
        let mut c = cascade();
        c.attach().await.unwrap();

        c.toggle_city("Sofia", true).await.unwrap();
        c.table_mut().toggle_row(1, true); // A2

        c.toggle_city("Sofia", false).await.unwrap();
        c.toggle_city("Plovdiv", true).await.unwrap();

        assert_eq!(addrs(c.table().data()), vec!["A2", "B1"]);
        assert_eq!(addrs(&c.selected_locations()), vec!["A2"]);
    }

    #[tokio::test]
    async fn test_dropdown_listeners_still_notified() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut c = cascade();
        c.attach().await.unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        c.dropdown_mut()
            .subscribe(move |change| sink.borrow_mut().push(change.selected.len()));

        c.toggle_city("Sofia", true).await.unwrap();
        c.toggle_city("Varna", true).await.unwrap();
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_table() {
        let store = Arc::new(DataStore::new(MemorySource::new()));
        let mut c = Cascade::new(FilterPipeline::new(store, FieldNames::default()));

        assert!(c.attach().await.is_err());
        assert!(c.toggle_city("Sofia", true).await.is_err());
        assert!(c.dropdown().is_selected("Sofia"));
        assert!(c.table().is_empty());
    }

    // ==========================================================================
    // ADDRESS CASCADE TESTS
    // ==========================================================================
    //
    // Filling a select picks its first option and emits a change, which is
    // what carries a city choice through to the address select.
    // ==========================================================================

    fn address_cascade() -> AddressCascade {
        let source = MemorySource::new().with_dataset(
            DatasetKind::Locations,
            "city,addr\nSofia,A1\nSofia,A2\nPlovdiv,B1\n",
        );
        let fields = FieldNames {
            city: "city".into(),
            address: "addr".into(),
            ..FieldNames::default()
        };
        AddressCascade::new(FilterPipeline::new(Arc::new(DataStore::new(source)), fields))
    }

    #[tokio::test]
    async fn test_attach_lands_on_first_city_and_address() {
        let mut c = address_cascade();
        c.attach().await.unwrap();

        assert_eq!(c.city().options(), &["Sofia", "Plovdiv"]);
        assert_eq!(c.city().value(), Some("Sofia"));
        assert_eq!(c.address().options(), &["A1", "A2"]);
        assert_eq!(c.address().value(), Some("A1"));
    }

    #[tokio::test]
    async fn test_city_choice_refills_addresses() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut c = address_cascade();
        c.attach().await.unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        c.address_mut().subscribe(move |value| sink.borrow_mut().push(value.clone()));

        c.select_city("Plovdiv").await.unwrap();
        assert_eq!(c.address().options(), &["B1"]);
        assert_eq!(c.address().value(), Some("B1"));
        assert_eq!(*seen.borrow(), vec![Some("B1".to_string())]);

        c.select_city("Atlantis").await.unwrap();
        assert_eq!(c.city().value(), Some("Plovdiv"));
        assert!(c.address().markup().contains(r#"<option value="B1" selected>B1</option>"#));
    }

    #[tokio::test]
    async fn test_no_cities_leaves_address_empty() {
        let source = MemorySource::new().with_dataset(DatasetKind::Locations, "city,addr\n");
        let pipeline = FilterPipeline::new(Arc::new(DataStore::new(source)), FieldNames::default());
        let mut c = AddressCascade::new(pipeline);

        c.attach().await.unwrap();
        assert_eq!(c.city().value(), None);
        assert_eq!(c.address().value(), None);
        assert!(c.address().options().is_empty());
    }
}
