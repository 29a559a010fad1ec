//! ledform - Campaign form data for LED screen bookings
//!
//! ledform loads three delimited datasets (LED pixel pitches, video
//! durations, screen locations) and drives the widgets of a campaign form:
//! a multi-select city dropdown feeding a sortable, selectable location
//! table, plus two plain option lists.
//!
//! # Overview
//!
//! Each dataset is loaded at most once per [`DataStore`]. Concurrent first
//! requests share a single in-flight load; a failed load is not cached, so
//! the next request tries again.
//!
//! [`FilterPipeline`] derives the form's option lists from the cached data
//! (unique cities, locations of the selected cities, pixel and duration
//! options). The widgets are headless state machines that render their own
//! markup and notify listeners when the selection changes.
//!
//! # Quick Start
//!
//! ```no_run
//! use ledform::{Cascade, Config, DataStore, DirSource, FilterPipeline};
//! use std::sync::Arc;
//!
//! # async fn run() -> ledform::Result<()> {
//! let config = Config::default();
//! let store = Arc::new(DataStore::new(DirSource::from_config(&config)));
//! let pipeline = FilterPipeline::new(store, config.fields.clone());
//!
//! let mut cascade = Cascade::new(pipeline);
//! cascade.attach().await?;
//! cascade.toggle_city("София", true).await?;
//! cascade.table_mut().toggle_all(true);
//!
//! for record in cascade.selected_locations() {
//!     println!("{}", record.value("АДРЕСИ"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`store`]: Lazily-loaded, shared datasets
//! - [`pipeline`]: Option lists and filters derived from the datasets
//! - [`widget`]: Multi-select dropdown, single-value select, selectable data table
//! - [`cascade`]: City dropdown wired to the location table, city select
//!   wired to the address select
//! - [`report`]: Selection export (HTML, JSON, CSV)
//! - [`serve`]: HTTP front for the form

pub mod cascade;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod serve;
pub mod source;
pub mod store;
pub mod template;
pub mod widget;

pub use cascade::{AddressCascade, Cascade};
pub use config::{Config, DatasetFiles, FieldNames};
pub use error::{Error, Result};
pub use pipeline::{FilterPipeline, OptionList};
pub use record::{Dataset, DatasetKind, Record, RecordId};
pub use source::{DatasetSource, DirSource, MemorySource};
pub use store::DataStore;
pub use widget::{
    DataTable, DropdownChange, DynamicSelect, MultiselectDropdown, SelectAllState, SortDirection,
};
