//! Sortable, row-selectable data table
//!
//! Renders a header row for the declared keys and one body row per record,
//! each with a selection checkbox. A header "select all" checkbox reflects the
//! selection as checked, unchecked, or indeterminate.
//!
//! # Selection identity
//!
//! Rows are addressed by their current index in every operation, but the
//! selection itself is stored as a set of [`RecordId`]s. Sorting therefore
//! moves selected rows together with their checkmarks, and
//! [`DataTable::set_data_retaining_selection`] can carry a selection across a
//! data replacement without the caller reading it out first.
//!
//! [`DataTable::set_data`] keeps the plain contract: new data, empty selection.

use super::{Emitter, ListenerId};
use crate::error::Error;
use crate::record::{Record, RecordId};
use crate::template::escape_html;
use std::cmp::Ordering;
use std::collections::HashSet;

const DEFAULT_MAX_HEIGHT: &str = "400px";
const DEFAULT_MAX_WIDTH: &str = "100%";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// CSS class used on the sorted header cell.
    pub fn class(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: Option<SortDirection>,
}

impl SortState {
    fn direction_for(&self, key: &str) -> Option<SortDirection> {
        match &self.key {
            Some(k) if k == key => self.direction,
            _ => None,
        }
    }
}

/// State of the header checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllState {
    Unchecked,
    Indeterminate,
    Checked,
}

impl SelectAllState {
    pub fn from_counts(selected: usize, total: usize) -> Self {
        if selected == 0 {
            SelectAllState::Unchecked
        } else if selected >= total {
            SelectAllState::Checked
        } else {
            SelectAllState::Indeterminate
        }
    }
}

#[derive(Debug)]
pub struct DataTable {
    keys: Vec<String>,
    unsortable: HashSet<String>,
    data: Vec<Record>,
    selected: HashSet<RecordId>,
    sort: SortState,
    max_height: String,
    max_width: String,
    markup: String,
    on_selection_change: Emitter<Vec<Record>>,
}

impl DataTable {
    pub fn new() -> Self {
        let mut table = Self {
            keys: Vec::new(),
            unsortable: HashSet::new(),
            data: Vec::new(),
            selected: HashSet::new(),
            sort: SortState::default(),
            max_height: DEFAULT_MAX_HEIGHT.to_string(),
            max_width: DEFAULT_MAX_WIDTH.to_string(),
            markup: String::new(),
            on_selection_change: Emitter::new(),
        };
        table.render();
        table
    }

    // ------------------------------------------------------------------
    // Columns & presentation
    // ------------------------------------------------------------------

    /// Declare the columns, in display order.
    pub fn set_keys<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self.render();
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Every declared column is sortable unless switched off here.
    pub fn set_sortable(&mut self, key: &str, sortable: bool) {
        if sortable {
            self.unsortable.remove(key);
        } else {
            self.unsortable.insert(key.to_string());
        }
        self.render();
    }

    pub fn is_sortable(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key) && !self.unsortable.contains(key)
    }

    pub fn set_max_height(&mut self, value: impl Into<String>) {
        self.max_height = value.into();
        self.render();
    }

    pub fn set_max_width(&mut self, value: impl Into<String>) {
        self.max_width = value.into();
        self.render();
    }

    // ------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------

    /// Replace the rows. The selection is cleared; listeners are notified if
    /// anything was selected before. An active sort is re-applied.
    pub fn set_data(&mut self, records: Vec<Record>) {
        let had_selection = !self.selected.is_empty();
        self.data = dedup_by_id(records);
        self.selected.clear();
        self.apply_sort();
        self.render();

        tracing::debug!(rows = self.data.len(), "Table data replaced");
        if had_selection {
            self.emit_selection_change();
        }
    }

    /// Replace the rows while keeping the current selection. Selected records
    /// missing from `records` are placed in front of it, and every previously
    /// selected record stays selected.
    pub fn set_data_retaining_selection(&mut self, records: Vec<Record>) {
        let kept = self.selected_records();
        let incoming: HashSet<RecordId> = records.iter().map(Record::id).collect();

        let mut merged: Vec<Record> = kept
            .iter()
            .filter(|r| !incoming.contains(&r.id()))
            .cloned()
            .collect();
        let carried = merged.len();
        merged.extend(records);

        self.data = dedup_by_id(merged);
        self.selected = kept.iter().map(Record::id).collect();
        self.apply_sort();
        self.render();

        tracing::debug!(
            rows = self.data.len(),
            selected = self.selected.len(),
            carried,
            "Table data replaced, selection retained"
        );
    }

    pub fn data(&self) -> &[Record] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // ------------------------------------------------------------------
    // Sorting
    // ------------------------------------------------------------------

    /// Sort ascending by `key`, or descending if already ascending by `key`.
    /// Null and absent values compare as the empty string. The sort is stable.
    pub fn sort_by_key(&mut self, key: &str) {
        let direction = match self.sort.direction_for(key) {
            Some(SortDirection::Ascending) => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };
        self.sort = SortState {
            key: Some(key.to_string()),
            direction: Some(direction),
        };

        self.apply_sort();
        self.render();
        tracing::debug!(key, direction = direction.class(), "Table sorted");
    }

    /// Header cell click. Ignored for columns that are not sortable.
    pub fn click_header(&mut self, key: &str) {
        if self.is_sortable(key) {
            self.sort_by_key(key);
        }
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    fn apply_sort(&mut self) {
        let (Some(key), Some(direction)) = (self.sort.key.as_deref(), self.sort.direction) else {
            return;
        };
        self.data.sort_by(|a, b| {
            let ord = compare_by_key(a, b, key);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Row checkbox change for the row currently at `index`.
    pub fn toggle_row(&mut self, index: usize, checked: bool) {
        let Some(record) = self.data.get(index) else {
            tracing::warn!(index, rows = self.data.len(), "Row toggle out of range, ignored");
            return;
        };

        let id = record.id();
        if checked {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }

        self.render();
        self.emit_selection_change();
    }

    /// Header "select all" checkbox change.
    pub fn toggle_all(&mut self, checked: bool) {
        if checked {
            self.selected = self.data.iter().map(Record::id).collect();
        } else {
            self.selected.clear();
        }

        self.render();
        self.emit_selection_change();
    }

    pub fn is_row_selected(&self, index: usize) -> bool {
        self.data
            .get(index)
            .map(|r| self.selected.contains(&r.id()))
            .unwrap_or(false)
    }

    /// Current indices of the selected rows, ascending.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, r)| self.selected.contains(&r.id()))
            .map(|(i, _)| i)
            .collect()
    }

    /// Selected records in current row order.
    pub fn selected_records(&self) -> Vec<Record> {
        let records: Vec<Record> = self
            .data
            .iter()
            .filter(|r| self.selected.contains(&r.id()))
            .cloned()
            .collect();

        let in_sync = records.len() == self.selected.len();
        if !in_sync {
            let err = Error::InvariantViolation(format!(
                "{} selected rows but only {} present in table data",
                self.selected.len(),
                records.len()
            ));
            tracing::error!(error = %err, "Row selection out of sync");
        }
        debug_assert!(in_sync, "row selection refers to records missing from the table");

        records
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn select_all_state(&self) -> SelectAllState {
        SelectAllState::from_counts(self.selected.len(), self.data.len())
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&Vec<Record>) + 'static,
    {
        self.on_selection_change.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.on_selection_change.unsubscribe(id)
    }

    fn emit_selection_change(&mut self) {
        let selected = self.selected_records();
        self.on_selection_change.emit(&selected);
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Markup from the most recent render.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    fn render(&mut self) {
        let select_all = match self.select_all_state() {
            SelectAllState::Checked => r#"<input type="checkbox" id="select-all" checked />"#,
            SelectAllState::Indeterminate => {
                r#"<input type="checkbox" id="select-all" data-indeterminate="true" />"#
            }
            SelectAllState::Unchecked => r#"<input type="checkbox" id="select-all" />"#,
        };

        let headers: String = self
            .keys
            .iter()
            .map(|key| {
                let escaped = escape_html(key);
                if self.unsortable.contains(key) {
                    format!(r#"<th data-key="{}">{}</th>"#, escaped, escaped)
                } else {
                    let class = self
                        .sort
                        .direction_for(key)
                        .map(|d| format!("sortable {}", d.class()))
                        .unwrap_or_else(|| "sortable".to_string());
                    format!(
                        r#"<th class="{}" data-key="{}">{}</th>"#,
                        class, escaped, escaped
                    )
                }
            })
            .collect();

        let rows: String = self
            .data
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let checked = if self.selected.contains(&record.id()) { " checked" } else { "" };
                let cells: String = self
                    .keys
                    .iter()
                    .map(|key| format!("<td>{}</td>", escape_html(record.value(key))))
                    .collect();
                format!(
                    r#"<tr data-index="{}"><td class="select-column"><input type="checkbox" class="row-select"{} /></td>{}</tr>"#,
                    index, checked, cells
                )
            })
            .collect();

        self.markup = format!(
            r#"<style>
.table-wrapper {{ max-height: {max_height}; max-width: {max_width}; overflow: auto; border: 1px solid #ddd; font-family: Arial, sans-serif; }}
table {{ width: 100%; border-collapse: collapse; }}
th, td {{ border: 1px solid #ddd; padding: 12px; text-align: left; }}
th.sortable {{ position: relative; cursor: pointer; }}
th.sortable:hover {{ background-color: #f4f4f4; }}
th.sortable.asc:after {{ content: '▲'; position: absolute; right: 8px; font-size: 10px; }}
th.sortable.desc:after {{ content: '▼'; position: absolute; right: 8px; font-size: 10px; }}
tr:hover {{ background-color: #f9f9f9; }}
.select-column {{ width: 50px; text-align: center; }}
</style><div class="table-wrapper"><table><thead><tr><th class="select-column">{select_all}</th>{headers}</tr></thead><tbody>{rows}</tbody></table></div>"#,
            max_height = escape_html(&self.max_height),
            max_width = escape_html(&self.max_width),
            select_all = select_all,
            headers = headers,
            rows = rows,
        );
    }
}

impl Default for DataTable {
    fn default() -> Self {
        Self::new()
    }
}

fn dedup_by_id(records: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    let total = records.len();
    let unique: Vec<Record> = records
        .into_iter()
        .filter(|r| seen.insert(r.id()))
        .collect();
    if unique.len() != total {
        tracing::debug!(dropped = total - unique.len(), "Duplicate records dropped from table data");
    }
    unique
}

/// Compare two records the way the table sorts them.
pub fn compare_by_key(a: &Record, b: &Record, key: &str) -> Ordering {
    a.value(key).cmp(b.value(key))
}
