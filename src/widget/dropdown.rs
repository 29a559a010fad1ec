//! Multi-select dropdown
//!
//! A display area showing the current selection, and a checkbox list that
//! opens and closes beneath it. Every checkbox toggle updates the selection,
//! re-renders the summary, and emits a [`DropdownChange`] carrying the whole
//! selection, synchronously and once per toggle.
//!
//! Selection membership is independent of the option list. Replacing the
//! options keeps selections that no longer appear in the list; they are not
//! rendered (so nothing shows them as checked) but they stay selected and are
//! still reported in change notifications. [`MultiselectDropdown::stale_selections`]
//! lists them for callers that want to act on this.

use super::{Emitter, ListenerId};
use crate::error::{Error, Result};
use crate::pipeline::OptionList;
use crate::template::escape_html;
use serde::Serialize;
use std::collections::HashSet;

pub const PLACEHOLDER: &str = "Select options...";
pub const SEPARATOR: &str = ", ";

const STYLE: &str = r#"<style>
.dropdown-container { position: relative; display: inline-block; width: 100%; font-family: Arial, sans-serif; }
.dropdown-selected { padding: 10px; border: 1px solid #ccc; border-radius: 4px; cursor: pointer; background: #fff; }
.dropdown-options { display: none; position: absolute; z-index: 10; width: 100%; background: #fff; box-shadow: 0px 4px 6px rgba(0, 0, 0, 0.1); border: 1px solid #ccc; border-radius: 4px; max-height: 200px; overflow-y: auto; }
.dropdown-options.active { display: block; }
.dropdown-options div { padding: 10px; cursor: pointer; }
.dropdown-options div:hover { background: #f0f0f0; }
.dropdown-options input[type="checkbox"] { margin-right: 10px; }
</style>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropdownState {
    #[default]
    Closed,
    Open,
}

/// Payload of the change notification: the full selection at emission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownChange {
    #[serde(rename = "selectedOptions")]
    pub selected: Vec<String>,
}

#[derive(Debug)]
pub struct MultiselectDropdown {
    options: OptionList,
    // Insertion order of user clicks; set semantics enforced on insert.
    selected: Vec<String>,
    state: DropdownState,
    markup: String,
    on_change: Emitter<DropdownChange>,
}

impl MultiselectDropdown {
    pub fn new() -> Self {
        let mut dropdown = Self {
            options: Vec::new(),
            selected: Vec::new(),
            state: DropdownState::Closed,
            markup: String::new(),
            on_change: Emitter::new(),
        };
        dropdown.render();
        dropdown
    }

    pub fn with_options(options: OptionList) -> Self {
        let mut dropdown = Self::new();
        dropdown.set_options(options);
        dropdown
    }

    /// Replace the option list. Duplicates are dropped, keeping the first.
    /// The selection is left untouched.
    pub fn set_options(&mut self, options: OptionList) {
        let mut seen = HashSet::new();
        self.options = options
            .into_iter()
            .filter(|option| seen.insert(option.clone()))
            .collect();

        let stale = self.stale_selections().len();
        if stale > 0 {
            tracing::debug!(stale, "Selections kept that are not in the new option list");
        }
        self.render();
    }

    /// Replace the option list from a JSON array of strings. Anything else is
    /// rejected with a warning and leaves the widget as it was.
    pub fn set_options_json(&mut self, json: &str) -> Result<()> {
        match serde_json::from_str::<Vec<String>>(json) {
            Ok(options) => {
                self.set_options(options);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Invalid options format. Use a JSON array.");
                Err(Error::MalformedOptions(e.to_string()))
            }
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Click on the display area.
    pub fn click_display(&mut self) {
        self.state = match self.state {
            DropdownState::Closed => DropdownState::Open,
            DropdownState::Open => DropdownState::Closed,
        };
        self.render();
    }

    /// Click anywhere outside the widget.
    pub fn click_outside(&mut self) {
        if self.state == DropdownState::Open {
            self.state = DropdownState::Closed;
            self.render();
        }
    }

    pub fn state(&self) -> DropdownState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DropdownState::Open
    }

    /// Checkbox change for `value`. Emits exactly one notification, even when
    /// the membership did not change.
    pub fn toggle(&mut self, value: &str, checked: bool) {
        if checked {
            if !self.is_selected(value) {
                self.selected.push(value.to_string());
            }
        } else {
            self.selected.retain(|s| s != value);
        }

        tracing::debug!(value, checked, selected = self.selected.len(), "Dropdown option toggled");
        self.render();

        let change = DropdownChange {
            selected: self.selected.clone(),
        };
        self.on_change.emit(&change);
    }

    /// Flip the checkbox for `value`.
    pub fn click_option(&mut self, value: &str) {
        let checked = !self.is_selected(value);
        self.toggle(value, checked);
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.selected.iter().any(|s| s == value)
    }

    /// Selected values absent from the current option list.
    pub fn stale_selections(&self) -> Vec<&str> {
        self.selected
            .iter()
            .filter(|s| !self.options.contains(*s))
            .map(String::as_str)
            .collect()
    }

    /// Text of the display area.
    pub fn summary(&self) -> String {
        if self.selected.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            self.selected.join(SEPARATOR)
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&DropdownChange) + 'static,
    {
        self.on_change.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.on_change.unsubscribe(id)
    }

    /// Markup from the most recent render.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    fn render(&mut self) {
        let options: String = self
            .options
            .iter()
            .map(|option| {
                let escaped = escape_html(option);
                let checked = if self.is_selected(option) { " checked" } else { "" };
                format!(
                    r#"<div><input type="checkbox" value="{}"{}/> {}</div>"#,
                    escaped, checked, escaped
                )
            })
            .collect();

        let active = if self.is_open() { " active" } else { "" };

        self.markup = format!(
            r#"{style}<div class="dropdown-container"><div class="dropdown-selected">{summary}</div><div class="dropdown-options{active}">{options}</div></div>"#,
            style = STYLE,
            summary = escape_html(&self.summary()),
            active = active,
            options = options,
        );
    }
}

impl Default for MultiselectDropdown {
    fn default() -> Self {
        Self::new()
    }
}
