//! Single-value select filled from data
//!
//! Whenever its options are replaced the first option becomes the value and a
//! change is emitted, so a select feeding another one re-fills the next link
//! of the chain straight away.

use super::{Emitter, ListenerId};
use crate::pipeline::OptionList;
use crate::template::escape_html;

#[derive(Debug)]
pub struct DynamicSelect {
    id: String,
    options: OptionList,
    value: Option<String>,
    markup: String,
    on_change: Emitter<Option<String>>,
}

impl DynamicSelect {
    /// `id` becomes the element id and form field name.
    pub fn new(id: impl Into<String>) -> Self {
        let mut select = Self {
            id: id.into(),
            options: Vec::new(),
            value: None,
            markup: String::new(),
            on_change: Emitter::new(),
        };
        select.render();
        select
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replace the options, select the first one and emit a change. An empty
    /// list leaves no value and still emits.
    pub fn set_options(&mut self, options: OptionList) {
        self.value = options.first().cloned();
        self.options = options;
        self.render();

        tracing::debug!(id = %self.id, options = self.options.len(), "Select options replaced");
        self.on_change.emit(&self.value);
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Pick `value`. Values not in the option list are ignored.
    pub fn select(&mut self, value: &str) {
        if !self.options.iter().any(|o| o == value) {
            tracing::warn!(id = %self.id, value, "Select value not among options, ignored");
            return;
        }
        self.value = Some(value.to_string());
        self.render();
        self.on_change.emit(&self.value);
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&Option<String>) + 'static,
    {
        self.on_change.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.on_change.unsubscribe(id)
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    fn render(&mut self) {
        let options: String = self
            .options
            .iter()
            .map(|option| {
                let escaped = escape_html(option);
                let selected = if self.value.as_deref() == Some(option.as_str()) { " selected" } else { "" };
                format!(r#"<option value="{}"{}>{}</option>"#, escaped, selected, escaped)
            })
            .collect();

        let id = escape_html(&self.id);
        self.markup = format!(r#"<select id="{id}" name="{id}">{options}</select>"#);
    }
}
