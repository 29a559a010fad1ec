//! Placeholder substitution for record-driven markup
//!
//! Templates reference values positionally: `{{value0}}` is the record's value
//! for the first key, `{{value1}}` for the second, and so on. Null or missing
//! values substitute as the empty string. Values are HTML-escaped.

use crate::record::Record;

pub const SELECT_OPTION_TEMPLATE: &str = r#"<option value="{{value0}}">{{value0}}</option>"#;

pub fn render(template: &str, record: &Record, keys: &[&str]) -> String {
    keys.iter()
        .enumerate()
        .fold(template.to_string(), |acc, (index, key)| {
            acc.replace(
                &format!("{{{{value{}}}}}", index),
                &escape_html(record.value(key)),
            )
        })
}

/// Render `template` once per record and concatenate the results.
pub fn render_all<'a, I>(template: &str, records: I, keys: &[&str]) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .map(|record| render(template, record, keys))
        .collect()
}

/// `<option>` elements for a plain select, one per record, showing `key`.
pub fn render_select_options<'a, I>(records: I, key: &str) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    render_all(SELECT_OPTION_TEMPLATE, records, &[key])
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
