//! HTML pages: the standalone selection export and the interactive form page

use crate::record::Record;
use crate::report::Summary;
use crate::template::escape_html;
use crate::widget::DataTable;
use std::io::{self, Write};

const PAGE_STYLE: &str = r#"
        :root {
            --bg: #f6f7f9;
            --card: #ffffff;
            --border: #dde1e6;
            --text: #1f2328;
            --dim: #656d76;
            --accent: #0969da;
        }
        * { box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
            margin: 0;
        }
        .container { max-width: 1200px; margin: 0 auto; padding: 2rem; }
        .header { margin-bottom: 1.5rem; padding-bottom: 1rem; border-bottom: 1px solid var(--border); }
        .logo { font-size: 2rem; font-weight: 800; color: var(--accent); }
        .subtitle { color: var(--dim); }
        .card { background: var(--card); border: 1px solid var(--border); border-radius: 12px; padding: 1.5rem; margin-bottom: 1.5rem; }
        .card h2 { font-size: 1rem; color: var(--dim); margin: 0 0 1rem 0; }
        label { display: block; font-weight: 600; margin-bottom: 0.5rem; }
        select { width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 4px; }
"#;

/// Standalone page listing the exported records.
pub fn write<W: Write>(writer: &mut W, keys: &[String], records: &[Record]) -> io::Result<()> {
    let summary = match keys.first() {
        Some(first) => Summary::from_records(records, first),
        None => Summary { total: records.len(), ..Summary::default() },
    };

    let mut table = DataTable::new();
    table.set_keys(keys.iter().cloned());
    table.set_max_height("none");
    table.set_data(records.to_vec());

    write!(writer, r#"<!DOCTYPE html>
<html lang="bg">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Selected locations</title>
    <style>{style}</style>
</head>
<body>
    <div class="container">
        <div class="header">
            <div class="logo">Selected locations</div>
            <div class="subtitle">{summary}</div>
        </div>
        <div class="card">{table}</div>
    </div>
</body>
</html>
"#,
        style = PAGE_STYLE,
        summary = escape_html(&summary.describe()),
        table = table.markup(),
    )?;

    Ok(())
}

/// Client behavior of the form page. The widgets' markup comes from the
/// server; the script opens and closes the dropdown, keeps the header
/// checkbox in step with the rows, and re-fetches the table fragment and the
/// address options when the user changes a filter.
const FORM_SCRIPT: &str = r#"
(function () {
    const dropdown = document.getElementById('campaign-city');
    const table = document.getElementById('campaign-location');
    const addressCity = document.getElementById('campaign-address-city');
    const address = document.getElementById('campaign-address');
    const view = { cities: [], sort: null, dir: 'asc' };

    function checkedCities() {
        return Array.from(dropdown.querySelectorAll('.dropdown-options input:checked')).map(i => i.value);
    }

    function readSort() {
        const th = table.querySelector('th.sortable.asc, th.sortable.desc');
        view.sort = th ? th.dataset.key : null;
        view.dir = th && th.classList.contains('desc') ? 'desc' : 'asc';
    }

    function syncSelectAll() {
        const rows = table.querySelectorAll('.row-select');
        const checked = table.querySelectorAll('.row-select:checked').length;
        const all = table.querySelector('#select-all');
        if (!all) return;
        all.checked = rows.length > 0 && checked === rows.length;
        all.indeterminate = checked > 0 && checked < rows.length;
    }

    function refreshTable() {
        const query = new URLSearchParams({ cities: view.cities.join(',') });
        if (view.sort) {
            query.set('sort', view.sort);
            query.set('dir', view.dir);
        }
        fetch('/table?' + query)
            .then(r => r.ok ? r.text() : Promise.reject(r.status))
            .then(html => { table.innerHTML = html; syncSelectAll(); })
            .catch(err => console.error('Table refresh failed', err));
    }

    dropdown.addEventListener('click', e => {
        if (e.target.closest('.dropdown-selected')) {
            dropdown.querySelector('.dropdown-options').classList.toggle('active');
        }
    });
    document.addEventListener('click', e => {
        if (!dropdown.contains(e.target)) {
            dropdown.querySelector('.dropdown-options').classList.remove('active');
        }
    });
    dropdown.addEventListener('change', () => {
        view.cities = checkedCities();
        dropdown.querySelector('.dropdown-selected').textContent =
            view.cities.length ? view.cities.join(', ') : 'Select options...';
        refreshTable();
    });

    table.addEventListener('click', e => {
        const th = e.target.closest('th.sortable');
        if (!th) return;
        view.dir = view.sort === th.dataset.key && view.dir === 'asc' ? 'desc' : 'asc';
        view.sort = th.dataset.key;
        refreshTable();
    });
    table.addEventListener('change', e => {
        if (e.target.id === 'select-all') {
            table.querySelectorAll('.row-select').forEach(c => { c.checked = e.target.checked; });
        }
        syncSelectAll();
    });

    addressCity.addEventListener('change', () => {
        fetch('/api/addresses?' + new URLSearchParams({ city: addressCity.value }))
            .then(r => r.json())
            .then(res => {
                address.innerHTML = '';
                (res.data || []).forEach(a => address.add(new Option(a, a)));
                if (address.options.length) {
                    address.value = address.options[0].value;
                    address.dispatchEvent(new Event('change'));
                }
            })
            .catch(err => console.error('Address refresh failed', err));
    });

    view.cities = checkedCities();
    readSort();
    syncSelectAll();
})();
"#;

/// Markup fragments making up the campaign form page.
#[derive(Debug, Default)]
pub struct FormPage<'a> {
    pub city_label: &'a str,
    pub city_dropdown: &'a str,
    pub location_table: &'a str,
    pub address_label: &'a str,
    pub address_city_select: &'a str,
    pub address_select: &'a str,
    pub pixel_label: &'a str,
    pub pixel_options: &'a str,
    pub duration_label: &'a str,
    pub duration_options: &'a str,
}

impl FormPage<'_> {
    pub fn render(&self) -> String {
        format!(r#"<!DOCTYPE html>
<html lang="bg">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Campaign</title>
    <style>{style}</style>
</head>
<body>
    <div class="container">
        <div class="header">
            <div class="logo">Campaign</div>
            <div class="subtitle">Pick cities, then the screens to book.</div>
        </div>
        <form id="campaign" class="card">
            <label for="video-duration">{duration_label}</label>
            <select id="video-duration" name="video-duration">{duration_options}</select>
            <label for="pixel-pitch">{pixel_label}</label>
            <select id="pixel-pitch" name="pixel-pitch">{pixel_options}</select>
            <label for="campaign-address-city">{city_label}</label>
            {address_city_select}
            <label for="campaign-address">{address_label}</label>
            {address_select}
        </form>
        <div class="card">
            <h2>{city_label}</h2>
            <multiselect-dropdown id="campaign-city">{city_dropdown}</multiselect-dropdown>
        </div>
        <div class="card">
            <custom-table id="campaign-location">{location_table}</custom-table>
        </div>
    </div>
    <script>{script}</script>
</body>
</html>
"#,
            style = PAGE_STYLE,
            city_label = escape_html(self.city_label),
            city_dropdown = self.city_dropdown,
            location_table = self.location_table,
            address_label = escape_html(self.address_label),
            address_city_select = self.address_city_select,
            address_select = self.address_select,
            pixel_label = escape_html(self.pixel_label),
            pixel_options = self.pixel_options,
            duration_label = escape_html(self.duration_label),
            duration_options = self.duration_options,
            script = FORM_SCRIPT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DatasetKind, RecordId};

    #[test]
    fn test_export_page_lists_rows_and_summary() {
        let records = vec![
            Record::new(RecordId::new(DatasetKind::Locations, 0), [("city", Some("Sofia")), ("addr", Some("A1"))]),
            Record::new(RecordId::new(DatasetKind::Locations, 1), [("city", Some("Varna")), ("addr", Some("C1"))]),
        ];
        let keys = vec!["city".to_string(), "addr".to_string()];

        let mut out = Vec::new();
        write(&mut out, &keys, &records).unwrap();
        let html = String::from_utf8(out).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("2 rows (Sofia: 1, Varna: 1)"));
        assert!(html.contains("<td>Varna</td><td>C1</td>"));
        assert!(html.contains("max-height: none"));
    }

    #[test]
    fn test_form_page_embeds_fragments() {
        let page = FormPage {
            city_label: "ГРАДОВЕ",
            city_dropdown: "<div class=\"dropdown-container\"></div>",
            location_table: "<table></table>",
            pixel_options: "<option value=\"P2.5\">P2.5</option>",
            ..FormPage::default()
        }
        .render();

        assert!(page.contains("<h2>ГРАДОВЕ</h2>"));
        assert!(page.contains("<multiselect-dropdown id=\"campaign-city\"><div class=\"dropdown-container\"></div>"));
        assert!(page.contains("<custom-table id=\"campaign-location\"><table></table>"));
        assert!(page.contains("<select id=\"pixel-pitch\" name=\"pixel-pitch\"><option value=\"P2.5\">P2.5</option></select>"));
    }

    #[test]
    fn test_form_page_ships_controls() {
        let page = FormPage::default().render();

        assert!(page.contains("<script>"));
        assert!(page.contains("fetch('/table?' + query)"));
        assert!(page.contains("fetch('/api/addresses?'"));
        assert!(page.contains("classList.toggle('active')"));
        assert!(page.contains("all.indeterminate = "));
    }

    #[test]
    fn test_form_page_embeds_address_cascade() {
        let page = FormPage {
            address_label: "АДРЕСИ",
            address_city_select: r#"<select id="campaign-address-city" name="campaign-address-city"></select>"#,
            address_select: r#"<select id="campaign-address" name="campaign-address"></select>"#,
            ..FormPage::default()
        }
        .render();

        assert!(page.contains(r#"<label for="campaign-address">АДРЕСИ</label>"#));
        assert!(page.contains(r#"<select id="campaign-address-city" name="campaign-address-city">"#));
    }
}
