//! HTTP server for the interactive form
//!
//! `ledform serve` → starts server, opens browser, shows the campaign form
//!
//! The page is rendered server-side from the same widgets the library
//! exposes, and its script re-fetches fragments as the user clicks. Query
//! parameters carry the view: `cities` is the dropdown selection, `sort`/`dir`
//! the header clicks on the table, `city` the address cascade's city.
//!
//! Only the locations dataset is required to render the page. If the pixel
//! or duration dataset cannot be loaded its select renders empty.

use crate::cascade::AddressCascade;
use crate::config::Config;
use crate::error::Error;
use crate::pipeline::FilterPipeline;
use crate::record::{DatasetKind, Record};
use crate::report::html::FormPage;
use crate::store::DataStore;
use crate::template;
use crate::widget::{DataTable, MultiselectDropdown};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tokio::runtime::Handle;

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(error: &Error) -> Self {
        Self { ok: false, data: None, error: Some(error.to_string()) }
    }
}

/// What the page shows: selected cities and the table's sort.
#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct ViewParams {
    /// Comma-separated city names
    #[serde(default)]
    pub cities: String,
    #[serde(default)]
    pub sort: Option<String>,
    /// `asc` (default) or `desc`
    #[serde(default)]
    pub dir: Option<String>,
    /// City of the address cascade
    #[serde(default)]
    pub city: Option<String>,
}

impl ViewParams {
    pub fn from_url(url: &str) -> Self {
        url.split_once('?')
            .and_then(|(_, query)| serde_urlencoded::from_str(query).ok())
            .unwrap_or_default()
    }

    pub fn city_list(&self) -> Vec<String> {
        self.cities
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn descending(&self) -> bool {
        self.dir.as_deref() == Some("desc")
    }
}

struct App {
    pipeline: FilterPipeline,
    runtime: Handle,
}

/// Start server, open browser, serve the form
pub fn start(
    config: &Config,
    store: Arc<DataStore>,
    runtime: Handle,
    open_browser: bool,
) -> std::io::Result<()> {
    let addr = format!("127.0.0.1:{}", config.port);
    let server = Server::http(&addr).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let url = format!("http://localhost:{}", config.port);

    eprintln!("\n\x1b[1;32mledform\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   Data: {}\n", config.data_dir.display());
    tracing::info!(%addr, data_dir = %config.data_dir.display(), "Server listening");

    if open_browser {
        let _ = open::that(&url);
    }

    let app = App {
        pipeline: FilterPipeline::new(store, config.fields.clone()),
        runtime,
    };

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &app) {
            tracing::warn!(error = %e, "Failed to answer request");
        }
    }

    Ok(())
}

fn handle_request(request: Request, app: &App) -> std::io::Result<()> {
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or("/");
    let method = request.method().clone();
    let params = ViewParams::from_url(&url);

    tracing::debug!(%method, path, "Request");

    match (&method, path) {
        (&Method::Get, "/") => match app.runtime.block_on(render_page(&app.pipeline, &params)) {
            Ok(html) => respond_html(request, html),
            Err(e) => respond_error(request, &e),
        },

        (&Method::Get, "/table") => {
            match app.runtime.block_on(build_table(&app.pipeline, &params)) {
                Ok(table) => respond_html(request, table.markup().to_string()),
                Err(e) => respond_error(request, &e),
            }
        }

        (&Method::Get, "/api/cities") => {
            let result = app.runtime.block_on(app.pipeline.unique_cities());
            respond_api(request, result)
        }

        (&Method::Get, "/api/pixels") => {
            let result = app.runtime.block_on(app.pipeline.pixel_pitch_options());
            respond_api(request, result)
        }

        (&Method::Get, "/api/durations") => {
            let result = app.runtime.block_on(app.pipeline.duration_options());
            respond_api(request, result)
        }

        (&Method::Get, "/api/addresses") => {
            let city = params.city.as_deref().unwrap_or_default();
            let result = app.runtime.block_on(app.pipeline.addresses_by_city(city));
            respond_api(request, result)
        }

        (&Method::Get, "/api/locations") => {
            let result = app
                .runtime
                .block_on(app.pipeline.locations_by_cities(params.city_list()));
            respond_api(request, result)
        }

        // 404
        _ => {
            let response = Response::from_string("Not found").with_status_code(404);
            request.respond(response)
        }
    }
}

/// Location table for the requested cities, sorted as requested.
pub async fn build_table(pipeline: &FilterPipeline, params: &ViewParams) -> crate::Result<DataTable> {
    let columns = pipeline.location_columns().await?;
    let rows: Vec<Record> = pipeline.locations_by_cities(params.city_list()).await?;

    let mut table = DataTable::new();
    table.set_keys(columns);
    table.set_data(rows);

    if let Some(key) = params.sort.as_deref() {
        table.click_header(key);
        if params.descending() {
            table.click_header(key);
        }
    }

    Ok(table)
}

/// The full campaign form page. Fails only when the locations cannot be
/// loaded.
pub async fn render_page(pipeline: &FilterPipeline, params: &ViewParams) -> crate::Result<String> {
    let fields = pipeline.fields();

    let mut dropdown = MultiselectDropdown::with_options(pipeline.unique_cities().await?);
    for city in params.city_list() {
        dropdown.toggle(&city, true);
    }

    let table = build_table(pipeline, params).await?;

    let mut addresses = AddressCascade::new(pipeline.clone());
    addresses.attach().await?;
    if let Some(city) = params.city.as_deref() {
        addresses.select_city(city).await?;
    }

    let pixel_options = select_options(pipeline, DatasetKind::Pixels, &fields.pixel_pitch).await;
    let duration_options = select_options(pipeline, DatasetKind::Durations, &fields.duration).await;

    Ok(FormPage {
        city_label: &fields.city,
        city_dropdown: dropdown.markup(),
        location_table: table.markup(),
        address_label: &fields.address,
        address_city_select: addresses.city().markup(),
        address_select: addresses.address().markup(),
        pixel_label: &fields.pixel_pitch,
        pixel_options: &pixel_options,
        duration_label: &fields.duration,
        duration_options: &duration_options,
    }
    .render())
}

/// `<option>` list for one of the plain selects, empty if its dataset fails
/// to load.
async fn select_options(pipeline: &FilterPipeline, kind: DatasetKind, field: &str) -> String {
    match pipeline.store().load(kind).await {
        Ok(dataset) => template::render_select_options(
            crate::pipeline::unique_records_by_field(dataset.records(), field),
            field,
        ),
        Err(e) => {
            tracing::warn!(dataset = %kind, error = %e, "Rendering empty select");
            String::new()
        }
    }
}

fn content_type(value: &'static str) -> Header {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes()).expect("static header is valid")
}

fn respond_html(request: Request, html: String) -> std::io::Result<()> {
    let response = Response::from_string(html).with_header(content_type("text/html; charset=utf-8"));
    request.respond(response)
}

fn respond_api<T: Serialize>(request: Request, result: crate::Result<T>) -> std::io::Result<()> {
    match result {
        Ok(data) => {
            let json = serde_json::to_string(&ApiResponse::success(data))?;
            let response = Response::from_string(json).with_header(content_type("application/json"));
            request.respond(response)
        }
        Err(e) => respond_error(request, &e),
    }
}

fn respond_error(request: Request, error: &Error) -> std::io::Result<()> {
    tracing::warn!(error = %error, "Request failed");
    let json = serde_json::to_string(&ApiResponse::<()>::failure(error))?;
    let response = Response::from_string(json)
        .with_status_code(StatusCode(502))
        .with_header(content_type("application/json"));
    request.respond(response)
}
