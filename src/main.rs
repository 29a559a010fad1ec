use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use ledform::report::{self, Summary};
use ledform::{Cascade, Config, DataStore, DirSource, FilterPipeline, Record};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ledform")]
#[command(author, version, about = "Browse and export LED screen locations for a campaign")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON config file (dataset files, delimiter, column names, port)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the dataset files (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Pick the data directory in a folder dialog
    #[arg(long, global = true)]
    gui: bool,

    /// Debug logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the campaign form in the browser
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Don't open the browser
        #[arg(long)]
        no_open: bool,
    },

    /// List the distinct cities
    Cities,

    /// List the locations of the given cities
    Locations {
        /// City to include (repeatable)
        #[arg(long = "city")]
        cities: Vec<String>,
    },

    /// List the pixel pitch or video duration options
    Options {
        #[arg(value_enum)]
        list: OptionKind,
    },

    /// Select every location of the given cities and write them to a file
    Export {
        /// City to include (repeatable)
        #[arg(long = "city", required = true)]
        cities: Vec<String>,

        /// Column to sort by
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Output file (.csv, .json, .html)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for auto-named exports
        #[arg(long, default_value = "ledform-exports")]
        export_dir: PathBuf,

        /// Open the export when done
        #[arg(long)]
        open: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OptionKind {
    Pixels,
    Durations,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("\x1b[31mError:\x1b[0m {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "ledform=debug" } else { "ledform=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> ledform::Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if args.gui {
        match pick_data_dir_gui() {
            Some(dir) => config.data_dir = dir,
            None => {
                eprintln!("No folder selected.");
                return Ok(());
            }
        }
    }
    if let Command::Serve { port: Some(port), .. } = &args.command {
        config.port = *port;
    }

    tracing::debug!(data_dir = %config.data_dir.display(), "Configuration resolved");

    let runtime = Runtime::new()?;
    let store = Arc::new(DataStore::new(DirSource::from_config(&config)));
    let pipeline = FilterPipeline::new(store.clone(), config.fields.clone());

    match args.command {
        Command::Serve { no_open, .. } => {
            ledform::serve::start(&config, store, runtime.handle().clone(), !no_open)?;
        }

        Command::Cities => {
            for city in runtime.block_on(pipeline.unique_cities())? {
                println!("{}", city);
            }
        }

        Command::Locations { cities } => {
            let rows = runtime.block_on(pipeline.locations_by_cities(&cities))?;
            print_locations(&rows, &config);
        }

        Command::Options { list } => {
            let options = match list {
                OptionKind::Pixels => runtime.block_on(pipeline.pixel_pitch_options())?,
                OptionKind::Durations => runtime.block_on(pipeline.duration_options())?,
            };
            for option in options {
                println!("{}", option);
            }
        }

        Command::Export { cities, sort, desc, output, export_dir, open } => {
            let mut cascade = Cascade::new(pipeline);
            runtime.block_on(async {
                cascade.attach().await?;
                for city in &cities {
                    cascade.toggle_city(city, true).await?;
                }
                Ok::<_, ledform::Error>(())
            })?;

            for city in cascade.dropdown().stale_selections() {
                eprintln!("\x1b[33mUnknown city:\x1b[0m {}", city);
            }

            let table = cascade.table_mut();
            if let Some(key) = sort.as_deref() {
                table.sort_by_key(key);
                if desc {
                    table.sort_by_key(key);
                }
            }
            table.toggle_all(true);

            let keys = cascade.table().keys().to_vec();
            let records = cascade.selected_locations();

            let path = output.unwrap_or_else(|| {
                let timestamp = Local::now().format("%Y%m%d_%H%M%S");
                export_dir.join(format!("selection_{}.csv", timestamp))
            });
            report::generate(&path, &keys, &records)?;

            let summary = Summary::from_records(&records, &config.fields.city);
            eprintln!("{}", summary.describe());
            eprintln!("\x1b[32mExport saved: {}\x1b[0m", path.display());

            if open {
                if let Err(e) = open::that(&path) {
                    eprintln!("Failed to open export: {}", e);
                }
            }
        }
    }

    Ok(())
}

fn print_locations(rows: &[Record], config: &Config) {
    let city = &config.fields.city;
    let address = &config.fields.address;

    println!("{:<20}  {}", truncate(city, 20), address);
    println!("{}", "─".repeat(70));
    for r in rows {
        println!("{:<20}  {}", truncate(r.value(city), 20), truncate(r.value(address), 48));
    }
    eprintln!("\n{}", Summary::from_records(rows, city).describe());
}

#[cfg(feature = "gui")]
fn pick_data_dir_gui() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select the folder holding the dataset files")
        .pick_folder()
}

#[cfg(not(feature = "gui"))]
fn pick_data_dir_gui() -> Option<PathBuf> {
    eprintln!("Note: GUI mode not available in this build.");
    None
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
