//! Collision Dashboard - NYC Motor Vehicle Collisions
//!
//! Loads the collisions CSV once per row limit and renders an interactive dashboard.
//!
//! CLI commands:
//! - gui: Launch the native dashboard (default)
//! - report: Evaluate the dashboard once and print it as JSON
//! - records: Print the typed rows of one hour as JSON

mod charts;
mod config;
mod data;
mod gui;
mod logging;
mod report;

use charts::{DashboardParams, DEFAULT_RAW_ROW_LIMIT};
use clap::{Parser, Subcommand};
use config::DashboardConfig;
use data::InjuryCategory;
use eframe::egui;
use gui::CollisionApp;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "collision_dashboard")]
#[command(about = "Dashboard of motor vehicle collisions in New York City")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Collisions CSV (overrides COLLISIONS_CSV)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Rows to read from the top of the file (overrides COLLISIONS_MAX_ROWS)
    #[arg(short, long, global = true)]
    max_rows: Option<usize>,

    /// Keep serving the cached table after the file changes on disk
    #[arg(long, global = true)]
    no_reload_on_change: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch native dashboard
    Gui,

    /// Print every dashboard view as JSON
    Report {
        /// Minimum persons injured for the injury map
        #[arg(long, default_value = "0")]
        min_injured: u32,

        /// Hour of day (0-23)
        #[arg(long, default_value = "0")]
        hour: u32,

        /// Affected type for the street ranking
        #[arg(long, value_enum, default_value_t = InjuryCategory::Pedestrians)]
        category: InjuryCategory,

        /// Keep only the first N streets
        #[arg(long)]
        top: Option<usize>,

        /// Include the raw rows of the selected hour
        #[arg(long)]
        raw: bool,

        /// Raw rows to include
        #[arg(long, default_value_t = DEFAULT_RAW_ROW_LIMIT)]
        raw_rows: usize,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print the normalized rows of one hour as JSON
    Records {
        /// Hour of day (0-23)
        #[arg(long, default_value = "0")]
        hour: u32,

        /// Keep only the first N rows
        #[arg(long)]
        limit: Option<usize>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

fn run_gui(config: DashboardConfig) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("NYC Motor Vehicle Collisions"),
        ..Default::default()
    };

    eframe::run_native(
        "Collision Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(CollisionApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {e}"))
}

fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    let config = DashboardConfig::from_env()?.with_overrides(
        cli.data,
        cli.max_rows,
        cli.no_reload_on_change,
    );
    tracing::info!(
        data = %config.data_path.display(),
        max_rows = config.max_rows,
        reload_on_change = config.cache_policy.reload_on_change,
        "Collision dashboard starting up"
    );

    match cli.command.unwrap_or(Commands::Gui) {
        Commands::Gui => run_gui(config)?,

        Commands::Report {
            min_injured,
            hour,
            category,
            top,
            raw,
            raw_rows,
            pretty,
        } => {
            let params = DashboardParams {
                min_injured,
                hour,
                category,
                top_streets: top,
                show_raw: raw,
                raw_row_limit: raw_rows,
            };
            println!("{}", report::render_report(&config, &params, pretty)?);
        }

        Commands::Records {
            hour,
            limit,
            pretty,
        } => {
            let records = report::hour_records(&config, hour, limit)?;
            let json = if pretty {
                serde_json::to_string_pretty(&records)?
            } else {
                serde_json::to_string(&records)?
            };
            println!("{json}");
        }
    }

    Ok(())
}
