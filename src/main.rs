//! lazygrid demo - Entry Point

use clap::Parser;
use lazygrid::config::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
    ResolvedConfig,
};
use lazygrid::demo::{demo_tables, TableData, TextMeasure};
use lazygrid::grid::dimensions::DimensionSummary;
use lazygrid::grid::{compute_grid_dimensions_blocking, CellMeasurer, SizeJob, TableSource};
use lazygrid::view::{ColorConfig, GridStyles, TuiError};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Virtualized grid demo - three content-measured tables with sticky headers
#[derive(Parser, Debug)]
#[command(name = "lazygrid")]
#[command(version)]
#[command(about = "Virtualized grid demo with sticky header row/column and horizontal fling")]
pub struct Args {
    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Let the first column scroll with the rest
    #[arg(long)]
    pub no_sticky_left: bool,

    /// Let the header row scroll with the rest
    #[arg(long)]
    pub no_sticky_top: bool,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,

    /// Measure the demo tables, print their dimensions as JSON and exit
    #[arg(long)]
    pub dump: bool,
}

fn main() -> Result<(), TuiError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = load_config_with_precedence(args.config.clone())?;
        let merged = merge_config(config_file);
        let with_env = apply_env_overrides(merged);
        apply_cli_overrides(with_env, args.no_sticky_left, args.no_sticky_top)
    };

    lazygrid::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    if args.dump {
        let summaries = dump_dimensions(&demo_tables(), &config)?;
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let styles = GridStyles::with_color_config(ColorConfig::from_env_and_args(args.no_color));
    lazygrid::view::run(&config, styles)
}

/// Measure every table synchronously, sharing one measurer.
fn dump_dimensions(
    tables: &[TableData],
    config: &ResolvedConfig,
) -> Result<Vec<DimensionSummary>, TuiError> {
    let mut measurer = CellMeasurer::new(TextMeasure::default(), config.measure_cache_capacity);
    tables
        .iter()
        .map(|table| {
            let job = SizeJob::new(
                table.dataset_key(),
                Instant::now(),
                table.col_count(),
                table.row_count(),
            );
            let mut source = TableSource::new(table.rows(), &mut measurer);
            let dims = compute_grid_dimensions_blocking(job, &mut source)?;
            Ok(dims.summary())
        })
        .collect()
}
