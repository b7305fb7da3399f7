//! cqc - Contraction quality-control CLI
//!
//! Loads raw per-well acquisition files, runs the filtering pipeline, and
//! writes highlighted, clean, and summary CSV reports.

use clap::{Parser, Subcommand};
use contraction_qc::data::{load_overview_table, DEFAULT_OVERVIEW_FILE_NAME};
use contraction_qc::error::{QcError, Result};
use contraction_qc::pipeline::{Pipeline, PipelineConfig};
use contraction_qc::report::{write_final_reports, CsvReporter};
use std::path::PathBuf;

/// Contraction quality control
#[derive(Parser)]
#[command(name = "cqc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter every well found under a data directory
    Run {
        /// Root directory containing the per-well folders
        #[arg(short, long)]
        data: PathBuf,

        /// Pacing frequency in Hz; read from the directory name if omitted
        #[arg(long)]
        hz: Option<f64>,

        /// Output directory for the CSV reports (defaults to the data directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Per-well file name to look for
        #[arg(long, default_value = DEFAULT_OVERVIEW_FILE_NAME)]
        overview_file_name: String,

        /// Pipeline configuration YAML; the standard pipeline if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the standard pipeline configuration as YAML
    Config {
        /// Pacing frequency to bake into the relaxation-time step
        #[arg(long)]
        hz: Option<f64>,
    },
}

fn run(
    data: PathBuf,
    hz: Option<f64>,
    output: Option<PathBuf>,
    overview_file_name: &str,
    config: Option<PathBuf>,
) -> Result<()> {
    if !data.is_dir() {
        return Err(QcError::InvalidParameter(format!(
            "{} is not a directory",
            data.display()
        )));
    }

    let mut table = load_overview_table(&data, overview_file_name)?;
    if table.overviews.is_empty() {
        return Err(QcError::EmptyData(format!(
            "no '{}' files found under {}",
            overview_file_name,
            data.display()
        )));
    }
    log::info!(
        "loaded {} wells from {}",
        table.overviews.len(),
        data.display()
    );

    let pipeline = match config {
        Some(path) => Pipeline::from_config(&PipelineConfig::from_yaml(&std::fs::read_to_string(
            path,
        )?)?),
        None => Pipeline::standard(hz),
    };

    let out_dir = output.unwrap_or_else(|| data.clone());
    let mut sink = CsvReporter::new(&out_dir);
    pipeline.run_with(&mut table, &mut sink)?;

    for path in write_final_reports(&table, &out_dir)? {
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            data,
            hz,
            output,
            overview_file_name,
            config,
        } => run(data, hz, output, &overview_file_name, config),
        Commands::Config { hz } => PipelineConfig::standard(hz)
            .to_yaml()
            .map(|yaml| println!("{}", yaml)),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
