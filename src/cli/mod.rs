//! Command-line interface for the feature pipeline

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::loader::RawLoader;
use crate::pipeline::{BuildReport, FeaturePipeline};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}
fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}
fn muted(s: &str) -> ColoredString {
    s.truecolor(140, 140, 140)
}
fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "aq-features")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build model-ready feature tables from raw air-quality exports")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build features from a sensor observation export
    Build {
        /// Raw data file (CSV, TSV, or Parquet)
        #[arg(short, long)]
        data: PathBuf,

        /// Output feature file (parquet); defaults to <input>_features.parquet
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Lag offsets in chronological steps
        #[arg(long, value_delimiter = ',', default_values_t = [1usize, 3, 24])]
        lags: Vec<usize>,
    },

    /// Build features from the flat daily per-city export
    BuildDaily {
        /// Raw data file (CSV, TSV, or Parquet)
        #[arg(short, long)]
        data: PathBuf,

        /// Output feature file (parquet); defaults to <input>_features.parquet
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Entity column for per-group lag computation
        #[arg(long, default_value = "City")]
        group_key: String,

        /// Lag offsets in chronological steps
        #[arg(long, value_delimiter = ',', default_values_t = [1usize, 3, 7])]
        lags: Vec<usize>,
    },

    /// Show raw data information
    Info {
        /// Raw data file
        #[arg(short, long)]
        data: PathBuf,
    },
}

fn default_output(data: &Path) -> PathBuf {
    let stem = data
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("features");
    data.with_file_name(format!("{stem}_features.parquet"))
}

fn print_report(report: &BuildReport, elapsed: std::time::Duration) {
    println!();
    println!(
        "  {:<16} {}",
        muted("Raw rows"),
        report.raw_rows.to_string().white()
    );
    println!(
        "  {:<16} {}",
        muted("After clean"),
        format!("{} ({} dropped)", report.clean_rows, report.dropped_invalid).white()
    );
    println!(
        "  {:<16} {}",
        muted("Feature rows"),
        report.feature_rows.to_string().white().bold()
    );
    println!(
        "  {:<16} {}",
        muted("Output"),
        report.output_path.display().to_string().white()
    );
    println!(
        "  {:<16} {}",
        muted("Time"),
        format!("{elapsed:.2?}").white()
    );
    println!();
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_build(data: &Path, output: Option<&Path>, lags: &[usize]) -> anyhow::Result<()> {
    section("Build features");

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(data));
    let config = PipelineConfig::sensor(data, &output).with_lag_offsets(lags.to_vec());

    run_pipeline(config)
}

pub fn cmd_build_daily(
    data: &Path,
    output: Option<&Path>,
    group_key: &str,
    lags: &[usize],
) -> anyhow::Result<()> {
    section("Build daily features");

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(data));
    let config = PipelineConfig::daily_city(data, &output)
        .with_group_key(group_key)
        .with_lag_offsets(lags.to_vec());

    run_pipeline(config)
}

fn run_pipeline(config: PipelineConfig) -> anyhow::Result<()> {
    step_run("Building");
    let start = Instant::now();
    let report = FeaturePipeline::new(config).run()?;
    step_done(&format!("{:?}", start.elapsed()));

    print_report(&report, start.elapsed());
    Ok(())
}

pub fn cmd_info(data: &Path) -> anyhow::Result<()> {
    section("Info");

    step_run("Loading data");
    let start = Instant::now();
    let df = RawLoader::load(data)?;
    step_done(&format!(
        "{} rows × {} cols in {:?}",
        df.height(),
        df.width(),
        start.elapsed()
    ));

    println!();
    for column in df.get_columns() {
        println!(
            "  {:<28} {}",
            muted(column.name().as_str()),
            format!("{:?}", column.dtype()).white()
        );
    }
    println!();
    Ok(())
}
