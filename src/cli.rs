//! Command-line interface argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use solar_panda::aggregate::Granularity;
use solar_panda::data::loader::MissingFieldPolicy;
use solar_panda::data::model::Country;

/// West Africa solar GHI dashboard
///
/// Loads `{country}_clean.{ext}` files for Benin, Sierra Leone and Togo
/// (or synthetic data when any is missing) and prints the ranked summary,
/// the distribution comparison and the trend series.
///
/// Examples:
///   solar-panda --data-dir ./data
///   solar-panda --countries benin,togo --granularity weekly
///   solar-panda --format json > charts.jsonl
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for solar-panda.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the cleaned per-country files
    #[arg(short, long, value_name = "DIR", env = "SOLAR_PANDA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// File extension of the country files (csv, json, parquet)
    #[arg(long, value_name = "EXT")]
    pub ext: Option<String>,

    /// Countries to compare, comma separated
    #[arg(long, value_delimiter = ',', value_name = "LIST")]
    pub countries: Option<Vec<Country>>,

    /// Trend bucket width: daily, weekly or monthly
    #[arg(short, long)]
    pub granularity: Option<Granularity>,

    /// What to do when a file lacks the GHI or TIMESTAMP column: skip or fail
    #[arg(long, value_name = "POLICY")]
    pub on_missing_ghi: Option<MissingFieldPolicy>,

    /// Seed for synthetic data
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tables and box statistics
    Text,
    /// JSON Lines: summary header, then one Vega-Lite spec per chart
    Json,
}
