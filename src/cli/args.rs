use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trailiq-etl")]
#[command(about = "Enrich trail records with coordinates, rainfall, crowd score and heat index")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Settings file [default: trailiq.toml, optional]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the enrichment pipeline and write the Parquet output
    Run {
        #[arg(long, help = "Clear the geocode and climate caches before running")]
        reset_cache: bool,

        #[arg(short, long, help = "Output Parquet file path [default: from settings]")]
        output: Option<PathBuf>,

        #[arg(short, long, help = "snappy, gzip, lz4, zstd or none [default: from settings]")]
        compression: Option<String>,
    },

    /// Display information about an enriched Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}
