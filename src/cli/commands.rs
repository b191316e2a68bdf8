use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;

use crate::cache::{DirectoryCache, JsonFileCache};
use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::models::EnrichedRecord;
use crate::processors::{
    ClimateFetcher, EnrichmentPipeline, Geocoder, PipelineInputs, PipelineOptions,
};
use crate::readers::{RainfallReader, TourismReader, TrailReader};
use crate::services::{NasaPowerClient, NominatimClient};
use crate::utils::constants::DEFAULT_CONFIG_FILE;
use crate::utils::ProgressReporter;
use crate::writers::ParquetWriter;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    // An explicitly named settings file must exist; the default one may not.
    let config_required = cli.config.is_some();
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    match cli.command {
        Commands::Run {
            reset_cache,
            output,
            compression,
        } => {
            let settings = Settings::load(&config_path, config_required)?;
            run_pipeline(settings, reset_cache, output, compression).await?;
        }

        Commands::Info { file, sample } => show_info(&file, sample)?,
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    result.map_err(|e| ProcessingError::Config(format!("Failed to initialise logging: {}", e)))
}

async fn run_pipeline(
    settings: Settings,
    reset_cache: bool,
    output: Option<PathBuf>,
    compression: Option<String>,
) -> Result<()> {
    let paths = &settings.paths;
    let output = output.unwrap_or_else(|| paths.output.clone());
    let compression = compression.unwrap_or_else(|| settings.output.compression.clone());

    // fail on a bad codec before spending an hour on network calls
    let writer = ParquetWriter::new().with_compression(&compression)?;

    println!("Enriching trails...");
    println!("Trails: {}", paths.trails_path().display());
    println!("Rainfall: {}", paths.rainfall_path().display());
    println!("Tourism: {}", paths.tourism_path().display());
    println!("Output file: {}", output.display());

    let loading = ProgressReporter::new_spinner("Reading input tables...", false);
    let trails = TrailReader::new().read_trails(&paths.trails_path())?;
    let rainfall = RainfallReader::new().read_rainfall(&paths.rainfall_path())?;
    let tourism =
        TourismReader::from_settings(&settings.tourism).read_tourism(&paths.tourism_path())?;
    loading.finish_with_message("Input tables loaded");
    println!(
        "Loaded {} trails, {} rainfall rows, {} tourism rows",
        trails.len(),
        rainfall.len(),
        tourism.len()
    );

    let geocoder = Geocoder::new(
        NominatimClient::new(&settings.geocoder)?,
        JsonFileCache::open(&paths.geocode_cache)?,
        &settings.geocoder,
    );
    let climate = ClimateFetcher::new(
        NasaPowerClient::new(&settings.climate)?,
        DirectoryCache::open(&paths.climate_cache_dir)?,
        &settings.climate,
    );
    let options = PipelineOptions::new(settings.geocoder.country.clone())
        .with_climate_failure_policy(settings.climate.failure_policy)
        .with_progress(true);

    let mut pipeline = EnrichmentPipeline::new(geocoder, climate, options);

    if reset_cache {
        pipeline.reset_caches()?;
        println!("Caches cleared");
    }

    let (records, report) = pipeline
        .run(PipelineInputs {
            trails,
            rainfall,
            tourism,
        })
        .await?;

    println!("\n{}", report.summary());

    println!("Writing {} trails to Parquet file...", records.len());
    writer.write_records(&records, &output)?;

    let file_info = writer.get_file_info(&output)?;
    println!("\n{}", file_info.summary());
    println!("Enrichment complete!");

    Ok(())
}

fn show_info(file: &Path, sample: usize) -> Result<()> {
    println!("Analyzing Parquet file: {}", file.display());

    let writer = ParquetWriter::new();
    let file_info = writer.get_file_info(file)?;

    println!("\nFile Details:");
    println!("{}", file_info.summary());

    if sample > 0 {
        println!("\nSample Records (showing up to {} records):", sample);
        match writer.read_sample_records(file, sample) {
            Ok(records) => {
                for (i, record) in records.iter().enumerate() {
                    println!("{}. {}", i + 1, describe(record));
                }
            }
            Err(e) => println!("Error reading sample data: {}", e),
        }
    }

    Ok(())
}

fn describe(record: &EnrichedRecord) -> String {
    fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
        value.map_or_else(|| "-".to_string(), |v| v.to_string())
    }

    format!(
        "{} [{}] ({:.4}, {:.4}): {} km, rain={}, crowd={}, heat={}°C, best month={}",
        record.trail_name,
        record.state.as_deref().unwrap_or("-"),
        record.lat,
        record.lon,
        or_dash(record.distance_km.map(|d| format!("{:.1}", d))),
        or_dash(record.rain_longterm.map(|r| format!("{:.1}", r))),
        or_dash(record.crowd_score.map(|c| format!("{:.2}", c))),
        or_dash(record.heat_index),
        or_dash(record.best_month),
    )
}
