//! The enrichment run: geocode, reverse-geocode fallback, drop, normalize,
//! rainfall and tourism joins, heat index, projection.
//!
//! Every stage runs to completion over all records before the next begins,
//! one external call at a time.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{info, warn};

use crate::cache::{DirectoryCache, JsonFileCache, PersistentCache};
use crate::config::ClimateFailurePolicy;
use crate::error::{ProcessingError, Result};
use crate::models::{
    ClimateCacheEntry, EnrichedRecord, GeocodeCacheEntry, GeocodeOutcome, RainfallRow,
    RainfallStats, ReverseOutcome, TourismRow, TrailRecord,
};
use crate::processors::{
    ClimateFetcher, ClimateStats, GeocodeStats, Geocoder, RainfallAggregator, RegionNormalizer,
    TourismScorer,
};
use crate::services::{ClimatologyService, GeocodingService};
use crate::utils::constants::DEFAULT_COUNTRY;
use crate::utils::progress::ProgressReporter;

/// Raw tables for one run
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub trails: Vec<TrailRecord>,
    pub rainfall: Vec<RainfallRow>,
    pub tourism: Vec<TourismRow>,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub country: String,
    pub climate_failure_policy: ClimateFailurePolicy,
    pub show_progress: bool,
}

impl PipelineOptions {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            climate_failure_policy: ClimateFailurePolicy::Abort,
            show_progress: false,
        }
    }

    pub fn with_climate_failure_policy(mut self, policy: ClimateFailurePolicy) -> Self {
        self.climate_failure_policy = policy;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY)
    }
}

/// Aggregate counts for one run, surfaced to the operator at the end
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub input_rows: usize,
    pub unqueryable_rows: usize,
    pub distinct_queries: usize,
    pub geocode: GeocodeStats,
    pub region_fallbacks: usize,
    pub regions_recovered: usize,
    pub dropped_rows: usize,
    pub rainfall_matches: usize,
    pub tourism_matches: usize,
    pub climate: ClimateStats,
    pub heat_index_skipped: usize,
    pub output_rows: usize,
}

impl RunReport {
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Enrichment Report ===\n");
        summary.push_str(&format!("Input trails: {}\n", self.input_rows));
        summary.push_str(&format!(
            "Geocoding: {} distinct queries, {} cached, {} resolved, {} no match, {} failed\n",
            self.distinct_queries,
            self.geocode.cache_hits,
            self.geocode.network_hits,
            self.geocode.misses,
            self.geocode.failures
        ));
        if self.unqueryable_rows > 0 {
            summary.push_str(&format!(
                "Trails without location text: {}\n",
                self.unqueryable_rows
            ));
        }
        summary.push_str(&format!(
            "Region fallback: {} candidates, {} recovered, {} no match, {} failed\n",
            self.region_fallbacks,
            self.regions_recovered,
            self.geocode.reverse_no_match,
            self.geocode.reverse_failures
        ));
        summary.push_str(&format!(
            "Dropped (no coordinates): {}\n",
            self.dropped_rows
        ));
        summary.push_str(&format!(
            "Rainfall matches: {}/{}\n",
            self.rainfall_matches, self.output_rows
        ));
        summary.push_str(&format!(
            "Tourism matches: {}/{}\n",
            self.tourism_matches, self.output_rows
        ));
        summary.push_str(&format!(
            "Heat index: {} cached, {} fetched, {} failed, {} skipped\n",
            self.climate.cache_hits,
            self.climate.fetched,
            self.climate.failed,
            self.heat_index_skipped
        ));
        summary.push_str(&format!("Output trails: {}\n", self.output_rows));

        summary
    }
}

/// Sequences the enrichment stages over one batch of trails.
pub struct EnrichmentPipeline<
    G,
    C,
    GC = JsonFileCache<GeocodeCacheEntry>,
    CC = DirectoryCache<ClimateCacheEntry>,
> {
    geocoder: Geocoder<G, GC>,
    climate: ClimateFetcher<C, CC>,
    normalizer: RegionNormalizer,
    rainfall_aggregator: RainfallAggregator,
    tourism_scorer: TourismScorer,
    options: PipelineOptions,
}

impl<G, C, GC, CC> EnrichmentPipeline<G, C, GC, CC>
where
    G: GeocodingService,
    C: ClimatologyService,
    GC: PersistentCache<GeocodeCacheEntry>,
    CC: PersistentCache<ClimateCacheEntry>,
{
    pub fn new(
        geocoder: Geocoder<G, GC>,
        climate: ClimateFetcher<C, CC>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            geocoder,
            climate,
            normalizer: RegionNormalizer::new(),
            rainfall_aggregator: RainfallAggregator::new(),
            tourism_scorer: TourismScorer::new(),
            options,
        }
    }

    pub fn with_normalizer(mut self, normalizer: RegionNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn geocoder(&self) -> &Geocoder<G, GC> {
        &self.geocoder
    }

    pub fn climate(&self) -> &ClimateFetcher<C, CC> {
        &self.climate
    }

    /// Forget every durable geocode and climate entry
    pub fn reset_caches(&mut self) -> Result<()> {
        self.geocoder.reset_cache()?;
        self.climate.reset_cache()?;
        info!("Geocode and climate caches cleared");
        Ok(())
    }

    /// Run every stage in order. Output keeps input order, minus dropped rows.
    pub async fn run(&mut self, inputs: PipelineInputs) -> Result<(Vec<EnrichedRecord>, RunReport)> {
        self.geocoder.begin_run();
        self.climate.begin_run();

        let PipelineInputs {
            mut trails,
            rainfall,
            tourism,
        } = inputs;

        check_inputs(&trails, &rainfall)?;

        let mut report = RunReport {
            input_rows: trails.len(),
            ..RunReport::default()
        };
        info!("Enriching {} trails", trails.len());

        self.resolve_coordinates(&mut trails, &mut report).await?;
        self.apply_region_fallback(&mut trails, &mut report).await;
        let mut trails = self.drop_unlocated(trails, &mut report);
        self.normalize_regions(&mut trails);

        let rainfall_stats = self.rainfall_aggregator.aggregate(&rainfall);
        self.join_rainfall(&mut trails, &rainfall_stats, &mut report);

        let crowd_scores = self.tourism_scorer.score(&tourism, &self.normalizer);
        self.join_tourism(&mut trails, &crowd_scores, &mut report);

        self.attach_heat_index(&mut trails, &mut report).await?;

        let records = trails
            .into_iter()
            .map(EnrichedRecord::try_from)
            .collect::<Result<Vec<_>>>()?;

        report.geocode = self.geocoder.stats().clone();
        report.climate = self.climate.stats().clone();
        report.output_rows = records.len();

        info!("Enrichment finished: {} trails out", records.len());
        Ok((records, report))
    }

    fn progress(&self, total: usize, message: &str) -> ProgressReporter {
        ProgressReporter::new(total as u64, message, !self.options.show_progress)
    }

    /// Forward-geocode each distinct query once, in first-appearance order
    async fn resolve_coordinates(
        &mut self,
        trails: &mut [TrailRecord],
        report: &mut RunReport,
    ) -> Result<()> {
        let country = self.options.country.clone();

        let mut seen = HashSet::new();
        let mut queries = Vec::new();
        for trail in trails.iter() {
            match trail.search_query(&country) {
                Some(query) => {
                    if seen.insert(query.clone()) {
                        queries.push(query);
                    }
                }
                None => report.unqueryable_rows += 1,
            }
        }
        report.distinct_queries = queries.len();
        info!("Geocoding {} distinct locations", queries.len());

        let progress = self.progress(queries.len(), "Geocoding locations");
        let mut outcomes: HashMap<String, GeocodeOutcome> = HashMap::with_capacity(queries.len());
        for query in queries {
            progress.set_message(&query);
            let outcome = self.geocoder.forward_geocode(&query).await?;
            outcomes.insert(query, outcome);
            progress.increment(1);
        }
        progress.finish_with_message("Geocoding complete");

        for trail in trails.iter_mut() {
            let Some(query) = trail.search_query(&country) else {
                continue;
            };
            if let Some(GeocodeOutcome::Resolved(point)) = outcomes.get(&query) {
                trail.latitude = Some(point.latitude);
                trail.longitude = Some(point.longitude);
                trail.region = point.region.clone();
            }
        }

        let stats = self.geocoder.stats();
        info!(
            "Geocoding: {} cached, {} resolved, {} no match, {} failed",
            stats.cache_hits, stats.network_hits, stats.misses, stats.failures
        );
        Ok(())
    }

    /// Reverse-geocode records whose region is missing or only the country.
    /// A non-region outcome leaves the existing value in place.
    async fn apply_region_fallback(&mut self, trails: &mut [TrailRecord], report: &mut RunReport) {
        let country = self.options.country.clone();
        let candidates: Vec<usize> = trails
            .iter()
            .enumerate()
            .filter(|(_, t)| t.has_coordinates() && t.needs_region_fallback(&country))
            .map(|(i, _)| i)
            .collect();

        report.region_fallbacks = candidates.len();
        if candidates.is_empty() {
            return;
        }
        info!("Reverse-geocoding {} coarse regions", candidates.len());

        let progress = self.progress(candidates.len(), "Reverse geocoding");
        for index in candidates {
            let trail = &mut trails[index];
            if let Some((latitude, longitude)) = trail.coordinates() {
                match self.geocoder.reverse_geocode(latitude, longitude).await {
                    ReverseOutcome::Region(region) => {
                        trail.region = Some(region);
                        report.regions_recovered += 1;
                    }
                    ReverseOutcome::NoMatch | ReverseOutcome::ServiceFailure(_) => {}
                }
            }
            progress.increment(1);
        }
        progress.finish_with_message("Reverse geocoding complete");
    }

    fn drop_unlocated(&self, trails: Vec<TrailRecord>, report: &mut RunReport) -> Vec<TrailRecord> {
        let before = trails.len();
        let kept: Vec<TrailRecord> = trails.into_iter().filter(|t| t.has_coordinates()).collect();
        report.dropped_rows = before - kept.len();

        if report.dropped_rows > 0 {
            warn!(
                "Dropped {} trails without coordinates ({} remain)",
                report.dropped_rows,
                kept.len()
            );
        }
        kept
    }

    fn normalize_regions(&self, trails: &mut [TrailRecord]) {
        for trail in trails.iter_mut() {
            trail.region = self.normalizer.normalize_opt(trail.region.as_deref());
        }
    }

    fn join_rainfall(
        &self,
        trails: &mut [TrailRecord],
        stats: &BTreeMap<String, RainfallStats>,
        report: &mut RunReport,
    ) {
        for trail in trails.iter_mut() {
            let matched = trail.region.as_ref().and_then(|region| stats.get(region));
            if let Some(stats) = matched {
                trail.rain_longterm = stats.mean_rainfall;
                trail.best_month = stats.driest_month;
                report.rainfall_matches += 1;
            }
        }
        info!(
            "Rainfall join: {}/{} trails matched",
            report.rainfall_matches,
            trails.len()
        );
    }

    fn join_tourism(
        &self,
        trails: &mut [TrailRecord],
        scores: &BTreeMap<String, f64>,
        report: &mut RunReport,
    ) {
        for trail in trails.iter_mut() {
            let matched = trail.region.as_ref().and_then(|region| scores.get(region));
            if let Some(&score) = matched {
                trail.crowd_score = Some(score);
                report.tourism_matches += 1;
            }
        }
        info!(
            "Tourism join: {}/{} trails matched",
            report.tourism_matches,
            trails.len()
        );
    }

    async fn attach_heat_index(
        &mut self,
        trails: &mut [TrailRecord],
        report: &mut RunReport,
    ) -> Result<()> {
        let policy = self.options.climate_failure_policy;
        let progress = self.progress(trails.len(), "Fetching climatology");

        for trail in trails.iter_mut() {
            match self
                .climate
                .annual_heat_index(trail.latitude, trail.longitude)
                .await
            {
                Ok(heat_index) => trail.heat_index = heat_index,
                Err(e @ ProcessingError::ClimateFetch { .. }) => match policy {
                    ClimateFailurePolicy::Abort => return Err(e),
                    ClimateFailurePolicy::Skip => {
                        warn!("Skipping heat index for '{}': {}", trail.trail_name, e);
                        trail.heat_index = None;
                        report.heat_index_skipped += 1;
                    }
                },
                Err(e) => return Err(e),
            }
            progress.increment(1);
        }
        progress.finish_with_message("Climatology complete");

        let stats = self.climate.stats();
        info!(
            "Heat index: {} cached, {} fetched, {} failed, {} skipped",
            stats.cache_hits, stats.fetched, stats.failed, report.heat_index_skipped
        );
        Ok(())
    }
}

/// Reject rows that could never be written before any network call is made
fn check_inputs(trails: &[TrailRecord], rainfall: &[RainfallRow]) -> Result<()> {
    if let Some(index) = trails.iter().position(|t| t.trail_name.trim().is_empty()) {
        return Err(ProcessingError::InvalidInput(format!(
            "Trail at row {} has a blank name",
            index + 1
        )));
    }

    let negative = rainfall
        .iter()
        .find(|row| row.monthly.iter().any(|v| matches!(v, Some(v) if *v < 0.0)));
    if let Some(row) = negative {
        return Err(ProcessingError::InvalidInput(format!(
            "Negative monthly rainfall for {}",
            row.subdivision
        )));
    }

    Ok(())
}
