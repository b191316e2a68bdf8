use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use trailiq_etl::cache::{DirectoryCache, JsonFileCache, PersistentCache};
use trailiq_etl::config::{ClimateFailurePolicy, ClimateSettings, GeocoderSettings};
use trailiq_etl::error::{ProcessingError, Result};
use trailiq_etl::models::{
    EnrichedRecord, GeoPoint, GeocodeCacheEntry, Month, RainfallRow, TemperatureClimatology,
    TourismRow, TrailRecord,
};
use trailiq_etl::processors::{
    ClimateFetcher, EnrichmentPipeline, Geocoder, PipelineInputs, PipelineOptions, RateLimiter,
    RunReport,
};
use trailiq_etl::readers::{RainfallReader, TourismReader, TrailReader};
use trailiq_etl::services::{ClimatologyService, GeocodingService};
use trailiq_etl::writers::ParquetWriter;

#[derive(Default)]
struct CallCounts {
    search: AtomicUsize,
    reverse: AtomicUsize,
    climate: AtomicUsize,
}

/// Answers from a fixed gazetteer; reverse lookups fail north of 35°N
struct MockGeocoder {
    places: HashMap<String, GeoPoint>,
    calls: Arc<CallCounts>,
}

#[async_trait]
impl GeocodingService for MockGeocoder {
    async fn search(&self, query: &str) -> Result<Option<GeoPoint>> {
        self.calls.search.fetch_add(1, Ordering::SeqCst);
        Ok(self.places.get(query).cloned())
    }

    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        self.calls.reverse.fetch_add(1, Ordering::SeqCst);
        if latitude > 35.0 {
            return Err(ProcessingError::service("mock", "connection reset"));
        }
        Ok(self
            .places
            .values()
            .find(|p| p.latitude == latitude && p.longitude == longitude)
            .and(Some("HIMACHAL PRADESH".to_string())))
    }
}

struct MockClimate {
    fail: bool,
    calls: Arc<CallCounts>,
}

#[async_trait]
impl ClimatologyService for MockClimate {
    async fn temperature_climatology(
        &self,
        latitude: f64,
        _longitude: f64,
    ) -> Result<TemperatureClimatology> {
        self.calls.climate.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProcessingError::service("mock", "HTTP 503"));
        }
        // colder further north
        let max = 40.0 - latitude;
        Ok(TemperatureClimatology::new(vec![max; 12], vec![max - 10.0; 12]))
    }
}

fn place(latitude: f64, longitude: f64, region: Option<&str>) -> GeoPoint {
    GeoPoint {
        latitude,
        longitude,
        region: region.map(String::from),
    }
}

fn gazetteer() -> HashMap<String, GeoPoint> {
    let mut places = HashMap::new();
    places.insert(
        "Valley of Flowers, India".to_string(),
        place(30.7284912, 79.6050123, Some("Uttarakhand")),
    );
    places.insert(
        "Kalsubai, India".to_string(),
        place(19.6013, 73.7117, Some("Maharashtra")),
    );
    places.insert(
        "Triund, India".to_string(),
        place(32.259, 76.358, Some("India")),
    );
    places.insert("Chadar, India".to_string(), place(35.8, 76.9, None));
    places
}

struct Harness {
    dir: TempDir,
    calls: Arc<CallCounts>,
}

impl Harness {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            calls: Arc::new(CallCounts::default()),
        }
    }

    fn geocode_cache(&self) -> std::path::PathBuf {
        self.dir.path().join("geocode_cache.json")
    }

    fn climate_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("climate_json")
    }

    fn pipeline(
        &self,
        policy: ClimateFailurePolicy,
        climate_fails: bool,
    ) -> EnrichmentPipeline<MockGeocoder, MockClimate> {
        let geocoder = Geocoder::new(
            MockGeocoder {
                places: gazetteer(),
                calls: Arc::clone(&self.calls),
            },
            JsonFileCache::open(&self.geocode_cache()).unwrap(),
            &GeocoderSettings::default(),
        )
        .with_rate_limiters(RateLimiter::unlimited(), RateLimiter::unlimited());

        let climate = ClimateFetcher::new(
            MockClimate {
                fail: climate_fails,
                calls: Arc::clone(&self.calls),
            },
            DirectoryCache::open(&self.climate_dir()).unwrap(),
            &ClimateSettings::default(),
        )
        .with_rate_limiter(RateLimiter::unlimited());

        let options = PipelineOptions::new("India").with_climate_failure_policy(policy);
        EnrichmentPipeline::new(geocoder, climate, options)
    }

    async fn run(&self, inputs: PipelineInputs) -> Result<(Vec<EnrichedRecord>, RunReport)> {
        self.pipeline(ClimateFailurePolicy::Abort, false)
            .run(inputs)
            .await
    }

    fn searches(&self) -> usize {
        self.calls.search.load(Ordering::SeqCst)
    }

    fn climate_calls(&self) -> usize {
        self.calls.climate.load(Ordering::SeqCst)
    }
}

fn trail(name: &str, location: &str) -> TrailRecord {
    TrailRecord::new(name).with_location(location).with_length("10 km")
}

fn rainfall_rows() -> Vec<RainfallRow> {
    let mut uttarakhand = [Some(80.0); 12];
    uttarakhand[10] = Some(6.0);
    let mut maharashtra = [Some(150.0); 12];
    maharashtra[1] = Some(1.0);

    vec![
        RainfallRow::new("UTTARAKHAND", Some(2001), uttarakhand),
        RainfallRow::new("Uttarakhand", Some(2002), uttarakhand),
        RainfallRow::new("MADHYA MAHARASHTRA", Some(2001), maharashtra),
    ]
}

fn inputs(trails: Vec<TrailRecord>) -> PipelineInputs {
    PipelineInputs {
        trails,
        rainfall: rainfall_rows(),
        tourism: vec![
            TourismRow::new("Uttarakhand", 100.0),
            TourismRow::new("Maharashtra", 500.0),
        ],
    }
}

fn by_name<'a>(records: &'a [EnrichedRecord], name: &str) -> &'a EnrichedRecord {
    records
        .iter()
        .find(|r| r.trail_name == name)
        .unwrap_or_else(|| panic!("{} missing from output", name))
}

#[tokio::test]
async fn test_valley_of_flowers_is_fully_enriched() {
    let harness = Harness::new();
    let (records, report) = harness
        .run(inputs(vec![trail("Valley of Flowers Trek", "Valley of Flowers")]))
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(report.dropped_rows, 0);

    let valley = &records[0];
    assert_eq!(valley.state.as_deref(), Some("Uttarakhand"));
    assert_eq!(valley.rain_longterm, Some((80.0 * 11.0 + 6.0) / 12.0));
    assert_eq!(valley.best_month, Some(Month::November));
    // 40 - 30.728 = 9.272 max, -0.728 min
    assert_eq!(valley.heat_index, Some(4.27));
    assert_eq!(valley.crowd_score, Some(0.0));
}

#[tokio::test]
async fn test_unresolvable_location_is_dropped_exactly_once() {
    let harness = Harness::new();
    let base = vec![
        trail("Valley of Flowers Trek", "Valley of Flowers"),
        trail("Kalsubai Peak", "Kalsubai"),
    ];
    let (_, baseline) = harness.run(inputs(base.clone())).await.unwrap();

    let mut with_unknown = base;
    with_unknown.insert(1, trail("Phantom Ridge", "Nowhere Plateau"));
    let (records, report) = harness.run(inputs(with_unknown)).await.unwrap();

    assert_eq!(report.dropped_rows, baseline.dropped_rows + 1);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.trail_name != "Phantom Ridge"));
}

#[tokio::test]
async fn test_maharashtra_joins_madhya_maharashtra() {
    let harness = Harness::new();
    let (records, report) = harness
        .run(inputs(vec![
            trail("Kalsubai Peak", "Kalsubai"),
            trail("Valley of Flowers Trek", "Valley of Flowers"),
        ]))
        .await
        .unwrap();

    let kalsubai = by_name(&records, "Kalsubai Peak");
    assert_eq!(kalsubai.state.as_deref(), Some("Madhya Maharashtra"));
    assert_eq!(kalsubai.best_month, Some(Month::February));
    assert!(kalsubai.rain_longterm.is_some());
    assert_eq!(kalsubai.crowd_score, Some(1.0));

    assert_eq!(report.rainfall_matches, 2);
    assert_eq!(report.tourism_matches, 2);
}

#[tokio::test]
async fn test_country_level_region_uses_reverse_fallback() {
    let harness = Harness::new();
    let (records, report) = harness
        .run(inputs(vec![trail("Triund Trek", "Triund")]))
        .await
        .unwrap();

    let triund = &records[0];
    assert_eq!(triund.state.as_deref(), Some("Himachal Pradesh"));
    // no rainfall or tourism rows for this region: nulls, not a drop
    assert_eq!(triund.rain_longterm, None);
    assert_eq!(triund.crowd_score, None);
    assert!(triund.heat_index.is_some());
    assert_eq!(report.regions_recovered, 1);
}

#[tokio::test]
async fn test_reverse_failure_keeps_the_record() {
    let harness = Harness::new();
    let (records, report) = harness
        .run(inputs(vec![trail("Chadar Trek", "Chadar")]))
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].state, None);
    assert_eq!(records[0].rain_longterm, None);
    assert_eq!(report.geocode.reverse_failures, 1);
    assert_eq!(report.dropped_rows, 0);
}

#[tokio::test]
async fn test_warm_rerun_is_offline_and_byte_identical() {
    let harness = Harness::new();
    let trails = vec![
        trail("Valley of Flowers Trek", "Valley of Flowers"),
        trail("Kalsubai Peak", "Kalsubai"),
        trail("Phantom Ridge", "Nowhere Plateau"),
        trail("Triund Trek", "Triund"),
    ];
    let writer = ParquetWriter::new();
    let first_path = harness.dir.path().join("first.parquet");
    let second_path = harness.dir.path().join("second.parquet");

    let (first, _) = harness.run(inputs(trails.clone())).await.unwrap();
    writer.write_records(&first, &first_path).unwrap();
    let searches_after_first = harness.searches();
    let climate_after_first = harness.climate_calls();
    assert_eq!(searches_after_first, 4);

    let (second, report) = harness.run(inputs(trails)).await.unwrap();
    writer.write_records(&second, &second_path).unwrap();

    assert_eq!(harness.searches(), searches_after_first);
    assert_eq!(harness.climate_calls(), climate_after_first);
    assert_eq!(report.geocode.cache_hits, 4);
    assert_eq!(report.climate.fetched, 0);
    assert_eq!(first, second);
    assert_eq!(
        std::fs::read(&first_path).unwrap(),
        std::fs::read(&second_path).unwrap()
    );
}

#[tokio::test]
async fn test_duplicate_locations_are_geocoded_once() {
    let harness = Harness::new();
    let (records, report) = harness
        .run(inputs(vec![
            trail("Kalsubai Peak", "Kalsubai"),
            trail("Kalsubai Night Trek", "Kalsubai"),
        ]))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].trail_name, "Kalsubai Peak");
    assert_eq!(records[1].trail_name, "Kalsubai Night Trek");
    assert_eq!(report.distinct_queries, 1);
    assert_eq!(harness.searches(), 1);
    // same coordinate, one climate request
    assert_eq!(harness.climate_calls(), 1);
}

#[tokio::test]
async fn test_geocode_cache_is_written_incrementally() {
    let harness = Harness::new();
    harness
        .run(inputs(vec![
            trail("Kalsubai Peak", "Kalsubai"),
            trail("Phantom Ridge", "Nowhere Plateau"),
        ]))
        .await
        .unwrap();

    let cache: JsonFileCache<GeocodeCacheEntry> =
        JsonFileCache::open(&harness.geocode_cache()).unwrap();
    assert_eq!(cache.len().unwrap(), 2);
    assert_eq!(
        cache.get("Nowhere Plateau, India").unwrap(),
        Some(GeocodeCacheEntry::unresolved())
    );
    assert!(cache.get("Kalsubai, India").unwrap().unwrap().is_resolved());
}

#[tokio::test]
async fn test_climate_failure_aborts_by_default() {
    let harness = Harness::new();
    let result = harness
        .pipeline(ClimateFailurePolicy::Abort, true)
        .run(inputs(vec![trail("Kalsubai Peak", "Kalsubai")]))
        .await;

    match result {
        Err(ProcessingError::ClimateFetch {
            latitude, longitude, ..
        }) => {
            assert_eq!(latitude, 19.601);
            assert_eq!(longitude, 73.712);
        }
        other => panic!("expected a climate failure, got {:?}", other.map(|(r, _)| r.len())),
    }
}

#[tokio::test]
async fn test_climate_failure_can_be_skipped() {
    let harness = Harness::new();
    let (records, report) = harness
        .pipeline(ClimateFailurePolicy::Skip, true)
        .run(inputs(vec![
            trail("Kalsubai Peak", "Kalsubai"),
            trail("Valley of Flowers Trek", "Valley of Flowers"),
        ]))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.heat_index.is_none()));
    assert!(records.iter().all(|r| r.rain_longterm.is_some()));
    assert_eq!(report.heat_index_skipped, 2);
}

#[tokio::test]
async fn test_skipped_coordinate_is_requested_once_per_run() {
    let harness = Harness::new();
    let trails = (1..=5)
        .map(|i| trail(&format!("Kalsubai Route {}", i), "Kalsubai"))
        .collect();

    let (records, report) = harness
        .pipeline(ClimateFailurePolicy::Skip, true)
        .run(inputs(trails))
        .await
        .unwrap();

    assert_eq!(records.len(), 5);
    assert_eq!(report.heat_index_skipped, 5);
    assert_eq!(harness.climate_calls(), 1);
    assert_eq!(report.climate.failed, 1);
}

#[tokio::test]
async fn test_reset_caches_forces_new_lookups() {
    let harness = Harness::new();
    let trails = vec![trail("Kalsubai Peak", "Kalsubai")];
    harness.run(inputs(trails.clone())).await.unwrap();

    let mut pipeline = harness.pipeline(ClimateFailurePolicy::Abort, false);
    pipeline.reset_caches().unwrap();
    pipeline.run(inputs(trails)).await.unwrap();

    assert_eq!(harness.searches(), 2);
    assert_eq!(harness.climate_calls(), 2);
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_end_to_end_from_csv_to_parquet() {
    let harness = Harness::new();
    let dir = harness.dir.path();

    let trails_path = write(
        dir,
        "Trails_data.csv",
        "trail_name,location,length,difficulty,average_rating,number_of_reviews,location\n\
         Valley of Flowers Trek,Valley of Flowers,38 km,moderate,4.7,\"1,204\",\n\
         Kalsubai Peak,,6.5 mi,hard,4.5,310,Kalsubai\n\
         Phantom Ridge,Nowhere Plateau,5 km,easy,3.0,2,\n",
    );
    let rainfall_path = write(
        dir,
        "rainfall.csv",
        "SUBDIVISION,YEAR,JAN,FEB,MAR,APR,MAY,JUN,JUL,AUG,SEP,OCT,NOV,DEC,ANNUAL\n\
         UTTARAKHAND,2001,50,60,40,20,30,200,400,380,180,40,5,20,1425\n\
         MADHYA MAHARASHTRA,2001,2,1,3,5,20,150,250,180,160,70,20,6,867\n",
    );
    let tourism_path = write(
        dir,
        "tourism.csv",
        "S.No.,State/UT,2017 - Domestic\n\
         1,Maharashtra,\"119,191,539\"\n\
         2,Uttarakhand,\"34,564,814\"\n\
         ,Total,\"153,756,353\"\n",
    );

    let inputs = PipelineInputs {
        trails: TrailReader::new().read_trails(&trails_path).unwrap(),
        rainfall: RainfallReader::new().read_rainfall(&rainfall_path).unwrap(),
        tourism: TourismReader::default().read_tourism(&tourism_path).unwrap(),
    };
    let (records, report) = harness.run(inputs).await.unwrap();

    let output = dir.join("out").join("clean_trails.parquet");
    let writer = ParquetWriter::new();
    writer.write_records(&records, &output).unwrap();

    assert_eq!(report.input_rows, 3);
    assert_eq!(report.dropped_rows, 1);
    assert_eq!(writer.get_file_info(&output).unwrap().total_rows, 2);

    let read_back = writer.read_sample_records(&output, 10).unwrap();
    assert_eq!(read_back, records);

    let valley = by_name(&read_back, "Valley of Flowers Trek");
    assert_eq!(valley.best_month, Some(Month::November));
    assert_eq!(valley.number_of_reviews, Some(1204));
    assert_eq!(valley.crowd_score, Some(0.0));

    let kalsubai = by_name(&read_back, "Kalsubai Peak");
    assert_eq!(kalsubai.state.as_deref(), Some("Madhya Maharashtra"));
    assert_eq!(kalsubai.best_month, Some(Month::February));
    assert_eq!(kalsubai.distance_mi, Some(6.5));
    assert_eq!(kalsubai.crowd_score, Some(1.0));
}
