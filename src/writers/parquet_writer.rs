use crate::error::{ProcessingError, Result};
use crate::models::{EnrichedRecord, Month};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use validator::Validate;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(parquet::basic::ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write enriched trails to a Parquet file, replacing it.
    ///
    /// An empty slice still produces a file carrying the schema.
    pub fn write_records(&self, records: &[EnrichedRecord], path: &Path) -> Result<()> {
        self.write_records_batched(records, path, records.len().max(1))
    }

    /// Write records in chunks of `batch_size` rows
    pub fn write_records_batched(
        &self,
        records: &[EnrichedRecord],
        path: &Path,
        batch_size: usize,
    ) -> Result<()> {
        for record in records {
            record.validate()?;
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let schema = Self::schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        for chunk in records.chunks(batch_size.max(1)) {
            let batch = self.records_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        tracing::info!("Wrote {} trails to {}", records.len(), path.display());
        Ok(())
    }

    /// Output schema. Everything a join or lookup can miss is nullable.
    pub fn schema() -> Arc<Schema> {
        let fields = vec![
            Field::new("trail_name", DataType::Utf8, false),
            Field::new("state", DataType::Utf8, true),
            Field::new("lat", DataType::Float64, false),
            Field::new("lon", DataType::Float64, false),
            Field::new("distance_km", DataType::Float64, true),
            Field::new("distance_mi", DataType::Float64, true),
            Field::new("difficulty", DataType::Utf8, true),
            Field::new("average_rating", DataType::Float64, true),
            Field::new("number_of_reviews", DataType::UInt32, true),
            Field::new("rain_longterm", DataType::Float64, true),
            Field::new("crowd_score", DataType::Float64, true),
            Field::new("heat_index", DataType::Float64, true),
            Field::new("best_month", DataType::Utf8, true),
        ];

        Arc::new(Schema::new(fields))
    }

    fn records_to_batch(
        &self,
        records: &[EnrichedRecord],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let floats = |f: fn(&EnrichedRecord) -> Option<f64>| -> ArrayRef {
            Arc::new(Float64Array::from(records.iter().map(f).collect::<Vec<_>>()))
        };
        let strings = |f: fn(&EnrichedRecord) -> Option<&str>| -> ArrayRef {
            Arc::new(StringArray::from(records.iter().map(f).collect::<Vec<_>>()))
        };

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(
                records.iter().map(|r| r.trail_name.as_str()).collect::<Vec<_>>(),
            )),
            strings(|r| r.state.as_deref()),
            Arc::new(Float64Array::from(records.iter().map(|r| r.lat).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(records.iter().map(|r| r.lon).collect::<Vec<_>>())),
            floats(|r| r.distance_km),
            floats(|r| r.distance_mi),
            strings(|r| r.difficulty.as_deref()),
            floats(|r| r.average_rating),
            Arc::new(UInt32Array::from(
                records.iter().map(|r| r.number_of_reviews).collect::<Vec<_>>(),
            )),
            floats(|r| r.rain_longterm),
            floats(|r| r.crowd_score),
            floats(|r| r.heat_index),
            strings(|r| r.best_month.map(|m| m.label())),
        ];

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Read up to `limit` records back from a Parquet file
    pub fn read_sample_records(&self, path: &Path, limit: usize) -> Result<Vec<EnrichedRecord>> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let file = File::open(path)?;
        let parquet_reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(limit.clamp(1, 8192))
            .build()?;

        let mut records = Vec::new();

        for batch_result in parquet_reader {
            if records.len() >= limit {
                break;
            }
            let batch = batch_result?;

            let trail_names = column::<StringArray>(&batch, "trail_name")?;
            let states = column::<StringArray>(&batch, "state")?;
            let lats = column::<Float64Array>(&batch, "lat")?;
            let lons = column::<Float64Array>(&batch, "lon")?;
            let distance_km = column::<Float64Array>(&batch, "distance_km")?;
            let distance_mi = column::<Float64Array>(&batch, "distance_mi")?;
            let difficulties = column::<StringArray>(&batch, "difficulty")?;
            let ratings = column::<Float64Array>(&batch, "average_rating")?;
            let reviews = column::<UInt32Array>(&batch, "number_of_reviews")?;
            let rainfall = column::<Float64Array>(&batch, "rain_longterm")?;
            let crowd = column::<Float64Array>(&batch, "crowd_score")?;
            let heat = column::<Float64Array>(&batch, "heat_index")?;
            let best_months = column::<StringArray>(&batch, "best_month")?;

            let to_read = batch.num_rows().min(limit - records.len());
            for i in 0..to_read {
                let best_month = optional_str(best_months, i)
                    .map(|label| label.parse::<Month>())
                    .transpose()?;

                records.push(EnrichedRecord {
                    trail_name: trail_names.value(i).to_string(),
                    state: optional_str(states, i).map(String::from),
                    lat: lats.value(i),
                    lon: lons.value(i),
                    distance_km: optional_f64(distance_km, i),
                    distance_mi: optional_f64(distance_mi, i),
                    difficulty: optional_str(difficulties, i).map(String::from),
                    average_rating: optional_f64(ratings, i),
                    number_of_reviews: (!reviews.is_null(i)).then(|| reviews.value(i)),
                    rain_longterm: optional_f64(rainfall, i),
                    crowd_score: optional_f64(crowd, i),
                    heat_index: optional_f64(heat, i),
                    best_month,
                });
            }
        }

        Ok(records)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        // compression as written, not as configured on this writer
        let compression = metadata
            .row_groups()
            .first()
            .and_then(|rg| rg.columns().first())
            .map(|c| c.compression())
            .unwrap_or(self.compression);

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid or missing {} column", name)))
}

fn optional_f64(array: &Float64Array, i: usize) -> Option<f64> {
    (!array.is_null(i)).then(|| array.value(i))
}

fn optional_str(array: &StringArray, i: usize) -> Option<&str> {
    (!array.is_null(i)).then(|| array.value(i))
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };

        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
            avg_rows
        )
    }
}
