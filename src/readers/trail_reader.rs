use std::path::Path;

use tracing::{debug, warn};

use crate::error::{ProcessingError, Result};
use crate::models::TrailRecord;
use crate::utils::encoding::read_input;
use crate::utils::text::{non_blank, parse_number};

/// Reads the raw trails table.
///
/// Headers are matched trimmed and lower-cased. The table may carry the
/// location twice (a second `location` column, or `location.1` when it was
/// re-exported); the second is used when the first is blank.
pub struct TrailReader {
    skip_unnamed: bool,
}

struct TrailColumns {
    trail_name: usize,
    length: usize,
    locations: Vec<usize>,
    difficulty: Option<usize>,
    average_rating: Option<usize>,
    number_of_reviews: Option<usize>,
}

impl TrailColumns {
    fn resolve(headers: &csv::StringRecord, source: &str) -> Result<Self> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |name: &str| names.iter().position(|h| h == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| ProcessingError::MissingColumn {
                column: name.to_string(),
                file: source.to_string(),
            })
        };

        let mut locations: Vec<usize> = names
            .iter()
            .enumerate()
            .filter(|(_, h)| *h == "location")
            .map(|(i, _)| i)
            .collect();
        if let Some(i) = find("location.1") {
            locations.push(i);
        }
        if locations.is_empty() {
            return Err(ProcessingError::MissingColumn {
                column: "location".to_string(),
                file: source.to_string(),
            });
        }

        Ok(Self {
            trail_name: require("trail_name")?,
            length: require("length")?,
            locations,
            difficulty: find("difficulty"),
            average_rating: find("average_rating"),
            number_of_reviews: find("number_of_reviews"),
        })
    }
}

impl TrailReader {
    pub fn new() -> Self {
        Self { skip_unnamed: true }
    }

    /// With `false`, a row with a blank trail name is an error instead of
    /// being skipped
    pub fn with_skip_unnamed(skip_unnamed: bool) -> Self {
        Self { skip_unnamed }
    }

    pub fn read_trails(&self, path: &Path) -> Result<Vec<TrailRecord>> {
        let content = read_input(path)?;
        self.parse_trails(&content, &path.display().to_string())
    }

    pub fn parse_trails(&self, content: &str, source: &str) -> Result<Vec<TrailRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let columns = TrailColumns::resolve(reader.headers()?, source)?;
        let mut trails = Vec::new();
        let mut skipped = 0;

        for row in reader.records() {
            let row = row?;
            let cell = |index: usize| row.get(index).unwrap_or("");

            let name = cell(columns.trail_name);
            if name.is_empty() {
                if self.skip_unnamed {
                    skipped += 1;
                    continue;
                }
                let line = row.position().map(|p| p.line()).unwrap_or_default();
                return Err(ProcessingError::InvalidFormat(format!(
                    "{}: line {} has a blank trail_name",
                    source, line
                )));
            }

            let location = columns
                .locations
                .iter()
                .find_map(|&i| non_blank(cell(i)))
                .unwrap_or_default();

            let optional = |index: Option<usize>| index.map(cell).unwrap_or("");
            let reviews = parse_number(optional(columns.number_of_reviews))
                .filter(|n| *n >= 0.0 && *n <= u32::MAX as f64)
                .map(|n| n.round() as u32);

            let trail = TrailRecord::new(name)
                .with_location(location)
                .with_length(cell(columns.length))
                .with_difficulty(non_blank(optional(columns.difficulty)))
                .with_rating(parse_number(optional(columns.average_rating)), reviews);

            trails.push(trail);
        }

        if skipped > 0 {
            warn!("Skipped {} unnamed rows in {}", skipped, source);
        }
        debug!("Read {} trails from {}", trails.len(), source);

        Ok(trails)
    }
}

impl Default for TrailReader {
    fn default() -> Self {
        Self::new()
    }
}
