use std::path::Path;

use crate::config::TourismSettings;
use crate::error::{ProcessingError, Result};
use crate::models::TourismRow;
use crate::utils::encoding::read_input;
use crate::utils::text::parse_number;

/// Reads visitor arrivals per region from a statistics table whose region and
/// arrivals columns are configurable.
pub struct TourismReader {
    region_column: String,
    arrivals_column: String,
}

impl TourismReader {
    pub fn new(region_column: impl Into<String>, arrivals_column: impl Into<String>) -> Self {
        Self {
            region_column: region_column.into(),
            arrivals_column: arrivals_column.into(),
        }
    }

    pub fn from_settings(settings: &TourismSettings) -> Self {
        Self::new(&settings.region_column, &settings.arrivals_column)
    }

    pub fn read_tourism(&self, path: &Path) -> Result<Vec<TourismRow>> {
        let content = read_input(path)?;
        self.parse_tourism(&content, &path.display().to_string())
    }

    /// Rows without a usable count and the table's own total rows are skipped
    pub fn parse_tourism(&self, content: &str, source: &str) -> Result<Vec<TourismRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
                .ok_or_else(|| ProcessingError::MissingColumn {
                    column: name.to_string(),
                    file: source.to_string(),
                })
        };
        let region_index = column(&self.region_column)?;
        let arrivals_index = column(&self.arrivals_column)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let region = record.get(region_index).unwrap_or("").trim();
            if region.is_empty() || is_total_row(region) {
                continue;
            }

            let Some(arrivals) = record
                .get(arrivals_index)
                .and_then(parse_number)
                .filter(|n| *n >= 0.0)
            else {
                tracing::debug!("No arrivals count for '{}' in {}", region, source);
                continue;
            };

            rows.push(TourismRow::new(region, arrivals));
        }

        tracing::debug!("Read {} tourism rows from {}", rows.len(), source);
        Ok(rows)
    }
}

impl Default for TourismReader {
    fn default() -> Self {
        Self::from_settings(&TourismSettings::default())
    }
}

fn is_total_row(region: &str) -> bool {
    let region = region.to_lowercase();
    region == "total" || region == "grand total"
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
S.No.,State/UT,2016 - Domestic,2017 - Domestic,2017 - Foreign
1,Andhra Pradesh,\"153163354\",\"165433898\",\"265752\"
2,Goa,5650061,6895234,842220
3,Lakshadweep,,,
,Total,1615388619,1652485025,26886985
";

    #[test]
    fn test_parse_tourism() -> Result<()> {
        let rows = TourismReader::default().parse_tourism(TABLE, "tourism.csv")?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], TourismRow::new("Andhra Pradesh", 165433898.0));
        assert_eq!(rows[1], TourismRow::new("Goa", 6895234.0));
        Ok(())
    }

    #[test]
    fn test_thousands_separators() -> Result<()> {
        let table = "State/UT,2017 - Domestic\nKerala,\"14,673,520\"\n";
        let rows = TourismReader::default().parse_tourism(table, "tourism.csv")?;
        assert_eq!(rows[0].arrivals, 14673520.0);
        Ok(())
    }

    #[test]
    fn test_configured_columns() -> Result<()> {
        let rows = TourismReader::new("State/UT", "2016 - Domestic").parse_tourism(TABLE, "t.csv")?;
        assert_eq!(rows[1].arrivals, 5650061.0);
        Ok(())
    }

    #[test]
    fn test_missing_column() {
        let err = TourismReader::new("State", "Arrivals")
            .parse_tourism(TABLE, "tourism.csv")
            .unwrap_err();
        assert!(matches!(err, ProcessingError::MissingColumn { .. }));
    }
}
