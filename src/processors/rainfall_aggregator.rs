use std::collections::BTreeMap;

use crate::models::{Month, RainfallRow, RainfallStats};
use crate::utils::text::title_case;

/// Reduces year-by-year subdivision rainfall to one long-term profile per
/// subdivision.
#[derive(Debug, Default)]
pub struct RainfallAggregator;

#[derive(Default)]
struct MonthlyAccumulator {
    sums: [f64; 12],
    counts: [usize; 12],
}

impl MonthlyAccumulator {
    fn add(&mut self, row: &RainfallRow) {
        for (i, value) in row.monthly.iter().enumerate() {
            if let Some(v) = value.filter(|v| v.is_finite()) {
                self.sums[i] += v;
                self.counts[i] += 1;
            }
        }
    }

    fn monthly_means(&self) -> [Option<f64>; 12] {
        let mut means = [None; 12];
        for (i, mean) in means.iter_mut().enumerate() {
            if self.counts[i] > 0 {
                *mean = Some(self.sums[i] / self.counts[i] as f64);
            }
        }
        means
    }

    fn stats(&self) -> RainfallStats {
        let means = self.monthly_means();

        let available: Vec<(usize, f64)> = means
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.map(|v| (i, v)))
            .collect();

        if available.is_empty() {
            return RainfallStats {
                mean_rainfall: None,
                driest_month: None,
            };
        }

        let mean_rainfall = available.iter().map(|(_, v)| v).sum::<f64>() / available.len() as f64;

        // strict comparison keeps the earliest month on ties
        let mut driest = available[0];
        for &(i, v) in &available[1..] {
            if v < driest.1 {
                driest = (i, v);
            }
        }

        RainfallStats {
            mean_rainfall: Some(mean_rainfall),
            driest_month: Month::from_index(driest.0),
        }
    }
}

impl RainfallAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Group rows by title-cased subdivision; per month average over years,
    /// skipping missing values, then take the mean of the monthly means and
    /// the month with the smallest one.
    pub fn aggregate(&self, rows: &[RainfallRow]) -> BTreeMap<String, RainfallStats> {
        let mut groups: BTreeMap<String, MonthlyAccumulator> = BTreeMap::new();

        for row in rows {
            let subdivision = title_case(row.subdivision.trim());
            if subdivision.is_empty() {
                continue;
            }
            groups.entry(subdivision).or_default().add(row);
        }

        let aggregated: BTreeMap<String, RainfallStats> = groups
            .into_iter()
            .map(|(subdivision, acc)| (subdivision, acc.stats()))
            .collect();

        tracing::debug!(
            "Aggregated {} rainfall rows into {} subdivisions",
            rows.len(),
            aggregated.len()
        );

        aggregated
    }
}
