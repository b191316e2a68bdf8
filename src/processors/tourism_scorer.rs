use std::collections::BTreeMap;

use crate::models::TourismRow;
use crate::processors::RegionNormalizer;

/// Turns raw visitor counts into a crowd score in [0, 1] per canonical region.
#[derive(Debug, Default)]
pub struct TourismScorer;

impl TourismScorer {
    pub fn new() -> Self {
        Self
    }

    /// Sum arrivals per canonical region, then min-max normalize.
    ///
    /// Several states can share one subdivision, so their arrivals add up.
    /// When every region has the same total there is no spread to measure and
    /// all scores are 0.0.
    pub fn score(&self, rows: &[TourismRow], normalizer: &RegionNormalizer) -> BTreeMap<String, f64> {
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for row in rows {
            if !row.arrivals.is_finite() {
                continue;
            }
            let region = normalizer.normalize(&row.region);
            if region.is_empty() {
                continue;
            }
            *totals.entry(region).or_insert(0.0) += row.arrivals;
        }

        let min = totals.values().copied().fold(f64::INFINITY, f64::min);
        let max = totals.values().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        totals
            .into_iter()
            .map(|(region, arrivals)| {
                let score = if range > 0.0 {
                    ((arrivals - min) / range).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                (region, score)
            })
            .collect()
    }
}
