// Numeric and text helpers shared by the reducers.

use std::collections::HashMap;

use crate::config::{NumericBucket, NumericStats, WriteInCount};

pub const MAX_BUCKETS: usize = 10;

/// Share of `count` in `total`, between 0 and 100. Zero if there is nothing to share.
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * (count as f64) / (total as f64)
    }
}

/// Same as `percentage`, rounded to the closest integer.
pub fn round_percentage(count: u64, total: u64) -> u32 {
    percentage(count, total).round() as u32
}

/// Grouping key for free text: surrounding whitespace and case are not significant.
pub fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Counts string values, remembering the order and the label of the first occurrence
/// of every key.
#[derive(Debug, Clone, Default)]
pub struct TextTally {
    normalize: bool,
    index: HashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl TextTally {
    /// Exact strings are the keys.
    pub fn exact() -> TextTally {
        TextTally {
            normalize: false,
            ..Default::default()
        }
    }

    /// Trimmed, lowercased strings are the keys. The first trimmed text is the label.
    pub fn normalized() -> TextTally {
        TextTally {
            normalize: true,
            ..Default::default()
        }
    }

    pub fn add(&mut self, s: &str) {
        let (key, label) = if self.normalize {
            (normalize_text(s), s.trim().to_string())
        } else {
            (s.to_string(), s.to_string())
        };
        if let Some(&idx) = self.index.get(&key) {
            self.entries[idx].1 += 1;
        } else {
            self.index.insert(key, self.entries.len());
            self.entries.push((label, 1));
        }
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| *c).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most frequent first. Ties keep the order in which the values were first seen.
    pub fn into_sorted(self) -> Vec<WriteInCount> {
        let mut res: Vec<WriteInCount> = self
            .entries
            .into_iter()
            .map(|(response, count)| WriteInCount { response, count })
            .collect();
        // sort_by is stable
        res.sort_by(|a, b| b.count.cmp(&a.count));
        res
    }
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        0.0
    } else if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Descriptive statistics. An empty input gives all zeros.
pub fn numeric_stats(values: &[f64]) -> NumericStats {
    if values.is_empty() {
        return NumericStats::default();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let sum: f64 = sorted.iter().sum();
    NumericStats {
        mean: sum / (sorted.len() as f64),
        median: median_of_sorted(&sorted),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        count: sorted.len() as u64,
    }
}

/// Splits the values in at most `MAX_BUCKETS` ranges of equal width spanning [min, max].
///
/// The width is never below 1. The last range also holds the maximum. Empty ranges
/// are not returned.
pub fn numeric_buckets(values: &[f64]) -> Vec<NumericBucket> {
    if values.is_empty() {
        return Vec::new();
    }
    let stats = numeric_stats(values);
    let width = ((stats.max - stats.min) / MAX_BUCKETS as f64).ceil().max(1.0);

    let mut counts: [u64; MAX_BUCKETS] = [0; MAX_BUCKETS];
    for v in values.iter() {
        let idx = ((v - stats.min) / width).floor() as usize;
        counts[idx.min(MAX_BUCKETS - 1)] += 1;
    }

    counts
        .iter()
        .enumerate()
        .filter(|(_, c)| **c > 0)
        .map(|(idx, c)| {
            let lower = stats.min + width * idx as f64;
            let upper = lower + width;
            NumericBucket {
                label: format!("{}-{}", lower, upper),
                lower,
                upper,
                count: *c,
                percentage: percentage(*c, stats.count),
            }
        })
        .collect()
}
