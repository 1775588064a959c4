use rustc_hash::{FxHashMap, FxHashSet};

use crate::dataset::{CATEGORY, PRIMARY_TEXT, SECONDARY_TEXT};
use crate::error::BenchResult;
use crate::frame::Frame;

/// Default number of retained categories.
pub const DEFAULT_TOP_K: usize = 25;

/// Per-category counts over complete records.
#[derive(Debug, Default)]
pub struct LabelFrequencyTable {
    counts: FxHashMap<String, usize>,
}

impl LabelFrequencyTable {
    /// Counts the `Some` values of a category column.
    pub fn from_column(categories: &[Option<String>]) -> Self {
        let mut counts: FxHashMap<String, usize> = FxHashMap::default();
        for category in categories.iter().flatten() {
            *counts.entry(category.clone()).or_default() += 1;
        }
        LabelFrequencyTable { counts }
    }

    pub fn count(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// The `k` most frequent categories, count descending. Categories
    /// sharing the boundary count are ordered lexicographically so the
    /// cutoff is deterministic.
    pub fn top(&self, k: usize) -> Vec<String> {
        let mut ordered: Vec<(&String, usize)> =
            self.counts.iter().map(|(c, &n)| (c, n)).collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ordered
            .into_iter()
            .take(k)
            .map(|(c, _)| c.clone())
            .collect()
    }
}

/// Drops incomplete rows and restricts the label space to the `top_k`
/// most frequent categories.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyFilter {
    pub top_k: usize,
}

impl Default for FrequencyFilter {
    fn default() -> Self {
        FrequencyFilter { top_k: DEFAULT_TOP_K }
    }
}

impl FrequencyFilter {
    pub fn new(top_k: usize) -> Self {
        FrequencyFilter { top_k }
    }

    /// Applies the filter. An input with no complete rows yields an
    /// empty frame, not an error; fewer than `top_k` distinct
    /// categories retains all of them.
    pub fn apply(&self, frame: &Frame) -> BenchResult<Frame> {
        let categories = frame.strings(CATEGORY)?;
        let primaries = frame.strings(PRIMARY_TEXT)?;
        let secondaries = frame.strings(SECONDARY_TEXT)?;

        let complete: Vec<bool> = (0..frame.len())
            .map(|i| {
                categories[i].is_some() && primaries[i].is_some() && secondaries[i].is_some()
            })
            .collect();
        let cleaned = frame.retain_rows(&complete);

        let table = LabelFrequencyTable::from_column(cleaned.strings(CATEGORY)?);
        let retained: FxHashSet<String> = table.top(self.top_k).into_iter().collect();

        let keep: Vec<bool> = cleaned
            .strings(CATEGORY)?
            .iter()
            .map(|c| c.as_ref().map(|c| retained.contains(c)).unwrap_or(false))
            .collect();
        Ok(cleaned.retain_rows(&keep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;

    fn frame_with_categories(rows: &[(&str, Option<&str>)]) -> Frame {
        let mut frame = Frame::new();
        frame
            .insert(
                CATEGORY,
                Column::Str(rows.iter().map(|(c, _)| Some(c.to_string())).collect()),
            )
            .unwrap();
        frame
            .insert(
                PRIMARY_TEXT,
                Column::Str(rows.iter().map(|(_, t)| t.map(str::to_string)).collect()),
            )
            .unwrap();
        frame
            .insert(
                SECONDARY_TEXT,
                Column::Str(rows.iter().map(|_| Some("s".to_string())).collect()),
            )
            .unwrap();
        frame
    }

    #[test]
    fn drops_rows_with_absent_fields() {
        let frame = frame_with_categories(&[
            ("news", Some("hello")),
            ("news", None),
            ("sports", Some("goal")),
        ]);
        let filtered = FrequencyFilter::default().apply(&frame).unwrap();
        assert_eq!(filtered.len(), 2);
        for value in filtered.strings(PRIMARY_TEXT).unwrap() {
            assert!(value.is_some());
        }
    }

    #[test]
    fn thirty_categories_reduce_to_top_25() {
        // Categories c00..c29; c00 appears 31 times, c01 30 times, and
        // so on down to c29 with 2 rows.
        let mut rows: Vec<(String, Option<&str>)> = Vec::new();
        for i in 0..30 {
            for _ in 0..(31 - i) {
                rows.push((format!("c{:02}", i), Some("text")));
            }
        }
        let owned: Vec<(&str, Option<&str>)> =
            rows.iter().map(|(c, t)| (c.as_str(), *t)).collect();
        let frame = frame_with_categories(&owned);

        let filtered = FrequencyFilter::new(25).apply(&frame).unwrap();
        let table =
            LabelFrequencyTable::from_column(filtered.strings(CATEGORY).unwrap());
        assert_eq!(table.distinct(), 25);
        for i in 0..25 {
            assert!(table.count(&format!("c{:02}", i)) > 0);
        }
        for i in 25..30 {
            assert_eq!(table.count(&format!("c{:02}", i)), 0);
        }
    }

    #[test]
    fn fewer_categories_than_top_k_keeps_all() {
        let frame = frame_with_categories(&[
            ("news", Some("a")),
            ("sports", Some("b")),
            ("news", Some("c")),
        ]);
        let filtered = FrequencyFilter::default().apply(&frame).unwrap();
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn empty_after_cleaning_is_empty_not_an_error() {
        let frame = frame_with_categories(&[("news", None), ("sports", None)]);
        let filtered = FrequencyFilter::default().apply(&frame).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn boundary_ties_break_lexicographically() {
        let table = LabelFrequencyTable::from_column(&[
            Some("beta".to_string()),
            Some("alpha".to_string()),
            Some("gamma".to_string()),
            Some("gamma".to_string()),
        ]);
        // gamma leads on count; alpha beats beta at the tied boundary.
        assert_eq!(table.top(2), vec!["gamma".to_string(), "alpha".to_string()]);
    }
}
