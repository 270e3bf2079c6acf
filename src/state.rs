use std::sync::{Arc, Mutex, PoisonError};

use crate::aggregate::{
    distribution_comparison, ranked_summary, trend_series, Comparison, Granularity, SummaryRow,
    TrendPoint,
};
use crate::data::filter::{filtered, init_selection, CountrySelection};
use crate::data::loader::{self, LoadError, LoaderConfig};
use crate::data::model::{CombinedDataset, Country};

// ---------------------------------------------------------------------------
// Session-lifetime dataset cache
// ---------------------------------------------------------------------------

/// Holds the combined dataset for the lifetime of the hosting process.
///
/// The first [`get_or_load`](Self::get_or_load) runs the loader; later calls
/// hand out the same `Arc` until [`invalidate`](Self::invalidate) is called.
pub struct DatasetCache {
    config: LoaderConfig,
    slot: Mutex<Option<Arc<CombinedDataset>>>,
}

impl DatasetCache {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached dataset, loading it on first use.
    /// A failed load leaves the cache empty.
    pub fn get_or_load(&self) -> Result<Arc<CombinedDataset>, LoadError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(ds) = slot.as_ref() {
            return Ok(Arc::clone(ds));
        }
        let ds = Arc::new(loader::load(&self.config)?);
        *slot = Some(Arc::clone(&ds));
        Ok(ds)
    }

    /// Drop the cached dataset; the next access reloads.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            log::debug!("dataset cache invalidated");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

// ---------------------------------------------------------------------------
// Dashboard selection state
// ---------------------------------------------------------------------------

/// The two user-controlled parameters, independent of rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    /// Countries shown in the comparison and trend charts.
    pub selection: CountrySelection,
    /// Bucket width of the trend chart.
    pub granularity: Granularity,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            selection: init_selection(),
            granularity: Granularity::default(),
        }
    }
}

/// Everything one dashboard refresh displays.
#[derive(Debug, Clone)]
pub struct Views<'a> {
    /// Always computed over the whole dataset, ignoring the selection.
    pub summary: Vec<SummaryRow>,
    pub comparison: Comparison<'a>,
    /// Empty when nothing is selected.
    pub trend: Vec<TrendPoint>,
}

impl DashboardState {
    /// Toggle a single country in the selection.
    pub fn toggle_country(&mut self, country: Country) {
        if !self.selection.remove(&country) {
            self.selection.insert(country);
        }
    }

    pub fn select_all(&mut self) {
        self.selection = init_selection();
    }

    pub fn select_none(&mut self) {
        self.selection.clear();
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
    }

    /// Recompute every derived view for the current selection.
    pub fn views<'a>(&self, dataset: &'a CombinedDataset) -> Views<'a> {
        let summary = ranked_summary(dataset.records());
        let comparison = distribution_comparison(dataset, &self.selection);
        let trend = trend_series(filtered(dataset, &self.selection), self.granularity);
        Views {
            summary,
            comparison,
            trend,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::data::model::DataOrigin;

    fn write_all(dir: &std::path::Path, ghi: f64) {
        for c in Country::ALL {
            let body = format!("TIMESTAMP,GHI\n2022-01-01 10:00:00,{ghi}\n");
            fs::write(dir.join(format!("{}_clean.csv", c.file_stem())), body).unwrap();
        }
    }

    fn cache(dir: &std::path::Path) -> DatasetCache {
        DatasetCache::new(LoaderConfig {
            data_dir: dir.to_path_buf(),
            ..LoaderConfig::default()
        })
    }

    #[test]
    fn repeated_access_returns_same_dataset() {
        let dir = TempDir::new().unwrap();
        write_all(dir.path(), 10.0);
        let cache = cache(dir.path());
        assert!(!cache.is_loaded());

        let a = cache.get_or_load().unwrap();
        // file changes are not observed without invalidation
        write_all(dir.path(), 99.0);
        let b = cache.get_or_load().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.records()[0].ghi, 10.0);
    }

    #[test]
    fn invalidate_forces_reload() {
        let dir = TempDir::new().unwrap();
        write_all(dir.path(), 10.0);
        let cache = cache(dir.path());
        let a = cache.get_or_load().unwrap();

        write_all(dir.path(), 99.0);
        cache.invalidate();
        assert!(!cache.is_loaded());
        let b = cache.get_or_load().unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.records()[0].ghi, 99.0);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = TempDir::new().unwrap();
        for c in Country::ALL {
            fs::write(
                dir.path().join(format!("{}_clean.csv", c.file_stem())),
                "TIMESTAMP,DNI\n2022-01-01 10:00:00,1\n",
            )
            .unwrap();
        }
        let cache = cache(dir.path());
        assert!(matches!(cache.get_or_load(), Err(LoadError::NoData)));
        assert!(!cache.is_loaded());
    }

    #[test]
    fn selection_toggles() {
        let mut state = DashboardState::default();
        assert_eq!(state.selection.len(), 3);
        state.toggle_country(Country::Benin);
        assert!(!state.selection.contains(&Country::Benin));
        state.toggle_country(Country::Benin);
        assert!(state.selection.contains(&Country::Benin));
        state.select_none();
        assert!(state.selection.is_empty());
        state.select_all();
        assert_eq!(state.selection.len(), 3);
    }

    #[test]
    fn summary_ignores_selection_but_charts_do_not() {
        let ts = chrono::NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let ds = CombinedDataset::new(
            Country::ALL
                .into_iter()
                .map(|country| crate::data::model::Measurement { country, timestamp: ts, ghi: 1.0 })
                .collect(),
            DataOrigin::Measured,
        );
        let mut state = DashboardState::default();
        state.select_none();
        let views = state.views(&ds);
        assert_eq!(views.summary.len(), 3);
        assert!(views.comparison.is_empty());
        assert!(views.trend.is_empty());
    }
}
