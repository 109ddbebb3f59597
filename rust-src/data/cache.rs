//! Process-wide dataset cache.
//!
//! A dataset is read from disk on first request and shared as an `Arc`
//! afterwards. Entries are only dropped by an explicit [`DatasetCache::clear`];
//! nothing reloads implicitly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::debug;

use super::{load_workbook, LoadOptions};
use crate::error::DashboardError;
use crate::models::Dataset;


/// Loaded datasets keyed by the options used to read them.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<LoadOptions, Arc<Dataset>>>,
}


impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by the whole process.
    pub fn global() -> &'static DatasetCache {
        static CACHE: OnceLock<DatasetCache> = OnceLock::new();
        CACHE.get_or_init(DatasetCache::new)
    }

    /// Return the cached dataset, loading it on first use. Failures are not cached.
    pub fn get_or_load(&self, options: &LoadOptions) -> Result<Arc<Dataset>, DashboardError> {
        self.get_or_load_with(options, load_workbook)
    }

    fn get_or_load_with<F>(&self, options: &LoadOptions, load: F) -> Result<Arc<Dataset>, DashboardError>
    where
        F: FnOnce(&LoadOptions) -> Result<Dataset, DashboardError>,
    {
        let mut entries = self.lock();

        if let Some(dataset) = entries.get(options) {
            debug!(path = %options.path.display(), "dataset cache hit");
            return Ok(Arc::clone(dataset));
        }

        debug!(path = %options.path.display(), "dataset cache miss");
        let dataset = Arc::new(load(options)?);
        entries.insert(options.clone(), Arc::clone(&dataset));

        Ok(dataset)
    }

    /// Drop every cached dataset; the next request reloads from disk.
    #[cfg(test)]
    pub fn clear(&self) {
        self.lock().clear();
        debug!("dataset cache cleared");
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // A poisoned lock still holds a consistent map
    fn lock(&self) -> MutexGuard<'_, HashMap<LoadOptions, Arc<Dataset>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::models::{SaleRecord, Schema};

    fn fake_dataset() -> Dataset {
        Dataset::new(Schema::required(), vec![SaleRecord::new("A", 2022, "CALÇA", 100.0)])
    }

    #[test]
    fn test_loads_once_until_cleared() {
        let cache = DatasetCache::new();
        let options = LoadOptions::default();
        let loads = Cell::new(0);
        let loader = |_: &LoadOptions| {
            loads.set(loads.get() + 1);
            Ok(fake_dataset())
        };

        let first = cache.get_or_load_with(&options, loader).unwrap();
        let second = cache.get_or_load_with(&options, loader).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.get(), 1);

        cache.clear();
        assert_eq!(cache.len(), 0);

        let third = cache.get_or_load_with(&options, loader).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(loads.get(), 2);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let cache = DatasetCache::new();
        let options = LoadOptions::default();

        let result = cache.get_or_load_with(&options, |o| {
            Err(DashboardError::load_failure(&o.path, "file not found"))
        });
        assert!(result.is_err());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_keyed_by_options() {
        let cache = DatasetCache::new();
        let a = LoadOptions::default();
        let b = LoadOptions::default().with_row_limit(10);

        cache.get_or_load_with(&a, |_| Ok(fake_dataset())).unwrap();
        cache.get_or_load_with(&b, |_| Ok(Dataset::default())).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_or_load_with(&b, |_| Ok(fake_dataset())).unwrap().len(), 0);
    }
}
