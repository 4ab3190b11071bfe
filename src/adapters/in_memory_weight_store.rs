//! In-memory weight store for testing.
//!
//! Keeps weight vectors in a shared map keyed by path so tests can run the
//! controller without touching the file system.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use crate::{Result, error::Error, ports::WeightStore};

/// In-memory store; clones share the same storage.
///
/// # Examples
///
/// ```
/// use footman_rl::adapters::InMemoryWeightStore;
/// use footman_rl::ports::WeightStore;
/// use std::path::Path;
///
/// let store = InMemoryWeightStore::new();
/// store.save(&[1.0, 2.0], Path::new("weights"))?;
/// assert_eq!(store.load(Path::new("weights"))?, vec![1.0, 2.0]);
/// assert_eq!(store.save_count(), 1);
/// # Ok::<(), footman_rl::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct InMemoryWeightStore {
    storage: Arc<Mutex<HashMap<String, Vec<f64>>>>,
    saves: Arc<Mutex<usize>>,
}

impl InMemoryWeightStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. to simulate a previous run's weight file.
    pub fn with_weights(self, path: &Path, weights: Vec<f64>) -> Self {
        self.storage
            .lock()
            .unwrap()
            .insert(path.to_string_lossy().to_string(), weights);
        self
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }

    /// Check if weights exist at the given path.
    pub fn contains(&self, path: &Path) -> bool {
        let key = path.to_string_lossy().to_string();
        self.storage.lock().unwrap().contains_key(&key)
    }

    /// Clear all stored vectors.
    pub fn clear(&self) {
        self.storage.lock().unwrap().clear();
    }
}

impl WeightStore for InMemoryWeightStore {
    fn save(&self, weights: &[f64], path: &Path) -> Result<()> {
        let key = path.to_string_lossy().to_string();
        self.storage.lock().unwrap().insert(key, weights.to_vec());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Vec<f64>> {
        let key = path.to_string_lossy().to_string();
        self.storage
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::MissingWeights { location: key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_save_and_load() {
        let store = InMemoryWeightStore::new();
        let path = Path::new("weights");

        assert!(!store.contains(path));
        store.save(&[0.5, 0.25], path).unwrap();

        assert!(store.contains(path));
        assert_eq!(store.load(path).unwrap(), vec![0.5, 0.25]);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_load_nonexistent_reports_missing() {
        let store = InMemoryWeightStore::new();
        let result = store.load(Path::new("nonexistent"));
        assert!(matches!(result, Err(Error::MissingWeights { .. })));
    }

    #[test]
    fn test_clone_shares_storage() {
        let store1 = InMemoryWeightStore::new();
        let store2 = store1.clone();

        store1.save(&[3.0], Path::new("shared")).unwrap();

        assert_eq!(store2.load(Path::new("shared")).unwrap(), vec![3.0]);
        assert_eq!(store2.save_count(), 1);
    }
}
