//! Snapshot cache file management.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::{Product, Snapshot};
use crate::error_handling::SnapshotError;

/// JSON file holding the last fetched product universe.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
    max_age: Duration,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            path: path.into(),
            max_age,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Whether a snapshot exists and is younger than the max age.
    pub fn is_valid(&self) -> bool {
        match self.read() {
            Ok(snapshot) => age_of(&snapshot) < self.max_age,
            Err(_) => false,
        }
    }

    /// Snapshot age in whole minutes, if one exists.
    pub fn age_minutes(&self) -> Option<u64> {
        self.read().ok().map(|s| age_of(&s).as_secs() / 60)
    }

    /// Loads the cached products.
    pub fn load(&self) -> Result<Vec<Product>, SnapshotError> {
        let snapshot = self.read()?;
        log_loaded(&snapshot);
        Ok(snapshot.products)
    }

    /// Reads the snapshot once and returns its products if it is younger
    /// than the max age.
    ///
    /// `None` means the caller should refresh: the snapshot is missing, stale
    /// or unreadable.
    pub fn load_fresh(&self) -> Option<Vec<Product>> {
        let snapshot = match self.read() {
            Ok(snapshot) => snapshot,
            Err(SnapshotError::Missing(_)) => return None,
            Err(e) => {
                log::warn!("Ignoring unreadable cache: {}", e);
                return None;
            }
        };
        let age = age_of(&snapshot);
        if age >= self.max_age {
            log::info!("Cache is {} minutes old, refreshing", age.as_secs() / 60);
            return None;
        }
        log_loaded(&snapshot);
        Some(snapshot.products)
    }

    /// Replaces the cached snapshot with `products`.
    pub fn save(&self, products: &[Product]) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let snapshot = Snapshot {
            saved_at: chrono::Utc::now().timestamp_millis(),
            products: products.to_vec(),
        };
        let content = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&self.path, content)?;
        log::info!("Saved {} products to cache", products.len());
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SnapshotError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::info!("Cache cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn read(&self) -> Result<Snapshot, SnapshotError> {
        if !self.path.exists() {
            return Err(SnapshotError::Missing(self.path.clone()));
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn log_loaded(snapshot: &Snapshot) {
    log::info!(
        "Loaded {} products ({} variants) from cache",
        snapshot.products.len(),
        snapshot.variant_count()
    );
}

fn age_of(snapshot: &Snapshot) -> Duration {
    let age_ms = chrono::Utc::now().timestamp_millis() - snapshot.saved_at;
    Duration::from_millis(age_ms.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Variant;
    use tempfile::TempDir;

    fn products() -> Vec<Product> {
        vec![Product {
            id: "p1".to_string(),
            title: "Dummy Product 1".to_string(),
            variants: vec![Variant {
                id: "v1".to_string(),
                inventory_item_id: "i1".to_string(),
            }],
        }]
    }

    #[test]
    fn test_missing_cache() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path().join("cache.json"), Duration::from_secs(3600));
        assert!(!cache.exists());
        assert!(!cache.is_valid());
        assert_eq!(cache.age_minutes(), None);
        assert!(matches!(cache.load(), Err(SnapshotError::Missing(_))));
        assert_eq!(cache.load_fresh(), None);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path().join("cache.json"), Duration::from_secs(3600));
        cache.save(&products()).unwrap();
        assert!(cache.exists());
        assert!(cache.is_valid());
        assert_eq!(cache.age_minutes(), Some(0));
        assert_eq!(cache.load().unwrap(), products());
        assert_eq!(cache.load_fresh(), Some(products()));
    }

    #[test]
    fn test_stale_cache_is_invalid_but_loadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let stale = Snapshot {
            saved_at: chrono::Utc::now().timestamp_millis() - 2 * 60 * 60 * 1000,
            products: products(),
        };
        std::fs::write(&path, serde_json::to_string(&stale).unwrap()).unwrap();

        let cache = SnapshotCache::new(&path, Duration::from_secs(3600));
        assert!(!cache.is_valid());
        assert_eq!(cache.age_minutes(), Some(120));
        assert_eq!(cache.load().unwrap().len(), 1);
        assert_eq!(cache.load_fresh(), None);
    }

    #[test]
    fn test_corrupt_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "not json").unwrap();
        let cache = SnapshotCache::new(&path, Duration::from_secs(3600));
        assert!(matches!(cache.load(), Err(SnapshotError::Parse(_))));
        assert_eq!(cache.load_fresh(), None);
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path().join("cache.json"), Duration::from_secs(3600));
        cache.save(&products()).unwrap();
        cache.clear().unwrap();
        assert!(!cache.exists());
        // Clearing twice is fine
        cache.clear().unwrap();
    }
}
