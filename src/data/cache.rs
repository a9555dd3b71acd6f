//! Table Cache Module
//! Memoizes the clean table per source file, keyed on path, size and modification time.

use super::loader::{load_and_clean, LoadError};
use super::processor::CleanOutcome;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Identity of a source file at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceKey {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceKey {
    pub fn of(path: &Path) -> Result<Self, LoadError> {
        let metadata = std::fs::metadata(path).map_err(|source| LoadError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// Holds the last successfully loaded table.
///
/// Failed loads are never cached.
#[derive(Debug, Default)]
pub struct TableCache {
    entry: Option<(SourceKey, Arc<CleanOutcome>)>,
    loads: usize,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table if the source is unchanged, otherwise load it.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<CleanOutcome>, LoadError> {
        let key = SourceKey::of(path)?;

        if let Some((cached_key, outcome)) = &self.entry {
            if *cached_key == key {
                log::debug!("Cache hit for {}", path.display());
                return Ok(Arc::clone(outcome));
            }
            log::info!("Source {} changed, reloading", path.display());
        }

        self.load(key)
    }

    /// Drop the cached table and load the source again.
    pub fn reload(&mut self, path: &Path) -> Result<Arc<CleanOutcome>, LoadError> {
        self.invalidate();
        let key = SourceKey::of(path)?;
        self.load(key)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|(key, _)| key.path == path)
    }

    /// Number of loads performed (cache misses).
    pub fn load_count(&self) -> usize {
        self.loads
    }

    fn load(&mut self, key: SourceKey) -> Result<Arc<CleanOutcome>, LoadError> {
        self.loads += 1;
        let outcome = Arc::new(load_and_clean(&key.path)?);
        self.entry = Some((key, Arc::clone(&outcome)));
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "retail_dashboard_cache_{}_{}.csv",
            name,
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_second_get_is_cache_hit() {
        let path = fixture("hit", "Montant,Magasin,Categorie_Produit\n10,A,X\n");
        let mut cache = TableCache::new();

        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.load_count(), 1);
        assert!(cache.is_cached(&path));
    }

    #[test]
    fn test_changed_source_is_reloaded() {
        let path = fixture("changed", "Montant,Magasin,Categorie_Produit\n10,A,X\n");
        let mut cache = TableCache::new();
        assert_eq!(cache.get_or_load(&path).unwrap().table.len(), 1);

        std::fs::write(&path, "Montant,Magasin,Categorie_Produit\n10,A,X\n20,B,Y\n").unwrap();
        let reloaded = cache.get_or_load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reloaded.table.len(), 2);
        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn test_reload_forces_load() {
        let path = fixture("reload", "Montant,Magasin,Categorie_Produit\n10,A,X\n");
        let mut cache = TableCache::new();
        cache.get_or_load(&path).unwrap();
        cache.reload(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn test_invalidate_and_missing_source() {
        let mut cache = TableCache::new();
        let missing = std::env::temp_dir().join("retail_dashboard_cache_missing.csv");
        assert!(cache.get_or_load(&missing).is_err());
        assert!(!cache.is_cached(&missing));

        cache.invalidate();
        assert_eq!(cache.load_count(), 0);
    }
}
