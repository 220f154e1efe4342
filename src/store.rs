use crate::app_dirs::AppDirs;
use crate::error::StoreError;
use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Where best streaks live between runs, one entry per level.
pub trait BestStreakStore {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Vec<u32>>, StoreError>;
    fn save(&self, streaks: &[u32]) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

impl<S: BestStreakStore + ?Sized> BestStreakStore for Box<S> {
    fn load(&self) -> Result<Option<Vec<u32>>, StoreError> {
        (**self).load()
    }

    fn save(&self, streaks: &[u32]) -> Result<(), StoreError> {
        (**self).save(streaks)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// JSON array on disk, e.g. `[3,0,12,0,0]`
#[derive(Debug, Clone)]
pub struct FileBestStreakStore {
    path: PathBuf,
}

impl FileBestStreakStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::best_streaks_path()
                .unwrap_or_else(|| PathBuf::from("multidrill_best_streaks.json")),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileBestStreakStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BestStreakStore for FileBestStreakStore {
    fn load(&self) -> Result<Option<Vec<u32>>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&self, streaks: &[u32]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec(streaks)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Keeps records for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    streaks: RefCell<Option<Vec<u32>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_streaks(streaks: Vec<u32>) -> Self {
        Self {
            streaks: RefCell::new(Some(streaks)),
        }
    }

    pub fn stored(&self) -> Option<Vec<u32>> {
        self.streaks.borrow().clone()
    }
}

impl BestStreakStore for InMemoryStore {
    fn load(&self) -> Result<Option<Vec<u32>>, StoreError> {
        Ok(self.stored())
    }

    fn save(&self, streaks: &[u32]) -> Result<(), StoreError> {
        *self.streaks.borrow_mut() = Some(streaks.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.streaks.borrow_mut() = None;
        Ok(())
    }
}

/// Best streak per level, backed by a [`BestStreakStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestStreaks {
    by_level: Vec<u32>,
}

impl BestStreaks {
    pub fn zeroed(level_count: usize) -> Self {
        Self {
            by_level: vec![0; level_count],
        }
    }

    /// Loads stored records. Anything unreadable or sized for a different
    /// number of levels is discarded and replaced by a zero baseline.
    pub fn load(store: &impl BestStreakStore, level_count: usize) -> Self {
        match store.load() {
            Ok(Some(by_level)) if by_level.len() == level_count => Self { by_level },
            Ok(Some(by_level)) => {
                log::warn!(
                    "stored best streaks have {} entries, expected {}; resetting",
                    by_level.len(),
                    level_count
                );
                Self::discard(store, level_count)
            }
            Ok(None) => Self::zeroed(level_count),
            Err(err) => {
                log::error!("failed to load best streaks: {}; resetting", err);
                Self::discard(store, level_count)
            }
        }
    }

    fn discard(store: &impl BestStreakStore, level_count: usize) -> Self {
        if let Err(err) = store.clear() {
            log::error!("failed to clear stored best streaks: {}", err);
        }
        Self::zeroed(level_count)
    }

    pub fn get(&self, level: usize) -> u32 {
        self.by_level.get(level).copied().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.by_level
    }

    /// Raises the level's record if `streak` beats it and persists the new
    /// table. Returns whether a new record was set.
    pub fn record(&mut self, store: &impl BestStreakStore, level: usize, streak: u32) -> bool {
        match self.by_level.get_mut(level) {
            Some(best) if streak > *best => *best = streak,
            _ => return false,
        }
        if let Err(err) = store.save(&self.by_level) {
            log::error!("failed to save best streaks: {}", err);
        }
        true
    }
}
