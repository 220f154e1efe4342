use crate::app_dirs::AppDirs;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Allotted seconds per question once the streak reaches `min_streak`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreakTier {
    pub min_streak: u32,
    pub seconds: u32,
}

/// Inclusive factor bounds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FactorRange {
    pub lo: u32,
    pub hi: u32,
}

impl FactorRange {
    pub const fn new(lo: u32, hi: u32) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, n: u32) -> bool {
        self.lo <= n && n <= self.hi
    }

    /// Number of distinct values in the range
    pub fn len(&self) -> u64 {
        if self.hi < self.lo {
            0
        } else {
            (self.hi - self.lo) as u64 + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Level {
    pub name: String,
    pub description: String,
    pub factor_a: FactorRange,
    pub factor_b: FactorRange,
}

impl Level {
    pub fn new(name: &str, description: &str, factor_a: FactorRange, factor_b: FactorRange) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            factor_a,
            factor_b,
        }
    }

    /// Biggest answer any problem on this level can have.
    pub fn largest_product(&self) -> u64 {
        self.factor_a.hi as u64 * self.factor_b.hi as u64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub feedback_delay_ms: u64,
    pub tick_interval_ms: u64,
    pub max_answer_digits: usize,
    /// Recent problems remembered to avoid repeats; 0 turns the policy off.
    pub history_size: usize,
    pub max_generation_attempts: u32,
    pub streak_time_tiers: Vec<StreakTier>,
    pub levels: Vec<Level>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            feedback_delay_ms: 1000,
            tick_interval_ms: 1000,
            max_answer_digits: 6,
            history_size: 4,
            max_generation_attempts: 50,
            streak_time_tiers: vec![
                StreakTier { min_streak: 0, seconds: 10 },
                StreakTier { min_streak: 5, seconds: 8 },
                StreakTier { min_streak: 10, seconds: 6 },
                StreakTier { min_streak: 15, seconds: 5 },
            ],
            levels: vec![
                Level::new("Basic", "Basic (1-3)", FactorRange::new(1, 3), FactorRange::new(0, 10)),
                Level::new("Medium", "Medium (4-5)", FactorRange::new(4, 5), FactorRange::new(0, 10)),
                Level::new(
                    "Medium High",
                    "Medium High (6-7)",
                    FactorRange::new(6, 7),
                    FactorRange::new(0, 10),
                ),
                Level::new("High", "High (8-9)", FactorRange::new(8, 9), FactorRange::new(0, 10)),
                Level::new(
                    "Advanced",
                    "Advanced (Mix)",
                    FactorRange::new(10, 99),
                    FactorRange::new(2, 9),
                ),
            ],
        }
    }
}

impl GameConfig {
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Seconds allotted for a fresh question at `streak`; the highest matching tier wins.
    pub fn seconds_for_streak(&self, streak: u32) -> u32 {
        seconds_for_streak(&self.streak_time_tiers, streak)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        for level in &self.levels {
            for range in [level.factor_a, level.factor_b] {
                if range.is_empty() {
                    return Err(ConfigError::EmptyRange {
                        level: level.name.clone(),
                        lo: range.lo,
                        hi: range.hi,
                    });
                }
            }
            let largest = level.largest_product();
            let digits = largest.to_string().len();
            if digits > self.max_answer_digits {
                return Err(ConfigError::AnswerTooLong {
                    level: level.name.clone(),
                    largest,
                    max_digits: self.max_answer_digits,
                });
            }
        }
        if self.streak_time_tiers.is_empty() {
            return Err(ConfigError::NoTiers);
        }
        for (index, tier) in self.streak_time_tiers.iter().enumerate() {
            if tier.seconds == 0 {
                return Err(ConfigError::ZeroSeconds { index });
            }
            if index > 0 && self.streak_time_tiers[index - 1].min_streak >= tier.min_streak {
                return Err(ConfigError::UnsortedTiers { index });
            }
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }
}

/// Tier lookup over a table sorted ascending by threshold.
pub fn seconds_for_streak(tiers: &[StreakTier], streak: u32) -> u32 {
    tiers
        .iter()
        .rev()
        .find(|tier| streak >= tier.min_streak)
        .or_else(|| tiers.first())
        .map(|tier| tier.seconds)
        .unwrap_or(0)
}

pub trait ConfigStore {
    fn load(&self) -> GameConfig;
    fn save(&self, cfg: &GameConfig) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path().unwrap_or_else(|| PathBuf::from("multidrill_config.json")),
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

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> GameConfig {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return GameConfig::default(),
        };
        let cfg = match serde_json::from_slice::<GameConfig>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("ignoring unreadable config {}: {}", self.path.display(), err);
                return GameConfig::default();
            }
        };
        match cfg.validate() {
            Ok(()) => cfg,
            Err(err) => {
                log::warn!("ignoring invalid config {}: {}", self.path.display(), err);
                GameConfig::default()
            }
        }
    }

    fn save(&self, cfg: &GameConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn default_config_is_valid() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.level_count(), 5);
        assert_eq!(cfg.history_size, 4);
    }

    #[test]
    fn tier_lookup_picks_highest_matching_threshold() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.seconds_for_streak(0), 10);
        assert_eq!(cfg.seconds_for_streak(2), 10);
        assert_eq!(cfg.seconds_for_streak(4), 10);
        assert_eq!(cfg.seconds_for_streak(5), 8);
        assert_eq!(cfg.seconds_for_streak(7), 8);
        assert_eq!(cfg.seconds_for_streak(10), 6);
        assert_eq!(cfg.seconds_for_streak(15), 5);
        assert_eq!(cfg.seconds_for_streak(400), 5);
    }

    #[test]
    fn tier_lookup_below_first_threshold_uses_first_tier() {
        let tiers = [
            StreakTier { min_streak: 3, seconds: 9 },
            StreakTier { min_streak: 6, seconds: 4 },
        ];
        assert_eq!(seconds_for_streak(&tiers, 0), 9);
        assert_eq!(seconds_for_streak(&[], 0), 0);
    }

    #[test]
    fn validate_rejects_unsorted_tiers() {
        let mut cfg = GameConfig::default();
        cfg.streak_time_tiers.swap(1, 2);
        assert_matches!(cfg.validate(), Err(ConfigError::UnsortedTiers { index: 2 }));
    }

    #[test]
    fn validate_rejects_answers_longer_than_the_field() {
        let mut cfg = GameConfig::default();
        cfg.levels[4].factor_a = FactorRange::new(1000, 9999);
        cfg.levels[4].factor_b = FactorRange::new(1000, 9999);
        assert_eq!(cfg.levels[4].largest_product(), 99_980_001);
        assert_matches!(
            cfg.validate(),
            Err(ConfigError::AnswerTooLong { largest: 99_980_001, max_digits: 6, .. })
        );

        cfg.max_answer_digits = 8;
        assert_eq!(cfg.validate(), Ok(()));

        let cfg = GameConfig {
            max_answer_digits: 1,
            ..GameConfig::default()
        };
        assert_matches!(
            cfg.validate(),
            Err(ConfigError::AnswerTooLong { level, largest: 30, .. }) if level == "Basic"
        );
    }

    #[test]
    fn validate_rejects_empty_range_and_zero_seconds() {
        let mut cfg = GameConfig::default();
        cfg.levels[0].factor_b = FactorRange::new(5, 2);
        assert_matches!(cfg.validate(), Err(ConfigError::EmptyRange { .. }));

        let mut cfg = GameConfig::default();
        cfg.streak_time_tiers[0].seconds = 0;
        assert_matches!(cfg.validate(), Err(ConfigError::ZeroSeconds { index: 0 }));

        let cfg = GameConfig {
            levels: vec![],
            ..GameConfig::default()
        };
        assert_matches!(cfg.validate(), Err(ConfigError::NoLevels));
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = GameConfig::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let cfg = GameConfig {
            feedback_delay_ms: 500,
            history_size: 0,
            levels: vec![Level::new(
                "Tiny",
                "Tiny (2)",
                FactorRange::new(2, 2),
                FactorRange::new(2, 3),
            )],
            ..GameConfig::default()
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.path(), dir.path().join("nested").join("config.json"));
        assert!(store.path().is_file());
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "feedback_delay_ms": 250 }"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.feedback_delay_ms, 250);
        assert_eq!(cfg.levels, GameConfig::default().levels);
    }

    #[test]
    fn invalid_or_missing_config_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let missing = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(missing.load(), GameConfig::default());

        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), GameConfig::default());

        fs::write(&path, r#"{ "streak_time_tiers": [] }"#).unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), GameConfig::default());
    }
}
