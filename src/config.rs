use directories::ProjectDirs;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::games::GameKind;

/// Tunable parameters for one game, persisted as a single JSON record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    /// Clock speed-up per level; < 1 speeds the world up.
    pub acceleration_factor: f64,
    /// World step period at level 1, in milliseconds.
    pub base_period_ms: u64,
    /// Floor for the retuned period, in milliseconds.
    pub min_period_ms: u64,
    /// Input cooldown, in milliseconds.
    pub throttle_ms: u64,
    /// Reward ladder, one entry per catch; the last entry repeats.
    pub score_values: Vec<i64>,
    /// Ascending progress thresholds, one per prize tier.
    pub prize_thresholds: Vec<u32>,
    /// Dispenser token per tier, aligned with `prize_thresholds`.
    pub tier_tokens: Vec<String>,
    /// Token emitted when no threshold is met.
    pub no_prize_token: String,
    /// Outcome banner duration, in milliseconds.
    pub resolve_delay_ms: u64,
    /// Prize popup duration before the session resets, in milliseconds.
    pub terminal_delay_ms: u64,
    /// Sensor level (0–100) above which an action fires.
    pub audio_threshold: u8,
    pub lives: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            acceleration_factor: 0.9,
            base_period_ms: 500,
            min_period_ms: 50,
            throttle_ms: 1000,
            score_values: vec![200, 300, 350, 400, 450, 500, 550, 600, 650, 700, 1500],
            prize_thresholds: vec![5, 10, 11],
            tier_tokens: vec![
                "third-prize".to_string(),
                "second-prize".to_string(),
                "first-prize".to_string(),
            ],
            no_prize_token: "no-prize".to_string(),
            resolve_delay_ms: 600,
            terminal_delay_ms: 3000,
            audio_threshold: 30,
            lives: 1,
        }
    }
}

impl GameConfig {
    /// Cabinet defaults per game, recovered from the original deployments.
    pub fn for_game(kind: GameKind) -> Self {
        let mut cfg = Self::default();
        match kind {
            GameKind::Fishing => {}
            GameKind::Claw => {
                cfg.acceleration_factor = 1.0;
                cfg.throttle_ms = 5000;
                cfg.resolve_delay_ms = 1000;
            }
            GameKind::Gems => {
                cfg.acceleration_factor = 1.0;
                cfg.base_period_ms = 250;
                cfg.resolve_delay_ms = 400;
                cfg.terminal_delay_ms = 5000;
            }
            GameKind::Hexagon => {
                cfg.acceleration_factor = 1.0;
                cfg.base_period_ms = 100;
                cfg.resolve_delay_ms = 500;
                cfg.terminal_delay_ms = 5000;
            }
            GameKind::Snake => {
                cfg.acceleration_factor = 0.8;
                cfg.base_period_ms = 100;
                cfg.min_period_ms = 20;
                cfg.resolve_delay_ms = 300;
            }
            GameKind::Runner => {
                cfg.acceleration_factor = 1.0;
                cfg.base_period_ms = 100;
                cfg.resolve_delay_ms = 500;
                cfg.terminal_delay_ms = 5000;
            }
        }
        cfg
    }

    /// Checks every field against its declared range. Edits are
    /// all-or-nothing: the first violation rejects the whole candidate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.1..=2.0).contains(&self.acceleration_factor) {
            return Err(ConfigError::OutOfRange {
                field: "acceleration_factor",
                allowed: "0.1..=2.0",
            });
        }
        if !(50..=5000).contains(&self.base_period_ms) {
            return Err(ConfigError::OutOfRange {
                field: "base_period_ms",
                allowed: "50..=5000",
            });
        }
        if self.min_period_ms < 10 || self.min_period_ms > self.base_period_ms {
            return Err(ConfigError::OutOfRange {
                field: "min_period_ms",
                allowed: "10..=base_period_ms",
            });
        }
        if !(1000..=30000).contains(&self.throttle_ms) {
            return Err(ConfigError::OutOfRange {
                field: "throttle_ms",
                allowed: "1000..=30000",
            });
        }
        if self.score_values.is_empty() {
            return Err(ConfigError::Empty {
                field: "score_values",
            });
        }
        if self.score_values.iter().any(|&v| v <= 0) {
            return Err(ConfigError::OutOfRange {
                field: "score_values",
                allowed: "positive integers",
            });
        }
        if self.prize_thresholds.is_empty() {
            return Err(ConfigError::Empty {
                field: "prize_thresholds",
            });
        }
        if !self
            .prize_thresholds
            .iter()
            .tuple_windows()
            .all(|(a, b)| a < b)
        {
            return Err(ConfigError::NotIncreasing {
                field: "prize_thresholds",
            });
        }
        if self.tier_tokens.len() != self.prize_thresholds.len() {
            return Err(ConfigError::Mismatched {
                field: "tier_tokens",
            });
        }
        if self.tier_tokens.iter().any(|t| t.is_empty()) {
            return Err(ConfigError::Empty {
                field: "tier_tokens",
            });
        }
        if !(300..=6000).contains(&self.resolve_delay_ms) {
            return Err(ConfigError::OutOfRange {
                field: "resolve_delay_ms",
                allowed: "300..=6000",
            });
        }
        if !(1000..=10000).contains(&self.terminal_delay_ms) {
            return Err(ConfigError::OutOfRange {
                field: "terminal_delay_ms",
                allowed: "1000..=10000",
            });
        }
        if self.audio_threshold > 100 {
            return Err(ConfigError::OutOfRange {
                field: "audio_threshold",
                allowed: "0..=100",
            });
        }
        if self.lives == 0 {
            return Err(ConfigError::OutOfRange {
                field: "lives",
                allowed: "1..",
            });
        }
        Ok(())
    }

    /// Token for a 1-based tier index, `None` mapping to the no-prize token.
    pub fn token_for_tier(&self, tier: Option<usize>) -> &str {
        match tier {
            Some(t) if t >= 1 && t <= self.tier_tokens.len() => &self.tier_tokens[t - 1],
            _ => &self.no_prize_token,
        }
    }
}

/// A rejected configuration edit, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    OutOfRange {
        field: &'static str,
        allowed: &'static str,
    },
    Empty {
        field: &'static str,
    },
    NotIncreasing {
        field: &'static str,
    },
    Mismatched {
        field: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::OutOfRange { field, allowed } => {
                write!(f, "{field} out of range (allowed: {allowed})")
            }
            ConfigError::Empty { field } => write!(f, "{field} must not be empty"),
            ConfigError::NotIncreasing { field } => {
                write!(f, "{field} must be strictly increasing")
            }
            ConfigError::Mismatched { field } => {
                write!(f, "{field} must have one entry per prize threshold")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure of a validated update.
#[derive(Debug)]
pub enum UpdateError {
    Invalid(ConfigError),
    Io(io::Error),
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::Invalid(e) => write!(f, "rejected: {e}"),
            UpdateError::Io(e) => write!(f, "could not persist configuration: {e}"),
        }
    }
}

impl std::error::Error for UpdateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpdateError::Invalid(e) => Some(e),
            UpdateError::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for UpdateError {
    fn from(e: ConfigError) -> Self {
        UpdateError::Invalid(e)
    }
}

pub trait ConfigStore {
    /// Never fails visibly: missing or unparseable records fall back to the
    /// store's defaults.
    fn load(&self) -> GameConfig;
    fn save(&self, cfg: &GameConfig) -> io::Result<()>;

    /// Validates the whole candidate, persists it, and re-loads so dependent
    /// components observe the committed values. On rejection the persisted
    /// record is untouched.
    fn update(&self, candidate: &GameConfig) -> Result<GameConfig, UpdateError> {
        candidate.validate()?;
        self.save(candidate).map_err(UpdateError::Io)?;
        Ok(self.load())
    }
}

/// JSON-file store under the platform config dir, one record per game.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
    defaults: GameConfig,
}

impl FileConfigStore {
    pub fn new(kind: GameKind) -> Self {
        let file = format!("{}.json", kind.to_string().to_lowercase());
        let path = if let Some(pd) = ProjectDirs::from("", "", "midway") {
            pd.config_dir().join(file)
        } else {
            PathBuf::from(format!("midway_{file}"))
        };
        Self {
            path,
            defaults: GameConfig::for_game(kind),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P, defaults: GameConfig) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
            defaults,
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> GameConfig {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<GameConfig>(&bytes) {
                return cfg;
            }
        }
        self.defaults.clone()
    }

    fn save(&self, cfg: &GameConfig) -> io::Result<()> {
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
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fishing.json");
        let store = FileConfigStore::with_path(&path, GameConfig::default());
        let cfg = GameConfig::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(
            dir.path().join("absent.json"),
            GameConfig::for_game(GameKind::Claw),
        );
        assert_eq!(store.load(), GameConfig::for_game(GameKind::Claw));
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snake.json");
        fs::write(&path, b"{not json").unwrap();
        let store = FileConfigStore::with_path(&path, GameConfig::for_game(GameKind::Snake));
        assert_eq!(store.load(), GameConfig::for_game(GameKind::Snake));
    }

    #[test]
    fn valid_update_then_load_is_idempotent() {
        let dir = tempdir().unwrap();
        let store =
            FileConfigStore::with_path(dir.path().join("fishing.json"), GameConfig::default());
        let mut candidate = GameConfig::default();
        candidate.acceleration_factor = 0.85;
        candidate.throttle_ms = 2500;

        let committed = store.update(&candidate).unwrap();
        assert_eq!(committed, candidate);
        assert_eq!(store.load(), candidate);
    }

    #[test]
    fn invalid_update_is_rejected_wholesale() {
        let dir = tempdir().unwrap();
        let store =
            FileConfigStore::with_path(dir.path().join("fishing.json"), GameConfig::default());
        let original = GameConfig::default();
        store.save(&original).unwrap();

        // One bad field poisons an otherwise sensible edit.
        let mut candidate = original.clone();
        candidate.throttle_ms = 2500;
        candidate.acceleration_factor = 5.0;

        let err = store.update(&candidate).unwrap_err();
        assert_matches!(
            err,
            UpdateError::Invalid(ConfigError::OutOfRange {
                field: "acceleration_factor",
                ..
            })
        );
        assert_eq!(store.load(), original);
    }

    #[test]
    fn per_game_defaults_validate() {
        for kind in [
            GameKind::Fishing,
            GameKind::Claw,
            GameKind::Gems,
            GameKind::Hexagon,
            GameKind::Snake,
            GameKind::Runner,
        ] {
            GameConfig::for_game(kind)
                .validate()
                .unwrap_or_else(|e| panic!("{kind} defaults invalid: {e}"));
        }
    }

    #[test]
    fn thresholds_must_strictly_increase() {
        let mut cfg = GameConfig::default();
        cfg.prize_thresholds = vec![5, 5, 11];
        assert_matches!(
            cfg.validate(),
            Err(ConfigError::NotIncreasing {
                field: "prize_thresholds"
            })
        );
    }

    #[test]
    fn tier_tokens_must_match_thresholds() {
        let mut cfg = GameConfig::default();
        cfg.tier_tokens.pop();
        assert_matches!(
            cfg.validate(),
            Err(ConfigError::Mismatched {
                field: "tier_tokens"
            })
        );
    }

    #[test]
    fn throttle_range_is_enforced() {
        let mut cfg = GameConfig::default();
        cfg.throttle_ms = 999;
        assert_matches!(cfg.validate(), Err(ConfigError::OutOfRange { .. }));
        cfg.throttle_ms = 30001;
        assert_matches!(cfg.validate(), Err(ConfigError::OutOfRange { .. }));
        cfg.throttle_ms = 30000;
        assert_matches!(cfg.validate(), Ok(()));
    }

    #[test]
    fn token_for_tier_maps_one_based_index() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.token_for_tier(Some(1)), "third-prize");
        assert_eq!(cfg.token_for_tier(Some(3)), "first-prize");
        assert_eq!(cfg.token_for_tier(None), "no-prize");
        assert_eq!(cfg.token_for_tier(Some(9)), "no-prize");
    }
}
