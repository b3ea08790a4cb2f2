//! TOML-based tuning configuration.
//!
//! The planning-lock threshold and the four timer delays ship with the
//! values the product has always used, but hosts can override them in
//! `~/.config/playmark/config.toml`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Returns `~/.config/playmark[-dev]/` based on PLAYMARK_ENV.
///
/// Set PLAYMARK_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PLAYMARK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("playmark-dev")
    } else {
        base_dir.join("playmark")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Timer delays and the planning-lock threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuning {
    /// Debounce window for progress persistence.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Inactivity delay before the progress slider hides itself.
    #[serde(default = "default_auto_close_ms")]
    pub auto_close_ms: u64,
    /// Lifetime of the love-reaction particle effect.
    #[serde(default = "default_particle_ms")]
    pub particle_ms: u64,
    /// Lifetime of the dislike-reaction shake animation.
    #[serde(default = "default_shake_ms")]
    pub shake_ms: u64,
    /// Highest play progress at which planning can still be enabled.
    #[serde(default = "default_planning_lock_pct")]
    pub planning_lock_pct: u8,
}

// Default functions
fn default_debounce_ms() -> u64 {
    500
}
fn default_auto_close_ms() -> u64 {
    1000
}
fn default_particle_ms() -> u64 {
    2000
}
fn default_shake_ms() -> u64 {
    500
}
fn default_planning_lock_pct() -> u8 {
    10
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            auto_close_ms: default_auto_close_ms(),
            particle_ms: default_particle_ms(),
            shake_ms: default_shake_ms(),
            planning_lock_pct: default_planning_lock_pct(),
        }
    }
}

impl Tuning {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn auto_close(&self) -> Duration {
        Duration::from_millis(self.auto_close_ms)
    }

    pub fn particle(&self) -> Duration {
        Duration::from_millis(self.particle_ms)
    }

    pub fn shake(&self) -> Duration {
        Duration::from_millis(self.shake_ms)
    }

    /// The longest of the four delays. Hosts that pump a manual scheduler
    /// use this to let every pending timer land before teardown.
    pub fn max_delay_ms(&self) -> u64 {
        self.debounce_ms
            .max(self.auto_close_ms)
            .max(self.particle_ms)
            .max(self.shake_ms)
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/playmark/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tuning: Tuning,
}

impl Config {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }
}
