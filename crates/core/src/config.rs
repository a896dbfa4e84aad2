use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};
use crate::series::ToleranceWindow;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_f64(profile: &str, key: &str, default: f64) -> f64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Dataset presets ───────────────────────────────────────────

/// Initial-threshold levels tuned per benchmark dataset.
pub const DATASET_LEVELS: &[(&str, f64)] = &[
    ("SMAP", 0.93),
    ("MSL", 0.99),
    ("SMD-1", 0.9950),
    ("SMD-2", 0.9925),
    ("SMD-3", 0.9999),
    ("TELENOR", 0.99),
];

/// Look up the preset level for a dataset key (case-insensitive).
pub fn level_for_dataset(dataset: &str) -> Option<f64> {
    DATASET_LEVELS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(dataset))
        .map(|(_, level)| *level)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub pot: PotConfig,
    pub tolerance: ToleranceWindow,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TSAD_PROFILE`. When set (e.g. `SMD`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("TSAD_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let defaults = ToleranceWindow::default();
        Self {
            profile: p.to_string(),
            pot: PotConfig::from_env_profiled(p),
            tolerance: ToleranceWindow {
                advance: profiled_env_usize(p, "EVAL_ADVANCE", defaults.advance),
                delay: profiled_env_usize(p, "EVAL_DELAY", defaults.delay),
            },
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Check parameter ranges before any evaluation runs.
    pub fn validate(&self) -> Result<()> {
        self.pot.validate()
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  pot:        q={}, level={}, dataset={}",
            self.pot.risk_q,
            self.pot.level,
            self.pot.dataset.as_deref().unwrap_or("(none)")
        );
        tracing::info!(
            "  tolerance:  advance={}, delay={}",
            self.tolerance.advance,
            self.tolerance.delay
        );
    }

    /// JSON view of the resolved configuration.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "pot": {
                "q": self.pot.risk_q,
                "level": self.pot.level,
                "dataset": self.pot.dataset,
            },
            "tolerance": {
                "advance": self.tolerance.advance,
                "delay": self.tolerance.delay,
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: String::new(),
            pot: PotConfig::default(),
            tolerance: ToleranceWindow::default(),
        }
    }
}

// ── Peaks-over-threshold ──────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotConfig {
    /// Risk quantile: target probability of a normal point exceeding the threshold.
    pub risk_q: f64,
    /// Probability used for the initial (empirical quantile) threshold.
    pub level: f64,
    /// Dataset whose preset level was applied, if any.
    pub dataset: Option<String>,
}

pub const DEFAULT_RISK_Q: f64 = 1e-4;
pub const DEFAULT_LEVEL: f64 = 0.96;

impl PotConfig {
    fn from_env_profiled(p: &str) -> Self {
        let dataset = profiled_env_opt(p, "POT_DATASET");
        let explicit_level = profiled_env_opt(p, "POT_LEVEL").and_then(|v| v.parse().ok());
        let level = explicit_level
            .or_else(|| dataset.as_deref().and_then(level_for_dataset))
            .unwrap_or(DEFAULT_LEVEL);
        Self {
            risk_q: profiled_env_f64(p, "POT_RISK_Q", DEFAULT_RISK_Q),
            level,
            dataset,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.risk_q > 0.0 && self.risk_q < 1.0) {
            return Err(EvalError::InvalidParameter(format!(
                "risk quantile q must be in (0, 1), got {}",
                self.risk_q
            )));
        }
        if !(self.level >= 0.0 && self.level < 1.0) {
            return Err(EvalError::InvalidParameter(format!(
                "level must be in [0, 1), got {}",
                self.level
            )));
        }
        if let Some(dataset) = &self.dataset {
            if level_for_dataset(dataset).is_none() {
                tracing::warn!(dataset = %dataset, "no level preset for dataset");
            }
        }
        Ok(())
    }
}

impl Default for PotConfig {
    fn default() -> Self {
        Self {
            risk_q: DEFAULT_RISK_Q,
            level: DEFAULT_LEVEL,
            dataset: None,
        }
    }
}
