use std::env;
use std::time::Duration;

use crate::error::AppError;

/// Phase timings and context bounds for the phase engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub night_duration: Duration,
    pub day_duration: Duration,
    pub vote_duration: Duration,
    /// How long before Night/Vote expiry the warning goes out.
    pub warning_lead: Duration,
    /// Public log ring buffer capacity.
    pub log_cap: usize,
    /// Public log entries included in a decision context.
    pub context_entries: usize,
    /// Max characters per context entry.
    pub context_entry_chars: usize,
    /// Computer players speak within this leading fraction of the day.
    pub remark_window: f64,
    pub remark_max_chars: usize,
    /// Seeds role assignment, personalities and random fallbacks.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            night_duration: Duration::from_secs(90),
            day_duration: Duration::from_secs(120),
            vote_duration: Duration::from_secs(60),
            warning_lead: Duration::from_secs(15),
            log_cap: 100,
            context_entries: 15,
            context_entry_chars: 300,
            remark_window: 0.6,
            remark_max_chars: 400,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Read `MAFIA_*` overrides from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(secs) = parse_var::<u64, _>(&lookup, "MAFIA_NIGHT_SECS")? {
            cfg.night_duration = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "MAFIA_DAY_SECS")? {
            cfg.day_duration = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "MAFIA_VOTE_SECS")? {
            cfg.vote_duration = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "MAFIA_WARNING_SECS")? {
            cfg.warning_lead = Duration::from_secs(secs);
        }
        if let Some(cap) = parse_var::<usize, _>(&lookup, "MAFIA_LOG_CAP")? {
            if cap == 0 {
                return Err(AppError::config("MAFIA_LOG_CAP must be at least 1"));
            }
            cfg.log_cap = cap;
        }
        cfg.seed = parse_var::<u64, _>(&lookup, "MAFIA_SEED")?;
        Ok(cfg)
    }

    /// Every phase `phase` long with a warning a fifth of the way from the
    /// end. Used by the simulator and tests.
    pub fn with_uniform_phases(mut self, phase: Duration) -> Self {
        self.night_duration = phase;
        self.day_duration = phase;
        self.vote_duration = phase;
        self.warning_lead = phase / 5;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::config(format!("invalid {name}='{raw}': {e}"))),
    }
}
