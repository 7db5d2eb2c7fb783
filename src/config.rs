use std::env;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_JOB_CAPACITY: usize = 100;
pub const DEFAULT_PROGRESS_EVERY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub workers: usize,
    pub job_capacity: usize,
    pub result_capacity: usize,
    /// Log parser progress every this many rides
    pub progress_every: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_workers(DEFAULT_WORKERS)
    }
}

impl Config {
    /// Default sizing for the given pool size. The result buffer scales with it.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            job_capacity: DEFAULT_JOB_CAPACITY,
            result_capacity: workers.saturating_mul(20).max(1),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }

    pub fn from_env() -> AppResult<Self> {
        Self::from_env_with_workers(None)
    }

    /// Like [`Config::from_env`], with an explicit pool size taking precedence
    /// over `FARE_WORKERS`.
    pub fn from_env_with_workers(workers: Option<usize>) -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup_with_workers(|key| env::var(key).ok(), workers)
    }

    /// Build from an arbitrary variable source; missing keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup_with_workers(lookup, None)
    }

    /// Capacities left unset are derived from the final worker count.
    pub fn from_lookup_with_workers<F>(lookup: F, workers: Option<usize>) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let workers = match workers {
            Some(workers) => workers,
            None => parse_var(&lookup, "FARE_WORKERS")?.unwrap_or(DEFAULT_WORKERS),
        };
        let defaults = Self::with_workers(workers);

        Ok(Self {
            workers,
            job_capacity: parse_var(&lookup, "FARE_JOB_CAPACITY")?
                .unwrap_or(defaults.job_capacity),
            result_capacity: parse_var(&lookup, "FARE_RESULT_CAPACITY")?
                .unwrap_or(defaults.result_capacity),
            progress_every: parse_var(&lookup, "FARE_PROGRESS_EVERY")?
                .unwrap_or(defaults.progress_every),
        })
    }

    pub fn validate(&self) -> AppResult<()> {
        let fields = [
            ("workers", self.workers),
            ("job_capacity", self.job_capacity),
            ("result_capacity", self.result_capacity),
            ("progress_every", self.progress_every),
        ];

        match fields.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(AppError::Config(format!("{} must be at least 1", name))),
            None => Ok(()),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> AppResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| AppError::Config(format!("{} must be a number, got {:?}", key, raw)))
        })
        .transpose()
}
