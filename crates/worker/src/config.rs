use std::path::PathBuf;
use std::time::Duration;

use vidsum_core::analyzer::{AnalyzerKind, AnalyzerSettings, MAX_SHOTS_PER_VIDEO};
use vidsum_core::config::{parse_opt, parse_or, process_env};
use vidsum_core::error::CoreError;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Sleep between polls when the queue is empty.
    pub poll_interval: Duration,
    /// Bound on a single analyzer call. `None` waits indefinitely.
    pub job_timeout: Option<Duration>,
    pub analyzer: AnalyzerSettings,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default  |
    /// |-------------------------|----------|
    /// | `POLL_INTERVAL_SECS`    | `5`      |
    /// | `PROCESSING_DELAY_SECS` | `3`      |
    /// | `SHOTS_PER_VIDEO`       | `4`      |
    /// | `ANALYZER`              | `mock`   |
    /// | `JOB_TIMEOUT_SECS`      | unset    |
    /// | `DATA_DIR`              | `./data` |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup<L>(lookup: &L) -> Result<Self, CoreError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let poll_interval_secs: u64 = parse_or(lookup, "POLL_INTERVAL_SECS", 5)?;
        if poll_interval_secs == 0 {
            return Err(CoreError::Validation(
                "POLL_INTERVAL_SECS must be at least 1".into(),
            ));
        }

        let shots_per_video: u32 = parse_or(lookup, "SHOTS_PER_VIDEO", 4)?;
        if !(1..=MAX_SHOTS_PER_VIDEO).contains(&shots_per_video) {
            return Err(CoreError::Validation(format!(
                "SHOTS_PER_VIDEO must be between 1 and {MAX_SHOTS_PER_VIDEO}"
            )));
        }

        let job_timeout = match parse_opt::<u64, _>(lookup, "JOB_TIMEOUT_SECS")? {
            Some(0) => {
                return Err(CoreError::Validation(
                    "JOB_TIMEOUT_SECS must be at least 1 when set".into(),
                ))
            }
            other => other.map(Duration::from_secs),
        };

        let analyzer = AnalyzerSettings {
            kind: parse_or(lookup, "ANALYZER", AnalyzerKind::Mock)?,
            simulated_delay: Duration::from_secs(parse_or(lookup, "PROCESSING_DELAY_SECS", 3)?),
            shots_per_video,
            storage_root: parse_or(lookup, "DATA_DIR", PathBuf::from("./data"))?,
        };

        Ok(Self {
            poll_interval: Duration::from_secs(poll_interval_secs),
            job_timeout,
            analyzer,
        })
    }
}
