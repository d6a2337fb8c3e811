//! Planner and manager tunables.
//!
//! Defaults keep a single planning call well inside one tick of a fixed-rate
//! scheduler. Both structs deserialize from JSON with every field optional;
//! durations are written in milliseconds.
//!
//! ```
//! use goap_engine::ManagerConfig;
//! use std::time::Duration;
//!
//! let config = ManagerConfig::from_json(r#"{ "max_iterations": 250, "max_duration_ms": 10 }"#).unwrap();
//! assert_eq!(config.planner.max_iterations, 250);
//! assert_eq!(config.planner.max_duration, Duration::from_millis(10));
//! assert_eq!(config.planner.max_frontier, 500);
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{GoapError, Result};

/// Safety bounds for one planning call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum number of frontier pops.
    #[serde(alias = "goapMaxIterations")]
    pub max_iterations: usize,
    /// Maximum wall-clock time spent searching.
    #[serde(
        rename = "max_duration_ms",
        alias = "goapMaxTimeMs",
        with = "duration_ms"
    )]
    pub max_duration: Duration,
    /// Maximum number of queued, unexpanded nodes.
    #[serde(alias = "goapMaxOpenSetSize")]
    pub max_frontier: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            max_duration: Duration::from_millis(25),
            max_frontier: 500,
        }
    }
}

impl PlannerConfig {
    /// Rejects zero limits.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(GoapError::InvalidConfig(
                "max_iterations must be positive".into(),
            ));
        }
        if self.max_duration.is_zero() {
            return Err(GoapError::InvalidConfig(
                "max_duration must be positive".into(),
            ));
        }
        if self.max_frontier == 0 {
            return Err(GoapError::InvalidConfig(
                "max_frontier must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for [`PlanExecutionManager`](crate::PlanExecutionManager).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    #[serde(flatten)]
    pub planner: PlannerConfig,
    /// How often the host scheduler should run an update cycle per agent.
    #[serde(
        rename = "update_interval_ms",
        alias = "aiGoapUpdateInterval",
        with = "duration_ms"
    )]
    pub update_interval: Duration,
    /// Consecutive `execute` failures tolerated before a forced replan.
    pub max_action_retries: u32,
    pub enabled: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            update_interval: Duration::from_millis(3000),
            max_action_retries: 3,
            enabled: true,
        }
    }
}

impl ManagerConfig {
    /// Parses and validates a JSON document. Missing fields keep their defaults.
    pub fn from_json(input: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects zero limits.
    pub fn validate(&self) -> Result<()> {
        self.planner.validate()?;
        if self.update_interval.is_zero() {
            return Err(GoapError::InvalidConfig(
                "update_interval must be positive".into(),
            ));
        }
        if self.max_action_retries == 0 {
            return Err(GoapError::InvalidConfig(
                "max_action_retries must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
