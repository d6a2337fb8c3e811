//! Scheduler-facing contract.
//!
//! Hosts that drive several engines from one fixed-rate loop register each of
//! them as a [`Subsystem`] and order them by priority. The loop decides when to
//! tick; the subsystem only reports how often it wants to be ticked.

use std::time::Duration;

use crate::error::Result;
use crate::PlanExecutionManager;

pub trait Subsystem: Send + Sync {
    /// Stable name used by the scheduler's registry.
    fn name(&self) -> &str;

    /// Lower runs earlier within a tick.
    fn priority(&self) -> i32;

    fn update_interval(&self) -> Duration;

    fn is_enabled(&self) -> bool;

    /// Current counters as a JSON document.
    fn analytics_json(&self) -> Result<String>;

    /// Drops state for agents `is_live` rejects; returns how many were removed.
    fn perform_maintenance(&self, is_live: &dyn Fn(&str) -> bool) -> usize;

    /// Drops all state for one agent.
    fn release_agent(&self, id: &str) -> bool;

    fn shutdown(&self);
}

impl Subsystem for PlanExecutionManager {
    fn name(&self) -> &str {
        "GOAP_Planning"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn update_interval(&self) -> Duration {
        self.config().update_interval
    }

    fn is_enabled(&self) -> bool {
        PlanExecutionManager::is_enabled(self)
    }

    fn analytics_json(&self) -> Result<String> {
        self.analytics().to_json()
    }

    fn perform_maintenance(&self, is_live: &dyn Fn(&str) -> bool) -> usize {
        PlanExecutionManager::perform_maintenance(self, is_live)
    }

    fn release_agent(&self, id: &str) -> bool {
        PlanExecutionManager::release_agent(self, id)
    }

    fn shutdown(&self) {
        PlanExecutionManager::shutdown(self)
    }
}
