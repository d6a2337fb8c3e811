//! Per-agent plan execution.
//!
//! [`PlanExecutionManager`] owns every registered agent's catalog, current
//! plan and retry bookkeeping. The host calls [`update_agent`] once per
//! scheduler tick with a fresh world-state snapshot; the manager decides
//! whether to replan, picks the best valid goal, runs the planner and executes
//! the action at the plan cursor against the live state.
//!
//! Planning and execution run without holding the agent map lock. The record
//! is snapshotted, the cycle runs on the snapshot and the outcome is written
//! back only if the same registration is still present, so releasing or
//! re-initializing an agent while one of its cycles is in flight leaves no
//! stale plan behind.
//!
//! [`update_agent`]: PlanExecutionManager::update_agent
//!
//! # Example
//!
//! ```
//! use goap_engine::{AgentCatalog, ManagerConfig, PlanExecutionManager, SimpleAction, SimpleGoal, WorldState};
//!
//! let catalog = AgentCatalog::new()
//!     .with_goal(SimpleGoal::new("work", 0.6).unwrap().with_desired("has_worked", true))
//!     .with_action(SimpleAction::new("work", 8.0).unwrap().with_effect("has_worked", true));
//!
//! let manager = PlanExecutionManager::new(ManagerConfig::default()).unwrap();
//! manager.initialize_agent("ada", catalog);
//!
//! let mut state = WorldState::new();
//! let report = manager.update_agent("ada", &mut state).unwrap();
//! assert_eq!(report.goal.as_deref(), Some("work"));
//! assert!(state.get_bool("has_worked"));
//!
//! manager.release_agent("ada");
//! assert_eq!(manager.analytics().agents_with_goals, 0);
//! ```

use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use crate::error::{GoapError, Result};
use crate::goal::select_best_goal;
use crate::search::SearchOutcome;
use crate::{AgentCatalog, ManagerConfig, Plan, PlanKind, Planner, WorldState, WorldStateBuilder};

/// Identity of a managed agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AgentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        AgentId(id.to_string())
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        AgentId(id)
    }
}

impl From<u64> for AgentId {
    fn from(id: u64) -> Self {
        AgentId(id.to_string())
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a cycle discarded the current plan and planned again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplanReason {
    NoPlan,
    PlanComplete,
    /// The action at the cursor is no longer performable.
    ActionInvalidated,
    /// The action at the cursor failed `max_action_retries` times in a row.
    RetriesExhausted,
}

/// Why a cycle executed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleReason {
    Disabled,
    NoValidGoal,
    EmptyPlan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionExecution {
    pub action: String,
    pub success: bool,
}

/// What one [`PlanExecutionManager::update_agent`] call did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CycleReport {
    pub replanned: Option<ReplanReason>,
    /// Goal the current plan serves.
    pub goal: Option<String>,
    /// Search outcome when this cycle planned.
    pub outcome: Option<SearchOutcome>,
    pub plan_kind: Option<PlanKind>,
    pub execution: Option<ActionExecution>,
    pub idle: Option<IdleReason>,
}

impl CycleReport {
    fn idle(reason: IdleReason) -> Self {
        Self {
            idle: Some(reason),
            ..Self::default()
        }
    }

    /// True when an action ran and succeeded this cycle.
    pub fn executed_successfully(&self) -> bool {
        self.execution.as_ref().map_or(false, |e| e.success)
    }
}

/// Aggregate counters, readable at any time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analytics {
    pub agents: usize,
    /// Registered agents whose catalog has at least one goal.
    pub agents_with_goals: usize,
    /// Agents holding a plan with actions left to run.
    pub active_plans: usize,
    pub average_plan_length: f64,
    pub searches: u64,
    pub searches_aborted: u64,
    pub searches_exhausted: u64,
    pub fallback_plans: u64,
    pub empty_fallbacks: u64,
    pub no_valid_goal_cycles: u64,
    pub action_failures: u64,
    pub forced_replans: u64,
}

impl Analytics {
    /// Serializes the counters to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Default)]
struct Counters {
    searches: AtomicU64,
    searches_aborted: AtomicU64,
    searches_exhausted: AtomicU64,
    fallback_plans: AtomicU64,
    empty_fallbacks: AtomicU64,
    no_valid_goal_cycles: AtomicU64,
    action_failures: AtomicU64,
    forced_replans: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

struct AgentRecord {
    /// Distinguishes a record from a later re-registration under the same id.
    generation: u64,
    catalog: AgentCatalog,
    plan: Option<Plan>,
    consecutive_failures: u32,
    force_replan: bool,
    last_update: Option<Instant>,
}

/// Mutable part of a record, carried through one cycle without the lock.
struct CycleState {
    plan: Option<Plan>,
    consecutive_failures: u32,
    force_replan: bool,
}

pub struct PlanExecutionManager {
    config: ManagerConfig,
    planner: Planner,
    agents: RwLock<HashMap<AgentId, AgentRecord>>,
    counters: Counters,
    enabled: AtomicBool,
    next_generation: AtomicU64,
}

impl PlanExecutionManager {
    /// Creates a manager with an A* planner built from `config.planner`.
    pub fn new(config: ManagerConfig) -> Result<Self> {
        let planner = Planner::new(config.planner.clone())?;
        Self::with_planner(config, planner)
    }

    /// Uses a custom planner; its bounds take precedence over `config.planner`.
    pub fn with_planner(config: ManagerConfig, planner: Planner) -> Result<Self> {
        config.validate()?;
        let enabled = AtomicBool::new(config.enabled);
        Ok(Self {
            config,
            planner,
            agents: RwLock::new(HashMap::new()),
            counters: Counters::default(),
            enabled,
            next_generation: AtomicU64::new(0),
        })
    }

    /// Returns the configuration the manager was built with.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Turns planning and execution on or off for all agents.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    fn read_agents(&self) -> RwLockReadGuard<'_, HashMap<AgentId, AgentRecord>> {
        self.agents.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_agents(&self) -> RwLockWriteGuard<'_, HashMap<AgentId, AgentRecord>> {
        self.agents.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers an agent, replacing any previous record under the same id.
    pub fn initialize_agent(&self, id: impl Into<AgentId>, catalog: AgentCatalog) {
        let id = id.into();
        log::info!(
            "Initializing GOAP agent {} with {} goals and {} actions",
            id,
            catalog.goals().len(),
            catalog.actions().len()
        );
        let record = AgentRecord {
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
            catalog,
            plan: None,
            consecutive_failures: 0,
            force_replan: false,
            last_update: None,
        };
        if self.write_agents().insert(id.clone(), record).is_some() {
            log::debug!("Replaced existing record for agent {}", id);
        }
    }

    /// Drops every piece of state held for `id`. Returns whether it was registered.
    pub fn release_agent(&self, id: &str) -> bool {
        let removed = self.write_agents().remove(id).is_some();
        if removed {
            log::info!("Released GOAP agent {}", id);
        }
        removed
    }

    /// Releases every agent.
    pub fn shutdown(&self) {
        let mut agents = self.write_agents();
        log::info!("Shutting down GOAP planning, releasing {} agents", agents.len());
        agents.clear();
    }

    /// Whether `id` currently has a record.
    pub fn is_registered(&self, id: &str) -> bool {
        self.read_agents().contains_key(id)
    }

    /// Number of registered agents.
    pub fn agent_count(&self) -> usize {
        self.read_agents().len()
    }

    /// A snapshot of the agent's current plan, cursor included.
    pub fn current_plan(&self, id: &str) -> Option<Plan> {
        self.read_agents().get(id).and_then(|r| r.plan.clone())
    }

    /// True when the agent is registered and its update interval has elapsed.
    pub fn needs_update(&self, id: &str) -> bool {
        match self.read_agents().get(id) {
            Some(record) => record
                .last_update
                .map_or(true, |at| at.elapsed() >= self.config.update_interval),
            None => false,
        }
    }

    /// Removes agents the host no longer knows about. Returns how many were dropped.
    pub fn perform_maintenance<F>(&self, is_live: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let mut agents = self.write_agents();
        let before = agents.len();
        agents.retain(|id, _| is_live(id.as_str()));
        let removed = before - agents.len();
        if removed > 0 {
            log::info!("GOAP maintenance removed {} stale agents", removed);
        }
        removed
    }

    /// Builds the snapshot with `builder`, runs one cycle on it and returns the
    /// report together with the state as the executed action left it.
    pub fn update_agent_with<C: ?Sized, B>(
        &self,
        id: &str,
        context: &C,
        builder: &B,
    ) -> Result<(CycleReport, WorldState)>
    where
        B: WorldStateBuilder<C> + ?Sized,
    {
        let mut state = builder.build_state(context);
        let report = self.update_agent(id, &mut state)?;
        Ok((report, state))
    }

    /// Runs one sense-plan-act cycle for `id` against `state`.
    ///
    /// `state` is the live world state: the executed action mutates it.
    /// Only an unknown agent is an error; everything else is reported in the
    /// returned [`CycleReport`].
    pub fn update_agent(&self, id: &str, state: &mut WorldState) -> Result<CycleReport> {
        let (generation, catalog, mut cycle) = {
            let agents = self.read_agents();
            let record = agents
                .get(id)
                .ok_or_else(|| GoapError::AgentNotFound(id.to_string()))?;
            (
                record.generation,
                record.catalog.clone(),
                CycleState {
                    plan: record.plan.clone(),
                    consecutive_failures: record.consecutive_failures,
                    force_replan: record.force_replan,
                },
            )
        };

        let report = if self.is_enabled() {
            self.run_cycle(id, &catalog, &mut cycle, state)
        } else {
            CycleReport::idle(IdleReason::Disabled)
        };

        let mut agents = self.write_agents();
        match agents.get_mut(id) {
            Some(record) if record.generation == generation => {
                record.plan = cycle.plan;
                record.consecutive_failures = cycle.consecutive_failures;
                record.force_replan = cycle.force_replan;
                record.last_update = Some(Instant::now());
            }
            Some(_) => log::debug!(
                "Agent {} re-initialized during update, dropping cycle result",
                id
            ),
            None => log::debug!("Agent {} released during update, dropping cycle result", id),
        }
        Ok(report)
    }

    fn replan_reason(&self, cycle: &CycleState, state: &WorldState) -> Option<ReplanReason> {
        if cycle.force_replan {
            return Some(ReplanReason::RetriesExhausted);
        }
        let plan = match &cycle.plan {
            Some(plan) => plan,
            None => return Some(ReplanReason::NoPlan),
        };
        match plan.current() {
            None => Some(ReplanReason::PlanComplete),
            Some(action) if !action.can_perform(state) => Some(ReplanReason::ActionInvalidated),
            Some(_) => None,
        }
    }

    fn run_cycle(
        &self,
        id: &str,
        catalog: &AgentCatalog,
        cycle: &mut CycleState,
        state: &mut WorldState,
    ) -> CycleReport {
        let mut report = CycleReport::default();

        if let Some(reason) = self.replan_reason(cycle, state) {
            report.replanned = Some(reason);
            cycle.consecutive_failures = 0;
            cycle.force_replan = false;

            let goal = match select_best_goal(catalog.goals(), state) {
                Some(goal) => goal,
                None => {
                    log::debug!("Agent {} has no valid goal this cycle", id);
                    bump(&self.counters.no_valid_goal_cycles);
                    cycle.plan = None;
                    report.idle = Some(IdleReason::NoValidGoal);
                    return report;
                }
            };
            log::debug!("Agent {} selected goal {} ({:?})", id, goal.name(), reason);

            let planned = self.planner.plan_detailed(state, goal.as_ref(), catalog.actions());
            self.record_search(&planned.outcome, &planned.plan);
            log::info!(
                "Agent {} planned for goal {}: {} ({:?}, {} actions)",
                id,
                goal.name(),
                planned.plan,
                planned.plan.kind(),
                planned.plan.len()
            );

            report.outcome = Some(planned.outcome);
            cycle.plan = Some(planned.plan);
        }

        let plan = match cycle.plan.as_mut() {
            Some(plan) => plan,
            None => {
                report.idle = Some(IdleReason::NoValidGoal);
                return report;
            }
        };
        report.goal = plan.goal().map(str::to_string);
        report.plan_kind = Some(plan.kind());

        let action = match plan.current() {
            Some(action) => action.clone(),
            None => {
                report.idle = Some(IdleReason::EmptyPlan);
                return report;
            }
        };

        let success = action.execute(state);
        log::debug!("Agent {} executed {}: success={}", id, action.name(), success);
        if success {
            plan.advance();
            cycle.consecutive_failures = 0;
        } else {
            bump(&self.counters.action_failures);
            cycle.consecutive_failures += 1;
            if cycle.consecutive_failures >= self.config.max_action_retries {
                log::debug!(
                    "Agent {}: {} failed {} times in a row, forcing replan",
                    id,
                    action.name(),
                    cycle.consecutive_failures
                );
                bump(&self.counters.forced_replans);
                cycle.force_replan = true;
            }
        }

        report.execution = Some(ActionExecution {
            action: action.name().to_string(),
            success,
        });
        report
    }

    fn record_search(&self, outcome: &SearchOutcome, plan: &Plan) {
        bump(&self.counters.searches);
        match outcome {
            SearchOutcome::Found => {}
            SearchOutcome::Exhausted => bump(&self.counters.searches_exhausted),
            SearchOutcome::Aborted(_) => bump(&self.counters.searches_aborted),
        }
        if plan.is_fallback() {
            bump(&self.counters.fallback_plans);
            if plan.is_empty() {
                bump(&self.counters.empty_fallbacks);
            }
        }
    }

    /// Snapshot of agent gauges and cumulative counters.
    pub fn analytics(&self) -> Analytics {
        let agents = self.read_agents();
        let active: Vec<&Plan> = agents
            .values()
            .filter_map(|r| r.plan.as_ref())
            .filter(|p| !p.is_exhausted())
            .collect();
        let average_plan_length = if active.is_empty() {
            0.0
        } else {
            active.iter().map(|p| p.len()).sum::<usize>() as f64 / active.len() as f64
        };
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);

        Analytics {
            agents: agents.len(),
            agents_with_goals: agents
                .values()
                .filter(|r| !r.catalog.goals().is_empty())
                .count(),
            active_plans: active.len(),
            average_plan_length,
            searches: load(&self.counters.searches),
            searches_aborted: load(&self.counters.searches_aborted),
            searches_exhausted: load(&self.counters.searches_exhausted),
            fallback_plans: load(&self.counters.fallback_plans),
            empty_fallbacks: load(&self.counters.empty_fallbacks),
            no_valid_goal_cycles: load(&self.counters.no_valid_goal_cycles),
            action_failures: load(&self.counters.action_failures),
            forced_replans: load(&self.counters.forced_replans),
        }
    }
}

impl fmt::Debug for PlanExecutionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanExecutionManager")
            .field("config", &self.config)
            .field("agents", &self.agent_count())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FnBuilder, SimpleAction, SimpleGoal};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    fn worker_catalog() -> AgentCatalog {
        AgentCatalog::new()
            .with_goal(
                SimpleGoal::new("work", 0.6)
                    .unwrap()
                    .with_desired("has_worked", true)
                    .with_validity(|s| !s.get_bool("has_worked")),
            )
            .with_action(SimpleAction::new("go_to_work", 2.0).unwrap().with_effect("at_work", true))
            .with_action(
                SimpleAction::new("work", 8.0)
                    .unwrap()
                    .with_precondition("at_work", true)
                    .with_effect("has_worked", true),
            )
    }

    fn manager() -> PlanExecutionManager {
        PlanExecutionManager::new(ManagerConfig::default()).unwrap()
    }

    #[test]
    fn test_unknown_agent() {
        let mut state = WorldState::new();
        assert!(matches!(
            manager().update_agent("nobody", &mut state),
            Err(GoapError::AgentNotFound(_))
        ));
    }

    #[test]
    fn test_plan_executes_over_cycles() {
        let manager = manager();
        manager.initialize_agent("ada", worker_catalog());
        let mut state = WorldState::new();

        let first = manager.update_agent("ada", &mut state).unwrap();
        assert_eq!(first.replanned, Some(ReplanReason::NoPlan));
        assert_eq!(first.outcome, Some(SearchOutcome::Found));
        assert_eq!(first.goal.as_deref(), Some("work"));
        assert_eq!(first.execution.as_ref().map(|e| e.action.as_str()), Some("go_to_work"));
        assert!(state.get_bool("at_work"));

        let second = manager.update_agent("ada", &mut state).unwrap();
        assert_eq!(second.replanned, None);
        assert!(second.executed_successfully());
        assert!(state.get_bool("has_worked"));

        // Goal is no longer valid once satisfied
        let third = manager.update_agent("ada", &mut state).unwrap();
        assert_eq!(third.replanned, Some(ReplanReason::PlanComplete));
        assert_eq!(third.idle, Some(IdleReason::NoValidGoal));
        assert!(manager.current_plan("ada").is_none());
        assert_eq!(manager.analytics().no_valid_goal_cycles, 1);
    }

    #[test]
    fn test_invalidated_action_triggers_replan() {
        let manager = manager();
        manager.initialize_agent("ada", worker_catalog());
        let mut state = WorldState::new();
        manager.update_agent("ada", &mut state).unwrap();

        // The world moved the agent away from work before the next tick
        state.set("at_work", false);
        let report = manager.update_agent("ada", &mut state).unwrap();
        assert_eq!(report.replanned, Some(ReplanReason::ActionInvalidated));
        assert_eq!(report.execution.map(|e| e.action), Some("go_to_work".to_string()));
    }

    #[test]
    fn test_failing_action_forces_replan_after_retries() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let catalog = AgentCatalog::new()
            .with_goal(SimpleGoal::new("work", 0.6).unwrap().with_desired("has_worked", true))
            .with_action(
                SimpleAction::new("work", 8.0)
                    .unwrap()
                    .with_effect("has_worked", true)
                    .with_executor(move |_| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        false
                    }),
            );
        let config = ManagerConfig {
            max_action_retries: 2,
            ..ManagerConfig::default()
        };
        let manager = PlanExecutionManager::new(config).unwrap();
        manager.initialize_agent("ada", catalog);
        let mut state = WorldState::new();

        let first = manager.update_agent("ada", &mut state).unwrap();
        assert!(!first.executed_successfully());
        assert_eq!(manager.current_plan("ada").map(|p| p.cursor()), Some(0));

        let second = manager.update_agent("ada", &mut state).unwrap();
        assert_eq!(second.replanned, None);
        assert!(!second.executed_successfully());

        let third = manager.update_agent("ada", &mut state).unwrap();
        assert_eq!(third.replanned, Some(ReplanReason::RetriesExhausted));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);

        let analytics = manager.analytics();
        assert_eq!(analytics.action_failures, 3);
        assert_eq!(analytics.forced_replans, 1);
        assert_eq!(analytics.searches, 2);
    }

    #[test]
    fn test_empty_fallback_leaves_agent_idle() {
        let catalog = AgentCatalog::new()
            .with_goal(SimpleGoal::new("marry", 0.3).unwrap().with_desired("has_spouse", true))
            .with_action(
                SimpleAction::new("propose", 2.0)
                    .unwrap()
                    .with_precondition("has_ring", true),
            );
        let manager = manager();
        manager.initialize_agent("bo", catalog);
        let mut state = WorldState::new();

        let report = manager.update_agent("bo", &mut state).unwrap();
        assert_eq!(report.outcome, Some(SearchOutcome::Exhausted));
        assert_eq!(report.plan_kind, Some(PlanKind::Fallback));
        assert_eq!(report.idle, Some(IdleReason::EmptyPlan));
        assert!(report.execution.is_none());

        let analytics = manager.analytics();
        assert_eq!(analytics.searches_exhausted, 1);
        assert_eq!(analytics.fallback_plans, 1);
        assert_eq!(analytics.empty_fallbacks, 1);
        assert_eq!(analytics.active_plans, 0);
    }

    #[test]
    fn test_disabled_manager_does_nothing() {
        let manager = manager();
        manager.initialize_agent("ada", worker_catalog());
        manager.set_enabled(false);
        let mut state = WorldState::new();

        let report = manager.update_agent("ada", &mut state).unwrap();
        assert_eq!(report.idle, Some(IdleReason::Disabled));
        assert!(state.is_empty());
        assert_eq!(manager.analytics().searches, 0);
    }

    #[test]
    fn test_release_cleans_up() {
        let manager = manager();
        manager.initialize_agent("ada", worker_catalog());
        manager.initialize_agent(7u64, worker_catalog());
        let mut state = WorldState::new();
        manager.update_agent("ada", &mut state).unwrap();

        let before = manager.analytics();
        assert_eq!(before.agents_with_goals, 2);
        assert_eq!(before.active_plans, 1);
        assert_eq!(before.average_plan_length, 2.0);

        assert!(manager.release_agent("ada"));
        assert!(!manager.release_agent("ada"));
        assert!(!manager.is_registered("ada"));
        assert!(manager.current_plan("ada").is_none());

        let after = manager.analytics();
        assert_eq!(after.agents, 1);
        assert_eq!(after.agents_with_goals, 1);
        assert_eq!(after.active_plans, 0);
        assert_eq!(after.average_plan_length, 0.0);

        manager.shutdown();
        assert_eq!(manager.agent_count(), 0);
    }

    #[test]
    fn test_maintenance_drops_dead_agents() {
        let manager = manager();
        for id in ["ada", "bo", "cy"] {
            manager.initialize_agent(id, worker_catalog());
        }
        assert_eq!(manager.perform_maintenance(|id| id != "bo"), 1);
        assert!(manager.is_registered("ada"));
        assert!(!manager.is_registered("bo"));
        assert_eq!(manager.agent_count(), 2);
    }

    #[test]
    fn test_needs_update_honours_interval() {
        let config = ManagerConfig {
            update_interval: Duration::from_secs(3600),
            ..ManagerConfig::default()
        };
        let manager = PlanExecutionManager::new(config).unwrap();
        assert!(!manager.needs_update("ada"));

        manager.initialize_agent("ada", worker_catalog());
        assert!(manager.needs_update("ada"));

        let mut state = WorldState::new();
        manager.update_agent("ada", &mut state).unwrap();
        assert!(!manager.needs_update("ada"));
    }

    #[test]
    fn test_reinitialized_agent_keeps_fresh_record() {
        let manager = Arc::new(manager());
        let handle = Arc::downgrade(&manager);
        let catalog = AgentCatalog::new()
            .with_goal(SimpleGoal::new("work", 0.6).unwrap().with_desired("has_worked", true))
            .with_action(
                SimpleAction::new("work", 8.0)
                    .unwrap()
                    .with_effect("has_worked", true)
                    .with_executor(move |_| {
                        // The host swaps the catalog while this cycle is in flight
                        if let Some(manager) = handle.upgrade() {
                            manager.initialize_agent("ada", worker_catalog());
                        }
                        false
                    }),
            );
        manager.initialize_agent("ada", catalog);
        let mut state = WorldState::new();

        let report = manager.update_agent("ada", &mut state).unwrap();
        assert!(!report.executed_successfully());
        assert!(manager.is_registered("ada"));
        assert!(manager.current_plan("ada").is_none());
        assert!(manager.needs_update("ada"));

        // The next cycle plans from the replacement catalog
        let report = manager.update_agent("ada", &mut state).unwrap();
        assert_eq!(report.execution.map(|e| e.action), Some("go_to_work".to_string()));
    }

    #[test]
    fn test_update_with_builder() {
        let manager = manager();
        manager.initialize_agent("ada", worker_catalog());
        let builder = FnBuilder::new(|at_work: &bool| WorldState::new().with("at_work", *at_work));

        let (report, state) = manager.update_agent_with("ada", &true, &builder).unwrap();
        assert_eq!(report.execution.map(|e| e.action), Some("work".to_string()));
        assert!(state.get_bool("has_worked"));
    }

    #[test]
    fn test_analytics_serializes() {
        let manager = manager();
        manager.initialize_agent("ada", worker_catalog());
        let json = manager.analytics().to_json().unwrap();
        assert!(json.contains("\"agents_with_goals\":1"));
        assert!(json.contains("\"average_plan_length\":0.0"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ManagerConfig {
            max_action_retries: 0,
            ..ManagerConfig::default()
        };
        assert!(matches!(
            PlanExecutionManager::new(config),
            Err(GoapError::InvalidConfig(_))
        ));
    }
}
