//! # Planner for Goal-Oriented Action Planning (GOAP)
//!
//! The planner turns a world state, a goal and a catalog of actions into an
//! ordered [`Plan`]. It never fails: when the search runs out of states or
//! hits one of its safety bounds, it degrades to a fallback plan so that the
//! agent still attempts some progress.
//!
//! ## Fallback policy
//!
//! 1. The first action (in catalog order) that is performable in the start
//!    state and whose effects touch any key of the goal's desired state.
//! 2. Otherwise the first performable action, regardless of relevance.
//! 3. Otherwise an empty plan.
//!
//! ## Basic Usage
//!
//! ```
//! use goap_engine::{Action, Planner, SimpleAction, SimpleGoal, WorldState};
//! use std::sync::Arc;
//!
//! let actions: Vec<Arc<dyn Action>> = vec![
//!     Arc::new(
//!         SimpleAction::new("chop_tree", 2.0)
//!             .unwrap()
//!             .with_precondition("has_axe", true)
//!             .with_effect("has_wood", true),
//!     ),
//!     Arc::new(
//!         SimpleAction::new("build_house", 4.0)
//!             .unwrap()
//!             .with_precondition("has_wood", true)
//!             .with_effect("has_house", true),
//!     ),
//! ];
//!
//! let goal = SimpleGoal::new("shelter", 1.0).unwrap().with_desired("has_house", true);
//! let state = WorldState::new().with("has_axe", true);
//!
//! let plan = Planner::default().plan(&state, &goal, &actions);
//! assert_eq!(plan.action_names(), ["chop_tree", "build_house"]);
//! assert!(!plan.is_fallback());
//! ```

use std::sync::Arc;
use std::time::Instant;

use crate::error::Result;
use crate::search::{AStarSearch, SearchAlgorithm, SearchOutcome, SearchStats};
use crate::{Action, Goal, Plan, PlanKind, PlannerConfig, WorldState};

/// What a single planning call produced and why.
#[derive(Debug, Clone)]
pub struct PlanReport {
    pub plan: Plan,
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

impl PlanReport {
    /// True when a safety bound stopped the search.
    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Aborted(_))
    }

    /// A fallback was needed and no action at all was performable.
    pub fn is_empty_fallback(&self) -> bool {
        self.plan.is_fallback() && self.plan.is_empty()
    }
}

pub struct Planner {
    config: PlannerConfig,
    search_algorithm: Box<dyn SearchAlgorithm>,
}

impl Planner {
    /// Creates an A* planner with the given bounds.
    pub fn new(config: PlannerConfig) -> Result<Self> {
        Self::with_search_algorithm(config, Box::new(AStarSearch::default()))
    }

    /// Creates a planner that uses `search_algorithm` instead of A*.
    pub fn with_search_algorithm(
        config: PlannerConfig,
        search_algorithm: Box<dyn SearchAlgorithm>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            search_algorithm,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plans for `goal`, returning a searched plan or a fallback.
    pub fn plan(&self, state: &WorldState, goal: &dyn Goal, actions: &[Arc<dyn Action>]) -> Plan {
        self.plan_detailed(state, goal, actions).plan
    }

    /// Like [`plan`](Planner::plan), but also reports the search outcome and counters.
    pub fn plan_detailed(
        &self,
        state: &WorldState,
        goal: &dyn Goal,
        actions: &[Arc<dyn Action>],
    ) -> PlanReport {
        let deadline = Instant::now() + self.config.max_duration;
        let desired = goal.desired_state();
        let result = self
            .search_algorithm
            .search(actions, state, desired, &self.config);
        let stats = result.stats;

        let plan = match result.outcome {
            SearchOutcome::Found => {
                log::debug!(
                    "Plan for goal {} found after {} iterations: {} actions",
                    goal.name(),
                    stats.iterations,
                    result.path.len()
                );
                Plan::new(result.path, PlanKind::Searched)
            }
            SearchOutcome::Exhausted => {
                log::debug!(
                    "Search for goal {} exhausted after {} iterations; using fallback",
                    goal.name(),
                    stats.iterations
                );
                scan_fallback(state, desired, actions, Some(deadline))
            }
            SearchOutcome::Aborted(reason) => {
                log::warn!(
                    "GOAP search for goal {} aborted ({}): iterations={}, time_ms={}, frontier={}. Limits: iterations={}, time_ms={}, frontier={}",
                    goal.name(),
                    reason,
                    stats.iterations,
                    stats.elapsed.as_millis(),
                    stats.frontier,
                    self.config.max_iterations,
                    self.config.max_duration.as_millis(),
                    self.config.max_frontier
                );
                scan_fallback(state, desired, actions, Some(deadline))
            }
        };

        PlanReport {
            plan: plan.for_goal(goal.name()),
            outcome: result.outcome,
            stats,
        }
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self {
            config: PlannerConfig::default(),
            search_algorithm: Box::new(AStarSearch::default()),
        }
    }
}

/// Best-effort single-action (or empty) plan used when search fails.
pub fn fallback_plan(
    state: &WorldState,
    desired: &WorldState,
    actions: &[Arc<dyn Action>],
) -> Plan {
    scan_fallback(state, desired, actions, None)
}

/// Applies the fallback policy, settling for the best candidate seen so far
/// once `deadline` has passed.
fn scan_fallback(
    state: &WorldState,
    desired: &WorldState,
    actions: &[Arc<dyn Action>],
    deadline: Option<Instant>,
) -> Plan {
    let mut first_performable = None;

    for action in actions {
        if deadline.map_or(false, |d| Instant::now() > d) {
            log::debug!("Fallback scan cut short by the planning deadline");
            break;
        }
        if !action.can_perform(state) {
            continue;
        }
        if action.effects(state).touches_any(desired) {
            return Plan::new(vec![Arc::clone(action)], PlanKind::Fallback);
        }
        if first_performable.is_none() {
            first_performable = Some(Arc::clone(action));
        }
    }

    match first_performable {
        Some(action) => Plan::new(vec![action], PlanKind::Fallback),
        None => Plan::empty(PlanKind::Fallback),
    }
}
