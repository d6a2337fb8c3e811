//! # Actions for Goal-Oriented Action Planning (GOAP)
//!
//! An [`Action`] is a unit of agent behaviour. The planner only ever calls its
//! pure side ([`can_perform`](Action::can_perform), [`effects`](Action::effects),
//! [`cost`](Action::cost)); the execution manager calls
//! [`execute`](Action::execute) once the action reaches the head of a plan.
//!
//! Most catalogs can be written with the declarative [`SimpleAction`], which
//! derives `can_perform` and `effects` from fixed precondition/effect states
//! and accepts closures where behaviour depends on the current state.
//!
//! ```
//! use goap_engine::{Action, SimpleAction, WorldState};
//!
//! let socialize = SimpleAction::new("socialize", 5.0)
//!     .unwrap()
//!     .with_precondition("villagers_nearby", true)
//!     .with_effect("has_socialized", true)
//!     .with_cost_fn(|base, state| {
//!         if state.get_str("personality") == "Shy" { base * 2.0 } else { base }
//!     });
//!
//! let mut state = WorldState::new().with("villagers_nearby", true);
//! assert!(socialize.can_perform(&state));
//! assert_eq!(socialize.cost(&state), 5.0);
//!
//! assert!(socialize.execute(&mut state));
//! assert!(state.get_bool("has_socialized"));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{GoapError, Result};
use crate::WorldState;

/// Behaviour contract consumed by the planner and the execution manager.
///
/// `can_perform`, `effects` and `cost` must be pure functions of the state
/// they receive. `preconditions` is informational and is not required to
/// mirror `can_perform` exactly.
pub trait Action: Send + Sync {
    /// Unique name within a catalog, used in logs and plan displays.
    fn name(&self) -> &str;

    fn base_cost(&self) -> f32;

    /// Whether the action may run in `state`.
    fn can_perform(&self, state: &WorldState) -> bool;

    /// Partial state merged into a copy of `state` when planning through this action.
    fn effects(&self, state: &WorldState) -> WorldState;

    fn cost(&self, _state: &WorldState) -> f32 {
        self.base_cost()
    }

    /// Performs the real side effect against the live state. Returns `false`
    /// on failure; the plan cursor then stays put.
    fn execute(&self, state: &mut WorldState) -> bool;

    fn preconditions(&self) -> WorldState {
        WorldState::new()
    }
}

impl fmt::Debug for dyn Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name())
            .field("base_cost", &self.base_cost())
            .finish()
    }
}

type CostFn = dyn Fn(f32, &WorldState) -> f32 + Send + Sync;
type GuardFn = dyn Fn(&WorldState) -> bool + Send + Sync;
type ExecFn = dyn Fn(&mut WorldState) -> bool + Send + Sync;

/// Declarative [`Action`] built from fixed preconditions and effects.
#[derive(Clone)]
pub struct SimpleAction {
    name: String,
    base_cost: f32,
    preconditions: WorldState,
    effects: WorldState,
    cost_fn: Option<Arc<CostFn>>,
    guard: Option<Arc<GuardFn>>,
    executor: Option<Arc<ExecFn>>,
}

impl SimpleAction {
    /// Creates an action with no preconditions and no effects.
    ///
    /// Fails with [`GoapError::InvalidActionCost`] when `base_cost` is
    /// negative or not finite.
    pub fn new(name: impl Into<String>, base_cost: f32) -> Result<Self> {
        let name = name.into();
        if !base_cost.is_finite() || base_cost < 0.0 {
            return Err(GoapError::InvalidActionCost(format!("{}: {}", name, base_cost)));
        }

        Ok(Self {
            name,
            base_cost,
            preconditions: WorldState::new(),
            effects: WorldState::new(),
            cost_fn: None,
            guard: None,
            executor: None,
        })
    }

    /// Requires `key` to hold `value` before the action can run.
    pub fn with_precondition(
        mut self,
        key: impl Into<String>,
        value: impl Into<crate::Value>,
    ) -> Self {
        self.preconditions.set(key, value);
        self
    }

    /// Sets `key` to `value` when the action is applied.
    pub fn with_effect(mut self, key: impl Into<String>, value: impl Into<crate::Value>) -> Self {
        self.effects.set(key, value);
        self
    }

    /// State-dependent cost. The closure receives the base cost and the state
    /// being expanded; negative results are clamped to zero.
    pub fn with_cost_fn<F>(mut self, func: F) -> Self
    where
        F: Fn(f32, &WorldState) -> f32 + Send + Sync + 'static,
    {
        self.cost_fn = Some(Arc::new(func));
        self
    }

    /// Extra applicability check evaluated after the declarative preconditions.
    pub fn with_guard<F>(mut self, func: F) -> Self
    where
        F: Fn(&WorldState) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Arc::new(func));
        self
    }

    /// Side-effecting step run by [`Action::execute`]. Without one, executing
    /// merges the effects into the live state and succeeds.
    pub fn with_executor<F>(mut self, func: F) -> Self
    where
        F: Fn(&mut WorldState) -> bool + Send + Sync + 'static,
    {
        self.executor = Some(Arc::new(func));
        self
    }

    /// Returns the fixed effects declared with [`with_effect`](SimpleAction::with_effect).
    pub fn declared_effects(&self) -> &WorldState {
        &self.effects
    }
}

impl Action for SimpleAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn base_cost(&self) -> f32 {
        self.base_cost
    }

    fn can_perform(&self, state: &WorldState) -> bool {
        state.satisfies(&self.preconditions) && self.guard.as_ref().map_or(true, |g| g(state))
    }

    fn effects(&self, _state: &WorldState) -> WorldState {
        self.effects.clone()
    }

    fn cost(&self, state: &WorldState) -> f32 {
        match &self.cost_fn {
            Some(func) => {
                let cost = func(self.base_cost, state);
                if cost.is_finite() {
                    cost.max(0.0)
                } else {
                    self.base_cost
                }
            }
            None => self.base_cost,
        }
    }

    fn execute(&self, state: &mut WorldState) -> bool {
        match &self.executor {
            Some(func) => func(state),
            None => {
                state.merge(&self.effects);
                true
            }
        }
    }

    fn preconditions(&self) -> WorldState {
        self.preconditions.clone()
    }
}

impl fmt::Debug for SimpleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleAction")
            .field("name", &self.name)
            .field("base_cost", &self.base_cost)
            .field("preconditions", &self.preconditions)
            .field("effects", &self.effects)
            .finish()
    }
}

impl fmt::Display for SimpleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
