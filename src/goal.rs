//! Goals: desired partial world states with context-sensitive priorities.

use std::fmt;
use std::sync::Arc;

use crate::error::{GoapError, Result};
use crate::{Value, WorldState};

/// A desired partial [`WorldState`] plus a priority function.
pub trait Goal: Send + Sync {
    fn name(&self) -> &str;

    fn base_priority(&self) -> f32;

    /// Facts that must all hold for the goal to be satisfied.
    fn desired_state(&self) -> &WorldState;

    /// Gates whether the goal is a candidate at all in `state`.
    fn is_valid(&self, _state: &WorldState) -> bool {
        true
    }

    /// Context-sensitive multiplier applied to the base priority.
    fn dynamic_priority(&self, _state: &WorldState) -> f32 {
        1.0
    }

    /// `base_priority * dynamic_priority` for valid goals, `0.0` otherwise.
    fn final_priority(&self, state: &WorldState) -> f32 {
        if !self.is_valid(state) {
            return 0.0;
        }
        self.base_priority() * self.dynamic_priority(state)
    }

    /// An empty desired state is never satisfied.
    fn is_satisfied(&self, state: &WorldState) -> bool {
        state.satisfies_goal(self.desired_state())
    }
}

impl fmt::Debug for dyn Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Goal")
            .field("name", &self.name())
            .field("base_priority", &self.base_priority())
            .field("desired_state", self.desired_state())
            .finish()
    }
}

type ValidityFn = dyn Fn(&WorldState) -> bool + Send + Sync;
type PriorityFn = dyn Fn(&WorldState) -> f32 + Send + Sync;

/// Declarative [`Goal`] with optional validity and priority closures.
///
/// ```
/// use goap_engine::{Goal, SimpleGoal, WorldState};
///
/// let be_happy = SimpleGoal::new("increase_happiness", 0.7)
///     .unwrap()
///     .with_desired("is_happy", true)
///     .with_validity(|s| s.get_float("happiness") < 70.0)
///     .with_dynamic_priority(|s| ((100.0 - s.get_float("happiness")) / 100.0).max(0.1) as f32);
///
/// let sad = WorldState::new().with("happiness", 20.0);
/// assert!(be_happy.is_valid(&sad));
/// assert!((be_happy.final_priority(&sad) - 0.56).abs() < 1e-6);
///
/// let content = WorldState::new().with("happiness", 90.0);
/// assert_eq!(be_happy.final_priority(&content), 0.0);
/// ```
#[derive(Clone)]
pub struct SimpleGoal {
    name: String,
    base_priority: f32,
    desired: WorldState,
    validity: Option<Arc<ValidityFn>>,
    priority: Option<Arc<PriorityFn>>,
}

impl SimpleGoal {
    /// Fails with [`GoapError::InvalidGoalPriority`] for a non-finite priority.
    pub fn new(name: impl Into<String>, base_priority: f32) -> Result<Self> {
        let name = name.into();
        if !base_priority.is_finite() {
            return Err(GoapError::InvalidGoalPriority(format!(
                "{}: {}",
                name, base_priority
            )));
        }

        Ok(Self {
            name,
            base_priority,
            desired: WorldState::new(),
            validity: None,
            priority: None,
        })
    }

    /// Adds a desired fact.
    pub fn with_desired(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.desired.set(key, value);
        self
    }

    /// Sets the validity check.
    pub fn with_validity<F>(mut self, func: F) -> Self
    where
        F: Fn(&WorldState) -> bool + Send + Sync + 'static,
    {
        self.validity = Some(Arc::new(func));
        self
    }

    /// Sets the priority multiplier.
    pub fn with_dynamic_priority<F>(mut self, func: F) -> Self
    where
        F: Fn(&WorldState) -> f32 + Send + Sync + 'static,
    {
        self.priority = Some(Arc::new(func));
        self
    }
}

impl Goal for SimpleGoal {
    fn name(&self) -> &str {
        &self.name
    }

    fn base_priority(&self) -> f32 {
        self.base_priority
    }

    fn desired_state(&self) -> &WorldState {
        &self.desired
    }

    fn is_valid(&self, state: &WorldState) -> bool {
        self.validity.as_ref().map_or(true, |f| f(state))
    }

    fn dynamic_priority(&self, state: &WorldState) -> f32 {
        self.priority.as_ref().map_or(1.0, |f| f(state))
    }
}

impl fmt::Debug for SimpleGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleGoal")
            .field("name", &self.name)
            .field("base_priority", &self.base_priority)
            .field("desired", &self.desired)
            .finish()
    }
}

/// Picks the valid goal with the highest final priority.
///
/// Ties resolve to the goal registered first. Goals whose final priority is
/// not finite are never selected.
pub fn select_best_goal<'a, G>(goals: &'a [G], state: &WorldState) -> Option<&'a G>
where
    G: AsRef<dyn Goal>,
{
    let mut best: Option<(&'a G, f32)> = None;
    for goal in goals {
        let g = goal.as_ref();
        if !g.is_valid(state) {
            continue;
        }
        let priority = g.final_priority(state);
        if !priority.is_finite() {
            log::debug!("Skipping goal {} with non-finite priority {}", g.name(), priority);
            continue;
        }
        match best {
            Some((_, current)) if !(priority > current) => {}
            _ => best = Some((goal, priority)),
        }
    }
    best.map(|(goal, _)| goal)
}
