//! Plans: ordered action sequences with an execution cursor.

use std::fmt;
use std::sync::Arc;

use crate::Action;

/// How a plan was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    /// A full search reached the goal.
    Searched,
    /// The search was aborted or exhausted; at most one best-effort action.
    Fallback,
}

/// Ordered actions produced by the planner for one goal.
///
/// The cursor points at the next action to execute. Plans are replaced
/// wholesale on replanning, never edited in place.
#[derive(Clone)]
pub struct Plan {
    actions: Vec<Arc<dyn Action>>,
    cursor: usize,
    kind: PlanKind,
    goal: Option<String>,
}

impl Plan {
    /// Creates a plan with the cursor at the first action.
    pub fn new(actions: Vec<Arc<dyn Action>>, kind: PlanKind) -> Self {
        Self {
            actions,
            cursor: 0,
            kind,
            goal: None,
        }
    }

    /// Creates a plan with no actions.
    pub fn empty(kind: PlanKind) -> Self {
        Self::new(Vec::new(), kind)
    }

    /// Records the goal this plan serves.
    pub fn for_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    pub fn actions(&self) -> &[Arc<dyn Action>] {
        &self.actions
    }

    /// Names of the actions, in execution order.
    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    pub fn kind(&self) -> PlanKind {
        self.kind
    }

    pub fn is_fallback(&self) -> bool {
        self.kind == PlanKind::Fallback
    }

    pub fn goal(&self) -> Option<&str> {
        self.goal.as_deref()
    }

    /// Total number of actions, executed or not.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Index of the next action to execute.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The action at the cursor, if the plan is not exhausted.
    pub fn current(&self) -> Option<&Arc<dyn Action>> {
        self.actions.get(self.cursor)
    }

    /// Number of actions not executed yet.
    pub fn remaining(&self) -> usize {
        self.actions.len().saturating_sub(self.cursor)
    }

    /// True once the cursor has moved past the last action (or the plan is empty).
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.actions.len()
    }

    /// Moves the cursor past the current action.
    pub fn advance(&mut self) {
        if !self.is_exhausted() {
            self.cursor += 1;
        }
    }
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plan")
            .field("actions", &self.action_names())
            .field("cursor", &self.cursor)
            .field("kind", &self.kind)
            .field("goal", &self.goal)
            .finish()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.action_names().join(" -> "))
    }
}
