//! Per-archetype goal and action catalogs.

use std::fmt;
use std::sync::Arc;

use crate::{Action, Goal};

/// The goals and actions available to one kind of agent.
///
/// Entries are reference counted, so a single catalog built per role can be
/// cloned cheaply and handed to every agent of that role. Registration order
/// is significant: it breaks priority ties between goals and cost ties between
/// actions.
#[derive(Clone, Default)]
pub struct AgentCatalog {
    goals: Vec<Arc<dyn Goal>>,
    actions: Vec<Arc<dyn Action>>,
}

impl AgentCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a goal, builder style.
    pub fn with_goal(mut self, goal: impl Goal + 'static) -> Self {
        self.goals.push(Arc::new(goal));
        self
    }

    /// Adds an action, builder style.
    pub fn with_action(mut self, action: impl Action + 'static) -> Self {
        self.actions.push(Arc::new(action));
        self
    }

    /// Appends an already shared goal.
    pub fn add_goal(&mut self, goal: Arc<dyn Goal>) {
        self.goals.push(goal);
    }

    /// Appends an already shared action.
    pub fn add_action(&mut self, action: Arc<dyn Action>) {
        self.actions.push(action);
    }

    /// Goals in registration order.
    pub fn goals(&self) -> &[Arc<dyn Goal>] {
        &self.goals
    }

    /// Actions in registration order.
    pub fn actions(&self) -> &[Arc<dyn Action>] {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty() && self.actions.is_empty()
    }
}

impl fmt::Debug for AgentCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let goals: Vec<_> = self.goals.iter().map(|g| g.name()).collect();
        let actions: Vec<_> = self.actions.iter().map(|a| a.name()).collect();
        f.debug_struct("AgentCatalog")
            .field("goals", &goals)
            .field("actions", &actions)
            .finish()
    }
}
