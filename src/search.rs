//! Bounded best-first search over world states.
//!
//! [`AStarSearch`] expands [`WorldState`]s from the start state by applying
//! every performable action, ordering the frontier by `f = g + h`. States are
//! deduplicated by [`WorldState::state_key`]. Every call is bounded by the
//! iteration, wall-clock and frontier limits of a [`PlannerConfig`]; hitting
//! any of them stops the search at once with [`SearchOutcome::Aborted`].

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{Action, PlannerConfig, WorldState};

/// Search strategy used by the [`Planner`](crate::Planner).
pub trait SearchAlgorithm: Send + Sync {
    fn search(
        &self,
        actions: &[Arc<dyn Action>],
        start: &WorldState,
        goal: &WorldState,
        limits: &PlannerConfig,
    ) -> SearchResult;
}

pub trait HeuristicStrategy: Send + Sync {
    fn calculate(&self, state: &WorldState, goal: &WorldState) -> f32;
}

/// Counts goal facts that are missing or hold a different value.
pub struct DefaultHeuristic;

impl HeuristicStrategy for DefaultHeuristic {
    fn calculate(&self, state: &WorldState, goal: &WorldState) -> f32 {
        state.unsatisfied_count(goal) as f32
    }
}

pub struct ZeroHeuristic;

impl HeuristicStrategy for ZeroHeuristic {
    fn calculate(&self, _state: &WorldState, _goal: &WorldState) -> f32 {
        0.0
    }
}

/// Which safety bound stopped a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    IterationLimit,
    TimeLimit,
    FrontierLimit,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AbortReason::IterationLimit => "iteration limit",
            AbortReason::TimeLimit => "time limit",
            AbortReason::FrontierLimit => "frontier limit",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A state satisfying the goal was popped from the frontier.
    Found,
    /// The reachable state space ran out without satisfying the goal.
    Exhausted,
    /// A safety bound was exceeded.
    Aborted(AbortReason),
}

/// Counters captured when a search stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes popped and goal-tested.
    pub iterations: usize,
    /// Successor nodes pushed onto the frontier.
    pub generated: usize,
    /// Frontier size when the search stopped.
    pub frontier: usize,
    pub peak_frontier: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub outcome: SearchOutcome,
    /// Actions from the start state to the goal; empty unless `outcome` is `Found`.
    pub path: Vec<Arc<dyn Action>>,
    pub stats: SearchStats,
}

#[derive(Clone)]
struct Node {
    state: WorldState,
    parent: Option<usize>,
    action: Option<Arc<dyn Action>>,
    g_cost: f32,
    h_cost: f32,
}

impl Node {
    fn f_cost(&self) -> f32 {
        self.g_cost + self.h_cost
    }
}

/// Frontier entry. Orders by lowest `f`, then highest `g` (deeper paths
/// first), then creation order, which follows action registration order.
#[derive(Debug, Clone)]
struct NodeWrapper {
    idx: usize,
    f_cost: f32,
    g_cost: f32,
}

impl PartialEq for NodeWrapper {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeWrapper {}

impl PartialOrd for NodeWrapper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeWrapper {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .total_cmp(&other.f_cost)
            .then_with(|| other.g_cost.total_cmp(&self.g_cost))
            .then_with(|| self.idx.cmp(&other.idx))
    }
}

struct SearchContext {
    nodes: Vec<Node>,
    keys: Vec<String>,
    open_set: BinaryHeap<Reverse<NodeWrapper>>,
    closed_set: HashSet<String>,
    best_g: HashMap<String, f32>,
    peak_frontier: usize,
}

impl SearchContext {
    fn new(start: &WorldState, goal: &WorldState, heuristic: &dyn HeuristicStrategy) -> Self {
        let mut context = Self {
            nodes: Vec::new(),
            keys: Vec::new(),
            open_set: BinaryHeap::new(),
            closed_set: HashSet::new(),
            best_g: HashMap::new(),
            peak_frontier: 0,
        };

        let h_cost = heuristic.calculate(start, goal);
        context.enqueue(
            start.state_key(),
            Node {
                state: start.clone(),
                parent: None,
                action: None,
                g_cost: 0.0,
                h_cost,
            },
        );
        context
    }

    fn enqueue(&mut self, key: String, node: Node) {
        let idx = self.nodes.len();
        self.best_g.insert(key.clone(), node.g_cost);
        self.open_set.push(Reverse(NodeWrapper {
            idx,
            f_cost: node.f_cost(),
            g_cost: node.g_cost,
        }));
        self.nodes.push(node);
        self.keys.push(key);
        self.peak_frontier = self.peak_frontier.max(self.open_set.len());
    }

    /// Pops the best node whose state has not been expanded yet.
    fn next_node(&mut self) -> Option<usize> {
        while let Some(Reverse(wrapper)) = self.open_set.pop() {
            if !self.closed_set.contains(&self.keys[wrapper.idx]) {
                return Some(wrapper.idx);
            }
        }
        None
    }

    fn mark_visited(&mut self, idx: usize) {
        self.closed_set.insert(self.keys[idx].clone());
    }

    /// Whether a successor reaching `key` at cost `g_cost` is worth queueing.
    fn is_improvement(&self, key: &str, g_cost: f32) -> bool {
        if self.closed_set.contains(key) {
            return false;
        }
        self.best_g.get(key).map_or(true, |&best| g_cost < best)
    }

    /// Expands node `idx`. Returns `None` once `deadline` passes mid-expansion.
    fn successors(
        &self,
        idx: usize,
        actions: &[Arc<dyn Action>],
        goal: &WorldState,
        heuristic: &dyn HeuristicStrategy,
        deadline: Instant,
    ) -> Option<Vec<(String, Node)>> {
        let parent = &self.nodes[idx];
        let mut successors = Vec::new();

        for action in actions {
            if Instant::now() > deadline {
                return None;
            }
            if !action.can_perform(&parent.state) {
                continue;
            }

            let step = action.cost(&parent.state);
            if !step.is_finite() {
                log::trace!("Skipping action {} with non-finite cost", action.name());
                continue;
            }

            let state = parent.state.applied(&action.effects(&parent.state));
            let g_cost = parent.g_cost + step.max(0.0);
            let key = state.state_key();
            if !self.is_improvement(&key, g_cost) {
                continue;
            }

            let h_cost = heuristic.calculate(&state, goal);
            log::trace!(
                "Generated successor via {}: g={} h={}",
                action.name(),
                g_cost,
                h_cost
            );
            successors.push((
                key,
                Node {
                    state,
                    parent: Some(idx),
                    action: Some(Arc::clone(action)),
                    g_cost,
                    h_cost,
                },
            ));
        }

        Some(successors)
    }

    fn reconstruct_path(&self, idx: usize) -> Vec<Arc<dyn Action>> {
        let mut path = Vec::new();
        let mut current = Some(idx);

        while let Some(i) = current {
            let node = &self.nodes[i];
            if let Some(action) = &node.action {
                path.push(Arc::clone(action));
            }
            current = node.parent;
        }

        path.reverse();
        path
    }

    fn stats(&self, iterations: usize, started: Instant) -> SearchStats {
        SearchStats {
            iterations,
            generated: self.nodes.len().saturating_sub(1),
            frontier: self.open_set.len(),
            peak_frontier: self.peak_frontier,
            elapsed: started.elapsed(),
        }
    }
}

/// A* over world states with a pluggable heuristic.
pub struct AStarSearch {
    heuristic: Box<dyn HeuristicStrategy>,
}

impl AStarSearch {
    /// Creates an A* search with a custom heuristic.
    pub fn new(heuristic: Box<dyn HeuristicStrategy>) -> Self {
        Self { heuristic }
    }

    /// Creates an A* search counting unsatisfied goal facts.
    pub fn with_default_heuristic() -> Self {
        Self {
            heuristic: Box::new(DefaultHeuristic),
        }
    }
}

impl Default for AStarSearch {
    fn default() -> Self {
        Self::with_default_heuristic()
    }
}

impl SearchAlgorithm for AStarSearch {
    fn search(
        &self,
        actions: &[Arc<dyn Action>],
        start: &WorldState,
        goal: &WorldState,
        limits: &PlannerConfig,
    ) -> SearchResult {
        let started = Instant::now();
        let deadline = started + limits.max_duration;
        let heuristic = self.heuristic.as_ref();
        let mut context = SearchContext::new(start, goal, heuristic);
        let mut iterations = 0;

        let finish = |context: &SearchContext, iterations, outcome, path| SearchResult {
            outcome,
            path,
            stats: context.stats(iterations, started),
        };

        loop {
            if iterations >= limits.max_iterations {
                return finish(
                    &context,
                    iterations,
                    SearchOutcome::Aborted(AbortReason::IterationLimit),
                    Vec::new(),
                );
            }
            if Instant::now() > deadline {
                return finish(
                    &context,
                    iterations,
                    SearchOutcome::Aborted(AbortReason::TimeLimit),
                    Vec::new(),
                );
            }

            let Some(current) = context.next_node() else {
                return finish(&context, iterations, SearchOutcome::Exhausted, Vec::new());
            };
            iterations += 1;

            if context.nodes[current].state.satisfies_goal(goal) {
                let path = context.reconstruct_path(current);
                return finish(&context, iterations, SearchOutcome::Found, path);
            }

            context.mark_visited(current);

            let Some(successors) = context.successors(current, actions, goal, heuristic, deadline)
            else {
                return finish(
                    &context,
                    iterations,
                    SearchOutcome::Aborted(AbortReason::TimeLimit),
                    Vec::new(),
                );
            };

            for (key, node) in successors {
                // A later sibling may have been superseded by an earlier, cheaper one.
                if !context.is_improvement(&key, node.g_cost) {
                    continue;
                }
                if context.open_set.len() >= limits.max_frontier {
                    return finish(
                        &context,
                        iterations,
                        SearchOutcome::Aborted(AbortReason::FrontierLimit),
                        Vec::new(),
                    );
                }
                context.enqueue(key, node);
            }
        }
    }
}

/// Uniform-cost search: A* with a zero heuristic.
#[derive(Default)]
pub struct DijkstraSearch;

impl SearchAlgorithm for DijkstraSearch {
    fn search(
        &self,
        actions: &[Arc<dyn Action>],
        start: &WorldState,
        goal: &WorldState,
        limits: &PlannerConfig,
    ) -> SearchResult {
        AStarSearch::new(Box::new(ZeroHeuristic)).search(actions, start, goal, limits)
    }
}
