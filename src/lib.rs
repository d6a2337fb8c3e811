//! Goal-Oriented Action Planning for many independent agents.
//!
//! Each agent owns a catalog of [`Goal`]s and [`Action`]s. Every scheduler
//! tick the [`PlanExecutionManager`] selects the most urgent valid goal, asks
//! the [`Planner`] for a bounded A* search over typed [`WorldState`] facts and
//! executes the plan one action per tick.

mod action;
mod builder;
mod catalog;
mod config;
mod error;
mod goal;
mod manager;
mod plan;
mod planner;
mod search;
mod subsystem;
mod value;
mod world_state;

pub use action::{Action, SimpleAction};
pub use builder::{FactSource, FactSources, FnBuilder, WorldStateBuilder};
pub use catalog::AgentCatalog;
pub use config::{ManagerConfig, PlannerConfig};
pub use error::{GoapError, Result};
pub use goal::{select_best_goal, Goal, SimpleGoal};
pub use manager::{
    ActionExecution, AgentId, Analytics, CycleReport, IdleReason, PlanExecutionManager,
    ReplanReason,
};
pub use plan::{Plan, PlanKind};
pub use planner::{fallback_plan, PlanReport, Planner};
pub use search::{
    AStarSearch, AbortReason, DefaultHeuristic, DijkstraSearch, HeuristicStrategy,
    SearchAlgorithm, SearchOutcome, SearchResult, SearchStats, ZeroHeuristic,
};
pub use subsystem::Subsystem;
pub use value::Value;
pub use world_state::WorldState;
