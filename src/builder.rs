//! Building world-state snapshots from host data.
//!
//! The engine never reads the simulation directly. Each update cycle the host
//! hands an agent context to a [`WorldStateBuilder`], which turns it into a
//! fresh [`WorldState`]. Builders can be written by hand, wrapped from a
//! closure with [`FnBuilder`], or composed from named [`FactSources`], each of
//! which contributes one slice of facts (needs, surroundings, time of day...).
//!
//! # Example
//!
//! ```
//! use goap_engine::{FactSources, WorldStateBuilder};
//!
//! struct Villager {
//!     age: i64,
//!     neighbours: usize,
//! }
//!
//! let mut sources = FactSources::new();
//! sources
//!     .add("profile", |v: &Villager, state: &mut goap_engine::WorldState| {
//!         state.set("age", v.age);
//!     })
//!     .unwrap();
//! sources
//!     .add("surroundings", |v: &Villager, state: &mut goap_engine::WorldState| {
//!         state.set("villagers_nearby", v.neighbours > 0);
//!     })
//!     .unwrap();
//!
//! let state = sources.build_state(&Villager { age: 140, neighbours: 2 });
//! assert_eq!(state.get_int("age"), 140);
//! assert!(state.get_bool("villagers_nearby"));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{GoapError, Result};
use crate::WorldState;

/// Produces the planning snapshot for one agent context.
pub trait WorldStateBuilder<C: ?Sized>: Send + Sync {
    fn build_state(&self, context: &C) -> WorldState;
}

/// Adapts a closure into a [`WorldStateBuilder`].
pub struct FnBuilder<F> {
    func: F,
}

impl<F> FnBuilder<F> {
    /// Wraps `func` as a builder.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<C: ?Sized, F> WorldStateBuilder<C> for FnBuilder<F>
where
    F: Fn(&C) -> WorldState + Send + Sync,
{
    fn build_state(&self, context: &C) -> WorldState {
        (self.func)(context)
    }
}

type SourceFn<C> = dyn Fn(&C, &mut WorldState) + Send + Sync;

/// A named contributor of facts.
pub struct FactSource<C: ?Sized> {
    name: String,
    func: Arc<SourceFn<C>>,
}

impl<C: ?Sized> FactSource<C> {
    /// Returns the source's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Writes this source's facts for `context` into `state`.
    pub fn contribute(&self, context: &C, state: &mut WorldState) {
        (self.func)(context, state)
    }
}

impl<C: ?Sized> Clone for FactSource<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<C: ?Sized> fmt::Debug for FactSource<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactSource")
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered collection of uniquely named fact sources.
///
/// Sources run in registration order; a later source overwrites keys an
/// earlier one set.
pub struct FactSources<C: ?Sized> {
    sources: Vec<FactSource<C>>,
}

impl<C: ?Sized> FactSources<C> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Registers a source. Fails if the name is already taken.
    pub fn add<F>(&mut self, name: impl Into<String>, func: F) -> Result<()>
    where
        F: Fn(&C, &mut WorldState) + Send + Sync + 'static,
    {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(GoapError::FactSourceAlreadyRegistered(name));
        }
        self.sources.push(FactSource {
            name,
            func: Arc::new(func),
        });
        Ok(())
    }

    /// Looks up a source by name.
    pub fn get(&self, name: &str) -> Option<&FactSource<C>> {
        self.sources.iter().find(|s| s.name() == name)
    }

    /// Removes a source by name. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let initial_len = self.sources.len();
        self.sources.retain(|s| s.name() != name);
        self.sources.len() != initial_len
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Iterates the sources in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FactSource<C>> {
        self.sources.iter()
    }
}

impl<C: ?Sized> Default for FactSources<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized> Clone for FactSources<C> {
    fn clone(&self) -> Self {
        Self {
            sources: self.sources.clone(),
        }
    }
}

impl<C: ?Sized> fmt::Debug for FactSources<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.sources.iter()).finish()
    }
}

impl<C: ?Sized> WorldStateBuilder<C> for FactSources<C> {
    fn build_state(&self, context: &C) -> WorldState {
        let mut state = WorldState::new();
        for source in &self.sources {
            source.contribute(context, &mut state);
        }
        state
    }
}
