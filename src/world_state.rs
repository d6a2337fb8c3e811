//! # World State for Goal-Oriented Action Planning (GOAP)
//!
//! A [`WorldState`] is a snapshot of the planning-relevant facts about one
//! agent and its surroundings. It plays several roles:
//!
//! - **Live state**: built fresh by a [`WorldStateBuilder`](crate::WorldStateBuilder)
//!   every update cycle and mutated by [`Action::execute`](crate::Action::execute)
//! - **Search state**: copied and extended at every node expansion in the planner
//! - **Goal state**: the partial set of facts a [`Goal`](crate::Goal) wants to hold
//! - **Effects / preconditions**: partial states describing what an action
//!   changes or requires
//!
//! ## Basic Usage
//!
//! ```
//! use goap_engine::WorldState;
//!
//! let mut state = WorldState::new();
//! state.set("villagers_nearby", true);
//! state.set("happiness", 55.0);
//! state.set("time_of_day", "MORNING");
//!
//! let mut desired = WorldState::new();
//! desired.set("has_socialized", true);
//! assert!(!state.satisfies_goal(&desired));
//!
//! // Missing or mistyped keys fall back to per-type defaults
//! assert_eq!(state.get_bool("has_socialized"), false);
//! assert_eq!(state.get_int("happiness"), 0);
//! assert_eq!(state.get_float("happiness"), 55.0);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::Value;

/// Typed key/value fact store.
///
/// Keys are kept ordered, so iteration, [`Display`](fmt::Display) and
/// [`state_key`](WorldState::state_key) are independent of insertion order.
/// A key that was never set is distinct from a key holding a falsy value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldState {
    facts: BTreeMap<String, Value>,
}

impl WorldState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self {
            facts: BTreeMap::new(),
        }
    }

    /// Sets `key` to `value`, overwriting any previous value of any type.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.facts.insert(key.into(), value.into());
    }

    /// Builder-style [`set`](WorldState::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a boolean fact.
    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.set(key, Value::Bool(value));
    }

    /// Sets an integer fact.
    pub fn set_int(&mut self, key: impl Into<String>, value: i64) {
        self.set(key, Value::Int(value));
    }

    /// Sets a float fact.
    pub fn set_float(&mut self, key: impl Into<String>, value: f64) {
        self.set(key, Value::Float(value));
    }

    /// Sets a string fact.
    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key, Value::Str(value.into()));
    }

    /// Raw access to the stored value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.facts.get(key)
    }

    /// Returns the boolean stored at `key`, or `false` when the key is
    /// missing or holds another type.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Returns the integer stored at `key`, or `0`.
    pub fn get_int(&self, key: &str) -> i64 {
        self.get(key).and_then(Value::as_int).unwrap_or(0)
    }

    /// Returns the float stored at `key`, or `0.0`.
    pub fn get_float(&self, key: &str) -> f64 {
        self.get(key).and_then(Value::as_float).unwrap_or(0.0)
    }

    /// Returns the string stored at `key`, or `""`.
    pub fn get_str(&self, key: &str) -> &str {
        self.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// Whether `key` is present, whatever its value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.facts.contains_key(key)
    }

    /// Removes a fact, returning its old value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.facts.remove(key)
    }

    /// Fact names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.facts.keys().map(String::as_str)
    }

    /// Facts in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.facts.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Checks whether every fact in `required` holds here with an equal value.
    ///
    /// An empty `required` state is trivially satisfied; use this for
    /// preconditions. Goals go through [`satisfies_goal`](WorldState::satisfies_goal).
    pub fn satisfies(&self, required: &WorldState) -> bool {
        required
            .facts
            .iter()
            .all(|(key, value)| self.facts.get(key) == Some(value))
    }

    /// Goal satisfaction: like [`satisfies`](WorldState::satisfies), except an
    /// empty desired state is never satisfied.
    pub fn satisfies_goal(&self, desired: &WorldState) -> bool {
        !desired.is_empty() && self.satisfies(desired)
    }

    /// Number of desired facts that are missing here or hold a different value.
    pub fn unsatisfied_count(&self, desired: &WorldState) -> usize {
        desired
            .facts
            .iter()
            .filter(|(key, value)| self.facts.get(*key) != Some(*value))
            .count()
    }

    /// Whether any key of `other` is also present here.
    pub fn touches_any(&self, other: &WorldState) -> bool {
        other.keys().any(|key| self.contains_key(key))
    }

    /// Merges `effects` into this state, overwriting existing keys.
    pub fn merge(&mut self, effects: &WorldState) {
        for (key, value) in &effects.facts {
            self.facts.insert(key.clone(), value.clone());
        }
    }

    /// Returns an independent copy with `effects` merged in.
    pub fn applied(&self, effects: &WorldState) -> Self {
        let mut next = self.clone();
        next.merge(effects);
        next
    }

    /// Facts of `other` that are absent here or differ from this state.
    pub fn diff(&self, other: &WorldState) -> Self {
        let facts = other
            .facts
            .iter()
            .filter(|(key, value)| self.facts.get(*key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self { facts }
    }

    /// Canonical encoding of the full key/value set.
    ///
    /// Two states produce the same key exactly when they hold the same typed
    /// facts, whatever order they were inserted in. Keys are quoted and values
    /// carry a type tag, so `;` or `=` inside strings cannot cause collisions.
    pub fn state_key(&self) -> String {
        let mut key = String::new();
        for (name, value) in &self.facts {
            key.push_str(&format!("{:?}={};", name, value.encode()));
        }
        key
    }
}

impl PartialEq for WorldState {
    fn eq(&self, other: &Self) -> bool {
        self.facts == other.facts
    }
}

impl Hash for WorldState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.state_key().hash(state);
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for WorldState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let facts = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { facts }
    }
}

impl fmt::Display for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (key, value) in &self.facts {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
            first = false;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_defaults_for_missing_and_mistyped_keys() {
        let mut state = WorldState::new();
        state.set("age", 120);
        state.set("mood", "calm");

        assert!(!state.get_bool("missing"));
        assert_eq!(state.get_int("missing"), 0);
        assert_eq!(state.get_float("missing"), 0.0);
        assert_eq!(state.get_str("missing"), "");

        assert_eq!(state.get_int("age"), 120);
        assert_eq!(state.get_float("age"), 0.0);
        assert!(!state.get_bool("mood"));
        assert_eq!(state.get_str("mood"), "calm");
    }

    #[test]
    fn test_equal_states_share_a_key() {
        let positive = WorldState::new().with("mood", 0.0);
        let negative = WorldState::new().with("mood", -0.0);
        assert_eq!(positive, negative);
        assert_eq!(positive.state_key(), negative.state_key());
    }

    #[test]
    fn test_absent_is_distinct_from_false() {
        let mut state = WorldState::new();
        state.set_bool("has_spouse", false);

        let desired = WorldState::new().with("has_spouse", false);
        assert!(state.satisfies_goal(&desired));
        assert!(!WorldState::new().satisfies_goal(&desired));
    }

    #[test]
    fn test_overwrite_changes_type() {
        let mut state = WorldState::new();
        state.set("x", 1);
        state.set("x", "one");
        assert_eq!(state.get("x"), Some(&Value::from("one")));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_satisfies_goal_requires_exact_typed_values() {
        let state = WorldState::new()
            .with("has_worked", true)
            .with("age", 3)
            .with("happiness", 70.0);

        assert!(state.satisfies_goal(&WorldState::new().with("has_worked", true)));
        assert!(state.satisfies_goal(&WorldState::new().with("age", 3).with("has_worked", true)));
        assert!(!state.satisfies_goal(&WorldState::new().with("age", 3.0)));
        assert!(!state.satisfies_goal(&WorldState::new().with("has_worked", false)));
        assert!(!state.satisfies_goal(&WorldState::new().with("has_spouse", true)));
    }

    #[test]
    fn test_empty_goal_is_never_satisfied() {
        let state = WorldState::new().with("anything", true);
        assert!(!state.satisfies_goal(&WorldState::new()));
        assert!(!WorldState::new().satisfies_goal(&WorldState::new()));
        // Preconditions keep the permissive rule
        assert!(state.satisfies(&WorldState::new()));
    }

    #[test]
    fn test_state_key_is_order_independent() {
        let mut a = WorldState::new();
        a.set("b", 2);
        a.set("a", true);
        a.set("c", "x");

        let mut b = WorldState::new();
        b.set("c", "x");
        b.set("a", true);
        b.set("b", 2);

        assert_eq!(a.state_key(), b.state_key());
        assert_eq!(a, b);
    }

    #[test]
    fn test_state_key_differs_when_contents_differ() {
        let base = WorldState::new().with("n", 1);
        assert_ne!(base.state_key(), WorldState::new().with("n", 1.0).state_key());
        assert_ne!(base.state_key(), WorldState::new().with("n", "1").state_key());
        assert_ne!(base.state_key(), WorldState::new().with("n", 2).state_key());
        assert_ne!(base.state_key(), base.clone().with("m", 1).state_key());
        assert_ne!(base.state_key(), WorldState::new().state_key());
    }

    #[test]
    fn test_state_key_resists_separator_injection() {
        let a = WorldState::new().with("a", "x;\"b\"=s:\"y\"");
        let b = WorldState::new().with("a", "x").with("b", "y");
        assert_ne!(a.state_key(), b.state_key());

        let c = WorldState::new().with("k=s:\"v\";", "w");
        let d = WorldState::new().with("k", "v").with("", "w");
        assert_ne!(c.state_key(), d.state_key());
    }

    #[test]
    fn test_copy_is_independent() {
        let original = WorldState::new().with("happiness", 40.0);
        let mut copy = original.clone();
        copy.set("happiness", 90.0);
        copy.set("is_happy", true);

        assert_eq!(original.get_float("happiness"), 40.0);
        assert!(!original.contains_key("is_happy"));
    }

    #[test]
    fn test_merge_and_applied() {
        let base = WorldState::new().with("x", false).with("y", false);
        let effects = WorldState::new().with("x", true).with("z", 3);

        let next = base.applied(&effects);
        assert!(next.get_bool("x"));
        assert!(!next.get_bool("y"));
        assert_eq!(next.get_int("z"), 3);
        assert!(!base.get_bool("x"));
    }

    #[test]
    fn test_unsatisfied_count() {
        let state = WorldState::new().with("a", true).with("b", 1);
        let desired = WorldState::new()
            .with("a", true)
            .with("b", 2)
            .with("c", true);
        assert_eq!(state.unsatisfied_count(&desired), 2);
        assert_eq!(state.unsatisfied_count(&WorldState::new()), 0);
    }

    #[test]
    fn test_diff() {
        let state1 = WorldState::new().with("key1", "value1").with("key2", "value2");
        let state2 = WorldState::new()
            .with("key1", "value1")
            .with("key2", "updated")
            .with("key3", "value3");

        let diff = state1.diff(&state2);
        assert_eq!(diff.len(), 2);
        assert!(diff.get("key1").is_none());
        assert_eq!(diff.get_str("key2"), "updated");
        assert_eq!(diff.get_str("key3"), "value3");
    }

    #[test]
    fn test_touches_any() {
        let effects = WorldState::new().with("has_socialized", true);
        assert!(effects.touches_any(&WorldState::new().with("has_socialized", true)));
        assert!(!effects.touches_any(&WorldState::new().with("has_worked", true)));
    }

    #[test]
    fn test_display_is_sorted() {
        let state = WorldState::new().with("b", 1).with("a", "x");
        assert_eq!(state.to_string(), "{a: \"x\", b: 1}");
    }
}
