//! The exploration-order abstraction shared by all search algorithms.

use crate::domain::{GoalDescription, State};
use std::collections::HashMap;
use std::fmt::Debug;
use std::rc::Rc;

/// The open set of not-yet-expanded states, with a strategy-specific
/// ordering and O(1) membership testing.
///
/// A frontier may be reused across sequential searches, but must be
/// [`Frontier::prepare`]-reset first so no state leaks between searches.
pub trait Frontier: Debug {
    /// Resets internal state for a new search towards the given goal.
    fn prepare(&mut self, goal_description: Rc<GoalDescription>);

    /// Queues a state according to the strategy's ordering.
    fn add(&mut self, state: Rc<State>);

    /// Removes and returns the next state to explore, or `None` when the
    /// frontier is exhausted.
    fn pop(&mut self) -> Option<Rc<State>>;

    /// The number of queued states, counting logical duplicates.
    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Whether the state is currently queued, by positional identity.
    fn contains(&self, state: &State) -> bool;
}

/// Multiset of queued states. Membership stays correct when the same
/// logical state is queued more than once, e.g. via different parents
/// before it is first popped.
#[derive(Debug, Default)]
pub(crate) struct Multiset {
    counts: HashMap<Rc<State>, usize>,
    total: usize,
}

impl Multiset {
    pub(crate) fn insert(&mut self, state: Rc<State>) {
        *self.counts.entry(state).or_insert(0) += 1;
        self.total += 1;
    }

    pub(crate) fn remove(&mut self, state: &State) {
        if let Some(count) = self.counts.get_mut(state) {
            *count -= 1;
            self.total -= 1;
            if *count == 0 {
                self.counts.remove(state);
            }
        }
    }

    pub(crate) fn contains(&self, state: &State) -> bool {
        self.counts.contains_key(state)
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn clear(&mut self) {
        self.counts.clear();
        self.total = 0;
    }
}
