//! FIFO and LIFO frontiers for breadth-first and depth-first search.

use crate::frontiers::{Frontier, Multiset};
use crate::domain::{GoalDescription, State};
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct BfsFrontier {
    queue: VecDeque<Rc<State>>,
    counter: Multiset,
}

impl BfsFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for BfsFrontier {
    fn prepare(&mut self, _goal_description: Rc<GoalDescription>) {
        self.queue.clear();
        self.counter.clear();
    }

    fn add(&mut self, state: Rc<State>) {
        self.counter.insert(Rc::clone(&state));
        self.queue.push_back(state);
    }

    fn pop(&mut self) -> Option<Rc<State>> {
        let state = self.queue.pop_front()?;
        self.counter.remove(&state);
        Some(state)
    }

    fn size(&self) -> usize {
        self.counter.total()
    }

    fn contains(&self, state: &State) -> bool {
        self.counter.contains(state)
    }
}

#[derive(Debug, Default)]
pub struct DfsFrontier {
    stack: Vec<Rc<State>>,
    counter: Multiset,
}

impl DfsFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for DfsFrontier {
    fn prepare(&mut self, _goal_description: Rc<GoalDescription>) {
        self.stack.clear();
        self.counter.clear();
    }

    fn add(&mut self, state: Rc<State>) {
        self.counter.insert(Rc::clone(&state));
        self.stack.push(state);
    }

    fn pop(&mut self) -> Option<Rc<State>> {
        let state = self.stack.pop()?;
        self.counter.remove(&state);
        Some(state)
    }

    fn size(&self) -> usize {
        self.counter.total()
    }

    fn contains(&self, state: &State) -> bool {
        self.counter.contains(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn bfs_is_first_in_first_out() {
        let level = rc_level(EMPTY_CORRIDOR);
        let first = level.initial_state();
        let second = state_with_agent_at(&level, 1, 2);
        let third = state_with_agent_at(&level, 1, 3);

        let mut frontier = BfsFrontier::new();
        frontier.prepare(level.goal_description());
        frontier.add(Rc::clone(&first));
        frontier.add(Rc::clone(&second));
        frontier.add(Rc::clone(&third));

        assert_eq!(frontier.size(), 3);
        assert!(frontier.contains(&second));
        assert_eq!(frontier.pop().unwrap(), first);
        assert_eq!(frontier.pop().unwrap(), second);
        assert_eq!(frontier.pop().unwrap(), third);
        assert!(frontier.is_empty());
    }

    #[test]
    fn dfs_is_last_in_first_out() {
        let level = rc_level(EMPTY_CORRIDOR);
        let first = level.initial_state();
        let second = state_with_agent_at(&level, 1, 2);

        let mut frontier = DfsFrontier::new();
        frontier.prepare(level.goal_description());
        frontier.add(Rc::clone(&first));
        frontier.add(Rc::clone(&second));

        assert_eq!(frontier.pop().unwrap(), second);
        assert_eq!(frontier.pop().unwrap(), first);
    }

    #[test]
    fn duplicate_states_are_counted() {
        let level = rc_level(EMPTY_CORRIDOR);
        let state = level.initial_state();

        let mut frontier = BfsFrontier::new();
        frontier.prepare(level.goal_description());
        frontier.add(Rc::clone(&state));
        frontier.add(Rc::clone(&state));

        assert_eq!(frontier.size(), 2);
        frontier.pop().unwrap();
        assert!(frontier.contains(&state));
        frontier.pop().unwrap();
        assert!(!frontier.contains(&state));
    }

    #[test]
    fn prepare_resets_leftover_state() {
        let level = rc_level(EMPTY_CORRIDOR);
        let state = level.initial_state();

        let mut frontier = BfsFrontier::new();
        frontier.prepare(level.goal_description());
        frontier.add(Rc::clone(&state));
        frontier.prepare(level.goal_description());
        assert!(frontier.is_empty());
        assert!(!frontier.contains(&state));
    }
}
