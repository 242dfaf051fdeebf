//! Deterministic graph search over joint actions, parameterised by the
//! frontier strategy.

use crate::algorithms::{SearchMonitor, SearchResult};
use crate::domain::{ActionSet, GoalDescription, State};
use crate::frontiers::Frontier;
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::rc::Rc;

/// Searches from `initial_state` for any state satisfying
/// `goal_description`, expanding states in the order dictated by
/// `frontier`. Duplicate states are detected by position-list identity,
/// so each state is expanded at most once.
pub fn graph_search(
    initial_state: Rc<State>,
    action_set: &ActionSet,
    goal_description: Rc<GoalDescription>,
    frontier: &mut dyn Frontier,
    rng: &mut StdRng,
    monitor: &mut SearchMonitor,
) -> SearchResult {
    frontier.prepare(Rc::clone(&goal_description));
    frontier.add(Rc::clone(&initial_state));
    let mut expanded: HashSet<Rc<State>> = HashSet::new();

    loop {
        if monitor.memory_exceeded() {
            monitor.finalise();
            return SearchResult::MemoryLimitExceeded;
        }

        let state = match frontier.pop() {
            Some(state) => state,
            None => {
                monitor.finalise();
                return SearchResult::Exhausted;
            }
        };

        if goal_description.is_goal(&state) {
            monitor.finalise();
            return SearchResult::Success(state.extract_plan());
        }

        expanded.insert(Rc::clone(&state));
        monitor.count_expanded(frontier.size());

        for joint_action in state.get_applicable_actions(action_set, rng) {
            let child = state.result(&joint_action);
            if !expanded.contains(&child) && !frontier.contains(&child) {
                monitor.count_generated(1);
                frontier.add(child);
            }
        }
    }
}
