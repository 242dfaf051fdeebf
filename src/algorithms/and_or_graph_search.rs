//! AND-OR graph search for actuators with bounded non-determinism.
//!
//! The agent chooses an action at OR nodes; the environment chooses one
//! of the action's possible outcomes at AND nodes. A solution is a
//! policy mapping every state the execution might visit to the action to
//! take there, such that the goal is reached no matter which outcomes
//! the environment realises.
//!
//! The search runs on an explicit frame stack rather than the host call
//! stack, so the depth ceiling is a search parameter and not a stack
//! size concern.

use std::collections::HashMap;
use std::hash::Hash;

/// Depth ceiling for a single bounded search.
pub const MAX_DEPTH: usize = 496;

/// Initial depth bound when iterative deepening is enabled; doubled on
/// every retry up to [`MAX_DEPTH`].
const INITIAL_DEPTH: usize = 16;

/// A contingent plan: which action to take in each covered state.
pub type Policy<N, A> = HashMap<N, A>;

enum BoundedOutcome {
    Success(usize),
    Failure { hit_bound: bool },
}

struct Frame<N, A> {
    node: N,
    actions: Vec<A>,
    action_idx: usize,
    /// Outcomes of the action currently being tried; empty means the
    /// next action still has to be expanded.
    outcomes: Vec<N>,
    outcome_idx: usize,
    /// Worst case over the outcomes proven so far for the current action.
    action_worst: usize,
    /// Undo-log length at the start of the current action, for rolling
    /// back provisional policy entries when the action fails.
    checkpoint: usize,
}

impl<N, A> Frame<N, A> {
    fn new(node: N, actions: Vec<A>) -> Self {
        Self {
            node,
            actions,
            action_idx: 0,
            outcomes: Vec::new(),
            outcome_idx: 0,
            action_worst: 0,
            checkpoint: 0,
        }
    }
}

/// Searches for a policy from `initial` to a goal node and returns it
/// together with its worst-case execution length, or `None` when no
/// strong plan exists within the depth ceiling.
///
/// With `iterative_deepening` the depth bound starts small and doubles
/// whenever the bound was the reason for failure, so shallow policies
/// are found without paying for the full ceiling. With `allow_cyclic`
/// an outcome looping back onto the current search path counts as a
/// zero-cost success instead of a failure; the worst-case length then
/// only covers the acyclic executions.
pub fn and_or_graph_search<N, A>(
    initial: N,
    mut applicable: impl FnMut(&N) -> Vec<A>,
    mut goal_test: impl FnMut(&N) -> bool,
    mut results: impl FnMut(&N, &A) -> Vec<N>,
    iterative_deepening: bool,
    allow_cyclic: bool,
) -> Option<(usize, Policy<N, A>)>
where
    N: Clone + Eq + Hash,
    A: Clone,
{
    let mut policy = Policy::new();
    if !iterative_deepening {
        return match bounded_search(
            initial,
            &mut applicable,
            &mut goal_test,
            &mut results,
            allow_cyclic,
            MAX_DEPTH,
            &mut policy,
        ) {
            BoundedOutcome::Success(worst_case) => Some((worst_case, policy)),
            BoundedOutcome::Failure { .. } => None,
        };
    }

    let mut depth_bound = INITIAL_DEPTH;
    loop {
        policy.clear();
        match bounded_search(
            initial.clone(),
            &mut applicable,
            &mut goal_test,
            &mut results,
            allow_cyclic,
            depth_bound,
            &mut policy,
        ) {
            BoundedOutcome::Success(worst_case) => return Some((worst_case, policy)),
            // The bound was never hit, so a deeper search cannot help.
            BoundedOutcome::Failure { hit_bound: false } => return None,
            BoundedOutcome::Failure { hit_bound: true } => {
                if depth_bound >= MAX_DEPTH {
                    return None;
                }
                depth_bound = (depth_bound * 2).min(MAX_DEPTH);
            }
        }
    }
}

fn bounded_search<N, A>(
    initial: N,
    applicable: &mut impl FnMut(&N) -> Vec<A>,
    goal_test: &mut impl FnMut(&N) -> bool,
    results: &mut impl FnMut(&N, &A) -> Vec<N>,
    allow_cyclic: bool,
    depth_bound: usize,
    policy: &mut Policy<N, A>,
) -> BoundedOutcome
where
    N: Clone + Eq + Hash,
    A: Clone,
{
    if goal_test(&initial) {
        return BoundedOutcome::Success(0);
    }

    let mut hit_bound = false;
    // Nodes on the current stack, for cycle detection.
    let mut path: std::collections::HashSet<N> = std::collections::HashSet::new();
    // Policy writes in insertion order, each with the value the key held
    // before, so a failing action can roll its subtree's writes back
    // without clobbering entries committed by earlier subtrees.
    let mut log: Vec<(N, Option<A>)> = Vec::new();
    let mut stack: Vec<Frame<N, A>> = Vec::new();

    path.insert(initial.clone());
    let initial_actions = applicable(&initial);
    stack.push(Frame::new(initial, initial_actions));

    // Result of the child subtree that just finished, if any.
    let mut returned: Option<Option<usize>> = None;

    while let Some(frame) = stack.last_mut() {
        if let Some(child_result) = returned.take() {
            match child_result {
                Some(child_worst) => {
                    frame.action_worst = frame.action_worst.max(child_worst);
                    frame.outcome_idx += 1;
                }
                None => {
                    // The current action fails; undo its policy writes in
                    // reverse order and move on.
                    for (node, previous) in log.drain(frame.checkpoint..).rev() {
                        match previous {
                            Some(action) => policy.insert(node, action),
                            None => policy.remove(&node),
                        };
                    }
                    frame.action_idx += 1;
                    frame.outcomes.clear();
                    frame.outcome_idx = 0;
                    frame.action_worst = 0;
                }
            }
        }

        if frame.outcomes.is_empty() {
            // No action in flight: expand the next one, or fail the node.
            match frame.actions.get(frame.action_idx) {
                None => {
                    path.remove(&frame.node);
                    stack.pop();
                    returned = Some(None);
                }
                Some(action) => {
                    let outcomes = results(&frame.node, action);
                    if outcomes.is_empty() {
                        frame.action_idx += 1;
                        continue;
                    }
                    frame.outcomes = outcomes;
                    frame.outcome_idx = 0;
                    frame.action_worst = 0;
                    frame.checkpoint = log.len();
                }
            }
            continue;
        }

        if frame.outcome_idx == frame.outcomes.len() {
            // Every outcome of the current action has a plan.
            let action = frame.actions[frame.action_idx].clone();
            let worst_case = frame.action_worst + 1;
            let node = frame.node.clone();
            path.remove(&node);
            let previous = policy.insert(node.clone(), action);
            log.push((node, previous));
            stack.pop();
            returned = Some(Some(worst_case));
            continue;
        }

        let child = frame.outcomes[frame.outcome_idx].clone();
        if goal_test(&child) {
            returned = Some(Some(0));
        } else if path.contains(&child) {
            returned = Some(if allow_cyclic { Some(0) } else { None });
        } else if stack.len() >= depth_bound {
            hit_bound = true;
            returned = Some(None);
        } else {
            path.insert(child.clone());
            let child_actions = applicable(&child);
            stack.push(Frame::new(child, child_actions));
        }
    }

    match returned {
        Some(Some(worst_case)) => BoundedOutcome::Success(worst_case),
        _ => BoundedOutcome::Failure { hit_bound },
    }
}
