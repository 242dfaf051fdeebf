//! The actions a single agent can perform in the hospital domain, and the
//! joint actions built from them.
//!
//! An action exposes three operations, all parameterized by the index of the
//! acting agent in the state's agent list (which is often, but not always,
//! the numeric value of the agent character):
//!
//! 1. `is_applicable` decides whether the action is individually valid for
//!    the agent, ignoring every other agent.
//! 2. `apply` incorporates the action's changes into a successor state. Both
//!    `is_applicable` and the joint-action conflict check always run first,
//!    so `apply` performs no re-validation.
//! 3. `conflicts` reports the cells this action newly occupies and the
//!    current cells of boxes it displaces, which the joint-action check uses
//!    to enforce two invariants: no two objects share a destination, and no
//!    two agents move the same box concurrently.

use crate::domain::{Position, State};
use smallvec::SmallVec;
use std::fmt;

use super::Direction;

/// One action per agent, applied simultaneously. The position in the tuple
/// is the agent's index in the state, not its character.
pub type JointAction = SmallVec<[Action; 4]>;

/// A sequence of joint actions leading from the initial state to a goal.
pub type Plan = Vec<JointAction>;

/// The actions available to each agent index.
pub type ActionSet = Vec<Vec<Action>>;

/// Cells touched by a single action: the newly occupied destinations and the
/// pre-move positions of displaced boxes.
pub type ConflictInfo = (SmallVec<[Position; 2]>, SmallVec<[Position; 2]>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    NoOp,
    /// The agent moves one cell in the given direction.
    Move(Direction),
    /// The agent moves onto the cell of an adjacent box of its own color,
    /// pushing the box one cell further in the second direction.
    Push(Direction, Direction),
    /// The agent moves one cell in the first direction, dragging along a box
    /// of its own color that trailed it in the second direction.
    Pull(Direction, Direction),
}

impl Action {
    /// Whether this action is valid for the given agent in `state`,
    /// independently of any other agent's action.
    pub fn is_applicable(&self, agent_index: usize, state: &State) -> bool {
        let (agent_position, agent_char) = state.agent_positions[agent_index];
        match self {
            // NoOp can never change the state if we only have a single agent.
            Action::NoOp => state.agent_positions.len() > 1,
            Action::Move(agent_dir) => state.free_at(agent_position + agent_dir.delta()),
            Action::Push(agent_dir, box_dir) => {
                let new_agent_position = agent_position + agent_dir.delta();
                let new_box_position = new_agent_position + box_dir.delta();
                match state.box_at(new_agent_position) {
                    Some((_, box_char)) => {
                        state.level.same_color(agent_char, box_char)
                            && state.free_at(new_box_position)
                    }
                    None => false,
                }
            }
            Action::Pull(agent_dir, box_dir) => {
                let box_position = agent_position - box_dir.delta();
                let new_agent_position = agent_position + agent_dir.delta();
                match state.box_at(box_position) {
                    Some((_, box_char)) => {
                        state.level.same_color(agent_char, box_char)
                            && state.free_at(new_agent_position)
                    }
                    None => false,
                }
            }
        }
    }

    /// Incorporates this action's changes into `state`, which must be the
    /// successor under construction, never an ancestor. Assumes the action
    /// was already validated.
    pub fn apply(&self, agent_index: usize, state: &mut State) {
        let (agent_position, agent_char) = state.agent_positions[agent_index];
        match self {
            Action::NoOp => {}
            Action::Move(agent_dir) => {
                state.agent_positions[agent_index] =
                    (agent_position + agent_dir.delta(), agent_char);
            }
            Action::Push(agent_dir, box_dir) => {
                let new_agent_position = agent_position + agent_dir.delta();
                let new_box_position = new_agent_position + box_dir.delta();
                let (box_index, box_char) = state
                    .box_at(new_agent_position)
                    .expect("push validated against a box ahead of the agent");
                state.agent_positions[agent_index] = (new_agent_position, agent_char);
                state.box_positions[box_index] = (new_box_position, box_char);
            }
            Action::Pull(agent_dir, box_dir) => {
                let box_position = agent_position - box_dir.delta();
                let new_agent_position = agent_position + agent_dir.delta();
                let (box_index, box_char) = state
                    .box_at(box_position)
                    .expect("pull validated against a box behind the agent");
                state.agent_positions[agent_index] = (new_agent_position, agent_char);
                state.box_positions[box_index] = (agent_position, box_char);
            }
        }
    }

    /// The cells this single action newly occupies and the boxes it moves,
    /// used by [`State::is_conflicting`] to reject interfering joint actions.
    pub fn conflicts(&self, agent_index: usize, state: &State) -> ConflictInfo {
        let (agent_position, _) = state.agent_positions[agent_index];
        let mut destinations = SmallVec::new();
        let mut moved_boxes = SmallVec::new();
        match self {
            Action::NoOp => {
                // The agent keeps occupying its cell, so nobody else may
                // move into it.
                destinations.push(agent_position);
            }
            Action::Move(agent_dir) => {
                destinations.push(agent_position + agent_dir.delta());
            }
            Action::Push(agent_dir, box_dir) => {
                let old_box_position = agent_position + agent_dir.delta();
                // The agent steps into the box's old cell, which is occupied
                // both before and after the action, so only the box's new
                // cell is a destination.
                destinations.push(old_box_position + box_dir.delta());
                moved_boxes.push(old_box_position);
            }
            Action::Pull(agent_dir, box_dir) => {
                destinations.push(agent_position + agent_dir.delta());
                moved_boxes.push(agent_position - box_dir.delta());
            }
        }
        (destinations, moved_boxes)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::NoOp => write!(f, "NoOp"),
            Action::Move(agent_dir) => write!(f, "Move({agent_dir})"),
            Action::Push(agent_dir, box_dir) => write!(f, "Push({agent_dir},{box_dir})"),
            Action::Pull(agent_dir, box_dir) => write!(f, "Pull({agent_dir},{box_dir})"),
        }
    }
}

/// Formats a joint action as the server expects it: `Name1|Name2|...`.
pub fn joint_action_to_string(joint_action: &JointAction) -> String {
    joint_action
        .iter()
        .map(Action::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

use Direction::{East as E, North as N, South as S, West as W};

/// Action library for multi-agent pathfinding levels: no box actions.
pub const MAPF_ACTION_LIBRARY: [Action; 5] = [
    Action::NoOp,
    Action::Move(N),
    Action::Move(S),
    Action::Move(E),
    Action::Move(W),
];

/// The full action library for the hospital domain. Push/Pull combinations
/// where the box would swap cells with the agent are not listed because they
/// are never applicable.
pub const HOSPITAL_ACTION_LIBRARY: [Action; 29] = [
    Action::NoOp,
    Action::Move(N),
    Action::Move(S),
    Action::Move(E),
    Action::Move(W),
    Action::Push(N, N),
    Action::Push(N, E),
    Action::Push(N, W),
    Action::Push(S, S),
    Action::Push(S, E),
    Action::Push(S, W),
    Action::Push(E, N),
    Action::Push(E, S),
    Action::Push(E, E),
    Action::Push(W, N),
    Action::Push(W, S),
    Action::Push(W, W),
    Action::Pull(N, N),
    Action::Pull(N, E),
    Action::Pull(N, W),
    Action::Pull(S, S),
    Action::Pull(S, E),
    Action::Pull(S, W),
    Action::Pull(E, N),
    Action::Pull(E, S),
    Action::Pull(E, E),
    Action::Pull(W, N),
    Action::Pull(W, S),
    Action::Pull(W, W),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use smallvec::smallvec;

    #[test]
    fn action_names_match_protocol() {
        assert_eq!(Action::NoOp.to_string(), "NoOp");
        assert_eq!(Action::Move(E).to_string(), "Move(E)");
        assert_eq!(Action::Push(N, W).to_string(), "Push(N,W)");
        assert_eq!(Action::Pull(S, S).to_string(), "Pull(S,S)");
    }

    #[test]
    fn joint_action_wire_format() {
        let joint: JointAction = smallvec![Action::Move(E), Action::NoOp];
        assert_eq!(joint_action_to_string(&joint), "Move(E)|NoOp");
    }

    #[test]
    fn move_applicability() {
        // Agent 0 sits at (1,1) in a 3x5 open box.
        let state = initial_state(EMPTY_CORRIDOR);
        assert!(Action::Move(E).is_applicable(0, &state));
        assert!(!Action::Move(N).is_applicable(0, &state));
        assert!(!Action::Move(W).is_applicable(0, &state));
    }

    #[test]
    fn noop_is_inapplicable_for_a_single_agent() {
        let state = initial_state(EMPTY_CORRIDOR);
        assert!(!Action::NoOp.is_applicable(0, &state));
        let two_agents = initial_state(TWO_AGENT_HEAD_ON);
        assert!(Action::NoOp.is_applicable(0, &two_agents));
    }

    #[test]
    fn push_requires_matching_color_and_free_cell() {
        // Agent 0 at (1,2), red box A at (1,3), free cells at (1,1) and (1,4).
        let state = initial_state(BOX_CORRIDOR);
        assert!(Action::Push(E, E).is_applicable(0, &state));
        // Pushing the box into the wall is not possible.
        assert!(!Action::Push(E, N).is_applicable(0, &state));
        // No box to the west of the agent.
        assert!(!Action::Push(W, W).is_applicable(0, &state));
    }

    #[test]
    fn pull_requires_box_behind_and_free_cell_ahead() {
        let state = initial_state(BOX_CORRIDOR);
        // Box is east of the agent, so pulling west drags it along.
        assert!(Action::Pull(W, W).is_applicable(0, &state));
        assert!(!Action::Pull(E, E).is_applicable(0, &state));
    }

    #[test]
    fn push_conflict_cells() {
        let state = initial_state(BOX_CORRIDOR);
        let (destinations, moved) = Action::Push(E, E).conflicts(0, &state);
        // The box's new cell is the only destination; its old cell is the
        // moved-box entry.
        assert_eq!(destinations.as_slice(), &[pos(1, 4)]);
        assert_eq!(moved.as_slice(), &[pos(1, 3)]);
    }
}
