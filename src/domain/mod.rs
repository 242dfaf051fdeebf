//! The hospital domain model: the static [`Level`], the dynamic [`State`],
//! the [`Action`] repertoire and the [`GoalDescription`] tested against
//! states, plus the [`Heuristic`] seam used by informed frontiers.

mod actions;
mod goal_description;
mod heuristics;
mod level;
mod position;
mod state;

pub use actions::{
    joint_action_to_string, Action, ActionSet, ConflictInfo, JointAction, Plan,
    HOSPITAL_ACTION_LIBRARY, MAPF_ACTION_LIBRARY,
};
pub use goal_description::GoalDescription;
pub use heuristics::{GoalCountHeuristic, Heuristic, HeuristicName, ManhattanHeuristic};
pub use level::{Goal, Level, LevelError};
pub use position::{Direction, Position};
pub use state::State;
