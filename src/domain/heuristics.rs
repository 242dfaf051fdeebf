//! Cost-to-go estimators consumed by the informed frontiers.

use crate::domain::{GoalDescription, Level, State};
use std::fmt::Debug;

/// A heuristic estimates the remaining cost from a state to a goal.
/// `preprocess` runs once before a search and may build lookup tables; `h`
/// must return a non-negative lower bound for A* to stay optimal.
pub trait Heuristic: Debug {
    fn preprocess(&mut self, _level: &Level) {}

    fn h(&self, state: &State, goal_description: &GoalDescription) -> u32;
}

/// Counts the unsatisfied goal literals.
///
/// Not strictly admissible under joint actions (one joint action can satisfy
/// several literals at once), but a useful greedy signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalCountHeuristic;

impl GoalCountHeuristic {
    pub fn new() -> Self {
        Self
    }
}

impl Heuristic for GoalCountHeuristic {
    fn h(&self, state: &State, goal_description: &GoalDescription) -> u32 {
        goal_description
            .goals
            .iter()
            .filter(|goal| {
                let occupant = state.object_at(goal.position).map(|(_, char)| char);
                let satisfied = if goal.is_positive {
                    occupant == Some(goal.letter)
                } else {
                    occupant != Some(goal.letter)
                };
                !satisfied
            })
            .count() as u32
    }
}

/// For each positive literal, the Manhattan distance from the nearest
/// matching object; the maximum over literals is the estimate.
///
/// Taking the maximum keeps the bound admissible for joint actions, where
/// every agent may close in on its own goal in the same step.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManhattanHeuristic;

impl ManhattanHeuristic {
    pub fn new() -> Self {
        Self
    }
}

impl Heuristic for ManhattanHeuristic {
    fn h(&self, state: &State, goal_description: &GoalDescription) -> u32 {
        goal_description
            .goals
            .iter()
            .filter(|goal| goal.is_positive)
            .map(|goal| {
                let objects = if goal.letter.is_ascii_digit() {
                    &state.agent_positions
                } else {
                    &state.box_positions
                };
                objects
                    .iter()
                    .filter(|&&(_, char)| char == goal.letter)
                    .map(|(position, _)| position.manhattan_distance(&goal.position))
                    .min()
                    .unwrap_or(0)
            })
            .max()
            .unwrap_or(0)
    }
}

/// The heuristics selectable on the command line.
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[clap(rename_all = "kebab-case")]
pub enum HeuristicName {
    #[clap(help = "Count the unsatisfied goal literals.")]
    GoalCount,
    #[clap(help = "Maximum Manhattan distance from a matching object to its goal.")]
    Manhattan,
}

impl HeuristicName {
    pub fn create(&self) -> Box<dyn Heuristic> {
        match self {
            HeuristicName::GoalCount => Box::new(GoalCountHeuristic::new()),
            HeuristicName::Manhattan => Box::new(ManhattanHeuristic::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn goal_count_counts_unsatisfied_literals() {
        let level = rc_level(BOX_CORRIDOR);
        let state = level.initial_state();
        let description = level.goal_description();
        // The single box goal at (1,4) is unsatisfied initially.
        assert_eq!(GoalCountHeuristic::new().h(&state, &description), 1);
    }

    #[test]
    fn goal_count_is_zero_at_the_goal() {
        let level = rc_level(EMPTY_CORRIDOR);
        let state = level.initial_state();
        let reached = level
            .goal_description()
            .with_goals(vec![crate::domain::Goal {
                position: pos(1, 1),
                letter: '0',
                is_positive: true,
            }]);
        assert_eq!(GoalCountHeuristic::new().h(&state, &reached), 0);
    }

    #[test]
    fn manhattan_measures_the_farthest_goal() {
        let level = rc_level(BOX_CORRIDOR);
        let state = level.initial_state();
        let description = level.goal_description();
        // Box A at (1,3), goal at (1,4).
        assert_eq!(ManhattanHeuristic::new().h(&state, &description), 1);
    }
}
