//! A goal description is a conjunction of positional literals
//! `(position, letter, is_positive)`. A positive literal is satisfied when
//! an object with the matching letter sits at the position, a negative one
//! when no such object does. Agent and box literals are additionally kept in
//! kind-specific sublists for quick lookup.

use crate::domain::{Goal, Level, State};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct GoalDescription {
    pub level: Rc<Level>,
    pub goals: Vec<Goal>,
    pub agent_goals: Vec<Goal>,
    pub box_goals: Vec<Goal>,
}

impl GoalDescription {
    pub fn new(level: Rc<Level>, goals: Vec<Goal>) -> Self {
        let agent_goals = goals
            .iter()
            .filter(|goal| goal.letter.is_ascii_digit())
            .copied()
            .collect();
        let box_goals = goals
            .iter()
            .filter(|goal| goal.letter.is_ascii_alphabetic())
            .copied()
            .collect();
        Self { level, goals, agent_goals, box_goals }
    }

    /// Whether the state satisfies every literal of the description.
    pub fn is_goal(&self, state: &State) -> bool {
        self.goals.iter().all(|goal| {
            let occupant = state.object_at(goal.position).map(|(_, char)| char);
            if goal.is_positive {
                occupant == Some(goal.letter)
            } else {
                occupant != Some(goal.letter)
            }
        })
    }

    /// A copy containing only the literals whose object has the given color.
    pub fn color_filter(&self, color: &str) -> GoalDescription {
        let goals = self
            .goals
            .iter()
            .filter(|goal| self.level.color_of(goal.letter) == Some(color))
            .copied()
            .collect();
        GoalDescription::new(Rc::clone(&self.level), goals)
    }

    /// The number of singleton sub-goals, for use with
    /// [`GoalDescription::sub_goal`].
    pub fn num_sub_goals(&self) -> usize {
        self.goals.len()
    }

    /// A description containing exactly one of the literals. Box goals come
    /// before agent goals.
    pub fn sub_goal(&self, goal_index: usize) -> GoalDescription {
        let num_box_goals = self.box_goals.len();
        let goal = if goal_index < num_box_goals {
            self.box_goals[goal_index]
        } else {
            self.agent_goals[goal_index - num_box_goals]
        };
        GoalDescription::new(Rc::clone(&self.level), vec![goal])
    }

    /// A new description over the same level, useful for domain-agnostic
    /// callers assembling their own literal sets.
    pub fn with_goals(&self, goals: Vec<Goal>) -> GoalDescription {
        GoalDescription::new(Rc::clone(&self.level), goals)
    }
}

impl PartialEq for GoalDescription {
    fn eq(&self, other: &Self) -> bool {
        self.goals == other.goals
    }
}

impl Eq for GoalDescription {}

impl Hash for GoalDescription {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.goals.hash(hasher);
    }
}

impl fmt::Display for GoalDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for goal in self.box_goals.iter().chain(&self.agent_goals) {
            if !first {
                write!(f, " and ")?;
            }
            first = false;
            let polarity = if goal.is_positive { "" } else { "not " };
            write!(f, "{}{} at {}", polarity, goal.letter, goal.position)?;
        }
        Ok(())
    }
}
