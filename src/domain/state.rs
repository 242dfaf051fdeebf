//! The dynamic part of a search node: agent and box positions, plus the
//! lineage used for plan extraction.
//!
//! Two states are equal and hash identically iff their agent and box
//! position lists are equal. Parent, producing action and path cost are
//! deliberately excluded so that duplicate detection in graph search
//! collapses states reached along different paths. After every transition
//! the box list is re-sorted, which makes boxes of the same letter
//! interchangeable and collapses permutation-equivalent states.

use crate::domain::{ActionSet, JointAction, Level, Plan, Position};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use smallvec::smallvec;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct State {
    pub level: Rc<Level>,
    /// `(position, character)` per agent; the index in this list is the
    /// agent index used by joint actions, which need not equal the agent's
    /// numeric character.
    pub agent_positions: Vec<(Position, char)>,
    /// `(position, character)` per box, kept sorted (canonical form).
    pub box_positions: Vec<(Position, char)>,
    /// Lineage for plan extraction; not part of state identity.
    pub parent: Option<Rc<State>>,
    /// The joint action that produced this state from its parent.
    pub joint_action: Option<JointAction>,
    pub path_cost: u32,
}

impl State {
    /// A root state with no lineage.
    pub fn new(
        level: Rc<Level>,
        agent_positions: Vec<(Position, char)>,
        box_positions: Vec<(Position, char)>,
    ) -> Self {
        Self {
            level,
            agent_positions,
            box_positions,
            parent: None,
            joint_action: None,
            path_cost: 0,
        }
    }

    /// The index and character of the agent at `position`, if any.
    pub fn agent_at(&self, position: Position) -> Option<(usize, char)> {
        self.agent_positions
            .iter()
            .position(|&(agent_position, _)| agent_position == position)
            .map(|index| (index, self.agent_positions[index].1))
    }

    /// The index and character of the box at `position`, if any.
    pub fn box_at(&self, position: Position) -> Option<(usize, char)> {
        self.box_positions
            .iter()
            .position(|&(box_position, _)| box_position == position)
            .map(|index| (index, self.box_positions[index].1))
    }

    /// The agent or box at `position`, for checks that do not care which
    /// kind of object blocks a cell.
    pub fn object_at(&self, position: Position) -> Option<(usize, char)> {
        self.agent_at(position).or_else(|| self.box_at(position))
    }

    /// Whether `position` is free of walls, agents and boxes.
    pub fn free_at(&self, position: Position) -> bool {
        !self.level.wall_at(position)
            && self.agent_at(position).is_none()
            && self.box_at(position).is_none()
    }

    /// Whether any two individual actions in the joint action interfere:
    /// two objects moving into the same destination, or two agents moving
    /// the same box.
    pub fn is_conflicting(&self, joint_action: &JointAction) -> bool {
        // All previously free cells some object moves into.
        let mut destinations: HashSet<Position> = HashSet::new();
        // The current cells of all boxes moved by the joint action.
        let mut active_boxes: HashSet<Position> = HashSet::new();

        for (agent_index, action) in joint_action.iter().enumerate() {
            let (action_destinations, action_boxes) = action.conflicts(agent_index, self);
            for destination in action_destinations {
                if !destinations.insert(destination) {
                    return true;
                }
            }
            for moved_box in action_boxes {
                if !active_boxes.insert(moved_box) {
                    return true;
                }
            }
        }
        false
    }

    /// Whether every individual action in the joint action is applicable.
    pub fn is_applicable(&self, joint_action: &JointAction) -> bool {
        joint_action
            .iter()
            .enumerate()
            .all(|(agent_index, action)| action.is_applicable(agent_index, self))
    }

    /// The state resulting from applying a joint action to this state. Only
    /// the new state's position lists are touched, never the ancestor's.
    pub fn result(self: &Rc<Self>, joint_action: &JointAction) -> Rc<State> {
        let mut new_state = State {
            level: Rc::clone(&self.level),
            agent_positions: self.agent_positions.clone(),
            box_positions: self.box_positions.clone(),
            parent: Some(Rc::clone(self)),
            joint_action: Some(joint_action.clone()),
            path_cost: self.path_cost + 1,
        };

        for (agent_index, action) in joint_action.iter().enumerate() {
            action.apply(agent_index, &mut new_state);
        }

        // Sorting the box positions makes boxes of the same letter
        // indistinguishable, which significantly shrinks the search space.
        new_state.box_positions.sort();

        Rc::new(new_state)
    }

    /// Applies a whole plan, one joint action at a time.
    pub fn result_of_plan(self: &Rc<Self>, plan: &Plan) -> Rc<State> {
        let mut current = Rc::clone(self);
        for joint_action in plan {
            current = current.result(joint_action);
        }
        current
    }

    /// All applicable joint actions in this state, in a shuffled but
    /// reproducible order determined by the injected rng.
    ///
    /// For a single agent no conflict checking is needed; with several
    /// agents the cartesian product of the individually applicable actions
    /// is filtered through [`State::is_conflicting`].
    pub fn get_applicable_actions(
        &self,
        action_set: &ActionSet,
        rng: &mut StdRng,
    ) -> Vec<JointAction> {
        let num_agents = self.agent_positions.len();

        let applicable: Vec<Vec<_>> = (0..num_agents)
            .map(|agent_index| {
                action_set[agent_index]
                    .iter()
                    .copied()
                    .filter(|action| action.is_applicable(agent_index, self))
                    .collect()
            })
            .collect();

        let mut joint_actions: Vec<JointAction> = if num_agents == 1 {
            applicable[0].iter().map(|&action| smallvec![action]).collect()
        } else {
            applicable
                .iter()
                .multi_cartesian_product()
                .map(|combination| combination.into_iter().copied().collect())
                .filter(|joint_action| !self.is_conflicting(joint_action))
                .collect()
        };

        joint_actions.shuffle(rng);
        joint_actions
    }

    /// A copy of this state with every object of another color removed.
    /// The copy is a fresh root (no lineage).
    pub fn color_filter(&self, color: &str) -> State {
        let matches = |&&(_, char): &&(Position, char)| self.level.color_of(char) == Some(color);
        State::new(
            Rc::clone(&self.level),
            self.agent_positions.iter().filter(matches).copied().collect(),
            self.box_positions.iter().filter(matches).copied().collect(),
        )
    }

    /// The plan that produced this state, reconstructed by walking parent
    /// pointers back to the root.
    pub fn extract_plan(&self) -> Plan {
        let mut plan = Vec::new();
        let mut node = self;
        while let Some(parent) = &node.parent {
            if let Some(joint_action) = &node.joint_action {
                plan.push(joint_action.clone());
            }
            node = parent;
        }
        plan.reverse();
        plan
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.agent_positions == other.agent_positions
            && self.box_positions == other.box_positions
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.agent_positions.hash(hasher);
        self.box_positions.hash(hasher);
    }
}

impl fmt::Display for State {
    /// Renders the level grid with the current object placements, mainly
    /// for diagnostics when execution diverges from a plan.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.level.num_rows() {
            if row > 0 {
                writeln!(f)?;
            }
            for col in 0..self.level.num_cols() {
                let position = Position::new(row as i16, col as i16);
                let char = match self.object_at(position) {
                    Some((_, char)) => char,
                    None if self.level.wall_at(position) => '+',
                    None => ' ',
                };
                write!(f, "{char}")?;
            }
        }
        Ok(())
    }
}
