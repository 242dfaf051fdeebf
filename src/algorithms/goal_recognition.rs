//! Online goal recognition over a solution graph: each observed actor
//! action walks one optimal edge and narrows the set of goals the actor
//! can still be optimally pursuing.

use crate::algorithms::{NodeId, SolutionGraph};
use crate::domain::{Action, GoalDescription};
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RecognitionError {
    /// The actor performed an action lying on no optimal plan, so the
    /// solution graph cannot explain its behaviour.
    #[error("observed action {0} lies on no optimal plan")]
    OffOptimalAction(String),
}

/// Tracks the actor's position in the solution graph as its actions are
/// observed.
#[derive(Debug)]
pub struct GoalRecogniser {
    graph: SolutionGraph,
    current: NodeId,
}

impl GoalRecogniser {
    pub fn new(graph: SolutionGraph) -> Self {
        let current = graph.root();
        Self { graph, current }
    }

    pub fn graph(&self) -> &SolutionGraph {
        &self.graph
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Advances along the optimal edge labelled with the observed actor
    /// action.
    pub fn observe(&mut self, action: &Action) -> Result<(), RecognitionError> {
        match self.graph.successor(self.current, action) {
            Some(next) => {
                self.current = next;
                debug!(
                    observed = %action,
                    remaining_goals = self.graph.node(self.current).consistent_goals().len(),
                );
                Ok(())
            }
            None => Err(RecognitionError::OffOptimalAction(action.to_string())),
        }
    }

    /// The candidate goals the observed actions are still optimally
    /// consistent with.
    pub fn consistent_goals(&self) -> Vec<Rc<GoalDescription>> {
        self.graph
            .node(self.current)
            .consistent_goals()
            .iter()
            .map(|&index| Rc::clone(&self.graph.possible_goals()[index]))
            .collect()
    }

    /// The actor's goal, once only one candidate remains.
    pub fn sole_goal(&self) -> Option<Rc<GoalDescription>> {
        match self.graph.node(self.current).consistent_goals() {
            [index] => Some(Rc::clone(&self.graph.possible_goals()[*index])),
            _ => None,
        }
    }
}
