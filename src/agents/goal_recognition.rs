//! The goal recognition agent: agent 0 (the actor) pursues one of
//! several candidate goals along some optimal plan; agent 1 (the
//! helper) cannot observe which. The helper plans with AND-OR search
//! where the environment branch enumerates the actor's goal-consistent
//! optimal actions, and narrows the candidate set online as actor
//! actions are observed.

use crate::agents::{AgentError, ServerConnection};
use crate::algorithms::{
    all_optimal_plans, and_or_graph_search, GoalRecogniser, NodeId, SearchMonitor, SolutionGraph,
};
use crate::domain::{Action, ActionSet, GoalDescription, JointAction, Level, State};
use crate::frontiers::Frontier;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use smallvec::smallvec;
use std::io::{BufRead, Write};
use std::rc::Rc;
use tracing::info;

pub const ACTOR_AGENT_INDEX: usize = 0;
pub const HELPER_AGENT_INDEX: usize = 1;

/// A node in the helper's search: the full two-agent state together
/// with the actor's position in its solution graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RecognitionNode {
    state: Rc<State>,
    graph_position: NodeId,
}

/// The actor actions optimal from `position` that stay jointly
/// applicable and conflict-free with the helper's chosen action.
fn joint_outcomes(
    graph: &SolutionGraph,
    node: &RecognitionNode,
    helper_action: Action,
) -> Vec<(Action, JointAction, NodeId)> {
    graph
        .node(node.graph_position)
        .optimal_edges()
        .iter()
        .filter_map(|&(actor_action, target)| {
            let joint: JointAction = smallvec![actor_action, helper_action];
            (node.state.is_applicable(&joint) && !node.state.is_conflicting(&joint))
                .then_some((actor_action, joint, target))
        })
        .collect()
}

pub fn goal_recognition_agent<R: BufRead, W: Write>(
    level: Rc<Level>,
    action_library: &[Action],
    frontier: &mut dyn Frontier,
    connection: &mut ServerConnection<R, W>,
    rng: &mut StdRng,
    monitor: &mut SearchMonitor,
    iterative_deepening: bool,
    allow_cyclic: bool,
) -> Result<(), AgentError> {
    let initial_state = level.initial_state();
    let actor_char = initial_state.agent_positions[ACTOR_AGENT_INDEX].1;
    let actor_color = level
        .color_of(actor_char)
        .ok_or(AgentError::NoPlan)?
        .to_string();

    // Each of the actor's monochrome sub-goals is a candidate for its
    // true goal.
    let actor_goals = level.goal_description().color_filter(&actor_color);
    let possible_goals: Vec<Rc<GoalDescription>> = (0..actor_goals.num_sub_goals())
        .map(|index| Rc::new(actor_goals.sub_goal(index)))
        .collect();

    // The actor's solution graph is built in its monochrome world.
    let actor_state = Rc::new(initial_state.color_filter(&actor_color));
    let actor_action_set: ActionSet = vec![action_library.to_vec()];
    let graph = all_optimal_plans(
        actor_state,
        &actor_action_set,
        possible_goals.clone(),
        frontier,
        rng,
        monitor,
    )
    .ok_or(AgentError::NoPlan)?;
    info!(nodes = graph.num_nodes(), "built actor solution graph");

    // The helper picks its own action; the actor's library is pinned to
    // NoOp so each joint action names exactly one helper action.
    let helper_action_set: ActionSet = vec![vec![Action::NoOp], action_library.to_vec()];
    let initial_node = RecognitionNode {
        state: Rc::clone(&initial_state),
        graph_position: graph.root(),
    };
    let (worst_case_length, policy) = and_or_graph_search(
        initial_node,
        |node| {
            node.state
                .get_applicable_actions(&helper_action_set, rng)
                .into_iter()
                .map(|joint_action| joint_action[HELPER_AGENT_INDEX])
                .collect()
        },
        |node| possible_goals.iter().any(|goal| goal.is_goal(&node.state)),
        |node, helper_action| {
            joint_outcomes(&graph, node, *helper_action)
                .into_iter()
                .map(|(_, joint, target)| RecognitionNode {
                    state: node.state.result(&joint),
                    graph_position: target,
                })
                .collect()
        },
        iterative_deepening,
        allow_cyclic,
    )
    .ok_or(AgentError::NoPlan)?;
    info!(worst_case_length, "found helper policy");

    let mut recogniser = GoalRecogniser::new(graph);
    let mut current_state = initial_state;
    while !possible_goals.iter().any(|goal| goal.is_goal(&current_state)) {
        let node = RecognitionNode {
            state: Rc::clone(&current_state),
            graph_position: recogniser.current(),
        };
        let helper_action = *policy
            .get(&node)
            .ok_or(AgentError::ExecutionDivergence)?;

        // The environment realises one of the actor's optimal actions.
        let outcomes = joint_outcomes(recogniser.graph(), &node, helper_action);
        let (actor_action, joint_action, _) = outcomes
            .choose(rng)
            .cloned()
            .ok_or(AgentError::ExecutionDivergence)?;

        let acks = connection.send_joint_action(&joint_action)?;
        if acks.iter().any(|&ok| !ok) {
            return Err(AgentError::ExecutionDivergence);
        }
        current_state = current_state.result(&joint_action);
        recogniser
            .observe(&actor_action)
            .map_err(|_| AgentError::ExecutionDivergence)?;

        if let Some(goal) = recogniser.sole_goal() {
            info!(goal = %goal, "actor goal identified");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MAPF_ACTION_LIBRARY;
    use crate::frontiers::BestFirstFrontier;
    use crate::test_utils::*;
    use rand::SeedableRng;
    use std::io::Cursor;

    /// The actor sits between two candidate goals; the helper idles in
    /// the second row.
    const AMBIGUOUS_CORRIDOR: &str = "#domain
hospital
#levelname
ambiguous corridor
#colors
red: 0
blue: 1
#initial
+++++++
+  0  +
+1    +
+++++++
#goal
+++++++
+0   0+
+     +
+++++++
#end";

    #[test]
    fn the_helper_policy_runs_to_an_actor_goal() {
        let level = rc_level(AMBIGUOUS_CORRIDOR);
        let mut frontier = BestFirstFrontier::uniform_cost();
        let input = Cursor::new("true|true\n".repeat(8));
        let mut output = Vec::new();
        let mut connection = ServerConnection::new(input, &mut output);
        let mut rng = StdRng::seed_from_u64(0);
        let mut monitor = SearchMonitor::new(None);

        goal_recognition_agent(
            level,
            &MAPF_ACTION_LIBRARY,
            &mut frontier,
            &mut connection,
            &mut rng,
            &mut monitor,
            true,
            false,
        )
        .unwrap();

        // Both candidates sit two actor steps from the start.
        let sent = String::from_utf8(output).unwrap();
        assert_eq!(sent.lines().count(), 2);
        for line in sent.lines() {
            let actor_action = line.split('|').next().unwrap();
            assert!(actor_action == "Move(E)" || actor_action == "Move(W)");
        }
    }

    #[test]
    fn a_level_without_candidate_goals_fails_fast() {
        // The actor's color has no goal literals at all.
        let no_goals = "#domain
hospital
#levelname
no goals
#colors
red: 0
blue: 1
#initial
+++++
+0 1+
+++++
#goal
+++++
+  1+
+++++
#end";
        let level = rc_level(no_goals);
        let mut frontier = BestFirstFrontier::uniform_cost();
        let input = Cursor::new("");
        let mut output = Vec::new();
        let mut connection = ServerConnection::new(input, &mut output);
        let mut rng = StdRng::seed_from_u64(0);
        let mut monitor = SearchMonitor::new(None);

        let result = goal_recognition_agent(
            level,
            &MAPF_ACTION_LIBRARY,
            &mut frontier,
            &mut connection,
            &mut rng,
            &mut monitor,
            true,
            false,
        );
        assert!(matches!(result, Err(AgentError::NoPlan)));
    }
}
