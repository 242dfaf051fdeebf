//! The non-deterministic agent: the actuator is broken and may perform
//! an action twice, so planning uses AND-OR graph search and execution
//! follows the resulting policy.

use crate::agents::{AgentError, ServerConnection};
use crate::algorithms::and_or_graph_search;
use crate::domain::{joint_action_to_string, Action, ActionSet, JointAction, Level, State};
use rand::rngs::StdRng;
use rand::Rng;
use std::io::{BufRead, Write};
use std::rc::Rc;
use tracing::{info, warn};

/// How often the broken actuator fires twice during execution.
pub const CHANCE_OF_EXTRA_ACTION: f64 = 0.5;

/// The broken actuator's outcome model: whenever the joint action is
/// still applicable after it has been performed, performing it a second
/// time is a possible outcome.
pub fn broken_results(state: &Rc<State>, joint_action: &JointAction) -> Vec<Rc<State>> {
    let standard_case = state.result(joint_action);
    if standard_case.is_applicable(joint_action) {
        let broken_case = standard_case.result(joint_action);
        vec![standard_case, broken_case]
    } else {
        vec![standard_case]
    }
}

pub fn non_deterministic_agent<R: BufRead, W: Write>(
    level: Rc<Level>,
    action_library: &[Action],
    connection: &mut ServerConnection<R, W>,
    rng: &mut StdRng,
    iterative_deepening: bool,
    allow_cyclic: bool,
) -> Result<(), AgentError> {
    let initial_state = level.initial_state();
    let goal_description = level.goal_description();
    let action_set: ActionSet = vec![action_library.to_vec()];

    let (worst_case_length, policy) = {
        let goal_description = Rc::clone(&goal_description);
        and_or_graph_search(
            Rc::clone(&initial_state),
            |state| state.get_applicable_actions(&action_set, rng),
            move |state| goal_description.is_goal(state),
            broken_results,
            iterative_deepening,
            allow_cyclic,
        )
    }
    .ok_or(AgentError::NoPlan)?;
    info!(worst_case_length, "found strong plan");

    let mut current_state = initial_state;
    while !goal_description.is_goal(&current_state) {
        let joint_action = policy
            .get(&current_state)
            .ok_or(AgentError::ExecutionDivergence)?
            .clone();
        connection.send_joint_action(&joint_action)?;
        current_state = current_state.result(&joint_action);

        // Broken actuator: roll the dice for a second execution of the
        // same action, when it is still applicable.
        if rng.gen_bool(CHANCE_OF_EXTRA_ACTION) && current_state.is_applicable(&joint_action) {
            warn!(
                action = %joint_action_to_string(&joint_action),
                "actuator fired twice"
            );
            connection.send_joint_action(&joint_action)?;
            current_state = current_state.result(&joint_action);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, MAPF_ACTION_LIBRARY};
    use crate::test_utils::*;
    use rand::SeedableRng;
    use smallvec::smallvec;
    use std::io::Cursor;

    #[test]
    fn an_action_at_the_wall_has_a_single_outcome() {
        let level = rc_level(EMPTY_CORRIDOR);
        let at_end = state_with_agent_at(&level, 1, 2);
        let east: JointAction = smallvec![Action::Move(Direction::East)];
        // From (1,2) a second Move(E) would hit the wall at (1,4).
        assert_eq!(broken_results(&at_end, &east).len(), 1);

        let at_start = level.initial_state();
        assert_eq!(broken_results(&at_start, &east).len(), 2);
    }

    #[test]
    fn the_policy_reaches_the_goal_despite_the_broken_actuator() {
        let level = rc_level(EMPTY_CORRIDOR);
        // Enough acknowledgements for any execution the policy can take.
        let input = Cursor::new("true\n".repeat(8));
        let mut output = Vec::new();
        let mut connection = ServerConnection::new(input, &mut output);
        let mut rng = StdRng::seed_from_u64(3);

        non_deterministic_agent(
            level,
            &MAPF_ACTION_LIBRARY,
            &mut connection,
            &mut rng,
            true,
            false,
        )
        .unwrap();
        let sent = String::from_utf8(output).unwrap();
        assert!(!sent.is_empty());
        assert!(sent.lines().all(|line| line == "Move(E)"));
    }
}
