//! The classic centralised agent: one deterministic graph search over
//! the full joint action space, then straight-line execution.

use crate::agents::{AgentError, ServerConnection};
use crate::algorithms::{graph_search, SearchMonitor, SearchResult};
use crate::domain::{Action, ActionSet, Level};
use crate::frontiers::Frontier;
use rand::rngs::StdRng;
use std::io::{BufRead, Write};
use std::rc::Rc;
use tracing::info;

pub fn classic_agent<R: BufRead, W: Write>(
    level: Rc<Level>,
    action_library: &[Action],
    frontier: &mut dyn Frontier,
    connection: &mut ServerConnection<R, W>,
    rng: &mut StdRng,
    monitor: &mut SearchMonitor,
) -> Result<(), AgentError> {
    let initial_state = level.initial_state();
    let goal_description = level.goal_description();
    // Every agent may use the full action library.
    let action_set: ActionSet = vec![action_library.to_vec(); level.num_agents()];

    let plan = match graph_search(
        initial_state,
        &action_set,
        goal_description,
        frontier,
        rng,
        monitor,
    ) {
        SearchResult::Success(plan) => plan,
        SearchResult::Exhausted => return Err(AgentError::NoPlan),
        SearchResult::MemoryLimitExceeded => return Err(AgentError::MemoryLimitExceeded),
    };
    info!(plan_length = plan.len(), "found solution");

    for (step, joint_action) in plan.iter().enumerate() {
        let acks = connection.send_joint_action(joint_action)?;
        // A rejected action cannot happen in classical planning, so an
        // execution failure means the model and server disagree.
        if acks.iter().any(|&ok| !ok) {
            return Err(AgentError::ExecutionFailed(step));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MAPF_ACTION_LIBRARY;
    use crate::frontiers::BfsFrontier;
    use crate::test_utils::*;
    use rand::SeedableRng;
    use std::io::Cursor;

    #[test]
    fn the_corridor_plan_is_sent_and_acknowledged() {
        let level = rc_level(EMPTY_CORRIDOR);
        let mut frontier = BfsFrontier::new();
        let input = Cursor::new("true\ntrue\n");
        let mut output = Vec::new();
        let mut connection = ServerConnection::new(input, &mut output);
        let mut rng = StdRng::seed_from_u64(0);
        let mut monitor = SearchMonitor::new(None);

        classic_agent(
            level,
            &MAPF_ACTION_LIBRARY,
            &mut frontier,
            &mut connection,
            &mut rng,
            &mut monitor,
        )
        .unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Move(E)\nMove(E)\n");
    }

    #[test]
    fn a_rejected_action_aborts_execution() {
        let level = rc_level(EMPTY_CORRIDOR);
        let mut frontier = BfsFrontier::new();
        let input = Cursor::new("true\nfalse\n");
        let mut output = Vec::new();
        let mut connection = ServerConnection::new(input, &mut output);
        let mut rng = StdRng::seed_from_u64(0);
        let mut monitor = SearchMonitor::new(None);

        let result = classic_agent(
            level,
            &MAPF_ACTION_LIBRARY,
            &mut frontier,
            &mut connection,
            &mut rng,
            &mut monitor,
        );
        assert!(matches!(result, Err(AgentError::ExecutionFailed(1))));
    }

    #[test]
    fn an_unsolvable_level_reports_no_plan() {
        let walled_off = "#domain
hospital
#levelname
walled off
#colors
red: 0
#initial
+++++
+0+ +
+++++
#goal
+++++
+ +0+
+++++
#end";
        let level = rc_level(walled_off);
        let mut frontier = BfsFrontier::new();
        let input = Cursor::new("");
        let mut output = Vec::new();
        let mut connection = ServerConnection::new(input, &mut output);
        let mut rng = StdRng::seed_from_u64(0);
        let mut monitor = SearchMonitor::new(None);

        let result = classic_agent(
            level,
            &MAPF_ACTION_LIBRARY,
            &mut frontier,
            &mut connection,
            &mut rng,
            &mut monitor,
        );
        assert!(matches!(result, Err(AgentError::NoPlan)));
    }
}
