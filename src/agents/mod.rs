//! The agent drivers that connect the search algorithms to the level
//! server, one per planning setting.

mod classic;
mod comms;
mod goal_recognition;
mod non_deterministic;

pub use classic::classic_agent;
pub use comms::ServerConnection;
pub use goal_recognition::{goal_recognition_agent, ACTOR_AGENT_INDEX, HELPER_AGENT_INDEX};
pub use non_deterministic::{broken_results, non_deterministic_agent, CHANCE_OF_EXTRA_ACTION};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("unable to solve the level")]
    NoPlan,
    #[error("search exceeded the memory limit")]
    MemoryLimitExceeded,
    #[error("the server rejected an action in step {0}")]
    ExecutionFailed(usize),
    #[error("reached a state not covered by the plan")]
    ExecutionDivergence,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
