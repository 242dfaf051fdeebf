//! Frontier strategies: FIFO/LIFO queues and the best-first priority
//! frontier with uniform-cost, A* and greedy objectives.

mod best_first;
mod bfs;
mod frontier;

pub use best_first::BestFirstFrontier;
pub use bfs::{BfsFrontier, DfsFrontier};
pub use frontier::Frontier;
pub(crate) use frontier::Multiset;

use crate::domain::Heuristic;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontierConfigError {
    #[error("the {0} strategy needs a heuristic, pass --heuristic")]
    MissingHeuristic(&'static str),
}

/// The search strategies selectable on the command line.
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[clap(rename_all = "kebab-case")]
pub enum StrategyName {
    Bfs,
    Dfs,
    Ucs,
    #[clap(name = "astar")]
    AStar,
    Greedy,
}

impl StrategyName {
    /// Builds the frontier, failing fast when an informed strategy is
    /// selected without a heuristic.
    pub fn create(
        &self,
        heuristic: Option<Box<dyn Heuristic>>,
    ) -> Result<Box<dyn Frontier>, FrontierConfigError> {
        match self {
            StrategyName::Bfs => Ok(Box::new(BfsFrontier::new())),
            StrategyName::Dfs => Ok(Box::new(DfsFrontier::new())),
            StrategyName::Ucs => Ok(Box::new(BestFirstFrontier::uniform_cost())),
            StrategyName::AStar => match heuristic {
                Some(heuristic) => Ok(Box::new(BestFirstFrontier::a_star(heuristic))),
                None => Err(FrontierConfigError::MissingHeuristic("astar")),
            },
            StrategyName::Greedy => match heuristic {
                Some(heuristic) => Ok(Box::new(BestFirstFrontier::greedy(heuristic))),
                None => Err(FrontierConfigError::MissingHeuristic("greedy")),
            },
        }
    }
}
