//! The search algorithms: deterministic graph search, AND-OR graph
//! search for non-deterministic actuators, and the all-optimal-plans
//! solution graph used for goal recognition.

mod all_optimal_plans;
mod and_or_graph_search;
mod goal_recognition;
mod graph_search;
mod monitoring;

pub use all_optimal_plans::{all_optimal_plans, MultiParentNode, NodeId, SolutionGraph};
pub use and_or_graph_search::{and_or_graph_search, Policy, MAX_DEPTH};
pub use goal_recognition::{GoalRecogniser, RecognitionError};
pub use graph_search::graph_search;
pub use monitoring::{SearchMonitor, SearchResult, REPORT_INTERVAL};
