//! All-optimal-plans search: a uniform-cost search that keeps expanding
//! past the first goal until every optimal plan to every candidate goal
//! has been recorded, merging re-discovered states into shared
//! multi-parent nodes. The result is the solution graph consumed by
//! goal recognition.

use crate::algorithms::SearchMonitor;
use crate::domain::{Action, ActionSet, GoalDescription, State};
use crate::frontiers::Frontier;
use rand::rngs::StdRng;
use segvec::{Linear, SegVec};
use serde::Serialize;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{error, info};

/// Stable index of a node in the solution graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(usize);

/// A state that may lie on optimal plans to several goals, reached from
/// possibly many parents.
#[derive(Debug)]
pub struct MultiParentNode {
    state: Rc<State>,
    path_cost: u32,
    parents: Vec<NodeId>,
    /// The actor actions lying on some optimal plan, with the node they
    /// lead to.
    optimal_edges: Vec<(Action, NodeId)>,
    /// Indices into the candidate goal list of every goal some optimal
    /// plan through this node reaches.
    consistent_goals: Vec<usize>,
}

impl MultiParentNode {
    fn new(state: Rc<State>) -> Self {
        let path_cost = state.path_cost;
        Self {
            state,
            path_cost,
            parents: Vec::new(),
            optimal_edges: Vec::new(),
            consistent_goals: Vec::new(),
        }
    }

    pub fn state(&self) -> &Rc<State> {
        &self.state
    }

    pub fn path_cost(&self) -> u32 {
        self.path_cost
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub fn optimal_edges(&self) -> &[(Action, NodeId)] {
        &self.optimal_edges
    }

    pub fn consistent_goals(&self) -> &[usize] {
        &self.consistent_goals
    }
}

/// The DAG of all states reachable via some optimal plan from the
/// initial state to one of the candidate goals. Nodes live in an arena
/// and refer to each other by [`NodeId`].
#[derive(Debug)]
pub struct SolutionGraph {
    nodes: SegVec<MultiParentNode, Linear>,
    root: NodeId,
    possible_goals: Vec<Rc<GoalDescription>>,
}

impl SolutionGraph {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &MultiParentNode {
        &self.nodes[id.0]
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn possible_goals(&self) -> &[Rc<GoalDescription>] {
        &self.possible_goals
    }

    /// Follows the optimal edge labelled with the actor's `action`, if
    /// the action lies on some optimal plan from `id`.
    pub fn successor(&self, id: NodeId, action: &Action) -> Option<NodeId> {
        self.node(id)
            .optimal_edges
            .iter()
            .find(|(edge_action, _)| edge_action == action)
            .map(|&(_, target)| target)
    }

    /// The optimal edges from `id` that stay consistent with the goal at
    /// `goal_index`.
    pub fn edges_consistent_with(&self, id: NodeId, goal_index: usize) -> Vec<(Action, NodeId)> {
        self.node(id)
            .optimal_edges
            .iter()
            .filter(|&&(_, target)| self.node(target).consistent_goals.contains(&goal_index))
            .copied()
            .collect()
    }

    /// Serialises the graph for offline inspection.
    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct NodeDump {
            id: usize,
            state: String,
            path_cost: u32,
            parents: Vec<NodeId>,
            optimal_edges: Vec<(String, NodeId)>,
            consistent_goals: Vec<usize>,
        }
        #[derive(Serialize)]
        struct GraphDump {
            root: NodeId,
            goals: Vec<String>,
            nodes: Vec<NodeDump>,
        }

        let dump = GraphDump {
            root: self.root,
            goals: self
                .possible_goals
                .iter()
                .map(|goal| goal.to_string())
                .collect(),
            nodes: self
                .nodes
                .iter()
                .enumerate()
                .map(|(id, node)| NodeDump {
                    id,
                    state: node.state.to_string(),
                    path_cost: node.path_cost,
                    parents: node.parents.clone(),
                    optimal_edges: node
                        .optimal_edges
                        .iter()
                        .map(|&(action, target)| (action.to_string(), target))
                        .collect(),
                    consistent_goals: node.consistent_goals.clone(),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&dump)
    }
}

/// Builds the solution graph of every optimal plan from `initial_state`
/// to each goal in `possible_goals`, or returns `None` when some
/// candidate goal is unreachable. `frontier` must order states by path
/// cost for the optimality bookkeeping to hold.
pub fn all_optimal_plans(
    initial_state: Rc<State>,
    action_set: &ActionSet,
    possible_goals: Vec<Rc<GoalDescription>>,
    frontier: &mut dyn Frontier,
    rng: &mut StdRng,
    monitor: &mut SearchMonitor,
) -> Option<SolutionGraph> {
    if possible_goals.is_empty() {
        return None;
    }

    // The frontier only needs the union of candidate literals, for
    // heuristic preprocessing.
    let all_literals = possible_goals
        .iter()
        .flat_map(|goal| goal.goals.iter().copied())
        .collect();
    frontier.prepare(Rc::new(possible_goals[0].with_goals(all_literals)));
    frontier.add(Rc::clone(&initial_state));

    let mut nodes: SegVec<MultiParentNode, Linear> = SegVec::new();
    let mut registry: HashMap<Rc<State>, NodeId> = HashMap::new();
    let root = NodeId(0);
    nodes.push(MultiParentNode::new(Rc::clone(&initial_state)));
    registry.insert(initial_state, root);

    // Optimal cost of each candidate goal, filled in as goals are popped.
    let mut goal_costs: Vec<Option<u32>> = vec![None; possible_goals.len()];

    loop {
        if monitor.memory_exceeded() {
            error!("memory limit exceeded while building the solution graph");
            monitor.finalise();
            return None;
        }

        let state = match frontier.pop() {
            Some(state) => state,
            None => break,
        };
        let cost = state.path_cost;
        let node_id = registry[&state];

        for (index, goal) in possible_goals.iter().enumerate() {
            if goal_costs[index].is_none() && goal.is_goal(&state) {
                goal_costs[index] = Some(cost);
            }
        }

        // Once every candidate is discovered, states costlier than the
        // most expensive candidate cannot lie on any optimal plan.
        if let Some(worst) = goal_costs.iter().copied().collect::<Option<Vec<u32>>>() {
            if cost > worst.into_iter().max().unwrap_or(0) {
                break;
            }
        }

        monitor.count_expanded(frontier.size());
        for joint_action in state.get_applicable_actions(action_set, rng) {
            let child = state.result(&joint_action);
            let actor_action = joint_action[0];
            match registry.get(&child) {
                None => {
                    let child_id = NodeId(nodes.len());
                    let mut child_node = MultiParentNode::new(Rc::clone(&child));
                    child_node.parents.push(node_id);
                    nodes.push(child_node);
                    registry.insert(Rc::clone(&child), child_id);
                    nodes[node_id.0].optimal_edges.push((actor_action, child_id));
                    monitor.count_generated(1);
                    frontier.add(child);
                }
                Some(&child_id) => {
                    let known_cost = nodes[child_id.0].path_cost;
                    debug_assert!(
                        child.path_cost >= known_cost,
                        "uniform-cost expansion rediscovered a state strictly cheaper"
                    );
                    // An equal-cost rediscovery is another optimal way in.
                    // Two actions from the same parent may produce the same
                    // child, so the parent list is deduplicated here.
                    if child.path_cost == known_cost {
                        if !nodes[child_id.0].parents.contains(&node_id) {
                            nodes[child_id.0].parents.push(node_id);
                        }
                        nodes[node_id.0].optimal_edges.push((actor_action, child_id));
                    }
                }
            }
        }
    }

    if goal_costs.iter().any(Option::is_none) {
        info!("not every candidate goal is reachable");
        monitor.finalise();
        return None;
    }
    monitor.finalise();

    let mut graph = SolutionGraph {
        nodes,
        root,
        possible_goals,
    };
    label_consistent_goals(&mut graph, &goal_costs);
    prune_inconsistent_edges(&mut graph);
    Some(graph)
}

/// Marks each node with every goal some optimal plan through it reaches,
/// by walking parent edges back from the optimal goal states.
fn label_consistent_goals(graph: &mut SolutionGraph, goal_costs: &[Option<u32>]) {
    let mut worklist: Vec<(NodeId, usize)> = Vec::new();
    for id in 0..graph.nodes.len() {
        let node = &graph.nodes[id];
        for (index, goal) in graph.possible_goals.iter().enumerate() {
            if goal_costs[index] == Some(node.path_cost) && goal.is_goal(&node.state) {
                worklist.push((NodeId(id), index));
            }
        }
    }

    while let Some((id, goal_index)) = worklist.pop() {
        let node = &mut graph.nodes[id.0];
        if node.consistent_goals.contains(&goal_index) {
            continue;
        }
        node.consistent_goals.push(goal_index);
        let parents = node.parents.clone();
        for parent in parents {
            worklist.push((parent, goal_index));
        }
    }
}

/// Drops edges whose target is consistent with no candidate goal; such
/// edges lead into the over-expanded fringe beyond the optimal plans.
fn prune_inconsistent_edges(graph: &mut SolutionGraph) {
    let keep: Vec<bool> = graph
        .nodes
        .iter()
        .map(|node| !node.consistent_goals.is_empty())
        .collect();
    for index in 0..graph.nodes.len() {
        graph.nodes[index]
            .optimal_edges
            .retain(|&(_, target)| keep[target.0]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, Goal, MAPF_ACTION_LIBRARY};
    use crate::frontiers::BestFirstFrontier;
    use crate::test_utils::*;
    use rand::SeedableRng;

    const WIDE_CORRIDOR: &str = "#domain
hospital
#levelname
wide corridor
#colors
red: 0
#initial
+++++++
+  0  +
+++++++
#goal
+++++++
+     +
+++++++
#end";

    const OPEN_ROOM: &str = "#domain
hospital
#levelname
open room
#colors
red: 0
#initial
++++
+0 +
+  +
++++
#goal
++++
+  +
+  +
++++
#end";

    fn agent_goal(level: &Rc<crate::domain::Level>, row: i16, col: i16) -> Rc<GoalDescription> {
        Rc::new(level.goal_description().with_goals(vec![Goal {
            position: pos(row, col),
            letter: '0',
            is_positive: true,
        }]))
    }

    fn build(level_text: &str, goals: Vec<(i16, i16)>) -> Option<SolutionGraph> {
        let level = rc_level(level_text);
        let possible_goals = goals
            .into_iter()
            .map(|(row, col)| agent_goal(&level, row, col))
            .collect();
        let action_set: ActionSet = vec![MAPF_ACTION_LIBRARY.to_vec()];
        let mut frontier = BestFirstFrontier::uniform_cost();
        let mut rng = StdRng::seed_from_u64(0);
        let mut monitor = SearchMonitor::new(None);
        all_optimal_plans(
            level.initial_state(),
            &action_set,
            possible_goals,
            &mut frontier,
            &mut rng,
            &mut monitor,
        )
    }

    #[test]
    fn two_opposed_goals_split_the_graph() {
        // Agent at (1,3); candidate goals at either end of the corridor.
        let graph = build(WIDE_CORRIDOR, vec![(1, 1), (1, 5)]).unwrap();
        let root = graph.node(graph.root());
        assert_eq!(root.consistent_goals().len(), 2);
        assert_eq!(root.optimal_edges().len(), 2);

        // Restricting to one candidate keeps a single edge.
        let westward = graph.edges_consistent_with(graph.root(), 0);
        assert_eq!(westward.len(), 1);
        assert_eq!(westward[0].0, Action::Move(Direction::West));

        // After one step each direction commits to a single goal.
        for &(action, target) in root.optimal_edges() {
            let consistent = graph.node(target).consistent_goals();
            assert_eq!(consistent.len(), 1);
            match action {
                Action::Move(Direction::West) => assert_eq!(consistent, &[0]),
                Action::Move(Direction::East) => assert_eq!(consistent, &[1]),
                other => panic!("unexpected edge {other}"),
            }
        }
    }

    #[test]
    fn rediscovered_states_merge_into_one_node() {
        // Both optimal routes to (2,2) pass through distinct middle
        // cells and must merge at the corner.
        let graph = build(OPEN_ROOM, vec![(2, 2)]).unwrap();
        let mut corner = None;
        for id in 0..graph.num_nodes() {
            let node = graph.node(NodeId(id));
            if node.state().agent_positions[0].0 == pos(2, 2) {
                assert!(corner.is_none(), "duplicate node for one state");
                corner = Some(id);
            }
        }
        let corner = graph.node(NodeId(corner.unwrap()));
        assert_eq!(corner.path_cost(), 2);
        assert_eq!(corner.parents().len(), 2);
    }

    #[test]
    fn overlapping_action_libraries_keep_parents_distinct() {
        // The same move appears twice in the library, so a parent reaches
        // the same child through two equal joint actions; the child must
        // still record the parent once.
        let level = rc_level(OPEN_ROOM);
        let possible_goals = vec![agent_goal(&level, 2, 2)];
        let mut library = MAPF_ACTION_LIBRARY.to_vec();
        library.extend_from_slice(&MAPF_ACTION_LIBRARY);
        let action_set: ActionSet = vec![library];
        let mut frontier = BestFirstFrontier::uniform_cost();
        let mut rng = StdRng::seed_from_u64(0);
        let mut monitor = SearchMonitor::new(None);
        let graph = all_optimal_plans(
            level.initial_state(),
            &action_set,
            possible_goals,
            &mut frontier,
            &mut rng,
            &mut monitor,
        )
        .unwrap();
        for id in 0..graph.num_nodes() {
            let parents = graph.node(NodeId(id)).parents();
            let distinct: std::collections::HashSet<_> = parents.iter().collect();
            assert_eq!(distinct.len(), parents.len(), "duplicate parent edge");
        }
    }

    #[test]
    fn parent_edges_witness_the_path_cost() {
        let graph = build(OPEN_ROOM, vec![(2, 2)]).unwrap();
        for id in 0..graph.num_nodes() {
            let node = graph.node(NodeId(id));
            if id != graph.root().0 && !node.consistent_goals().is_empty() {
                let min_parent = node
                    .parents()
                    .iter()
                    .map(|&parent| graph.node(parent).path_cost())
                    .min()
                    .unwrap();
                assert_eq!(node.path_cost(), min_parent + 1);
            }
        }
    }

    #[test]
    fn an_unreachable_candidate_fails_the_search() {
        let level = rc_level(EMPTY_CORRIDOR);
        // (0,0) is a wall, no state can satisfy the second candidate.
        let possible_goals = vec![agent_goal(&level, 1, 3), agent_goal(&level, 0, 0)];
        let action_set: ActionSet = vec![MAPF_ACTION_LIBRARY.to_vec()];
        let mut frontier = BestFirstFrontier::uniform_cost();
        let mut rng = StdRng::seed_from_u64(0);
        let mut monitor = SearchMonitor::new(None);
        assert!(all_optimal_plans(
            level.initial_state(),
            &action_set,
            possible_goals,
            &mut frontier,
            &mut rng,
            &mut monitor,
        )
        .is_none());
    }

    #[test]
    fn the_json_dump_contains_every_node() {
        let graph = build(WIDE_CORRIDOR, vec![(1, 1), (1, 5)]).unwrap();
        let dump: serde_json::Value =
            serde_json::from_str(&graph.to_json().unwrap()).unwrap();
        assert_eq!(
            dump["nodes"].as_array().unwrap().len(),
            graph.num_nodes()
        );
        assert_eq!(dump["goals"].as_array().unwrap().len(), 2);
    }
}
