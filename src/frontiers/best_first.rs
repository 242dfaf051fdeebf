//! The priority-ordered frontier behind uniform-cost, A* and greedy search.

use crate::domain::{GoalDescription, Heuristic, State};
use crate::frontiers::{Frontier, Multiset};
use priority_queue::PriorityQueue;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Heap key: lowest `f` pops first; among equal `f` values the most
/// recently inserted element wins (LIFO), decided by a monotonically
/// increasing insertion tick so that states themselves are never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Priority {
    f: u32,
    tick: u64,
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        // The priority queue pops the greatest entry, so lower f compares
        // greater, and for equal f the larger (newer) tick does.
        other.f.cmp(&self.f).then(self.tick.cmp(&other.tick))
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy)]
enum Objective {
    /// f = g: uniform-cost search.
    UniformCost,
    /// f = g + h: A*.
    AStar,
    /// f = h: greedy best-first.
    Greedy,
}

/// A frontier ordered by an f-value per state.
///
/// Re-adding a queued state performs a decrease-key: the backing
/// [`PriorityQueue`] keeps one entry per state and only improves its
/// priority, so no tombstoned heap entries accumulate.
pub struct BestFirstFrontier {
    objective: Objective,
    heuristic: Option<Box<dyn Heuristic>>,
    goal_description: Option<Rc<GoalDescription>>,
    queue: PriorityQueue<Rc<State>, Priority>,
    counter: Multiset,
    tick: u64,
}

impl BestFirstFrontier {
    pub fn uniform_cost() -> Self {
        Self::with_objective(Objective::UniformCost, None)
    }

    pub fn a_star(heuristic: Box<dyn Heuristic>) -> Self {
        Self::with_objective(Objective::AStar, Some(heuristic))
    }

    pub fn greedy(heuristic: Box<dyn Heuristic>) -> Self {
        Self::with_objective(Objective::Greedy, Some(heuristic))
    }

    fn with_objective(objective: Objective, heuristic: Option<Box<dyn Heuristic>>) -> Self {
        Self {
            objective,
            heuristic,
            goal_description: None,
            queue: PriorityQueue::new(),
            counter: Multiset::default(),
            tick: 0,
        }
    }

    fn f(&self, state: &State) -> u32 {
        let h = || {
            let heuristic = self
                .heuristic
                .as_ref()
                .expect("informed frontiers are constructed with a heuristic");
            let goal_description = self
                .goal_description
                .as_ref()
                .expect("frontier must be prepared before states are added");
            heuristic.h(state, goal_description)
        };
        match self.objective {
            Objective::UniformCost => state.path_cost,
            Objective::AStar => state.path_cost + h(),
            Objective::Greedy => h(),
        }
    }
}

impl Frontier for BestFirstFrontier {
    fn prepare(&mut self, goal_description: Rc<GoalDescription>) {
        self.queue.clear();
        self.counter.clear();
        self.tick = 0;
        if let Some(heuristic) = self.heuristic.as_mut() {
            heuristic.preprocess(&goal_description.level);
        }
        self.goal_description = Some(goal_description);
    }

    fn add(&mut self, state: Rc<State>) {
        let priority = Priority { f: self.f(&state), tick: self.tick };
        self.tick += 1;
        if self.counter.contains(&state) {
            // Decrease-key: only replaces the stored priority when the new
            // one orders earlier.
            self.queue.push_increase(state, priority);
        } else {
            self.counter.insert(Rc::clone(&state));
            self.queue.push(state, priority);
        }
    }

    fn pop(&mut self) -> Option<Rc<State>> {
        let (state, _) = self.queue.pop()?;
        self.counter.remove(&state);
        Some(state)
    }

    fn size(&self) -> usize {
        self.queue.len()
    }

    fn contains(&self, state: &State) -> bool {
        self.counter.contains(state)
    }
}

impl fmt::Debug for BestFirstFrontier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BestFirstFrontier")
            .field("objective", &self.objective)
            .field("size", &self.queue.len())
            .finish()
    }
}
