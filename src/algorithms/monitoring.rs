//! Progress reporting and resource limits shared by the search algorithms.

use crate::domain::Plan;
use memory_stats::memory_stats;
use std::time::Instant;
use tracing::info;

/// How many expansions pass between progress reports.
pub const REPORT_INTERVAL: u64 = 10_000;

/// The outcome of a search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    /// A plan from the initial state to a goal state.
    Success(Plan),
    /// The reachable state space was exhausted without finding a goal.
    Exhausted,
    /// The search hit its memory limit.
    MemoryLimitExceeded,
}

/// Tracks expansion counts, elapsed time and memory usage for a single
/// search run and reports them periodically.
#[derive(Debug)]
pub struct SearchMonitor {
    memory_limit_mb: Option<usize>,
    start_time: Instant,
    peak_memory_usage_mb: Option<usize>,
    expanded: u64,
    generated: u64,
}

impl SearchMonitor {
    pub fn new(memory_limit_mb: Option<usize>) -> Self {
        info!(memory_limit_mb = memory_limit_mb);
        Self {
            memory_limit_mb,
            start_time: Instant::now(),
            peak_memory_usage_mb: None,
            expanded: 0,
            generated: 0,
        }
    }

    /// Registers one expansion and reports progress every
    /// [`REPORT_INTERVAL`] expansions.
    pub fn count_expanded(&mut self, frontier_size: usize) {
        self.expanded += 1;
        if self.expanded % REPORT_INTERVAL == 0 {
            self.log(frontier_size);
        }
    }

    pub fn count_generated(&mut self, num_states: usize) {
        self.generated += num_states as u64;
    }

    pub fn expanded(&self) -> u64 {
        self.expanded
    }

    /// Polls current memory usage and returns `true` when the recorded
    /// peak exceeds the limit. Call once per expansion.
    pub fn memory_exceeded(&mut self) -> bool {
        let memory_usage = memory_stats().map(|usage| usage.physical_mem / 1024 / 1024);
        self.peak_memory_usage_mb = self.peak_memory_usage_mb.max(memory_usage);
        match (self.memory_limit_mb, self.peak_memory_usage_mb) {
            (Some(limit), Some(peak)) => peak > limit,
            _ => false,
        }
    }

    pub fn log(&mut self, frontier_size: usize) {
        let memory_usage = memory_stats().map(|usage| usage.physical_mem / 1024 / 1024);
        self.peak_memory_usage_mb = self.peak_memory_usage_mb.max(memory_usage);
        info!(
            expanded = self.expanded,
            generated = self.generated,
            frontier_size = frontier_size,
            memory_usage_mb = memory_usage,
            time_elapsed = self.start_time.elapsed().as_secs_f64(),
        );
    }

    pub fn finalise(&mut self) {
        info!(
            expanded = self.expanded,
            generated = self.generated,
            peak_recorded_memory_usage_mb = self.peak_memory_usage_mb,
            total_time_used = self.start_time.elapsed().as_secs_f64(),
        );
    }
}
