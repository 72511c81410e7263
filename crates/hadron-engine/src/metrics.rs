//! Worker metrics published at each barrier flush.

use hadron_solver::SolverStats;

/// Snapshot of worker counters, copied into the barrier on every flush.
///
/// Values lag the worker by at most one flush interval.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorkerMetrics {
    /// Number of completed flushes.
    pub flushes: u64,
    /// Step count when this snapshot was taken.
    pub step_count: u64,
    /// Time the worker held the barrier lock during the last flush, in
    /// microseconds.
    pub last_flush_us: u64,
    /// Integrator counters.
    pub solver: SolverStats,
}
