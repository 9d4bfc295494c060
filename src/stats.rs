use serde::{Deserialize, Serialize};

/// Per-run counters. A copy rides inside every emitted snapshot so consumers
/// never have to re-derive progress from the step stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Equality tests performed (linear search).
    pub comparisons: u64,
    /// Multiply-accumulate operations (matrix multiplication).
    pub operations: u64,
    /// Candidate placements tried (N-Queens, Sudoku).
    pub attempts: u64,
    /// Tentative placements undone after a failed branch.
    pub backtracks: u64,
    /// Cells currently filled beyond the givens (Sudoku). Not monotonic:
    /// decremented on every backtrack.
    pub cells_filled: u64,
    /// Complete tours evaluated (TSP).
    pub permutations: u64,
    /// Complete solutions reached (N-Queens).
    pub solutions: u64,
}
