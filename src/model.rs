use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stats::Stats;

/// Synchronous, pre-run failures. A run that has started cannot error:
/// "no solution" and "search space exhausted" are completed outcomes, and a
/// requested stop is a clean cancellation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("a run is already in progress")]
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    LinearSearch,
    MatMul,
    NQueens,
    Sudoku,
    Tsp,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::LinearSearch => "linear search",
            Algorithm::MatMul => "matrix multiplication",
            Algorithm::NQueens => "n-queens",
            Algorithm::Sudoku => "sudoku",
            Algorithm::Tsp => "tsp",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchInput {
    pub values: Vec<i64>,
    pub target: i64,
}

/// Entry magnitude is capped by `validate`, so an n-term i64 dot product
/// over accepted matrices cannot overflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatMulInput {
    pub a: Vec<Vec<i64>>,
    pub b: Vec<Vec<i64>>,
}

impl MatMulInput {
    pub const MAX_ENTRY: i64 = 1_000_000;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueensMode {
    /// Stop at the first complete placement.
    FirstSolution,
    /// Explore the whole tree, counting every complete placement.
    FindAll,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueensInput {
    pub n: usize,
    pub mode: QueensMode,
}

/// 0 means blank; nonzero cells are immutable givens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SudokuInput {
    pub givens: [[u8; 9]; 9],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct City {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TspInput {
    pub cities: Vec<City>,
}

/// Already-typed problem statement for one run. Parsing raw text into these
/// is the CLI's job; engines only see validated values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProblemInput {
    Search(SearchInput),
    MatMul(MatMulInput),
    Queens(QueensInput),
    Sudoku(SudokuInput),
    Tsp(TspInput),
}

impl ProblemInput {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            ProblemInput::Search(_) => Algorithm::LinearSearch,
            ProblemInput::MatMul(_) => Algorithm::MatMul,
            ProblemInput::Queens(_) => Algorithm::NQueens,
            ProblemInput::Sudoku(_) => Algorithm::Sudoku,
            ProblemInput::Tsp(_) => Algorithm::Tsp,
        }
    }

    /// Structural validation, checked before any stepping begins.
    pub fn validate(&self) -> Result<(), StartError> {
        match self {
            ProblemInput::Search(input) => {
                if input.values.is_empty() {
                    return Err(StartError::InvalidInput("the sequence is empty".into()));
                }
            }
            ProblemInput::MatMul(input) => {
                let n = input.a.len();
                if n == 0 {
                    return Err(StartError::InvalidInput("matrices are empty".into()));
                }
                if input.b.len() != n
                    || input.a.iter().any(|row| row.len() != n)
                    || input.b.iter().any(|row| row.len() != n)
                {
                    return Err(StartError::InvalidInput(format!(
                        "matrices must both be square with {n} rows"
                    )));
                }
                // Keeps every n-term dot product well inside i64 range.
                if input
                    .a
                    .iter()
                    .chain(&input.b)
                    .flatten()
                    .any(|&v| v > MatMulInput::MAX_ENTRY || v < -MatMulInput::MAX_ENTRY)
                {
                    return Err(StartError::InvalidInput(format!(
                        "matrix entries must be within ±{}",
                        MatMulInput::MAX_ENTRY
                    )));
                }
            }
            ProblemInput::Queens(input) => {
                if input.n == 0 {
                    return Err(StartError::InvalidInput(
                        "board size must be at least 1".into(),
                    ));
                }
            }
            ProblemInput::Sudoku(input) => {
                if input.givens.iter().flatten().any(|&cell| cell > 9) {
                    return Err(StartError::InvalidInput(
                        "grid cells must be 0 (blank) through 9".into(),
                    ));
                }
            }
            ProblemInput::Tsp(input) => {
                if input.cities.len() < 3 {
                    return Err(StartError::InvalidInput(format!(
                        "need at least 3 cities, got {}",
                        input.cities.len()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Events emitted by a running engine and consumed by presentation layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VisEvent {
    RunStarted {
        algorithm: Algorithm,
    },
    Step(Snapshot),
    /// Status messages generated outside the engine (controller, CLI).
    Info(String),
    RunFinished {
        // Box to keep VisEvent small; summaries carry whole boards/matrices.
        outcome: Box<Outcome>,
    },
}

/// One observable step: the counters at that instant plus enough coordinates
/// for a renderer to redraw every affected cell without diffing states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub stats: Stats,
    pub detail: StepDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StepDetail {
    Search(SearchStep),
    MatMul(MatMulStep),
    Queens(QueensStep),
    Sudoku(SudokuStep),
    Tsp(TspStep),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SearchStep {
    Comparing { index: usize, value: i64, target: i64 },
    Mismatch { index: usize, value: i64 },
    Found { index: usize },
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatMulStep {
    CellStarted {
        row: usize,
        col: usize,
    },
    Accumulate {
        row: usize,
        col: usize,
        k: usize,
        a: i64,
        b: i64,
        product: i64,
        partial_sum: i64,
    },
    CellCommitted {
        row: usize,
        col: usize,
        value: i64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QueensStep {
    Trying {
        row: usize,
        col: usize,
    },
    Placed {
        row: usize,
        col: usize,
        board: Vec<Vec<u8>>,
    },
    Conflict {
        row: usize,
        col: usize,
    },
    Removed {
        row: usize,
        col: usize,
    },
    SolutionFound {
        ordinal: u64,
        board: Vec<Vec<u8>>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SudokuStep {
    Visiting {
        row: usize,
        col: usize,
    },
    TryingDigit {
        row: usize,
        col: usize,
        digit: u8,
    },
    Placed {
        row: usize,
        col: usize,
        digit: u8,
    },
    /// The digit clashed with already-filled cells; `conflicts` lists them.
    Conflict {
        row: usize,
        col: usize,
        digit: u8,
        conflicts: Vec<(usize, usize)>,
    },
    Backtrack {
        row: usize,
        col: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TspStep {
    RouteEvaluated { route: Vec<usize>, distance: f64 },
    NewBest { route: Vec<usize>, distance: f64 },
}

/// How a run ended. Cancellation is a first-class outcome, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Outcome {
    Completed(RunSummary),
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunSummary {
    Search {
        found: Option<usize>,
        comparisons: u64,
    },
    MatMul {
        product: Vec<Vec<i64>>,
        operations: u64,
    },
    Queens {
        mode: QueensMode,
        solved: bool,
        solutions: u64,
        attempts: u64,
        backtracks: u64,
        board: Vec<Vec<u8>>,
    },
    Sudoku {
        solved: bool,
        grid: [[u8; 9]; 9],
        attempts: u64,
        backtracks: u64,
    },
    Tsp {
        best_route: Vec<usize>,
        best_distance: f64,
        permutations: u64,
    },
}
