//! Text summary builder for CLI output.
//!
//! Formats the final outcome of a run as human-readable lines.

use crate::model::{Outcome, QueensMode, RunSummary};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build the closing summary for a finished run.
pub(crate) fn build_text_summary(outcome: &Outcome) -> TextSummary {
    let lines = match outcome {
        Outcome::Cancelled => vec!["Run cancelled.".to_string()],
        Outcome::Completed(summary) => summary_lines(summary),
    };
    TextSummary { lines }
}

fn summary_lines(summary: &RunSummary) -> Vec<String> {
    match summary {
        RunSummary::Search { found, comparisons } => match found {
            Some(index) => vec![format!(
                "Target found at index {index} ({comparisons} comparisons)"
            )],
            None => vec![format!("Target not found ({comparisons} comparisons)")],
        },
        RunSummary::MatMul {
            product,
            operations,
        } => {
            let mut lines = vec![format!(
                "Multiplication complete: {0}x{0} result, {operations} operations",
                product.len()
            )];
            lines.extend(matrix_lines(product));
            lines
        }
        RunSummary::Queens {
            mode,
            solved,
            solutions,
            attempts,
            backtracks,
            board,
        } => match (mode, solved) {
            (QueensMode::FindAll, _) => vec![format!(
                "Search exhausted: {solutions} solutions ({attempts} attempts, {backtracks} backtracks)"
            )],
            (QueensMode::FirstSolution, true) => {
                let mut lines = vec![format!(
                    "Solution found ({attempts} attempts, {backtracks} backtracks)"
                )];
                lines.extend(board_lines(board));
                lines
            }
            (QueensMode::FirstSolution, false) => vec![format!(
                "No solution exists for this board size ({attempts} attempts, {backtracks} backtracks)"
            )],
        },
        RunSummary::Sudoku {
            solved,
            grid,
            attempts,
            backtracks,
        } => {
            if *solved {
                let mut lines = vec![format!(
                    "Sudoku solved ({attempts} attempts, {backtracks} backtracks)"
                )];
                lines.extend(grid_lines(grid));
                lines
            } else {
                vec![format!(
                    "No solution for this puzzle ({attempts} attempts, {backtracks} backtracks)"
                )]
            }
        }
        RunSummary::Tsp {
            best_route,
            best_distance,
            permutations,
        } => {
            let route = best_route
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            vec![format!(
                "Optimal tour: {route} -> 0, distance {best_distance:.2} ({permutations} permutations evaluated)"
            )]
        }
    }
}

fn matrix_lines(matrix: &[Vec<i64>]) -> Vec<String> {
    matrix
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| format!("{v:>6}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn board_lines(board: &[Vec<u8>]) -> Vec<String> {
    board
        .iter()
        .map(|row| {
            row.iter()
                .map(|&cell| if cell == 1 { "Q" } else { "." })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn grid_lines(grid: &[[u8; 9]; 9]) -> Vec<String> {
    let mut lines = Vec::with_capacity(11);
    for (r, row) in grid.iter().enumerate() {
        if r > 0 && r % 3 == 0 {
            lines.push("------+-------+------".to_string());
        }
        let mut parts = Vec::with_capacity(11);
        for (c, &cell) in row.iter().enumerate() {
            if c > 0 && c % 3 == 0 {
                parts.push("|".to_string());
            }
            parts.push(if cell == 0 {
                ".".to_string()
            } else {
                cell.to_string()
            });
        }
        lines.push(parts.join(" "));
    }
    lines
}
