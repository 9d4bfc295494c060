use futures::future::BoxFuture;
use futures::FutureExt;

use crate::control::Pace;
use crate::engine::StepCtx;
use crate::model::{Outcome, RunSummary, StepDetail, SudokuInput, SudokuStep};

/// Exhaustive backtracking over the next empty cell in row-major order,
/// digits 1..=9 in order. No propagation or heuristics; the givens are never
/// touched.
pub(crate) struct SudokuEngine {
    working: [[u8; 9]; 9],
    cx: StepCtx,
}

impl SudokuEngine {
    pub fn new(input: SudokuInput, cx: StepCtx) -> Self {
        Self {
            working: input.givens,
            cx,
        }
    }

    fn emit(&self, step: SudokuStep) {
        self.cx.emit(StepDetail::Sudoku(step));
    }

    fn find_empty(&self) -> Option<(usize, usize)> {
        for row in 0..9 {
            for col in 0..9 {
                if self.working[row][col] == 0 {
                    return Some((row, col));
                }
            }
        }
        None
    }

    fn is_valid(&self, row: usize, col: usize, digit: u8) -> bool {
        for i in 0..9 {
            if self.working[row][i] == digit || self.working[i][col] == digit {
                return false;
            }
        }
        let (block_row, block_col) = (row / 3 * 3, col / 3 * 3);
        for r in block_row..block_row + 3 {
            for c in block_col..block_col + 3 {
                if self.working[r][c] == digit {
                    return false;
                }
            }
        }
        true
    }

    /// Every already-filled cell that clashes with placing `digit` at
    /// (row, col): same row, same column, then the containing 3×3 block.
    fn conflicting_cells(&self, row: usize, col: usize, digit: u8) -> Vec<(usize, usize)> {
        let mut conflicts = Vec::new();
        for i in 0..9 {
            if self.working[row][i] == digit && i != col {
                conflicts.push((row, i));
            }
            if self.working[i][col] == digit && i != row {
                conflicts.push((i, col));
            }
        }
        let (block_row, block_col) = (row / 3 * 3, col / 3 * 3);
        for r in block_row..block_row + 3 {
            for c in block_col..block_col + 3 {
                // Cells sharing the row or column are already listed above.
                if self.working[r][c] == digit && r != row && c != col {
                    conflicts.push((r, c));
                }
            }
        }
        conflicts
    }

    fn solve(&mut self) -> BoxFuture<'_, bool> {
        async move {
            if !self.cx.active() {
                return false;
            }

            let Some((row, col)) = self.find_empty() else {
                return true;
            };

            self.emit(SudokuStep::Visiting { row, col });
            self.cx.pause(Pace::Full).await;

            for digit in 1..=9u8 {
                if !self.cx.active() {
                    return false;
                }

                self.cx.stats.attempts += 1;
                self.emit(SudokuStep::TryingDigit { row, col, digit });
                self.cx.pause(Pace::Full).await;

                if self.is_valid(row, col, digit) {
                    self.working[row][col] = digit;
                    self.cx.stats.cells_filled += 1;
                    self.emit(SudokuStep::Placed { row, col, digit });
                    self.cx.pause(Pace::Full).await;

                    if self.solve().await {
                        return true;
                    }
                    if !self.cx.active() {
                        return false;
                    }

                    self.cx.stats.backtracks += 1;
                    self.cx.stats.cells_filled -= 1;
                    self.working[row][col] = 0;
                    self.emit(SudokuStep::Backtrack { row, col });
                    self.cx.pause(Pace::Full).await;
                } else {
                    let conflicts = self.conflicting_cells(row, col, digit);
                    self.emit(SudokuStep::Conflict {
                        row,
                        col,
                        digit,
                        conflicts,
                    });
                    self.cx.pause(Pace::Full).await;
                }
            }
            false
        }
        .boxed()
    }

    pub async fn run(mut self) -> Outcome {
        let solved = self.solve().await;
        if !self.cx.active() {
            return Outcome::Cancelled;
        }
        let stats = self.cx.stats;
        self.cx.finish(RunSummary::Sudoku {
            solved,
            grid: self.working,
            attempts: stats.attempts,
            backtracks: stats.backtracks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::running_ctx;
    use crate::presets::sudoku_preset;

    fn assert_solved_grid(grid: &[[u8; 9]; 9]) {
        for row in 0..9 {
            for col in 0..9 {
                let digit = grid[row][col];
                assert!((1..=9).contains(&digit), "blank cell at ({row}, {col})");
                for i in 0..9 {
                    assert!(!(grid[row][i] == digit && i != col), "row duplicate");
                    assert!(!(grid[i][col] == digit && i != row), "column duplicate");
                }
                let (br, bc) = (row / 3 * 3, col / 3 * 3);
                for r in br..br + 3 {
                    for c in bc..bc + 3 {
                        assert!(
                            !(grid[r][c] == digit && (r, c) != (row, col)),
                            "block duplicate"
                        );
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn solves_the_easy_preset_and_keeps_the_givens() {
        let givens = sudoku_preset("easy").unwrap();
        let (cx, _ctrl, _rx) = running_ctx();
        let outcome = SudokuEngine::new(SudokuInput { givens }, cx).run().await;
        match outcome {
            Outcome::Completed(RunSummary::Sudoku { solved, grid, .. }) => {
                assert!(solved);
                assert_solved_grid(&grid);
                for row in 0..9 {
                    for col in 0..9 {
                        if givens[row][col] != 0 {
                            assert_eq!(grid[row][col], givens[row][col]);
                        }
                    }
                }
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn an_already_complete_grid_succeeds_without_attempts() {
        let givens = sudoku_preset("easy").unwrap();
        let (cx, _ctrl, _rx) = running_ctx();
        let solved_grid = match SudokuEngine::new(SudokuInput { givens }, cx).run().await {
            Outcome::Completed(RunSummary::Sudoku { grid, .. }) => grid,
            other => panic!("unexpected outcome: {other:?}"),
        };

        let (cx, _ctrl, _rx) = running_ctx();
        match SudokuEngine::new(SudokuInput { givens: solved_grid }, cx)
            .run()
            .await
        {
            Outcome::Completed(RunSummary::Sudoku {
                solved, attempts, ..
            }) => {
                assert!(solved);
                assert_eq!(attempts, 0);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn contradictory_grid_reports_unsolved() {
        // (0,2) is the first blank scanned and admits no digit: 1-8 clash
        // along the row, 9 clashes down the column. The root cell failing
        // means the whole search fails immediately.
        let mut givens = [[0u8; 9]; 9];
        givens[0] = [1, 2, 0, 3, 4, 5, 6, 7, 8];
        givens[1][2] = 9;
        let (cx, _ctrl, _rx) = running_ctx();
        match SudokuEngine::new(SudokuInput { givens }, cx).run().await {
            Outcome::Completed(RunSummary::Sudoku { solved, .. }) => assert!(!solved),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn conflicting_cells_names_the_clashing_coordinates() {
        let mut givens = [[0u8; 9]; 9];
        givens[0][0] = 5;
        givens[2][2] = 7;
        let (cx, _ctrl, _rx) = running_ctx();
        let engine = SudokuEngine::new(SudokuInput { givens }, cx);
        // Same row.
        assert_eq!(engine.conflicting_cells(0, 4, 5), vec![(0, 0)]);
        // Same column.
        assert_eq!(engine.conflicting_cells(7, 0, 5), vec![(0, 0)]);
        // Same block, different row and column.
        assert_eq!(engine.conflicting_cells(1, 1, 7), vec![(2, 2)]);
        assert!(engine.conflicting_cells(5, 5, 3).is_empty());
    }
}
