use futures::future::BoxFuture;
use futures::FutureExt;

use crate::control::Pace;
use crate::engine::StepCtx;
use crate::model::{Outcome, QueensInput, QueensMode, QueensStep, RunSummary, StepDetail};

/// Row-by-row backtracking over an n×n board. First-solution mode
/// short-circuits as soon as a full placement is reached; find-all mode keeps
/// exploring the whole tree and only counts.
pub(crate) struct QueensEngine {
    n: usize,
    mode: QueensMode,
    board: Vec<Vec<u8>>,
    cx: StepCtx,
}

impl QueensEngine {
    pub fn new(input: QueensInput, cx: StepCtx) -> Self {
        Self {
            n: input.n,
            mode: input.mode,
            board: vec![vec![0; input.n]; input.n],
            cx,
        }
    }

    fn emit(&self, step: QueensStep) {
        self.cx.emit(StepDetail::Queens(step));
    }

    /// Linear scan of the placed rows: same column, then both upper
    /// diagonals. Rows below `row` are still empty.
    fn is_safe(&self, row: usize, col: usize) -> bool {
        for r in 0..row {
            if self.board[r][col] == 1 {
                return false;
            }
        }
        let (mut r, mut c) = (row, col);
        while r > 0 && c > 0 {
            r -= 1;
            c -= 1;
            if self.board[r][c] == 1 {
                return false;
            }
        }
        let (mut r, mut c) = (row, col);
        while r > 0 && c + 1 < self.n {
            r -= 1;
            c += 1;
            if self.board[r][c] == 1 {
                return false;
            }
        }
        true
    }

    fn solve(&mut self, row: usize) -> BoxFuture<'_, bool> {
        async move {
            if row == self.n {
                self.cx.stats.solutions += 1;
                self.emit(QueensStep::SolutionFound {
                    ordinal: self.cx.stats.solutions,
                    board: self.board.clone(),
                });
                return match self.mode {
                    QueensMode::FirstSolution => true,
                    QueensMode::FindAll => {
                        // Let the solution sink in, then keep searching.
                        self.cx.pause(Pace::Double).await;
                        false
                    }
                };
            }

            for col in 0..self.n {
                if !self.cx.active() {
                    return false;
                }

                self.cx.stats.attempts += 1;
                self.emit(QueensStep::Trying { row, col });
                self.cx.pause(Pace::Brief).await;

                if self.is_safe(row, col) {
                    self.board[row][col] = 1;
                    self.emit(QueensStep::Placed {
                        row,
                        col,
                        board: self.board.clone(),
                    });
                    self.cx.pause(Pace::Full).await;

                    if self.solve(row + 1).await {
                        return true;
                    }
                    if !self.cx.active() {
                        return false;
                    }

                    self.cx.stats.backtracks += 1;
                    self.board[row][col] = 0;
                    self.emit(QueensStep::Removed { row, col });
                    self.cx.pause(Pace::Half).await;
                } else {
                    self.emit(QueensStep::Conflict { row, col });
                    self.cx.pause(Pace::Half).await;
                }
            }
            false
        }
        .boxed()
    }

    pub async fn run(mut self) -> Outcome {
        let solved = self.solve(0).await;
        if !self.cx.active() {
            return Outcome::Cancelled;
        }
        let solved = match self.mode {
            QueensMode::FirstSolution => solved,
            QueensMode::FindAll => self.cx.stats.solutions > 0,
        };
        let stats = self.cx.stats;
        self.cx.finish(RunSummary::Queens {
            mode: self.mode,
            solved,
            solutions: stats.solutions,
            attempts: stats.attempts,
            backtracks: stats.backtracks,
            board: self.board,
        })
    }
}
