use crate::control::Pace;
use crate::engine::StepCtx;
use crate::model::{MatMulInput, MatMulStep, Outcome, RunSummary, StepDetail};

/// Naive triple-loop matrix product, one multiply-accumulate per observable
/// step, with a half-length settle after each committed cell.
pub(crate) struct MatMulEngine {
    a: Vec<Vec<i64>>,
    b: Vec<Vec<i64>>,
    product: Vec<Vec<i64>>,
    cx: StepCtx,
}

impl MatMulEngine {
    pub fn new(input: MatMulInput, cx: StepCtx) -> Self {
        let n = input.a.len();
        Self {
            a: input.a,
            b: input.b,
            product: vec![vec![0; n]; n],
            cx,
        }
    }

    fn emit(&self, step: MatMulStep) {
        self.cx.emit(StepDetail::MatMul(step));
    }

    pub async fn run(mut self) -> Outcome {
        let n = self.a.len();
        for row in 0..n {
            for col in 0..n {
                if !self.cx.active() {
                    return Outcome::Cancelled;
                }

                self.emit(MatMulStep::CellStarted { row, col });
                let mut sum = 0i64;
                for k in 0..n {
                    if !self.cx.active() {
                        return Outcome::Cancelled;
                    }

                    self.cx.stats.operations += 1;
                    let a = self.a[row][k];
                    let b = self.b[k][col];
                    let product = a * b;
                    sum += product;
                    self.emit(MatMulStep::Accumulate {
                        row,
                        col,
                        k,
                        a,
                        b,
                        product,
                        partial_sum: sum,
                    });
                    self.cx.pause(Pace::Full).await;
                }

                self.product[row][col] = sum;
                self.emit(MatMulStep::CellCommitted {
                    row,
                    col,
                    value: sum,
                });
                self.cx.pause(Pace::Half).await;
            }
        }

        let operations = self.cx.stats.operations;
        self.cx.finish(RunSummary::MatMul {
            product: self.product,
            operations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::running_ctx;

    fn reference_product(a: &[Vec<i64>], b: &[Vec<i64>]) -> Vec<Vec<i64>> {
        let n = a.len();
        let mut c = vec![vec![0i64; n]; n];
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    c[i][j] += a[i][k] * b[k][j];
                }
            }
        }
        c
    }

    #[tokio::test]
    async fn product_matches_the_direct_computation() {
        let a = vec![vec![2, 7, 1], vec![4, 0, 3], vec![5, 6, 9]];
        let b = vec![vec![1, 3, 8], vec![2, 4, 6], vec![7, 5, 0]];
        let expected = reference_product(&a, &b);

        let (cx, _ctrl, _rx) = running_ctx();
        let outcome = MatMulEngine::new(MatMulInput { a, b }, cx).run().await;
        match outcome {
            Outcome::Completed(RunSummary::MatMul {
                product,
                operations,
            }) => {
                assert_eq!(product, expected);
                assert_eq!(operations, 27);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn one_by_one_matrix_commits_a_single_cell() {
        let (cx, _ctrl, _rx) = running_ctx();
        let outcome = MatMulEngine::new(
            MatMulInput {
                a: vec![vec![6]],
                b: vec![vec![7]],
            },
            cx,
        )
        .run()
        .await;
        match outcome {
            Outcome::Completed(RunSummary::MatMul {
                product,
                operations,
            }) => {
                assert_eq!(product, vec![vec![42]]);
                assert_eq!(operations, 1);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
