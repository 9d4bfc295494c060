use crate::control::Pace;
use crate::engine::StepCtx;
use crate::model::{Outcome, RunSummary, SearchInput, SearchStep, StepDetail};

/// Left-to-right scan over the sequence, one comparison per observable step.
pub(crate) struct SearchEngine {
    input: SearchInput,
    cx: StepCtx,
}

impl SearchEngine {
    pub fn new(input: SearchInput, cx: StepCtx) -> Self {
        Self { input, cx }
    }

    fn emit(&self, step: SearchStep) {
        self.cx.emit(StepDetail::Search(step));
    }

    pub async fn run(mut self) -> Outcome {
        let target = self.input.target;
        for (index, &value) in self.input.values.iter().enumerate() {
            if !self.cx.active() {
                return Outcome::Cancelled;
            }

            self.cx.stats.comparisons += 1;
            self.emit(SearchStep::Comparing {
                index,
                value,
                target,
            });
            self.cx.pause(Pace::Full).await;

            if !self.cx.active() {
                return Outcome::Cancelled;
            }

            if value == target {
                self.emit(SearchStep::Found { index });
                return self.cx.finish(RunSummary::Search {
                    found: Some(index),
                    comparisons: self.cx.stats.comparisons,
                });
            }

            self.emit(SearchStep::Mismatch { index, value });
            self.cx.pause(Pace::Half).await;
        }

        self.emit(SearchStep::NotFound);
        self.cx.finish(RunSummary::Search {
            found: None,
            comparisons: self.cx.stats.comparisons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::running_ctx;
    use crate::model::SearchInput;

    async fn run_search(values: Vec<i64>, target: i64) -> Outcome {
        let (cx, _ctrl, _rx) = running_ctx();
        SearchEngine::new(SearchInput { values, target }, cx)
            .run()
            .await
    }

    #[tokio::test]
    async fn reports_the_smallest_matching_index() {
        // 9 appears twice; the scan must stop at index 2.
        let outcome = run_search(vec![3, 7, 9, 1, 9], 9).await;
        match outcome {
            Outcome::Completed(RunSummary::Search { found, comparisons }) => {
                assert_eq!(found, Some(2));
                assert_eq!(comparisons, 3);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn absent_target_checks_every_element() {
        let outcome = run_search(vec![5, 1, 8, 2], 4).await;
        match outcome {
            Outcome::Completed(RunSummary::Search { found, comparisons }) => {
                assert_eq!(found, None);
                assert_eq!(comparisons, 4);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn pre_cancelled_control_yields_cancelled() {
        let (cx, ctrl, _rx) = running_ctx();
        ctrl.request_stop();
        let outcome = SearchEngine::new(
            SearchInput {
                values: vec![1, 2, 3],
                target: 2,
            },
            cx,
        )
        .run()
        .await;
        assert!(matches!(outcome, Outcome::Cancelled));
    }
}
