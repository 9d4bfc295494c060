mod linear_search;
mod matmul;
mod nqueens;
mod sudoku;
mod tsp;

use crate::control::{Pace, Pacer, RunControl, RunState};
use crate::model::{
    Outcome, ProblemInput, RunSummary, Snapshot, StartError, StepDetail, VisEvent,
};
use crate::stats::Stats;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum EngineControl {
    /// Cancel the run entirely
    Cancel,
    /// Change the pacing speed (milliseconds per full pause)
    SetSpeed(u64),
}

/// Per-run context shared by all engines: counters, snapshot emission,
/// cancellation checkpoints, and pacing. This is the only channel through
/// which algorithm state leaves an engine.
pub(crate) struct StepCtx {
    pub stats: Stats,
    event_tx: mpsc::UnboundedSender<VisEvent>,
    ctrl: RunControl,
    pacer: Pacer,
}

impl StepCtx {
    fn new(event_tx: mpsc::UnboundedSender<VisEvent>, ctrl: RunControl, pacer: Pacer) -> Self {
        Self {
            stats: Stats::default(),
            event_tx,
            ctrl,
            pacer,
        }
    }

    /// True while no stop has been requested. Engines call this at every step
    /// boundary, before mutating state or pacing.
    pub fn active(&self) -> bool {
        self.ctrl.is_active()
    }

    /// Emit one observable step with a copy of the current counters.
    pub fn emit(&self, detail: StepDetail) {
        let _ = self.event_tx.send(VisEvent::Step(Snapshot {
            stats: self.stats,
            detail,
        }));
    }

    pub async fn pause(&self, pace: Pace) {
        self.pacer.wait(pace).await;
    }

    /// Close out a naturally-terminated run. If a stop request raced in after
    /// the last checkpoint, the cancellation wins.
    pub fn finish(&self, summary: RunSummary) -> Outcome {
        if self.ctrl.complete() {
            Outcome::Completed(summary)
        } else {
            Outcome::Cancelled
        }
    }
}

pub(crate) async fn run_engine(input: ProblemInput, cx: StepCtx) -> Outcome {
    match input {
        ProblemInput::Search(input) => linear_search::SearchEngine::new(input, cx).run().await,
        ProblemInput::MatMul(input) => matmul::MatMulEngine::new(input, cx).run().await,
        ProblemInput::Queens(input) => nqueens::QueensEngine::new(input, cx).run().await,
        ProblemInput::Sudoku(input) => sudoku::SudokuEngine::new(input, cx).run().await,
        ProblemInput::Tsp(input) => tsp::TspEngine::new(input, cx).run().await,
    }
}

/// Handle for a spawned run: a control channel plus the join handle that
/// yields the final outcome.
#[derive(Debug)]
pub struct RunHandle {
    ctrl_tx: mpsc::UnboundedSender<EngineControl>,
    pub handle: tokio::task::JoinHandle<Outcome>,
}

impl RunHandle {
    pub fn control(&self) -> mpsc::UnboundedSender<EngineControl> {
        self.ctrl_tx.clone()
    }
}

/// One visualizer instance. Owns the run flag and the speed setting; at most
/// one run may be active at a time.
pub struct Visualizer {
    ctrl: RunControl,
    pacer: Pacer,
}

impl Visualizer {
    pub fn new(speed_ms: u64) -> Self {
        Self {
            ctrl: RunControl::new(),
            pacer: Pacer::new(speed_ms),
        }
    }

    /// Validate the input and spawn the engine task. Fails synchronously on
    /// malformed input or if a run is already active; the run itself cannot
    /// error after this point.
    pub fn start(
        &self,
        input: ProblemInput,
        event_tx: mpsc::UnboundedSender<VisEvent>,
    ) -> Result<RunHandle, StartError> {
        input.validate()?;
        self.ctrl.start()?;

        let _ = event_tx.send(VisEvent::RunStarted {
            algorithm: input.algorithm(),
        });

        let (ctrl_tx, mut ctrl_rx) = mpsc::unbounded_channel::<EngineControl>();

        // Control listener, mirroring the stop/speed commands onto the shared
        // run flag and pacer.
        let ctrl = self.ctrl.clone();
        let pacer = self.pacer.clone();
        let listener = tokio::spawn(async move {
            while let Some(msg) = ctrl_rx.recv().await {
                match msg {
                    EngineControl::SetSpeed(ms) => pacer.set_speed(ms),
                    EngineControl::Cancel => {
                        ctrl.request_stop();
                        break;
                    }
                }
            }
        });

        let cx = StepCtx::new(event_tx, self.ctrl.clone(), self.pacer.clone());
        let handle = tokio::spawn(async move {
            let outcome = run_engine(input, cx).await;
            // Abort the listener before returning; dropping a JoinHandle does
            // not cancel the task, and it would otherwise keep waiting on the
            // control channel after the run is over.
            listener.abort();
            outcome
        });

        Ok(RunHandle { ctrl_tx, handle })
    }

    /// Request cancellation. Observed at the engine's next checkpoint;
    /// idempotent when nothing is running.
    pub fn request_stop(&self) {
        self.ctrl.request_stop();
    }

    /// Takes effect at the start of the next pacing wait.
    pub fn set_speed(&self, speed_ms: u64) {
        self.pacer.set_speed(speed_ms);
    }

    pub fn state(&self) -> RunState {
        self.ctrl.state()
    }

    pub fn reset(&self) {
        self.ctrl.reset();
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a zero-delay context wired to a fresh Running control, returning
    /// the control and the event receiver alongside it.
    pub fn running_ctx() -> (StepCtx, RunControl, mpsc::UnboundedReceiver<VisEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let ctrl = RunControl::new();
        ctrl.start().unwrap();
        let cx = StepCtx::new(event_tx, ctrl.clone(), Pacer::new(0));
        (cx, ctrl, event_rx)
    }

    /// Drain every snapshot currently buffered in the receiver.
    pub fn drain_steps(rx: &mut mpsc::UnboundedReceiver<VisEvent>) -> Vec<Snapshot> {
        let mut steps = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if let VisEvent::Step(s) = ev {
                steps.push(s);
            }
        }
        steps
    }
}
