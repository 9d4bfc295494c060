//! Run lifecycle flag and pacing primitive shared between an engine task and
//! the outside world (controller, CLI, tests).

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::time::Duration;

use crate::model::StartError;

/// Lifecycle of a single visualizer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Cancelled,
    Completed,
}

impl RunState {
    fn from_u8(v: u8) -> RunState {
        match v {
            1 => RunState::Running,
            2 => RunState::Cancelled,
            3 => RunState::Completed,
            _ => RunState::Idle,
        }
    }
}

/// Shared run flag. The engine polls `is_active` at every step boundary;
/// stop requests are observed there, never mid-wait.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    state: Arc<AtomicU8>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Transition into Running. Fails if a run is already active; any other
    /// state (Idle, Cancelled, Completed) is a valid launch point.
    pub fn start(&self) -> Result<(), StartError> {
        let prev = self.state.swap(RunState::Running as u8, Ordering::AcqRel);
        if prev == RunState::Running as u8 {
            // Someone else was already running; leave the flag as-is.
            Err(StartError::AlreadyRunning)
        } else {
            Ok(())
        }
    }

    /// Cancel an active run. No effect (and no error) in any other state.
    pub fn request_stop(&self) {
        let _ = self.state.compare_exchange(
            RunState::Running as u8,
            RunState::Cancelled as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Mark natural termination. Only applies while still Running, so a
    /// cancelled run can never be re-reported as completed. Returns whether
    /// the transition happened.
    pub fn complete(&self) -> bool {
        self.state
            .compare_exchange(
                RunState::Running as u8,
                RunState::Completed as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Explicit reset: cancels an active run, otherwise returns to Idle.
    pub fn reset(&self) {
        if self.is_active() {
            self.request_stop();
        } else {
            self.state.store(RunState::Idle as u8, Ordering::Release);
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.load(Ordering::Acquire) == RunState::Running as u8
    }
}

/// Relative length of a pacing pause. The ratios are the ones the step
/// animations are tuned around: a full beat for placements and comparisons,
/// half for settle/undo, a third for the brief "trying" highlight, double to
/// let a found solution sink in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    Full,
    Half,
    Brief,
    Double,
}

/// Awaitable delay scaled by a shared, mutable speed setting (milliseconds).
/// The speed is read at the start of every wait, so changes apply to the next
/// pause rather than retroactively. A pending stop request does not interrupt
/// an in-flight wait; callers poll `RunControl` after resuming.
#[derive(Debug, Clone)]
pub struct Pacer {
    speed_ms: Arc<AtomicU64>,
}

impl Pacer {
    pub fn new(speed_ms: u64) -> Self {
        Self {
            speed_ms: Arc::new(AtomicU64::new(speed_ms)),
        }
    }

    pub fn set_speed(&self, speed_ms: u64) {
        self.speed_ms.store(speed_ms, Ordering::Relaxed);
    }

    pub async fn wait(&self, pace: Pace) {
        let base = self.speed_ms.load(Ordering::Relaxed);
        let ms = match pace {
            Pace::Full => base,
            Pace::Half => base / 2,
            Pace::Brief => base / 3,
            Pace::Double => base.saturating_mul(2),
        };
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_rejected_while_running() {
        let ctrl = RunControl::new();
        ctrl.start().unwrap();
        assert_eq!(ctrl.start(), Err(StartError::AlreadyRunning));
        assert!(ctrl.is_active());
    }

    #[test]
    fn stop_cancels_only_an_active_run() {
        let ctrl = RunControl::new();
        // Idempotent no-op outside Running.
        ctrl.request_stop();
        assert_eq!(ctrl.state(), RunState::Idle);

        ctrl.start().unwrap();
        ctrl.request_stop();
        assert_eq!(ctrl.state(), RunState::Cancelled);
        ctrl.request_stop();
        assert_eq!(ctrl.state(), RunState::Cancelled);
    }

    #[test]
    fn complete_never_overwrites_a_cancel() {
        let ctrl = RunControl::new();
        ctrl.start().unwrap();
        ctrl.request_stop();
        assert!(!ctrl.complete());
        assert_eq!(ctrl.state(), RunState::Cancelled);
    }

    #[test]
    fn restart_is_allowed_from_terminal_states() {
        let ctrl = RunControl::new();
        ctrl.start().unwrap();
        ctrl.complete();
        assert!(ctrl.start().is_ok());
        ctrl.request_stop();
        assert!(ctrl.start().is_ok());
    }

    #[test]
    fn reset_returns_terminal_states_to_idle() {
        let ctrl = RunControl::new();
        ctrl.start().unwrap();
        ctrl.complete();
        ctrl.reset();
        assert_eq!(ctrl.state(), RunState::Idle);

        ctrl.start().unwrap();
        ctrl.reset();
        assert_eq!(ctrl.state(), RunState::Cancelled);
    }

    #[tokio::test]
    async fn zero_speed_waits_resolve_promptly() {
        let pacer = Pacer::new(0);
        pacer.wait(Pace::Full).await;
        pacer.set_speed(1);
        pacer.wait(Pace::Brief).await;
        pacer.wait(Pace::Double).await;
    }

    #[tokio::test(start_paused = true)]
    async fn speed_changes_apply_to_the_next_wait_not_the_current_one() {
        let pacer = Pacer::new(1_000);
        let waiter = {
            let pacer = pacer.clone();
            tokio::spawn(async move { pacer.wait(Pace::Full).await })
        };
        // Let the sleep register before changing the speed.
        tokio::task::yield_now().await;
        pacer.set_speed(1);

        tokio::time::advance(Duration::from_millis(999)).await;
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished(), "in-flight wait was shortened");

        tokio::time::advance(Duration::from_millis(1)).await;
        waiter.await.unwrap();

        let start = tokio::time::Instant::now();
        pacer.wait(Pace::Full).await;
        assert_eq!(start.elapsed(), Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_requests_never_interrupt_an_in_flight_wait() {
        let ctrl = RunControl::new();
        ctrl.start().unwrap();
        let pacer = Pacer::new(100);
        let waiter = {
            let pacer = pacer.clone();
            tokio::spawn(async move { pacer.wait(Pace::Full).await })
        };
        tokio::task::yield_now().await;
        ctrl.request_stop();

        tokio::time::advance(Duration::from_millis(99)).await;
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished(), "wait was cut short by the stop");

        tokio::time::advance(Duration::from_millis(1)).await;
        waiter.await.unwrap();
        // The stop is only observable at the checkpoint after the wait.
        assert!(!ctrl.is_active());
        assert_eq!(ctrl.state(), RunState::Cancelled);
    }
}
