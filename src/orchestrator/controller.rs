//! Run lifecycle controller.
//!
//! Owns start/stop/restart orchestration and emits events for presentation layers.

use crate::engine::{EngineControl, Visualizer};
use crate::model::{Outcome, ProblemInput, VisEvent};
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Commands emitted by presentation layers to control the running visualizer.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Stop,
    SetSpeed(u64),
    Restart,
    Quit,
}

/// Internal handle for a spawned run task.
struct RunCtx {
    ctrl_tx: UnboundedSender<EngineControl>,
    handle: Option<tokio::task::JoinHandle<Outcome>>,
}

fn start_run(
    vis: &Visualizer,
    input: &ProblemInput,
    event_tx: &UnboundedSender<VisEvent>,
) -> Option<RunCtx> {
    match vis.start(input.clone(), event_tx.clone()) {
        Ok(run) => Some(RunCtx {
            ctrl_tx: run.control(),
            handle: Some(run.handle),
        }),
        Err(e) => {
            let _ = event_tx.send(VisEvent::Info(format!("Start failed: {e}")));
            None
        }
    }
}

/// Drive one visualizer's lifecycle from UI commands, forwarding the final
/// outcome of every run as a `RunFinished` event.
pub(crate) async fn run_controller(
    input: ProblemInput,
    speed_ms: u64,
    event_tx: UnboundedSender<VisEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let vis = Visualizer::new(speed_ms);
    let mut run_ctx = start_run(&vis, &input, &event_tx);
    let mut restart_pending = false;
    let mut quit_pending = false;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Stop) => {
                        if let Some(ctx) = &run_ctx {
                            let _ = ctx.ctrl_tx.send(EngineControl::Cancel);
                            let _ = event_tx.send(VisEvent::Info("Cancelling…".into()));
                        }
                    }
                    Some(UiCommand::SetSpeed(ms)) => {
                        vis.set_speed(ms);
                    }
                    Some(UiCommand::Restart) => {
                        // Restart is serialized: cancel the active run first,
                        // then start a fresh one once completion is observed.
                        // This avoids overlapping runs.
                        if let Some(ctx) = &run_ctx {
                            restart_pending = true;
                            let _ = ctx.ctrl_tx.send(EngineControl::Cancel);
                            let _ = event_tx.send(VisEvent::Info("Cancelling…".into()));
                        } else {
                            vis.reset();
                            run_ctx = start_run(&vis, &input, &event_tx);
                        }
                    }
                    Some(UiCommand::Quit) | None => {
                        // Quit waits for the current run so its outcome is
                        // still reported.
                        quit_pending = true;
                        if let Some(ctx) = &run_ctx {
                            let _ = ctx.ctrl_tx.send(EngineControl::Cancel);
                        } else {
                            break;
                        }
                    }
                }
            }
            // Do not take the JoinHandle before this branch wins; otherwise it
            // can be dropped when another branch is chosen and completion is
            // never observed.
            maybe_done = async {
                if let Some(ctx) = &mut run_ctx {
                    if let Some(h) = ctx.handle.as_mut() {
                        return Some(h.await);
                    }
                }
                futures::future::pending().await
            } => {
                if let Some(join_res) = maybe_done {
                    match join_res {
                        Ok(outcome) => {
                            let _ = event_tx.send(VisEvent::RunFinished {
                                outcome: Box::new(outcome),
                            });
                        }
                        Err(e) => {
                            let _ = event_tx.send(VisEvent::Info(format!(
                                "Run join failed: {e}"
                            )));
                        }
                    }
                    run_ctx = None;
                    if quit_pending {
                        break;
                    }
                    if restart_pending {
                        restart_pending = false;
                        vis.reset();
                        run_ctx = start_run(&vis, &input, &event_tx);
                    }
                }
            }
        }
    }

    Ok(())
}
