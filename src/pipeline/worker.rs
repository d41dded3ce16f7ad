//! Per-session worker task.
//!
//! Each session gets one task that owns its smoothing history and processes
//! that session's windows strictly in arrival order. Sessions never wait on
//! each other; a slow polish call only delays captions for its own session.

use crate::ipc::protocol::OutboundMessage;
use crate::landmarks::LandmarkWindow;
use crate::pipeline::runner::CaptionPipeline;
use crate::session::{SessionKey, SharedProfile};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Work queued for one session, processed in order.
#[derive(Debug)]
pub enum WorkerCommand {
    /// Caption a window, clearing history first when `reset_first` is set.
    Window {
        window: LandmarkWindow,
        reset_first: bool,
    },
    Reset,
}

/// Handle to a running session worker.
pub struct SessionWorker {
    key: SessionKey,
    tx: mpsc::Sender<WorkerCommand>,
    handle: JoinHandle<()>,
    /// A reset that found the queue full and rides on the next window.
    pending_reset: bool,
}

impl SessionWorker {
    /// Spawns the worker on the current tokio runtime.
    pub fn spawn(
        key: SessionKey,
        pipeline: Arc<CaptionPipeline>,
        profile: SharedProfile,
        queue_depth: usize,
        outbound: mpsc::Sender<OutboundMessage>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(queue_depth.max(1));
        let handle = tokio::spawn(run_worker(key.clone(), pipeline, profile, rx, outbound));
        Self {
            key,
            tx,
            handle,
            pending_reset: false,
        }
    }

    fn window_command(&self, window: LandmarkWindow) -> WorkerCommand {
        WorkerCommand::Window {
            window,
            reset_first: self.pending_reset,
        }
    }

    /// Queues a window without waiting. Returns `false` if it was dropped.
    pub fn submit(&mut self, window: LandmarkWindow) -> bool {
        match self.tx.try_send(self.window_command(window)) {
            Ok(()) => {
                self.pending_reset = false;
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!("Session {} is behind, dropping window", self.key);
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Session {} worker has stopped, dropping window", self.key);
                false
            }
        }
    }

    /// Queues a window, waiting for space if the session is behind.
    pub async fn submit_wait(&mut self, window: LandmarkWindow) {
        let command = self.window_command(window);
        if self.tx.send(command).await.is_err() {
            warn!("Session {} worker has stopped, dropping window", self.key);
        } else {
            self.pending_reset = false;
        }
    }

    /// Resets history behind any queued windows. Never waits.
    ///
    /// When the queue is full the reset is carried by the next window instead.
    pub fn reset(&mut self) {
        if self.pending_reset {
            return;
        }
        match self.tx.try_send(WorkerCommand::Reset) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!("Session {} queue full, deferring reset", self.key);
                self.pending_reset = true;
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Session {} worker has stopped, reset ignored", self.key);
            }
        }
    }

    /// Stops immediately. Queued windows and any in-flight polish are discarded.
    pub fn abort(self) {
        self.handle.abort();
    }

    /// Lets the worker finish queued windows, then waits for it.
    pub async fn finish(self) {
        let Self { key, tx, handle, .. } = self;
        drop(tx);
        match handle.await {
            Err(e) if e.is_panic() => warn!("Session {} worker panicked", key),
            _ => {}
        }
    }
}

async fn run_worker(
    key: SessionKey,
    pipeline: Arc<CaptionPipeline>,
    profile: SharedProfile,
    mut rx: mpsc::Receiver<WorkerCommand>,
    outbound: mpsc::Sender<OutboundMessage>,
) {
    let mut track = pipeline.new_track();
    while let Some(command) = rx.recv().await {
        match command {
            WorkerCommand::Window {
                window,
                reset_first,
            } => {
                if reset_first {
                    debug!("Session {} history reset", key);
                    track.reset();
                }
                let snapshot = profile.snapshot();
                let caption = pipeline.run(&window, &mut track, &snapshot).await;
                let message = OutboundMessage::caption(&key, caption.result, caption.hands_detected);
                if outbound.send(message).await.is_err() {
                    debug!("Session {} output closed, stopping worker", key);
                    break;
                }
            }
            WorkerCommand::Reset => {
                debug!("Session {} history reset", key);
                track.reset();
            }
        }
    }
}
