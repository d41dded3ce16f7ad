//! Caption service: routes inbound messages to sessions and their workers.

use crate::caption::templates;
use crate::caption::{CaptionMode, CaptionResult};
use crate::config::Config;
use crate::error::{Result, SigncapError};
use crate::ipc::protocol::{InboundMessage, OutboundMessage, frame_from_wire};
use crate::pipeline::runner::CaptionPipeline;
use crate::pipeline::worker::SessionWorker;
use crate::session::{SessionKey, SessionRegistry};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Owns a session registry and one worker per active session.
///
/// Captions for every session leave through the single `outbound` channel.
pub struct CaptionService {
    pipeline: Arc<CaptionPipeline>,
    registry: SessionRegistry,
    workers: HashMap<SessionKey, SessionWorker>,
    outbound: mpsc::Sender<OutboundMessage>,
    queue_depth: usize,
    idle_timeout: Duration,
    wait_for_queue: bool,
}

impl CaptionService {
    pub fn new(
        config: &Config,
        pipeline: Arc<CaptionPipeline>,
        outbound: mpsc::Sender<OutboundMessage>,
    ) -> Self {
        Self {
            pipeline,
            registry: SessionRegistry::new(config.window.frames, config.session.default_style),
            workers: HashMap::new(),
            outbound,
            queue_depth: config.session.queue_depth,
            idle_timeout: Duration::from_secs(config.session.idle_timeout_secs),
            wait_for_queue: false,
        }
    }

    /// Makes full session queues delay ingestion instead of dropping windows.
    ///
    /// For offline input, where frames arrive faster than real time.
    pub fn with_backpressure(mut self) -> Self {
        self.wait_for_queue = true;
        self
    }

    /// Parses and handles one wire line. Bad input is logged and dropped.
    pub async fn handle_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        let result = match InboundMessage::parse_line(line) {
            Ok(message) => self.handle_message(message).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("Dropping message: {}", e);
        }
    }

    /// Handles one inbound message.
    ///
    /// Errors only describe the rejected message; the service stays usable.
    pub async fn handle_message(&mut self, message: InboundMessage) -> Result<()> {
        let key = message.key();
        match message {
            InboundMessage::Frame {
                ts, hands, style, ..
            } => {
                let frame = frame_from_wire(ts, &hands)?;
                if let Some(style) = style {
                    self.registry.set_style(&key, style);
                }
                if let Some(window) = self.registry.ingest(&key, frame) {
                    let wait = self.wait_for_queue;
                    let worker = self.worker(&key);
                    if wait {
                        worker.submit_wait(window).await;
                    } else {
                        worker.submit(window);
                    }
                }
                Ok(())
            }
            InboundMessage::Correction {
                ts,
                incorrect_token,
                correct_token,
                ..
            } => {
                let correct =
                    match self
                        .registry
                        .handle_correction(&key, &incorrect_token, &correct_token)
                    {
                        Ok(token) => token,
                        Err(e @ SigncapError::UnknownToken { .. }) => {
                            warn!("Session {} correction ignored: {}", key, e);
                            return Ok(());
                        }
                        Err(e) => return Err(e),
                    };
                let ack = CaptionResult {
                    caption: templates::correction_ack(correct),
                    confidence: 1.0,
                    mode: CaptionMode::Template,
                    ts,
                };
                self.emit(OutboundMessage::caption(&key, ack, 0)).await
            }
            InboundMessage::Reset { .. } => {
                self.registry.touch(&key);
                if let Some(worker) = self.workers.get_mut(&key) {
                    worker.reset();
                }
                Ok(())
            }
            InboundMessage::End { .. } => {
                self.end_session(&key);
                Ok(())
            }
        }
    }

    fn worker(&mut self, key: &SessionKey) -> &mut SessionWorker {
        let Self {
            pipeline,
            registry,
            workers,
            outbound,
            queue_depth,
            ..
        } = self;
        workers.entry(key.clone()).or_insert_with(|| {
            SessionWorker::spawn(
                key.clone(),
                Arc::clone(pipeline),
                registry.profile(key),
                *queue_depth,
                outbound.clone(),
            )
        })
    }

    async fn emit(&self, message: OutboundMessage) -> Result<()> {
        self.outbound
            .send(message)
            .await
            .map_err(|_| SigncapError::Server {
                message: "caption output closed".to_string(),
            })
    }

    /// Frees the session and abandons any caption still being produced.
    pub fn end_session(&mut self, key: &SessionKey) {
        self.registry.end_session(key);
        if let Some(worker) = self.workers.remove(key) {
            worker.abort();
        }
    }

    /// Ends sessions idle past the configured timeout.
    pub fn sweep_idle(&mut self) -> Vec<SessionKey> {
        let expired = self.registry.expire_idle(self.idle_timeout);
        for key in &expired {
            if let Some(worker) = self.workers.remove(key) {
                worker.abort();
            }
        }
        expired
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    /// Lets every worker finish its queued windows, then stops.
    pub async fn shutdown(self) {
        let count = self.workers.len();
        for (_, worker) in self.workers {
            worker.finish().await;
        }
        debug!("Caption service stopped ({} workers drained)", count);
    }
}
