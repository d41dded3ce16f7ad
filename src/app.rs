//! Application entry points: the caption server and offline classification.

use crate::caption::{DisabledPolisher, Polisher, polisher_from_config};
use crate::config::Config;
use crate::defaults;
use crate::error::{Result, SigncapError};
use crate::ipc::protocol::OutboundMessage;
use crate::ipc::server::CaptionServer;
use crate::pipeline::{CaptionPipeline, CaptionService};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Run the caption server until Ctrl-C.
pub async fn run_serve(config: Config) -> Result<()> {
    let polisher = polisher_from_config(&config.polish)?;
    info!(
        "Starting signcap {} (polisher: {}, window: {} frames, debug tokens: {})",
        crate::version_string(),
        polisher.name(),
        config.window.frames,
        config.debug_tokens
    );
    let pipeline = Arc::new(CaptionPipeline::from_config(&config, polisher)?);
    let listen = config.server.listen.clone();
    let server = CaptionServer::bind(&listen, config, pipeline).await?;
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
}

/// Caption newline-delimited wire messages without any network calls.
///
/// Every window is processed; none are dropped for arriving too fast.
pub async fn classify_lines(config: &Config, input: &str) -> Result<Vec<OutboundMessage>> {
    let polisher: Arc<dyn Polisher> = Arc::new(DisabledPolisher);
    classify_lines_with(config, polisher, input).await
}

/// [`classify_lines`] with an explicit polisher.
pub async fn classify_lines_with(
    config: &Config,
    polisher: Arc<dyn Polisher>,
    input: &str,
) -> Result<Vec<OutboundMessage>> {
    let pipeline = Arc::new(CaptionPipeline::from_config(config, polisher)?);
    let (tx, mut rx) = mpsc::channel(defaults::OUTBOUND_BUFFER);
    let collector = tokio::spawn(async move {
        let mut out = Vec::new();
        while let Some(message) = rx.recv().await {
            out.push(message);
        }
        out
    });

    let mut service = CaptionService::new(config, pipeline, tx).with_backpressure();
    for line in input.lines() {
        service.handle_line(line).await;
    }
    service.shutdown().await;

    collector
        .await
        .map_err(|e| SigncapError::Other(format!("caption collector failed: {}", e)))
}

/// Run the classify command: read `path` (or stdin for `-`) and print captions.
pub async fn run_classify(config: &Config, path: &Path) -> Result<()> {
    let input = if path == Path::new("-") {
        tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin()))
            .await
            .map_err(|e| SigncapError::Other(e.to_string()))??
    } else {
        tokio::fs::read_to_string(path).await?
    };

    for message in classify_lines(config, &input).await? {
        let json = message
            .to_json()
            .map_err(|e| SigncapError::Other(e.to_string()))?;
        println!("{}", json);
    }
    Ok(())
}
