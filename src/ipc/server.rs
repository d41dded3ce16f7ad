//! Async TCP server speaking JSON lines.
//!
//! Each connection gets its own [`CaptionService`]; sessions from different
//! connections never share state. The classifier and polisher are shared.

use crate::config::Config;
use crate::defaults;
use crate::error::{Result, SigncapError};
use crate::ipc::protocol::OutboundMessage;
use crate::pipeline::{CaptionPipeline, CaptionService};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Caption server bound to a TCP address.
pub struct CaptionServer {
    listener: TcpListener,
    config: Arc<Config>,
    pipeline: Arc<CaptionPipeline>,
}

impl CaptionServer {
    /// Binds to `addr`. Use port 0 to let the OS pick one.
    pub async fn bind(addr: &str, config: Config, pipeline: Arc<CaptionPipeline>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| SigncapError::Server {
                message: format!("Failed to bind to {}: {}", addr, e),
            })?;
        Ok(Self {
            listener,
            config: Arc::new(config),
            pipeline,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!("Listening on {}", self.local_addr()?);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down server");
                    break;
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = accepted.map_err(|e| SigncapError::Server {
                        message: format!("Failed to accept connection: {}", e),
                    })?;
                    let config = Arc::clone(&self.config);
                    let pipeline = Arc::clone(&self.pipeline);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, config, pipeline).await {
                            warn!("Connection {} failed: {}", peer, e);
                        }
                    });
                }
            }
        }

        Ok(())
    }
}

/// Serves one client until it closes its side, then drains pending captions.
async fn handle_connection(
    stream: TcpStream,
    config: Arc<Config>,
    pipeline: Arc<CaptionPipeline>,
) -> Result<()> {
    let peer = stream.peer_addr()?;
    info!("Client {} connected", peer);

    let (reader, writer) = stream.into_split();
    let (tx, rx) = mpsc::channel(defaults::OUTBOUND_BUFFER);
    let writer_task = tokio::spawn(write_captions(writer, rx));

    let mut service = CaptionService::new(&config, pipeline, tx);
    let mut lines = BufReader::new(reader).lines();
    let mut sweep = tokio::time::interval(Duration::from_secs(defaults::IDLE_SWEEP_INTERVAL_SECS));

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => service.handle_line(&line).await,
                Ok(None) => break,
                Err(e) => {
                    warn!("Client {} read error: {}", peer, e);
                    break;
                }
            },
            _ = sweep.tick() => {
                let expired = service.sweep_idle();
                if !expired.is_empty() {
                    debug!("Client {}: {} idle session(s) ended", peer, expired.len());
                }
            }
        }
    }

    service.shutdown().await;
    match writer_task.await {
        Ok(result) => result?,
        Err(e) => warn!("Client {} writer task failed: {}", peer, e),
    }
    info!("Client {} disconnected", peer);
    Ok(())
}

async fn write_captions(
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::Receiver<OutboundMessage>,
) -> Result<()> {
    while let Some(message) = rx.recv().await {
        let json = message.to_json().map_err(|e| SigncapError::Server {
            message: format!("Failed to serialize caption: {}", e),
        })?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption::{CaptionMode, MockPolisher};
    use tokio::io::AsyncReadExt;

    async fn start_server(config: Config) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
        let pipeline =
            CaptionPipeline::from_config(&config, Arc::new(MockPolisher::new())).unwrap();
        let server = CaptionServer::bind("127.0.0.1:0", config, Arc::new(pipeline))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(server.run_until(async {
            let _ = stop_rx.await;
        }));
        (addr, stop_tx)
    }

    fn frame_line(ts: i64) -> String {
        format!(
            "{{\"type\":\"frame\",\"session\":\"call\",\"user\":\"ana\",\"ts\":{},\"hands\":[]}}\n",
            ts
        )
    }

    #[tokio::test]
    async fn test_bind_reports_local_addr() {
        let config = Config::default();
        let pipeline =
            CaptionPipeline::from_config(&config, Arc::new(MockPolisher::new())).unwrap();
        let server = CaptionServer::bind("127.0.0.1:0", config, Arc::new(pipeline))
            .await
            .unwrap();
        assert!(server.local_addr().unwrap().port() > 0);
    }

    #[tokio::test]
    async fn test_bind_failure_is_server_error() {
        let config = Config::default();
        let pipeline =
            CaptionPipeline::from_config(&config, Arc::new(MockPolisher::new())).unwrap();
        let result = CaptionServer::bind("not an address", config, Arc::new(pipeline)).await;
        assert!(matches!(result, Err(SigncapError::Server { .. })));
    }

    #[tokio::test]
    async fn test_client_receives_caption_for_full_window() {
        let (addr, _stop) = start_server(Config::default()).await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let mut payload = String::from("garbage line\n");
        for ts in 0..10 {
            payload.push_str(&frame_line(ts * 100));
        }
        stream.write_all(payload.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        let lines: Vec<&str> = response.lines().collect();
        assert_eq!(lines.len(), 1, "got: {:?}", lines);

        let OutboundMessage::Caption {
            session,
            user,
            ts,
            caption,
            mode,
            hands_detected,
            ..
        } = OutboundMessage::from_json(lines[0]).unwrap();
        assert_eq!((session.as_str(), user.as_str()), ("call", "ana"));
        assert_eq!(ts, 900);
        assert_eq!(caption, defaults::NO_SIGNING_CAPTION);
        assert_eq!(mode, CaptionMode::Template);
        assert_eq!(hands_detected, 0);
    }

    #[tokio::test]
    async fn test_partial_window_produces_nothing() {
        let (addr, _stop) = start_server(Config::default()).await;
        let mut stream = TcpStream::connect(addr).await.unwrap();
        for ts in 0..9 {
            stream.write_all(frame_line(ts).as_bytes()).await.unwrap();
        }
        stream.shutdown().await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.is_empty());
    }
}
