//! OCPP 1.6 WebSocket server
//!
//! A single listener serves both charge points and the supervisory UI.
//! Every accepted connection gets a charger slot eagerly; a connection that
//! identifies itself with the UI handshake is re-homed to the operator
//! slot. Inbound frames for a connection are processed serially on its own
//! task, so each session sees its traffic in receive order.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::gateway::{OperatorGateway, OPERATOR_HELLO};
use crate::handlers::ChargerHandler;
use crate::registry::{SharedRegistry, OPERATOR_SLOT};
use crate::storage::TelemetrySink;
use crate::support::shutdown::ShutdownSignal;

/// OCPP 1.6 WebSocket subprotocol
const OCPP_SUBPROTOCOL: &str = "ocpp1.6";

/// Connection handles are process-unique and never reused.
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// OCPP WebSocket Server
pub struct OcppServer {
    config: ServerConfig,
    registry: SharedRegistry,
    telemetry: Arc<dyn TelemetrySink>,
    shutdown_signal: Option<ShutdownSignal>,
}

impl OcppServer {
    pub fn new(
        config: ServerConfig,
        registry: SharedRegistry,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            config,
            registry,
            telemetry,
            shutdown_signal: None,
        }
    }

    /// Set the shutdown signal for graceful shutdown
    pub fn with_shutdown(mut self, signal: ShutdownSignal) -> Self {
        self.shutdown_signal = Some(signal);
        self
    }

    /// Start the WebSocket server
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = self.config.address();
        let listener = TcpListener::bind(&addr).await?;

        info!("OCPP 1.6 Central System started on ws://{}", addr);

        match &self.shutdown_signal {
            Some(shutdown) => self.run_with_shutdown(listener, shutdown.clone()).await,
            None => self.run_loop(listener).await,
        }
    }

    async fn run_loop(
        &self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        while let Ok((stream, addr)) = listener.accept().await {
            self.spawn_connection(stream, addr);
        }
        Ok(())
    }

    async fn run_with_shutdown(
        &self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            self.spawn_connection(stream, addr);
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                        }
                    }
                }
                _ = shutdown.notified().wait() => {
                    info!("WebSocket server received shutdown signal");
                    return Ok(());
                }
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let registry = self.registry.clone();
        let telemetry = self.telemetry.clone();
        let shutdown = self.shutdown_signal.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, addr, registry, telemetry, shutdown).await {
                error!("Connection error from {}: {}", addr, e);
            }
        });
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }
}

/// Handle a single WebSocket connection
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    registry: SharedRegistry,
    telemetry: Arc<dyn TelemetrySink>,
    shutdown: Option<ShutdownSignal>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("New connection from: {}", addr);

    let ws_stream = tokio_tungstenite::accept_hdr_async(
        stream,
        |req: &Request, mut response: Response| {
            let requested_protocols = req
                .headers()
                .get("Sec-WebSocket-Protocol")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");

            let supports_ocpp16 = requested_protocols
                .split(',')
                .map(|s| s.trim())
                .any(|p| p == OCPP_SUBPROTOCOL);

            if supports_ocpp16 {
                response
                    .headers_mut()
                    .insert("Sec-WebSocket-Protocol", OCPP_SUBPROTOCOL.parse().unwrap());
            } else if !requested_protocols.is_empty() {
                warn!(
                    "Client does not support {}, requested: {}",
                    OCPP_SUBPROTOCOL, requested_protocols
                );
            }

            Ok(response)
        },
    )
    .await?;

    let handle = NEXT_HANDLE.fetch_add(1, Ordering::SeqCst);
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // A freshly accepted connection is assumed to be a charger until the
    // UI handshake says otherwise.
    let mut handler = registry
        .assign_charger(handle, tx.clone())
        .map(|slot| ChargerHandler::new(&slot, registry.clone(), telemetry.clone()));
    let gateway = OperatorGateway::new(registry.clone());

    // Outgoing message sender task
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            info!(handle, "-> {}", msg);
            if let Err(e) = ws_sender.send(Message::Text(msg)).await {
                error!(handle, "Send error: {}", e);
                break;
            }
        }
    });

    // Incoming message receiver task
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    info!(handle, "<- {}", text);

                    if text == OPERATOR_HELLO {
                        // The connection is the supervisory UI; its eager
                        // charger slot goes back to the pool.
                        gateway.attach_operator(handle, tx.clone()).await;
                        handler = None;
                    } else if OperatorGateway::is_command(&text) {
                        gateway.handle_command(&text).await;
                    } else if let Some(charger) = &handler {
                        if let Some(reply) = charger.handle(&text).await {
                            if tx.send(reply).is_err() {
                                break;
                            }
                        }
                    } else {
                        warn!(handle, "frame from an unregistered connection ignored");
                    }
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(frame)) => {
                    info!(handle, "Close frame received: {:?}", frame);
                    break;
                }
                Ok(Message::Binary(data)) => {
                    warn!(handle, "Binary message received ({} bytes), ignoring", data.len());
                }
                Ok(Message::Frame(_)) => {}
                Err(e) => {
                    error!(handle, "WebSocket error: {}", e);
                    break;
                }
            }
        }
    });

    // Wait for tasks or shutdown
    if let Some(shutdown) = shutdown {
        tokio::select! {
            _ = send_task => {},
            _ = recv_task => {},
            _ = shutdown.notified().wait() => {
                info!(handle, "Connection closing due to server shutdown");
            }
        }
    } else {
        tokio::select! {
            _ = send_task => {},
            _ = recv_task => {},
        }
    }

    // Cleanup: free the slot and, for a charger, tell the UI the slot is
    // empty again.
    if let Some(freed) = registry.release_handle(handle) {
        if freed != OPERATOR_SLOT {
            OperatorGateway::new(registry.clone()).publish_offline(freed);
        }
    }

    info!(handle, "Disconnected ({})", addr);

    Ok(())
}
