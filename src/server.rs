//! Listener-facing surfaces: the WebSocket fan-out hub and the HTTP
//! endpoint serving the most recent record.
//!
//! Both run on their own threads so the tick loop never waits on a
//! subscriber. Binding either port is the only fatal failure; everything
//! after startup is per-client and isolated.

use crate::record::Record;
use crate::traits::RecordPublisher;
use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use tiny_http::{Header, Response};
use tungstenite::{accept, Message, WebSocket};

const GREETING: &str = r#"{"status":"connected"}"#;
const EMPTY_BODY: &str = r#"{"time":null,"latency":null,"confidence":null,"trigger":false}"#;

/// Fan-out of records to connected WebSocket clients.
///
/// Clients are registered by the accept thread and written to by the tick
/// thread on publish. A client whose send fails is dropped; there is no
/// queueing for slow or disconnected clients.
pub struct WsHub {
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
}

impl Default for WsHub {
    fn default() -> Self {
        Self::new()
    }
}

impl WsHub {
    pub fn new() -> Self {
        WsHub {
            clients: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Bind the WebSocket port and start accepting clients in the
    /// background. Returns the bound address; the bind itself is the only
    /// failure surfaced to the caller.
    pub fn listen(&self, port: u16) -> Result<SocketAddr> {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .with_context(|| format!("failed to bind WebSocket port {}", port))?;
        let addr = listener.local_addr()?;
        info!("WebSocket server listening on {}", addr);

        let clients = Arc::clone(&self.clients);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                match accept(stream) {
                    Ok(mut websocket) => {
                        info!("WebSocket client connected");
                        let _ = websocket.send(Message::Text(GREETING.into()));
                        if let Ok(mut clients) = clients.lock() {
                            clients.push(websocket);
                        }
                    }
                    Err(e) => warn!("WebSocket handshake failed: {}", e),
                }
            }
        });

        Ok(addr)
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl RecordPublisher for WsHub {
    fn publish(&self, record: &Record) {
        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                warn!("record serialization failed: {}", e);
                return;
            }
        };

        let Ok(mut clients) = self.clients.lock() else {
            return;
        };
        clients.retain_mut(|websocket| match websocket.send(Message::Text(json.clone().into())) {
            Ok(()) => true,
            Err(e) => {
                info!("WebSocket client dropped: {}", e);
                false
            }
        });
    }
}

/// Serve the most recent record over HTTP. `GET /` and `GET /latest`
/// return it as JSON; before the first tick completes, a placeholder with
/// null fields and `trigger:false`.
pub fn serve_latest(port: u16, latest: Arc<RwLock<Option<Record>>>) -> Result<SocketAddr> {
    let server = tiny_http::Server::http(("0.0.0.0", port))
        .map_err(|e| anyhow!("failed to bind HTTP port {}: {}", port, e))?;
    let addr = match server.server_addr().to_ip() {
        Some(addr) => addr,
        None => SocketAddr::from(([0, 0, 0, 0], port)),
    };
    info!("HTTP status endpoint listening on {}", addr);

    thread::spawn(move || {
        for request in server.incoming_requests() {
            let response = match request.url() {
                "/" | "/latest" => {
                    let body = latest
                        .read()
                        .map(|guard| latest_body(&guard))
                        .unwrap_or_else(|_| EMPTY_BODY.to_string());
                    json_response(body)
                }
                _ => Response::from_string("404 Not Found").with_status_code(404),
            };
            let _ = request.respond(response);
        }
    });

    Ok(addr)
}

fn latest_body(latest: &Option<Record>) -> String {
    match latest {
        Some(record) => {
            serde_json::to_string(record).unwrap_or_else(|_| EMPTY_BODY.to_string())
        }
        None => EMPTY_BODY.to_string(),
    }
}

fn json_response(body: String) -> Response<std::io::Cursor<Vec<u8>>> {
    let mut response = Response::from_string(body);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response = response.with_header(header);
    }
    response
}
