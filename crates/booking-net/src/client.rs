//! Peer client
//!
//! Every call dials a fresh connection, writes one bare request line with no
//! headers, and reads a bounded response until the peer closes or the
//! declared body has arrived.

use crate::constants::{CONNECT_TIMEOUT_SECS, PROTOCOL_VERSION, READ_BUFFER_SIZE, READ_TIMEOUT_SECS};
use crate::response::Response;
use crate::{content_length, find_header_end};
use booking_core::config::PeersConfig;
use booking_core::{AppError, AppResult};
use bytes::BytesMut;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

/// Client for one peer service
#[derive(Debug, Clone)]
pub struct ServiceClient {
    addr: String,
    connect_timeout: Duration,
    read_timeout: Duration,
    max_response_bytes: usize,
}

impl ServiceClient {
    /// Create a client with default timeouts
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            max_response_bytes: READ_BUFFER_SIZE,
        }
    }

    /// Create a client using the configured peer timeouts
    pub fn with_config(addr: impl Into<String>, peers: &PeersConfig) -> Self {
        Self {
            addr: addr.into(),
            connect_timeout: peers.connect_timeout(),
            read_timeout: peers.read_timeout(),
            max_response_bytes: peers.max_response_bytes,
        }
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Issue `GET <path>?<query> HTTP/1.0` and return the parsed response
    #[instrument(skip(self, params), fields(peer = %self.addr))]
    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> AppResult<Response> {
        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        let request_line = if query.is_empty() {
            format!("GET {} {}\r\n\r\n", path, PROTOCOL_VERSION)
        } else {
            format!("GET {}?{} {}\r\n\r\n", path, query, PROTOCOL_VERSION)
        };

        let raw = self.send_raw(request_line.as_bytes()).await?;
        let response = Response::parse(&raw)?;
        debug!("{} {} -> {}", self.addr, path, response.status);
        Ok(response)
    }

    /// Probe the peer's `/health` endpoint; anything but 200 is a failure
    pub async fn check_health(&self) -> AppResult<()> {
        let response = self.get("/health", &[]).await?;
        if response.is_success() {
            Ok(())
        } else {
            warn!("Health probe of {} answered {}", self.addr, response.status);
            Err(AppError::Transport(format!(
                "health probe of {} answered {}",
                self.addr, response.status
            )))
        }
    }

    /// Write raw bytes and read the raw reply
    pub async fn send_raw(&self, request: &[u8]) -> AppResult<Vec<u8>> {
        let mut stream = timeout(self.connect_timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| AppError::Transport(format!("connect to {} timed out", self.addr)))?
            .map_err(|e| AppError::Transport(format!("connect to {} failed: {}", self.addr, e)))?;

        stream
            .write_all(request)
            .await
            .map_err(|e| AppError::Transport(format!("write to {} failed: {}", self.addr, e)))?;
        stream.flush().await?;

        timeout(self.read_timeout, self.read_response(&mut stream))
            .await
            .map_err(|_| AppError::Transport(format!("read from {} timed out", self.addr)))?
    }

    async fn read_response(&self, stream: &mut TcpStream) -> AppResult<Vec<u8>> {
        let mut buf = BytesMut::with_capacity(self.max_response_bytes.min(READ_BUFFER_SIZE));

        loop {
            let n = stream
                .read_buf(&mut buf)
                .await
                .map_err(|e| AppError::Transport(format!("read from {} failed: {}", self.addr, e)))?;

            if n == 0 || response_complete(&buf) {
                break;
            }
            if buf.len() >= self.max_response_bytes {
                warn!(
                    "Response from {} exceeds {} bytes, truncating",
                    self.addr, self.max_response_bytes
                );
                buf.truncate(self.max_response_bytes);
                break;
            }
        }

        if buf.is_empty() {
            return Err(AppError::Transport(format!(
                "{} closed the connection without a response",
                self.addr
            )));
        }

        Ok(buf.to_vec())
    }
}

fn response_complete(buf: &[u8]) -> bool {
    let Some((end, term)) = find_header_end(buf) else {
        return false;
    };
    let head = String::from_utf8_lossy(&buf[..end]);
    match content_length(&head) {
        Some(len) => buf.len() - end - term >= len,
        None => false,
    }
}
