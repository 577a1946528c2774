//! Bounded TCP server
//!
//! Accepts connections, admits at most `max_connections` at once, reads one
//! request per connection under a deadline, hands it to a [`Handler`], writes
//! the response and closes.

use crate::constants::READ_BUFFER_SIZE;
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use booking_core::config::ServerConfig;
use booking_core::{AppError, AppResult};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

/// Service logic behind a listener
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, request: Request) -> Response;
}

/// Admission and deadline settings
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub max_connections: usize,
    pub read_timeout: Duration,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            max_connections: config.max_connections.max(1),
            read_timeout: config.read_timeout(),
        }
    }
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            max_connections: 64,
            read_timeout: Duration::from_secs(30),
        }
    }
}

pub struct Server {
    listener: TcpListener,
    options: ServerOptions,
}

impl Server {
    pub async fn bind(addr: &str, options: ServerOptions) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, options })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the accept loop. Per-connection failures are logged and never end
    /// the loop.
    pub async fn run<H: Handler + ?Sized>(self, handler: Arc<H>) -> std::io::Result<()> {
        let local = self.listener.local_addr()?;
        info!(
            "Listening on {} (max {} connections)",
            local, self.options.max_connections
        );

        let permits = Arc::new(Semaphore::new(self.options.max_connections));

        loop {
            let permit = match permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    warn!("Connection semaphore closed, stopping accept loop");
                    return Ok(());
                }
            };

            match self.listener.accept().await {
                Ok((socket, peer)) => {
                    let conn_id = Uuid::new_v4();
                    debug!("Connection {} accepted from {}", conn_id, peer);

                    let handler = handler.clone();
                    let read_timeout = self.options.read_timeout;
                    let span = tracing::info_span!("connection", id = %conn_id, %peer);

                    tokio::spawn(
                        async move {
                            if let Err(e) =
                                handle_connection(socket, handler.as_ref(), read_timeout).await
                            {
                                error!("Error handling connection from {}: {}", peer, e);
                            }
                            drop(permit);
                        }
                        .instrument(span),
                    );
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

async fn handle_connection<H: Handler + ?Sized>(
    mut socket: TcpStream,
    handler: &H,
    read_timeout: Duration,
) -> AppResult<()> {
    let raw = match read_request(&mut socket, read_timeout).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("Peer closed without sending a request");
            return Ok(());
        }
        Err(e) => {
            warn!("Rejecting request: {}", e);
            let response = Response::from_error(&e);
            socket.write_all(&response.to_bytes()).await?;
            socket.shutdown().await?;
            return Ok(());
        }
    };

    let response = match Request::parse(&String::from_utf8_lossy(&raw)) {
        Ok(request) => {
            debug!("{} {}", request.method, request.path);
            handler.handle(request).await
        }
        Err(e) => {
            warn!("Malformed request: {}", e);
            Response::from_error(&e)
        }
    };

    debug!("Responding {}", response.status);
    socket.write_all(&response.to_bytes()).await?;
    socket.shutdown().await?;
    Ok(())
}

/// Read until the request is complete, the peer stops sending, or the
/// deadline passes; a partial request is still returned for parsing.
async fn read_request(socket: &mut TcpStream, read_timeout: Duration) -> AppResult<Option<Vec<u8>>> {
    let mut buf = BytesMut::with_capacity(1024);

    let read = timeout(read_timeout, async {
        loop {
            let n = socket.read_buf(&mut buf).await?;
            if n == 0 || Request::is_complete(&buf) {
                return Ok::<(), AppError>(());
            }
            if buf.len() > READ_BUFFER_SIZE {
                return Err(AppError::Protocol(format!(
                    "request exceeds {} bytes",
                    READ_BUFFER_SIZE
                )));
            }
        }
    })
    .await;

    match read {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e),
        Err(_) if buf.is_empty() => {
            debug!("Read timed out before any data arrived");
            return Ok(None);
        }
        Err(_) => debug!("Read timed out, parsing {} buffered bytes", buf.len()),
    }

    if buf.is_empty() {
        return Ok(None);
    }
    Ok(Some(buf.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ServiceClient;
    use crate::response::Status;

    struct Echo;

    #[async_trait]
    impl Handler for Echo {
        async fn handle(&self, request: Request) -> Response {
            match request.params() {
                Ok(params) => Response::ok(format!(
                    "{} {}\n",
                    request.path,
                    params.get("name").unwrap_or("-")
                )),
                Err(e) => Response::from_error(&e),
            }
        }
    }

    async fn start(options: ServerOptions) -> String {
        let server = Server::bind("127.0.0.1:0", options).await.unwrap();
        let addr = server.local_addr().unwrap().to_string();
        tokio::spawn(server.run(Arc::new(Echo)));
        addr
    }

    #[tokio::test]
    async fn test_round_trip_over_tcp() {
        let addr = start(ServerOptions::default()).await;
        let response = ServiceClient::new(addr)
            .get("/add", &[("name", "R1".to_string())])
            .await
            .unwrap();
        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.body, "/add R1\n");
    }

    #[tokio::test]
    async fn test_json_body_without_content_length() {
        let addr = start(ServerOptions::default()).await;
        let raw = ServiceClient::new(addr)
            .send_raw(b"POST /add HTTP/1.0\r\n\r\n{\"name\":\"R2\"}")
            .await
            .unwrap();
        let response = Response::parse(&raw).unwrap();
        assert_eq!(response.body, "/add R2\n");
    }

    #[tokio::test]
    async fn test_malformed_request_gets_400_and_server_survives() {
        let addr = start(ServerOptions::default()).await;
        let client = ServiceClient::new(addr);

        let raw = client.send_raw(b"NONSENSE\r\n\r\n").await.unwrap();
        assert_eq!(Response::parse(&raw).unwrap().status, Status::BadRequest);

        let response = client.get("/health", &[]).await.unwrap();
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_empty_connection_closed_without_response() {
        let addr = start(ServerOptions::default()).await;

        let mut socket = TcpStream::connect(&addr).await.unwrap();
        socket.shutdown().await.unwrap();
        let mut reply = Vec::new();
        socket.read_to_end(&mut reply).await.unwrap();
        assert!(reply.is_empty());

        let response = ServiceClient::new(addr).get("/health", &[]).await.unwrap();
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_partial_request_parsed_after_read_timeout() {
        let addr = start(ServerOptions {
            max_connections: 4,
            read_timeout: Duration::from_millis(100),
        })
        .await;

        // no header terminator: the server parses what arrived once the deadline passes
        let raw = ServiceClient::new(addr)
            .send_raw(b"GET /check?name=yoga HTTP/1.0")
            .await
            .unwrap();
        assert_eq!(Response::parse(&raw).unwrap().body, "/check yoga\n");
    }
}
