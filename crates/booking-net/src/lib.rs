//! Wire protocol plumbing for the booking services
//!
//! The three services talk a minimal HTTP/1.0-like protocol over raw TCP: one
//! request per connection, a status line, `Content-Type` and `Content-Length`
//! headers, and a plain-text body.
//!
//! # Architecture
//!
//! ```text
//!   ServiceClient ──TCP──> Server (accept loop, bounded)
//!                            |
//!                            v
//!                     Request (parser)
//!                            |
//!                            v
//!                     Handler (service logic)
//!                            |
//!                            v
//!                     Response (status + text)
//! ```
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use booking_net::{Server, ServerOptions, ServiceClient};
//!
//! let server = Server::bind("127.0.0.1:8082", ServerOptions::default()).await?;
//! tokio::spawn(server.run(handler));
//!
//! let client = ServiceClient::new("127.0.0.1:8082");
//! let response = client.get("/check", &[("name", "yoga".to_string())]).await?;
//! ```

pub mod client;
pub mod request;
pub mod response;
pub mod server;

pub use client::ServiceClient;
pub use request::{Method, Params, Request};
pub use response::{Outcome, Response, Status};
pub use server::{Handler, Server, ServerOptions};

/// Protocol constants
pub mod constants {
    /// Upper bound on one inbound request, headers and body together
    pub const READ_BUFFER_SIZE: usize = 8192;

    /// Version token written on every request and status line
    pub const PROTOCOL_VERSION: &str = "HTTP/1.0";

    /// Every body is plain text
    pub const CONTENT_TYPE: &str = "text/plain";

    /// Default deadline for dialing a peer, in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 5;

    /// Default deadline for reading a peer response, in seconds
    pub const READ_TIMEOUT_SECS: u64 = 10;
}

/// Locate the blank line ending the header block.
///
/// Returns `(head_len, terminator_len)`; both CRLF and bare LF line endings
/// are accepted.
pub(crate) fn find_header_end(buf: &[u8]) -> Option<(usize, usize)> {
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| (i, 4));
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|i| (i, 2));
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Value of the `Content-Length` header in a header block, if any
pub(crate) fn content_length(head: &str) -> Option<usize> {
    head.lines().skip(1).find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_header_end() {
        assert_eq!(find_header_end(b"GET / HTTP/1.0\r\n\r\n"), Some((14, 4)));
        assert_eq!(find_header_end(b"GET / HTTP/1.0\n\nbody"), Some((14, 2)));
        assert_eq!(find_header_end(b"GET / HTTP/1.0\r\n"), None);
    }

    #[test]
    fn test_content_length() {
        let head = "POST /add HTTP/1.0\r\nContent-Type: application/json\r\ncontent-length: 12";
        assert_eq!(content_length(head), Some(12));
        assert_eq!(content_length("GET / HTTP/1.0"), None);
    }
}
