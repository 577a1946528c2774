//! Response status and framing

use crate::constants::{CONTENT_TYPE, PROTOCOL_VERSION};
use crate::{content_length, find_header_end};
use booking_core::{AppError, AppResult};
use std::fmt;

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    Forbidden,
    NotFound,
    InternalServerError,
    BadGateway,
    Other(u16),
}

impl Status {
    pub fn from_code(code: u16) -> Self {
        match code {
            200 => Status::Ok,
            400 => Status::BadRequest,
            403 => Status::Forbidden,
            404 => Status::NotFound,
            500 => Status::InternalServerError,
            502 => Status::BadGateway,
            other => Status::Other(other),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::Forbidden => 403,
            Status::NotFound => 404,
            Status::InternalServerError => 500,
            Status::BadGateway => 502,
            Status::Other(code) => *code,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::Forbidden => "Forbidden",
            Status::NotFound => "Not Found",
            Status::InternalServerError => "Internal Server Error",
            Status::BadGateway => "Bad Gateway",
            Status::Other(_) => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

/// How a caller classifies a peer's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    BadRequest,
    Forbidden,
    NotFound,
    Unexpected(u16),
}

/// Plain-text response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub body: String,
}

impl Response {
    pub fn new(status: Status, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(Status::Ok, body)
    }

    /// Response carrying the error's default status and message
    pub fn from_error(err: &AppError) -> Self {
        Self::new(Status::from_code(err.status_code()), format!("{}\n", err))
    }

    /// Response carrying the error's message under an endpoint-specific status
    pub fn error_with_status(status: Status, err: &AppError) -> Self {
        Self::new(status, format!("{}\n", err))
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn outcome(&self) -> Outcome {
        match self.status.code() {
            200 => Outcome::Success,
            400 => Outcome::BadRequest,
            403 => Outcome::Forbidden,
            404 => Outcome::NotFound,
            other => Outcome::Unexpected(other),
        }
    }

    /// Serialize status line, headers and body
    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "{} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n{}",
            PROTOCOL_VERSION,
            self.status,
            CONTENT_TYPE,
            self.body.len(),
            self.body
        )
        .into_bytes()
    }

    /// Parse a response read off the wire.
    ///
    /// The status code is taken from the status line; a body shorter than
    /// its `Content-Length` is returned as far as it was read.
    pub fn parse(raw: &[u8]) -> AppResult<Self> {
        let text = String::from_utf8_lossy(raw);
        let (head, body) = match find_header_end(text.as_bytes()) {
            Some((end, term)) => (&text[..end], &text[end + term..]),
            None => (&*text, ""),
        };

        let status_line = head.lines().next().unwrap_or("").trim();
        let mut parts = status_line.split_whitespace();
        let version = parts.next().unwrap_or("");
        if !version.starts_with("HTTP/") {
            return Err(AppError::Protocol(format!(
                "invalid status line '{}'",
                status_line
            )));
        }

        let code: u16 = parts
            .next()
            .and_then(|c| c.parse().ok())
            .ok_or_else(|| {
                AppError::Protocol(format!("missing status code in '{}'", status_line))
            })?;

        let body = content_length(head)
            .and_then(|len| body.get(..len))
            .unwrap_or(body);

        Ok(Self::new(Status::from_code(code), body))
    }
}
