//! Inbound request parsing
//!
//! A request is a request line (`<METHOD> <path>[?<query>] [<version>]`),
//! optional headers, a blank line and an optional body. Fields may arrive in
//! the query string or as a flat JSON object in the body; both are merged
//! into one [`Params`] view, body fields winning.

use crate::{content_length, find_header_end};
use booking_core::{AppError, AppResult};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Request method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    fn parse(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            _ => Method::Other(token.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
            Method::Other(m) => f.write_str(m),
        }
    }
}

/// Parsed inbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,

    /// Raw query string, without the leading `?`
    pub query: String,

    pub body: String,
}

impl Request {
    /// Parse a complete request.
    ///
    /// A missing header terminator is tolerated (the whole input is the
    /// header block); a missing version token is tolerated too.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let (head, body) = match find_header_end(raw.as_bytes()) {
            Some((end, term)) => (&raw[..end], &raw[end + term..]),
            None => (raw, ""),
        };

        let request_line = head
            .lines()
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .ok_or_else(|| AppError::Protocol("empty request".to_string()))?;

        let mut parts = request_line.split_whitespace();
        let method = parts
            .next()
            .map(Method::parse)
            .ok_or_else(|| AppError::Protocol("missing method".to_string()))?;
        let target = parts
            .next()
            .ok_or_else(|| AppError::Protocol(format!("missing path in '{}'", request_line)))?;

        if !target.starts_with('/') {
            return Err(AppError::Protocol(format!("invalid path '{}'", target)));
        }

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };

        let body = content_length(head)
            .and_then(|len| body.get(..len))
            .unwrap_or(body);

        Ok(Self {
            method,
            path: path.to_string(),
            query: query.to_string(),
            body: body.to_string(),
        })
    }

    /// Check whether `buf` holds a whole request.
    ///
    /// With `Content-Length` the body must be fully present. Without it a
    /// non-POST request ends at the header terminator and a POST ends once
    /// its body parses as JSON.
    pub fn is_complete(buf: &[u8]) -> bool {
        let Some((end, term)) = find_header_end(buf) else {
            return false;
        };
        let head = String::from_utf8_lossy(&buf[..end]);
        let body = &buf[end + term..];

        if let Some(len) = content_length(&head) {
            return body.len() >= len;
        }

        let is_post = head
            .split_whitespace()
            .next()
            .is_some_and(|m| m.eq_ignore_ascii_case("POST"));
        if !is_post {
            return true;
        }

        !body.is_empty() && serde_json::from_slice::<Value>(body).is_ok()
    }

    /// Merge query-string and JSON body fields
    pub fn params(&self) -> AppResult<Params> {
        let mut values = HashMap::new();

        for pair in self.query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            values.insert(decode(key)?, decode(value)?);
        }

        if !self.body.trim().is_empty() {
            let json: Value = serde_json::from_str(&self.body)
                .map_err(|e| AppError::Protocol(format!("malformed JSON body: {}", e)))?;
            let Value::Object(fields) = json else {
                return Err(AppError::Protocol(
                    "JSON body must be an object".to_string(),
                ));
            };

            for (key, value) in fields {
                let value = match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null => continue,
                    other => {
                        return Err(AppError::Protocol(format!(
                            "field '{}' must be a scalar, got {}",
                            key, other
                        )))
                    }
                };
                values.insert(key, value);
            }
        }

        Ok(Params { values })
    }
}

fn decode(component: &str) -> AppResult<String> {
    let plus_decoded = component.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(|s| s.into_owned())
        .map_err(|e| AppError::Protocol(format!("bad percent-encoding: {}", e)))
}

/// Request fields keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// First value present under any of `keys`
    pub fn get_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// Required text field; `keys` lists the accepted aliases, canonical first
    pub fn require_str(&self, keys: &[&str]) -> AppResult<String> {
        self.get_any(keys)
            .map(str::to_string)
            .ok_or_else(|| AppError::MissingField(keys.first().copied().unwrap_or("").to_string()))
    }

    /// Required integer field
    pub fn require_i32(&self, keys: &[&str]) -> AppResult<i32> {
        let raw = self.require_str(keys)?;
        raw.trim().parse().map_err(|_| {
            AppError::Validation(format!(
                "{} must be an integer, got '{}'",
                keys.first().copied().unwrap_or(""),
                raw
            ))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_form() {
        let req = Request::parse("GET /reserve?name=R1&day=1&hour=9&duration=2 HTTP/1.0\r\n\r\n")
            .unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/reserve");

        let params = req.params().unwrap();
        assert_eq!(params.get("name"), Some("R1"));
        assert_eq!(params.require_i32(&["duration"]).unwrap(), 2);
    }

    #[test]
    fn test_parse_json_body_with_aliases() {
        let raw = "POST /reserve HTTP/1.0\r\nContent-Length: 45\r\n\r\n\
                   {\"room_name\":\"R 1\",\"day\":\"3\",\"hour\":10,\"x\":1}";
        let req = Request::parse(raw).unwrap();
        assert_eq!(req.method, Method::Post);

        let params = req.params().unwrap();
        assert_eq!(params.require_str(&["name", "room_name"]).unwrap(), "R 1");
        assert_eq!(params.require_i32(&["day"]).unwrap(), 3);
        assert_eq!(params.require_i32(&["hour"]).unwrap(), 10);
    }

    #[test]
    fn test_percent_decoding() {
        let req = Request::parse("GET /add?name=Sala%20A+B HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(req.params().unwrap().get("name"), Some("Sala A B"));
    }

    #[test]
    fn test_missing_and_malformed_fields() {
        let params = Request::parse("GET /check?day=x HTTP/1.0\r\n\r\n")
            .unwrap()
            .params()
            .unwrap();
        assert!(matches!(
            params.require_str(&["name"]),
            Err(AppError::MissingField(_))
        ));
        assert!(matches!(
            params.require_i32(&["day"]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_requests() {
        assert!(matches!(Request::parse(""), Err(AppError::Protocol(_))));
        assert!(matches!(Request::parse("GARBAGE\r\n\r\n"), Err(AppError::Protocol(_))));
        assert!(matches!(
            Request::parse("GET nopath HTTP/1.0\r\n\r\n"),
            Err(AppError::Protocol(_))
        ));

        let req = Request::parse("POST /add HTTP/1.0\r\n\r\n{not json").unwrap();
        assert!(matches!(req.params(), Err(AppError::Protocol(_))));

        let req = Request::parse("POST /add HTTP/1.0\r\n\r\n[1,2]").unwrap();
        assert!(matches!(req.params(), Err(AppError::Protocol(_))));
    }

    #[test]
    fn test_is_complete() {
        assert!(!Request::is_complete(b"GET /health HTTP/1.0\r\n"));
        assert!(Request::is_complete(b"GET /health HTTP/1.0\r\n\r\n"));
        assert!(!Request::is_complete(
            b"POST /add HTTP/1.0\r\nContent-Length: 10\r\n\r\n{\"a\":"
        ));
        assert!(Request::is_complete(
            b"POST /add HTTP/1.0\r\nContent-Length: 6\r\n\r\n{\"a\":1"
        ));
        assert!(!Request::is_complete(b"POST /add HTTP/1.0\r\n\r\n{\"name\":"));
        assert!(Request::is_complete(b"POST /add HTTP/1.0\r\n\r\n{\"name\":\"R1\"}"));
    }
}
