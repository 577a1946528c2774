//! Peer adapters used by the Reservation service
//!
//! Implement the coordinator seams by calling the Activity and Room services
//! over the wire protocol. Each call dials a fresh connection.

use async_trait::async_trait;
use booking_core::{models::Slot, AppError, AppResult};
use booking_net::{Outcome, Response, ServiceClient};
use tracing::{debug, instrument, warn};

use crate::coordinator::{ActivityDirectory, SlotHoldOutcome, SlotReserver};

fn slot_params(room: &str, slot: &Slot) -> Vec<(&'static str, String)> {
    vec![
        ("name", room.to_string()),
        ("day", slot.day.to_string()),
        ("hour", slot.hour.to_string()),
        ("duration", slot.duration.to_string()),
    ]
}

fn unexpected(peer: &str, path: &str, response: &Response) -> AppError {
    AppError::Upstream(format!(
        "{}{} answered {}: {}",
        peer,
        path,
        response.status,
        response.body.trim()
    ))
}

/// Activity service client
#[derive(Debug, Clone)]
pub struct RemoteActivityDirectory {
    client: ServiceClient,
}

impl RemoteActivityDirectory {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }
}

#[async_trait]
impl ActivityDirectory for RemoteActivityDirectory {
    #[instrument(skip(self))]
    async fn activity_exists(&self, name: &str) -> AppResult<bool> {
        let response = self
            .client
            .get("/check", &[("name", name.to_string())])
            .await?;

        match response.outcome() {
            Outcome::Success => Ok(true),
            Outcome::NotFound => Ok(false),
            other => {
                warn!("Activity check answered {:?}, treating as unknown", other);
                Ok(false)
            }
        }
    }
}

/// Room service client
#[derive(Debug, Clone)]
pub struct RemoteRoomService {
    client: ServiceClient,
}

impl RemoteRoomService {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    /// Free start-hours of `room` on `day`, as reported by the Room service
    #[instrument(skip(self))]
    pub async fn available_hours(&self, room: &str, day: i32) -> AppResult<Vec<i32>> {
        let response = self
            .client
            .get(
                "/checkavailability",
                &[("name", room.to_string()), ("day", day.to_string())],
            )
            .await?;

        match response.outcome() {
            Outcome::Success => parse_hours(&response.body),
            Outcome::NotFound => Err(AppError::RoomNotFound(room.to_string())),
            Outcome::BadRequest => Err(AppError::InvalidRange(response.body.trim().to_string())),
            _ => Err(unexpected(self.client.addr(), "/checkavailability", &response)),
        }
    }
}

#[async_trait]
impl SlotReserver for RemoteRoomService {
    #[instrument(skip(self), fields(slot = %slot))]
    async fn hold_slot(&self, room: &str, slot: &Slot) -> AppResult<SlotHoldOutcome> {
        let response = self.client.get("/reserve", &slot_params(room, slot)).await?;
        debug!("Room service answered {}", response.status);

        match response.outcome() {
            Outcome::Success => Ok(SlotHoldOutcome::Held),
            Outcome::NotFound => Ok(SlotHoldOutcome::RoomNotFound),
            Outcome::Forbidden => Ok(SlotHoldOutcome::Conflict),
            Outcome::BadRequest => Ok(SlotHoldOutcome::Invalid),
            Outcome::Unexpected(_) => Err(unexpected(self.client.addr(), "/reserve", &response)),
        }
    }

    #[instrument(skip(self), fields(slot = %slot))]
    async fn release_slot(&self, room: &str, slot: &Slot) -> AppResult<()> {
        let response = self.client.get("/release", &slot_params(room, slot)).await?;

        match response.outcome() {
            Outcome::Success => Ok(()),
            Outcome::NotFound => Err(AppError::ReservationNotFound(format!("{} {}", room, slot))),
            _ => Err(unexpected(self.client.addr(), "/release", &response)),
        }
    }
}

/// Parse a space-separated list of hour labels
pub fn parse_hours(body: &str) -> AppResult<Vec<i32>> {
    body.split_whitespace()
        .map(|token| {
            token
                .parse()
                .map_err(|_| AppError::Protocol(format!("bad hour label '{}'", token)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_parse_hours() {
        assert_eq!(parse_hours("9 12 13\n").unwrap(), vec![9, 12, 13]);
        assert!(parse_hours("").unwrap().is_empty());
        assert!(matches!(parse_hours("9 ten"), Err(AppError::Protocol(_))));
    }

    async fn peer_answering(reply: &'static str) -> ServiceClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 512];
            let _ = socket.read(&mut buf).await.unwrap();
            socket.write_all(reply.as_bytes()).await.unwrap();
        });
        ServiceClient::new(addr)
    }

    #[tokio::test]
    async fn test_hold_outcomes_follow_status() {
        let cases = [
            ("HTTP/1.0 200 OK\r\n\r\n", SlotHoldOutcome::Held),
            ("HTTP/1.0 404 Not Found\r\n\r\n", SlotHoldOutcome::RoomNotFound),
            ("HTTP/1.0 403 Forbidden\r\n\r\n", SlotHoldOutcome::Conflict),
            ("HTTP/1.0 400 Bad Request\r\n\r\n", SlotHoldOutcome::Invalid),
        ];
        for (reply, expected) in cases {
            let rooms = RemoteRoomService::new(peer_answering(reply).await);
            let outcome = rooms.hold_slot("R1", &Slot::new(1, 9, 1)).await.unwrap();
            assert_eq!(outcome, expected);
        }
    }

    #[tokio::test]
    async fn test_unexpected_status_is_upstream_error() {
        let rooms = RemoteRoomService::new(
            peer_answering("HTTP/1.0 500 Internal Server Error\r\n\r\n").await,
        );
        assert!(matches!(
            rooms.hold_slot("R1", &Slot::new(1, 9, 1)).await,
            Err(AppError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn test_activity_lookup() {
        let found = RemoteActivityDirectory::new(peer_answering("HTTP/1.0 200 OK\r\n\r\n").await);
        assert!(found.activity_exists("yoga").await.unwrap());

        let missing =
            RemoteActivityDirectory::new(peer_answering("HTTP/1.0 404 Not Found\r\n\r\n").await);
        assert!(!missing.activity_exists("yoga").await.unwrap());
    }
}
