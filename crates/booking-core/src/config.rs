//! Application configuration
//!
//! Configuration is assembled with the `config` crate from built-in defaults,
//! optional `config/default` and `config/{RUN_MODE}` files, and `BOOKING__*`
//! environment variables (e.g. `BOOKING__ROOM__PORT=9001`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub room: RoomConfig,
    pub activity: ActivityConfig,
    pub reservation: ReservationConfig,
    pub peers: PeersConfig,
    pub database: DatabaseConfig,
}

/// Listener settings shared by all three services
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Maximum number of connections handled at once
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Deadline for reading one inbound request, in seconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> usize {
    num_cpus::get() * 64
}

fn default_read_timeout() -> u64 {
    30
}

/// Room service settings
#[derive(Debug, Deserialize, Clone)]
pub struct RoomConfig {
    #[serde(default = "default_room_port")]
    pub port: u16,

    /// Serialize check-then-reserve per (room, day)
    #[serde(default = "default_serialize_reservations")]
    pub serialize_reservations: bool,
}

fn default_room_port() -> u16 {
    8081
}

fn default_serialize_reservations() -> bool {
    true
}

/// Activity service settings
#[derive(Debug, Deserialize, Clone)]
pub struct ActivityConfig {
    #[serde(default = "default_activity_port")]
    pub port: u16,
}

fn default_activity_port() -> u16 {
    8082
}

/// Reservation service settings
#[derive(Debug, Deserialize, Clone)]
pub struct ReservationConfig {
    #[serde(default = "default_reservation_port")]
    pub port: u16,
}

fn default_reservation_port() -> u16 {
    8083
}

/// Where the Reservation service finds its peers, and how long it waits
#[derive(Debug, Deserialize, Clone)]
pub struct PeersConfig {
    #[serde(default = "default_room_addr")]
    pub room_addr: String,

    #[serde(default = "default_activity_addr")]
    pub activity_addr: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_peer_read_timeout")]
    pub read_timeout_secs: u64,

    /// Upper bound on a peer response
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

fn default_room_addr() -> String {
    "127.0.0.1:8081".to_string()
}

fn default_activity_addr() -> String {
    "127.0.0.1:8082".to_string()
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_peer_read_timeout() -> u64 {
    10
}

fn default_max_response_bytes() -> usize {
    8192
}

/// Store settings; without a URL every service keeps its rows in memory
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL (e.g. "sqlite://{service}.db?mode=rwc"); a
    /// `{service}` placeholder is replaced by the service name so each process
    /// gets its own file
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_db_connections")]
    pub max_connections: u32,
}

fn default_db_connections() -> u32 {
    5
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.max_connections", default_max_connections() as i64)?
            .set_default("server.read_timeout_secs", default_read_timeout() as i64)?
            .set_default("room.port", default_room_port() as i64)?
            .set_default("room.serialize_reservations", true)?
            .set_default("activity.port", default_activity_port() as i64)?
            .set_default("reservation.port", default_reservation_port() as i64)?
            .set_default("peers.room_addr", default_room_addr())?
            .set_default("peers.activity_addr", default_activity_addr())?
            .set_default("peers.connect_timeout_secs", default_connect_timeout() as i64)?
            .set_default("peers.read_timeout_secs", default_peer_read_timeout() as i64)?
            .set_default("peers.max_response_bytes", default_max_response_bytes() as i64)?
            .set_default("database.max_connections", default_db_connections() as i64)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with BOOKING_ prefix
            .add_source(
                Environment::with_prefix("BOOKING")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("BOOKING").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Bind address for a service listening on `port`
    pub fn bind_addr(&self, port: u16) -> String {
        format!("{}:{}", self.server.host, port)
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

impl DatabaseConfig {
    /// Connection URL for one service, if a store is configured
    pub fn url_for(&self, service: &str) -> Option<String> {
        self.url
            .as_ref()
            .map(|url| url.replace("{service}", service))
    }
}

impl PeersConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                max_connections: default_max_connections(),
                read_timeout_secs: default_read_timeout(),
            },
            room: RoomConfig {
                port: default_room_port(),
                serialize_reservations: default_serialize_reservations(),
            },
            activity: ActivityConfig {
                port: default_activity_port(),
            },
            reservation: ReservationConfig {
                port: default_reservation_port(),
            },
            peers: PeersConfig {
                room_addr: default_room_addr(),
                activity_addr: default_activity_addr(),
                connect_timeout_secs: default_connect_timeout(),
                read_timeout_secs: default_peer_read_timeout(),
                max_response_bytes: default_max_response_bytes(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: default_db_connections(),
            },
        }
    }
}
