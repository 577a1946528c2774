//! Service wiring
//!
//! Builds the store, service and handler for one of the three services and
//! binds it to a listener. The Reservation service probes its peers before
//! binding and refuses to start if either is unhealthy.

use booking_core::{AppConfig, AppError, AppResult};
use booking_db::{
    create_pool, create_schema, MemoryActivityRepository, MemoryReservationRepository,
    MemoryRoomRepository, SqliteActivityRepository, SqlitePool, SqliteReservationRepository,
    SqliteRoomRepository,
};
use booking_net::{Handler, Server, ServerOptions, ServiceClient};
use booking_services::{ActivityService, RemoteActivityDirectory, RemoteRoomService, RoomService};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};

use crate::handlers::{ActivityHandler, ReservationHandler, RoomHandler};

/// Which service a process runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Room,
    Activity,
    Reservation,
}

impl ServiceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ServiceKind::Room => "room",
            ServiceKind::Activity => "activity",
            ServiceKind::Reservation => "reservation",
        }
    }

    /// Configured listening port
    pub fn port(&self, config: &AppConfig) -> u16 {
        match self {
            ServiceKind::Room => config.room.port,
            ServiceKind::Activity => config.activity.port,
            ServiceKind::Reservation => config.reservation.port,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServiceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "room" => Ok(ServiceKind::Room),
            "activity" => Ok(ServiceKind::Activity),
            "reservation" => Ok(ServiceKind::Reservation),
            other => Err(AppError::Config(format!(
                "unknown service '{}', expected room, activity or reservation",
                other
            ))),
        }
    }
}

/// A service bound to its listener, ready to serve
pub struct BoundService {
    kind: ServiceKind,
    server: Server,
    handler: Arc<dyn Handler>,
}

impl BoundService {
    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    pub fn local_addr(&self) -> AppResult<SocketAddr> {
        self.server
            .local_addr()
            .map_err(|e| AppError::Internal(format!("listener has no address: {}", e)))
    }

    /// Serve until the process ends
    pub async fn run(self) -> AppResult<()> {
        info!("Serving {} service", self.kind);
        self.server
            .run(self.handler)
            .await
            .map_err(|e| AppError::Internal(format!("{} service stopped: {}", self.kind, e)))
    }
}

async fn open_store(config: &AppConfig, kind: ServiceKind) -> AppResult<Option<SqlitePool>> {
    let Some(url) = config.database.url_for(kind.name()) else {
        info!("Using in-memory store for {} service", kind);
        return Ok(None);
    };

    info!("Using SQLite store for {} service", kind);
    let pool = create_pool(&url, Some(config.database.max_connections)).await?;
    create_schema(&pool).await?;
    Ok(Some(pool))
}

fn room_handler<M, R>(config: &AppConfig, rooms: M, holds: R) -> Arc<dyn Handler>
where
    M: booking_core::traits::RoomRepository + 'static,
    R: booking_core::traits::ReservationRepository + 'static,
{
    let service = RoomService::new(
        Arc::new(rooms),
        Arc::new(holds),
        config.room.serialize_reservations,
    );
    Arc::new(RoomHandler::new(Arc::new(service)))
}

async fn build_handler(config: &AppConfig, kind: ServiceKind) -> AppResult<Arc<dyn Handler>> {
    let pool = open_store(config, kind).await?;

    let handler: Arc<dyn Handler> = match (kind, pool) {
        (ServiceKind::Room, Some(pool)) => room_handler(
            config,
            SqliteRoomRepository::new(pool.clone()),
            SqliteReservationRepository::new(pool),
        ),
        (ServiceKind::Room, None) => room_handler(
            config,
            MemoryRoomRepository::new(),
            MemoryReservationRepository::new(),
        ),
        (ServiceKind::Activity, Some(pool)) => Arc::new(ActivityHandler::new(Arc::new(
            ActivityService::new(Arc::new(SqliteActivityRepository::new(pool))),
        ))),
        (ServiceKind::Activity, None) => Arc::new(ActivityHandler::new(Arc::new(
            ActivityService::new(Arc::new(MemoryActivityRepository::new())),
        ))),
        (ServiceKind::Reservation, pool) => {
            let activities = Arc::new(RemoteActivityDirectory::new(ServiceClient::with_config(
                config.peers.activity_addr.clone(),
                &config.peers,
            )));
            let rooms = Arc::new(RemoteRoomService::new(ServiceClient::with_config(
                config.peers.room_addr.clone(),
                &config.peers,
            )));
            match pool {
                Some(pool) => Arc::new(ReservationHandler::new(
                    activities,
                    rooms,
                    Arc::new(SqliteReservationRepository::new(pool)),
                )),
                None => Arc::new(ReservationHandler::new(
                    activities,
                    rooms,
                    Arc::new(MemoryReservationRepository::new()),
                )),
            }
        }
    };

    Ok(handler)
}

/// Probe the Activity and Room services; any failure aborts startup
pub async fn probe_peers(config: &AppConfig) -> AppResult<()> {
    for (peer, addr) in [
        ("activity", &config.peers.activity_addr),
        ("room", &config.peers.room_addr),
    ] {
        let client = ServiceClient::with_config(addr.clone(), &config.peers);
        if let Err(e) = client.check_health().await {
            error!("Health probe of {} service at {} failed: {}", peer, addr, e);
            return Err(e);
        }
        info!("{} service at {} is healthy", peer, addr);
    }
    Ok(())
}

/// Build `kind` and bind it to `addr`
pub async fn bind(config: &AppConfig, kind: ServiceKind, addr: &str) -> AppResult<BoundService> {
    if kind == ServiceKind::Reservation {
        probe_peers(config).await?;
    }

    let handler = build_handler(config, kind).await?;
    let server = Server::bind(addr, ServerOptions::from_config(&config.server))
        .await
        .map_err(|e| AppError::Internal(format!("failed to bind {}: {}", addr, e)))?;

    info!("{} service bound to {}", kind, addr);
    Ok(BoundService {
        kind,
        server,
        handler,
    })
}

/// Run `kind` on `port`, or on its configured port
pub async fn run(config: &AppConfig, kind: ServiceKind, port: Option<u16>) -> AppResult<()> {
    let addr = config.bind_addr(port.unwrap_or_else(|| kind.port(config)));
    bind(config, kind, &addr).await?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_kind() {
        assert_eq!("Room".parse::<ServiceKind>().unwrap(), ServiceKind::Room);
        assert_eq!(
            "reservation".parse::<ServiceKind>().unwrap(),
            ServiceKind::Reservation
        );
        assert!(matches!(
            "gym".parse::<ServiceKind>(),
            Err(AppError::Config(_))
        ));

        let config = AppConfig::default();
        assert_eq!(ServiceKind::Activity.port(&config), 8082);
    }
}
