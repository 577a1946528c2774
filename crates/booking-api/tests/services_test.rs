//! End-to-end tests: real Activity, Room and Reservation services on
//! ephemeral ports, driven over TCP.

use booking_api::{bind, ServiceKind};
use booking_core::{AppConfig, AppError};
use booking_net::{Response, ServiceClient, Status};
use std::net::SocketAddr;
use std::time::Duration;

async fn spawn_service(config: &AppConfig, kind: ServiceKind) -> SocketAddr {
    let service = bind(config, kind, "127.0.0.1:0").await.unwrap();
    let addr = service.local_addr().unwrap();
    tokio::spawn(service.run());
    addr
}

struct Cluster {
    room: ServiceClient,
    activity: ServiceClient,
    reservation: ServiceClient,
}

async fn start_cluster() -> Cluster {
    let mut config = AppConfig::default();
    config.server.read_timeout_secs = 5;

    let room = spawn_service(&config, ServiceKind::Room).await;
    let activity = spawn_service(&config, ServiceKind::Activity).await;

    config.peers.room_addr = room.to_string();
    config.peers.activity_addr = activity.to_string();
    let reservation = spawn_service(&config, ServiceKind::Reservation).await;

    Cluster {
        room: ServiceClient::new(room.to_string()),
        activity: ServiceClient::new(activity.to_string()),
        reservation: ServiceClient::new(reservation.to_string()),
    }
}

fn fields(pairs: &[(&'static str, &str)]) -> Vec<(&'static str, String)> {
    pairs.iter().map(|&(k, v)| (k, v.to_string())).collect()
}

async fn seed(cluster: &Cluster) {
    let added = cluster.room.get("/add", &fields(&[("name", "R1")])).await.unwrap();
    assert_eq!(added.status, Status::Ok);
    let added = cluster
        .activity
        .get("/add", &fields(&[("name", "yoga")]))
        .await
        .unwrap();
    assert_eq!(added.status, Status::Ok);
}

async fn reserve(cluster: &Cluster, activity: &str, day: &str, hour: &str, duration: &str) -> Response {
    cluster
        .reservation
        .get(
            "/reserve",
            &fields(&[
                ("room", "R1"),
                ("activity", activity),
                ("day", day),
                ("hour", hour),
                ("duration", duration),
            ]),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_reservation_confirmed_and_hours_removed() {
    let cluster = start_cluster().await;
    seed(&cluster).await;

    let response = reserve(&cluster, "yoga", "3", "10", "2").await;
    assert_eq!(response.status, Status::Ok);
    assert!(response.body.contains("Reservation ID: 1"));

    let hours = cluster
        .room
        .get("/checkavailability", &fields(&[("name", "R1"), ("day", "3")]))
        .await
        .unwrap();
    assert_eq!(hours.body, "9 12 13 14 15 16 17\n");

    // proxied through the Reservation service
    let proxied = cluster
        .reservation
        .get("/listavailability", &fields(&[("room", "R1"), ("day", "3")]))
        .await
        .unwrap();
    assert_eq!(proxied.body, hours.body);

    let shown = cluster
        .reservation
        .get("/display", &fields(&[("id", "1")]))
        .await
        .unwrap();
    assert_eq!(shown.status, Status::Ok);
    assert!(shown.body.contains("Activity: yoga"));
}

#[tokio::test]
async fn test_overlapping_reservation_is_conflict() {
    let cluster = start_cluster().await;
    seed(&cluster).await;

    assert_eq!(reserve(&cluster, "yoga", "3", "10", "2").await.status, Status::Ok);
    assert_eq!(
        reserve(&cluster, "yoga", "3", "11", "1").await.status,
        Status::Forbidden
    );
}

#[tokio::test]
async fn test_unknown_activity_creates_nothing() {
    let cluster = start_cluster().await;
    seed(&cluster).await;

    let response = reserve(&cluster, "unknown-activity", "1", "9", "1").await;
    assert_eq!(response.status, Status::NotFound);

    // the room was never asked to hold the slot
    let hours = cluster
        .room
        .get("/checkavailability", &fields(&[("name", "R1"), ("day", "1")]))
        .await
        .unwrap();
    assert_eq!(hours.body, "9 10 11 12 13 14 15 16 17\n");

    let shown = cluster
        .reservation
        .get("/display", &fields(&[("id", "1")]))
        .await
        .unwrap();
    assert_eq!(shown.status, Status::NotFound);
}

#[tokio::test]
async fn test_invalid_range_and_unknown_room() {
    let cluster = start_cluster().await;
    seed(&cluster).await;

    assert_eq!(
        reserve(&cluster, "yoga", "1", "16", "3").await.status,
        Status::BadRequest
    );

    let response = cluster
        .reservation
        .get(
            "/reserve",
            &fields(&[
                ("room", "R9"),
                ("activity", "yoga"),
                ("day", "1"),
                ("hour", "9"),
                ("duration", "1"),
            ]),
        )
        .await
        .unwrap();
    assert_eq!(response.status, Status::NotFound);
}

#[tokio::test]
async fn test_json_body_form() {
    let cluster = start_cluster().await;
    seed(&cluster).await;

    let body = r#"{"room_name":"R1","activity_name":"yoga","day":2,"hour":"13","duration":1}"#;
    let raw = format!(
        "POST /reserve HTTP/1.0\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let response = Response::parse(&cluster.reservation.send_raw(raw.as_bytes()).await.unwrap())
        .unwrap();
    assert_eq!(response.status, Status::Ok);
    assert!(response.body.contains("Reservation ID:"));
}

#[tokio::test]
async fn test_removed_room_rejects_reservations() {
    let cluster = start_cluster().await;
    seed(&cluster).await;
    assert_eq!(reserve(&cluster, "yoga", "5", "9", "1").await.status, Status::Ok);

    let removed = cluster
        .room
        .get("/remove", &fields(&[("name", "R1")]))
        .await
        .unwrap();
    assert_eq!(removed.status, Status::Ok);

    let again = cluster
        .room
        .get("/remove", &fields(&[("name", "R1")]))
        .await
        .unwrap();
    assert_eq!(again.status, Status::Forbidden);

    assert_eq!(
        reserve(&cluster, "yoga", "5", "10", "1").await.status,
        Status::NotFound
    );
}

#[tokio::test]
async fn test_reservation_refuses_to_start_without_peers() {
    // bind then drop to get ports nobody listens on
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap().to_string();
    drop(dead);

    let mut config = AppConfig::default();
    config.peers.activity_addr = dead_addr.clone();
    config.peers.room_addr = dead_addr;
    config.peers.connect_timeout_secs = 1;

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        bind(&config, ServiceKind::Reservation, "127.0.0.1:0"),
    )
    .await
    .unwrap();
    assert!(matches!(result, Err(AppError::Transport(_))));
}

#[tokio::test]
async fn test_activity_service_down_fails_reservation() {
    let mut config = AppConfig::default();
    let room = spawn_service(&config, ServiceKind::Room).await;
    let activity = bind(&config, ServiceKind::Activity, "127.0.0.1:0").await.unwrap();
    let activity_addr = activity.local_addr().unwrap();
    let activity_task = tokio::spawn(activity.run());

    config.peers.room_addr = room.to_string();
    config.peers.activity_addr = activity_addr.to_string();
    config.peers.connect_timeout_secs = 1;
    let reservation = spawn_service(&config, ServiceKind::Reservation).await;

    // take the Activity service down after startup
    activity_task.abort();
    let _ = activity_task.await;

    let response = ServiceClient::new(reservation.to_string())
        .get(
            "/reserve",
            &fields(&[
                ("room", "R1"),
                ("activity", "yoga"),
                ("day", "1"),
                ("hour", "9"),
                ("duration", "1"),
            ]),
        )
        .await
        .unwrap();
    assert_eq!(response.status, Status::BadGateway);
}
