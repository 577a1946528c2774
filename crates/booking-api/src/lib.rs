//! API layer for the booking services
//!
//! Request handlers for the Room, Activity and Reservation services, the
//! wiring that binds each of them to a listener, and tracing setup.

#![forbid(unsafe_code)]

pub mod app;
pub mod dto;
pub mod handlers;
pub mod telemetry;

pub use app::{bind, run, BoundService, ServiceKind};
pub use handlers::{ActivityHandler, ReservationHandler, RoomHandler};
pub use telemetry::init_tracing;
