//! Business logic services for the booking platform
//!
//! # Services
//!
//! - `AvailabilityEngine` - free hours of a room on a day, slot checks
//! - `RoomService` - rooms and their slot holds, serialized per (room, day)
//! - `ActivityService` - activity registry
//! - `ReservationCoordinator` - the activity-check / room-hold / commit saga
//!
//! Services are generic over the repository traits in `booking-core` and
//! are shared across connection tasks behind `Arc`. The coordinator reaches
//! its peers through the `ActivityDirectory` and `SlotReserver` seams;
//! `remote` implements them over the wire protocol.

pub mod activity_service;
pub mod availability;
pub mod coordinator;
pub mod remote;
pub mod room_service;
pub mod slot_lock;

pub use activity_service::ActivityService;
pub use availability::AvailabilityEngine;
pub use coordinator::{
    ActivityDirectory, RejectReason, ReservationCoordinator, ReservationOutcome,
    ReservationRequest, SlotHoldOutcome, SlotReserver,
};
pub use remote::{RemoteActivityDirectory, RemoteRoomService};
pub use room_service::RoomService;
pub use slot_lock::SlotLocks;
