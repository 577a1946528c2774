//! Domain models for the booking services

pub mod activity;
pub mod reservation;
pub mod room;

pub use activity::Activity;
pub use reservation::{NewReservation, Reservation, ReservationFilter, Slot};
pub use room::Room;
