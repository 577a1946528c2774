//! Reservation coordinator
//!
//! Books a room for an activity across three services with no shared
//! transaction:
//!
//! 1. validate the slot locally (no remote call on failure)
//! 2. ask the Activity service whether the activity exists
//! 3. ask the Room service to hold the slot
//! 4. commit the booking locally
//!
//! Steps run once each, in order, without retries. If step 4 fails after the
//! hold succeeded, a compensating release is sent to the Room service; if
//! that fails as well the hold is orphaned and logged.
//!
//! Requests carry no idempotency token: a caller retrying after a timeout in
//! step 2 or 3 may create a duplicate hold and booking.

use async_trait::async_trait;
use booking_core::{
    models::{NewReservation, Reservation, Slot},
    traits::ReservationRepository,
    AppError, AppResult, BookingValidator,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Activity existence lookups
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityDirectory: Send + Sync {
    /// `Ok(false)` when the directory answered that the activity is unknown;
    /// `Err` only when it could not be asked.
    async fn activity_exists(&self, name: &str) -> AppResult<bool>;
}

/// Result of asking the Room service to hold a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotHoldOutcome {
    Held,
    RoomNotFound,
    Conflict,
    Invalid,
}

/// Slot holds on the Room service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlotReserver: Send + Sync {
    async fn hold_slot(&self, room: &str, slot: &Slot) -> AppResult<SlotHoldOutcome>;

    async fn release_slot(&self, room: &str, slot: &Slot) -> AppResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub room: String,
    pub activity: String,
    pub slot: Slot,
}

impl ReservationRequest {
    pub fn new(room: impl Into<String>, activity: impl Into<String>, slot: Slot) -> Self {
        Self {
            room: room.into(),
            activity: activity.into(),
            slot,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InvalidRange,
    ActivityNotFound,
    RoomNotFound,
    SlotConflict,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InvalidRange => f.write_str("reservation is outside business hours"),
            RejectReason::ActivityNotFound => f.write_str("activity not found"),
            RejectReason::RoomNotFound => f.write_str("room not found"),
            RejectReason::SlotConflict => f.write_str("slot is already reserved"),
        }
    }
}

#[derive(Debug)]
pub enum ReservationOutcome {
    Confirmed(Reservation),
    Rejected(RejectReason),
    Failed(AppError),
}

pub struct ReservationCoordinator<D: ActivityDirectory, S: SlotReserver, R: ReservationRepository> {
    activities: Arc<D>,
    rooms: Arc<S>,
    bookings: Arc<R>,
}

impl<D: ActivityDirectory, S: SlotReserver, R: ReservationRepository> ReservationCoordinator<D, S, R> {
    pub fn new(activities: Arc<D>, rooms: Arc<S>, bookings: Arc<R>) -> Self {
        Self {
            activities,
            rooms,
            bookings,
        }
    }

    #[instrument(skip(self, request), fields(room = %request.room, activity = %request.activity, slot = %request.slot))]
    pub async fn reserve(&self, request: &ReservationRequest) -> ReservationOutcome {
        let ReservationRequest {
            room,
            activity,
            slot,
        } = request;

        if let Err(e) = BookingValidator::validate_slot(slot) {
            warn!("Rejected: {}", e);
            return ReservationOutcome::Rejected(RejectReason::InvalidRange);
        }

        match self.activities.activity_exists(activity).await {
            Ok(true) => debug!("Activity {} exists", activity),
            Ok(false) => {
                warn!("Rejected: activity {} not found", activity);
                return ReservationOutcome::Rejected(RejectReason::ActivityNotFound);
            }
            Err(e) => {
                error!("Activity check failed: {}", e);
                return ReservationOutcome::Failed(e);
            }
        }

        let reason = match self.rooms.hold_slot(room, slot).await {
            Ok(SlotHoldOutcome::Held) => None,
            Ok(SlotHoldOutcome::RoomNotFound) => Some(RejectReason::RoomNotFound),
            Ok(SlotHoldOutcome::Conflict) => Some(RejectReason::SlotConflict),
            Ok(SlotHoldOutcome::Invalid) => Some(RejectReason::InvalidRange),
            Err(e) => {
                error!("Slot hold failed: {}", e);
                return ReservationOutcome::Failed(e);
            }
        };
        if let Some(reason) = reason {
            warn!("Rejected by room service: {}", reason);
            return ReservationOutcome::Rejected(reason);
        }

        match self
            .bookings
            .create(&NewReservation::booking(room.as_str(), activity.as_str(), *slot))
            .await
        {
            Ok(booking) => {
                info!("Reservation {} confirmed", booking.id);
                ReservationOutcome::Confirmed(booking)
            }
            Err(e) => {
                error!("Commit failed after slot hold: {}", e);
                self.compensate(room, slot).await;
                ReservationOutcome::Failed(e)
            }
        }
    }

    async fn compensate(&self, room: &str, slot: &Slot) {
        warn!("Releasing hold {} {}", room, slot);
        if let Err(e) = self.rooms.release_slot(room, slot).await {
            error!(
                "Orphaned hold on room {} {}: release failed: {}",
                room, slot, e
            );
        }
    }

    /// Look up a confirmed booking
    pub async fn display(&self, id: i64) -> AppResult<Reservation> {
        self.bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ReservationNotFound(id.to_string()))
    }
}
