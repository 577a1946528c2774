//! Room service
//!
//! Owns the room registry and the slot holds. Reserving a slot runs
//! validate → availability check → insert; with serialization enabled the
//! check and insert happen under the `(room, day)` lock so concurrent
//! requests cannot both claim the same hours.

use booking_core::{
    models::{NewReservation, Reservation, ReservationFilter, Room, Slot},
    traits::{ReservationRepository, RoomRepository},
    validation::{FIRST_DAY, LAST_DAY},
    AppError, AppResult, BookingValidator,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::availability::AvailabilityEngine;
use crate::slot_lock::SlotLocks;

pub struct RoomService<M: RoomRepository, R: ReservationRepository> {
    rooms: Arc<M>,
    holds: Arc<R>,
    availability: AvailabilityEngine<M, R>,
    locks: SlotLocks,
    serialize_reservations: bool,
}

impl<M: RoomRepository, R: ReservationRepository> RoomService<M, R> {
    /// Create a room service; `serialize_reservations` turns the per-slot lock on
    pub fn new(rooms: Arc<M>, holds: Arc<R>, serialize_reservations: bool) -> Self {
        if !serialize_reservations {
            warn!("Slot reservations are not serialized; concurrent reserves may overlap");
        }
        Self {
            availability: AvailabilityEngine::new(rooms.clone(), holds.clone()),
            rooms,
            holds,
            locks: SlotLocks::new(),
            serialize_reservations,
        }
    }

    #[instrument(skip(self))]
    pub async fn add_room(&self, name: &str) -> AppResult<Room> {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "room name must not be empty".to_string(),
            ));
        }

        let room = self.rooms.create(&Room::new(name)).await?;
        info!("Room {} added", room.name);
        Ok(room)
    }

    /// Delete a room and every hold on it; returns the number of holds removed.
    ///
    /// With serialization on, every day of the room is locked first so no
    /// reserve in flight can insert a hold after the cascade.
    #[instrument(skip(self))]
    pub async fn remove_room(&self, name: &str) -> AppResult<u64> {
        self.ensure_room(name).await?;

        let guards = if self.serialize_reservations {
            self.locks.acquire_days(name, FIRST_DAY..=LAST_DAY).await
        } else {
            Vec::new()
        };

        if !self.rooms.delete(name).await? {
            return Err(AppError::RoomNotFound(name.to_string()));
        }
        let released = self.holds.delete_by_room(name).await?;

        drop(guards);
        self.locks.forget_room(name);
        info!("Room {} removed with {} holds", name, released);
        Ok(released)
    }

    /// Fail with `RoomNotFound` before any lock is created for an unknown name
    async fn ensure_room(&self, room: &str) -> AppResult<()> {
        if self.rooms.exists(room).await? {
            Ok(())
        } else {
            Err(AppError::RoomNotFound(room.to_string()))
        }
    }

    /// Hold `slot` of `room` if all its hours are free
    #[instrument(skip(self), fields(slot = %slot))]
    pub async fn reserve_slot(&self, room: &str, slot: Slot) -> AppResult<Reservation> {
        BookingValidator::validate_slot(&slot)?;
        self.ensure_room(room).await?;

        let _guard = if self.serialize_reservations {
            Some(self.locks.acquire(room, slot.day).await)
        } else {
            None
        };

        self.availability.check_slot(room, &slot).await?;
        let hold = self.holds.create(&NewReservation::hold(room, slot)).await?;

        info!("Slot held: {} {} (hold {})", room, slot, hold.id);
        Ok(hold)
    }

    /// Drop the hold exactly matching `slot`
    #[instrument(skip(self), fields(slot = %slot))]
    pub async fn release_slot(&self, room: &str, slot: Slot) -> AppResult<()> {
        BookingValidator::validate_slot(&slot)?;
        self.ensure_room(room).await?;

        let _guard = if self.serialize_reservations {
            Some(self.locks.acquire(room, slot.day).await)
        } else {
            None
        };

        let holds = self
            .holds
            .find(&ReservationFilter::new().room(room).day(slot.day))
            .await?;

        let hold = holds
            .into_iter()
            .find(|h| h.slot() == slot)
            .ok_or_else(|| AppError::ReservationNotFound(format!("no hold for {} {}", room, slot)))?;

        self.holds.delete(hold.id).await?;
        info!("Slot released: {} {} (hold {})", room, slot, hold.id);
        Ok(())
    }

    pub async fn available_hours(&self, room: &str, day: i32) -> AppResult<Vec<i32>> {
        self.availability.available_hours(room, day).await
    }

    pub async fn weekly_availability(&self, room: &str) -> AppResult<BTreeMap<i32, Vec<i32>>> {
        self.availability.weekly_availability(room).await
    }

    pub async fn room_count(&self) -> AppResult<i64> {
        self.rooms.count().await
    }
}
