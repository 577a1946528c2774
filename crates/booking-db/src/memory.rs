//! In-memory repositories
//!
//! Rows live in `parking_lot` locks for the lifetime of the process. Locks are
//! never held across an await point.

use async_trait::async_trait;
use booking_core::{
    models::{Activity, NewReservation, Reservation, ReservationFilter, Room},
    traits::{ActivityRepository, ReservationRepository, RoomRepository},
    AppError, AppResult,
};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, instrument};

/// In-memory room store
#[derive(Debug, Default)]
pub struct MemoryRoomRepository {
    rooms: RwLock<BTreeMap<String, Room>>,
}

impl MemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for MemoryRoomRepository {
    #[instrument(skip(self, room), fields(room = %room.name))]
    async fn create(&self, room: &Room) -> AppResult<Room> {
        let mut rooms = self.rooms.write();
        if rooms.contains_key(&room.name) {
            return Err(AppError::AlreadyExists(format!("room {}", room.name)));
        }
        rooms.insert(room.name.clone(), room.clone());
        debug!("Stored room {}", room.name);
        Ok(room.clone())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Room>> {
        Ok(self.rooms.read().get(name).cloned())
    }

    #[instrument(skip(self))]
    async fn delete(&self, name: &str) -> AppResult<bool> {
        Ok(self.rooms.write().remove(name).is_some())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.rooms.read().len() as i64)
    }
}

/// In-memory activity store
#[derive(Debug, Default)]
pub struct MemoryActivityRepository {
    activities: RwLock<BTreeMap<String, Activity>>,
}

impl MemoryActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityRepository for MemoryActivityRepository {
    #[instrument(skip(self, activity), fields(activity = %activity.name))]
    async fn create(&self, activity: &Activity) -> AppResult<Activity> {
        let mut activities = self.activities.write();
        if activities.contains_key(&activity.name) {
            return Err(AppError::AlreadyExists(format!(
                "activity {}",
                activity.name
            )));
        }
        activities.insert(activity.name.clone(), activity.clone());
        Ok(activity.clone())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Activity>> {
        Ok(self.activities.read().get(name).cloned())
    }

    #[instrument(skip(self))]
    async fn delete(&self, name: &str) -> AppResult<bool> {
        Ok(self.activities.write().remove(name).is_some())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.activities.read().len() as i64)
    }
}

/// In-memory reservation store with monotonic ids starting at 1
#[derive(Debug)]
pub struct MemoryReservationRepository {
    reservations: RwLock<BTreeMap<i64, Reservation>>,
    next_id: AtomicI64,
}

impl MemoryReservationRepository {
    pub fn new() -> Self {
        Self {
            reservations: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryReservationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationRepository for MemoryReservationRepository {
    #[instrument(skip(self, reservation), fields(room = %reservation.room_name, slot = %reservation.slot))]
    async fn create(&self, reservation: &NewReservation) -> AppResult<Reservation> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = Reservation {
            id,
            room_name: reservation.room_name.clone(),
            activity_name: reservation.activity_name.clone(),
            day: reservation.slot.day,
            hour: reservation.slot.hour,
            duration: reservation.slot.duration,
            created_at: Utc::now(),
        };

        self.reservations.write().insert(id, stored.clone());
        debug!("Stored reservation {}", id);
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Reservation>> {
        Ok(self.reservations.read().get(&id).cloned())
    }

    async fn find(&self, filter: &ReservationFilter) -> AppResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .read()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.reservations.write().remove(&id).is_some())
    }

    async fn delete_by_room(&self, room_name: &str) -> AppResult<u64> {
        let mut reservations = self.reservations.write();
        let before = reservations.len();
        reservations.retain(|_, r| r.room_name != room_name);
        Ok((before - reservations.len()) as u64)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.reservations.read().len() as i64)
    }
}
