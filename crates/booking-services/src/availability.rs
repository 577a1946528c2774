//! Availability engine
//!
//! Derives the free start-hours of a room on a day from its stored holds.
//! Each hold removes the run of `duration` consecutive labels starting at its
//! `hour` in the remaining sequence; a hold that does not fit the remaining
//! sequence means the store is inconsistent.

use booking_core::{
    models::{Reservation, ReservationFilter, Slot},
    traits::{ReservationRepository, RoomRepository},
    validation::{BUSINESS_HOURS, FIRST_DAY, LAST_DAY},
    AppError, AppResult,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, instrument};

pub struct AvailabilityEngine<M: RoomRepository, R: ReservationRepository> {
    rooms: Arc<M>,
    holds: Arc<R>,
}

impl<M: RoomRepository, R: ReservationRepository> AvailabilityEngine<M, R> {
    pub fn new(rooms: Arc<M>, holds: Arc<R>) -> Self {
        Self { rooms, holds }
    }

    /// Free start-hours of `room` on `day`, ascending
    #[instrument(skip(self))]
    pub async fn available_hours(&self, room: &str, day: i32) -> AppResult<Vec<i32>> {
        if !self.rooms.exists(room).await? {
            return Err(AppError::RoomNotFound(room.to_string()));
        }
        if !(FIRST_DAY..=LAST_DAY).contains(&day) {
            return Err(AppError::InvalidRange(format!(
                "day value should be {} to {}, got {}",
                FIRST_DAY, LAST_DAY, day
            )));
        }

        let holds = self
            .holds
            .find(&ReservationFilter::new().room(room).day(day))
            .await?;
        debug!("{} holds on {} day {}", holds.len(), room, day);

        free_hours(&holds).map_err(|e| {
            error!("Holds of {} on day {} are inconsistent: {}", room, day, e);
            e
        })
    }

    /// Free start-hours of `room` for every day of the week
    #[instrument(skip(self))]
    pub async fn weekly_availability(&self, room: &str) -> AppResult<BTreeMap<i32, Vec<i32>>> {
        let mut week = BTreeMap::new();
        for day in FIRST_DAY..=LAST_DAY {
            week.insert(day, self.available_hours(room, day).await?);
        }
        Ok(week)
    }

    /// Succeeds only if every hour of `slot` is still free
    pub async fn check_slot(&self, room: &str, slot: &Slot) -> AppResult<()> {
        let free = self.available_hours(room, slot.day).await?;
        if slot.hours().all(|hour| free.contains(&hour)) {
            Ok(())
        } else {
            Err(AppError::SlotConflict(format!("{} {}", room, slot)))
        }
    }
}

/// Remove each hold's run from the business-hours sequence
pub fn free_hours(holds: &[Reservation]) -> AppResult<Vec<i32>> {
    let mut hours = BUSINESS_HOURS.to_vec();

    for hold in holds {
        let start = hours.iter().position(|&h| h == hold.hour).ok_or_else(|| {
            AppError::DataInconsistency(format!(
                "reservation {} starts at {} which is no longer free",
                hold.id, hold.hour
            ))
        })?;

        let len = usize::try_from(hold.duration).unwrap_or(0);
        let end = start + len;
        let contiguous = len > 0
            && end <= hours.len()
            && hours[start..end]
                .iter()
                .zip(hold.hour..)
                .all(|(&h, expected)| h == expected);

        if !contiguous {
            return Err(AppError::DataInconsistency(format!(
                "reservation {} ({}) overlaps another hold or leaves business hours",
                hold.id,
                hold.slot()
            )));
        }

        hours.drain(start..end);
    }

    Ok(hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::models::{NewReservation, Room};
    use booking_db::{MemoryReservationRepository, MemoryRoomRepository};
    use chrono::Utc;
    use proptest::prelude::*;

    fn hold(id: i64, day: i32, hour: i32, duration: i32) -> Reservation {
        Reservation {
            id,
            room_name: "R1".to_string(),
            activity_name: None,
            day,
            hour,
            duration,
            created_at: Utc::now(),
        }
    }

    async fn engine() -> (
        AvailabilityEngine<MemoryRoomRepository, MemoryReservationRepository>,
        Arc<MemoryReservationRepository>,
    ) {
        let rooms = Arc::new(MemoryRoomRepository::new());
        rooms.create(&Room::new("R1")).await.unwrap();
        let holds = Arc::new(MemoryReservationRepository::new());
        (AvailabilityEngine::new(rooms, holds.clone()), holds)
    }

    #[test]
    fn test_free_hours_without_holds() {
        assert_eq!(free_hours(&[]).unwrap(), BUSINESS_HOURS.to_vec());
    }

    #[test]
    fn test_free_hours_removes_runs() {
        let free = free_hours(&[hold(1, 1, 10, 2), hold(2, 1, 15, 1)]).unwrap();
        assert_eq!(free, vec![9, 12, 13, 14, 16, 17]);
    }

    #[test]
    fn test_overlapping_holds_are_inconsistent() {
        // 11 was already removed by the first hold
        let err = free_hours(&[hold(1, 1, 10, 2), hold(2, 1, 11, 1)]).unwrap_err();
        assert!(matches!(err, AppError::DataInconsistency(_)));

        // starts free but runs into a removed hour
        let err = free_hours(&[hold(1, 1, 12, 1), hold(2, 1, 10, 3)]).unwrap_err();
        assert!(matches!(err, AppError::DataInconsistency(_)));

        // runs past the end of the sequence
        let err = free_hours(&[hold(1, 1, 16, 4)]).unwrap_err();
        assert!(matches!(err, AppError::DataInconsistency(_)));
    }

    #[tokio::test]
    async fn test_unknown_room() {
        let (engine, _) = engine().await;
        assert!(matches!(
            engine.available_hours("R9", 1).await,
            Err(AppError::RoomNotFound(_))
        ));
        assert!(matches!(
            engine.weekly_availability("R9").await,
            Err(AppError::RoomNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_available_hours_only_counts_matching_day() {
        let (engine, holds) = engine().await;
        holds
            .create(&NewReservation::hold("R1", Slot::new(3, 10, 2)))
            .await
            .unwrap();
        holds
            .create(&NewReservation::hold("R2", Slot::new(3, 13, 1)))
            .await
            .unwrap();

        assert_eq!(
            engine.available_hours("R1", 3).await.unwrap(),
            vec![9, 12, 13, 14, 15, 16, 17]
        );
        assert_eq!(
            engine.available_hours("R1", 4).await.unwrap(),
            BUSINESS_HOURS.to_vec()
        );

        let week = engine.weekly_availability("R1").await.unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(week.keys().copied().collect::<Vec<_>>(), (1..=7).collect::<Vec<_>>());
        assert_eq!(week[&3], vec![9, 12, 13, 14, 15, 16, 17]);
    }

    #[tokio::test]
    async fn test_check_slot() {
        let (engine, holds) = engine().await;
        holds
            .create(&NewReservation::hold("R1", Slot::new(3, 10, 2)))
            .await
            .unwrap();

        assert!(matches!(
            engine.check_slot("R1", &Slot::new(3, 11, 1)).await,
            Err(AppError::SlotConflict(_))
        ));
        assert!(engine.check_slot("R1", &Slot::new(3, 12, 2)).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_day() {
        let (engine, _) = engine().await;
        assert!(matches!(
            engine.available_hours("R1", 8).await,
            Err(AppError::InvalidRange(_))
        ));
    }

    /// Greedily keep the non-overlapping, in-hours slots of `candidates`
    fn disjoint(candidates: Vec<(i32, i32)>) -> Vec<(i32, i32)> {
        let mut kept: Vec<(i32, i32)> = Vec::new();
        for (hour, duration) in candidates {
            let slot = Slot::new(1, hour, duration);
            if hour + duration <= 17
                && kept
                    .iter()
                    .all(|&(h, d)| !Slot::new(1, h, d).overlaps(&slot))
            {
                kept.push((hour, duration));
            }
        }
        kept
    }

    proptest! {
        #[test]
        fn prop_free_hours_exclude_exactly_booked(
            candidates in proptest::collection::vec((9i32..17, 1i32..4), 0..8)
        ) {
            let kept = disjoint(candidates);
            let holds: Vec<Reservation> = kept
                .iter()
                .enumerate()
                .map(|(i, &(h, d))| hold(i as i64 + 1, 1, h, d))
                .collect();

            let expected: Vec<i32> = BUSINESS_HOURS
                .iter()
                .copied()
                .filter(|hour| !kept.iter().any(|&(h, d)| (h..h + d).contains(hour)))
                .collect();

            prop_assert_eq!(free_hours(&holds).unwrap(), expected.clone());

            // processing order does not matter
            let reversed: Vec<Reservation> = holds.into_iter().rev().collect();
            prop_assert_eq!(free_hours(&reversed).unwrap(), expected);
        }
    }
}
