//! Reservation service handler

use async_trait::async_trait;
use booking_core::{traits::ReservationRepository, AppResult};
use booking_net::{Handler, Params, Request, Response, Status};
use booking_services::{
    RejectReason, RemoteActivityDirectory, RemoteRoomService, ReservationCoordinator,
    ReservationOutcome,
};
use std::sync::Arc;
use tracing::{error, warn};

use super::{default_status, format_hours, health, prepare, reply, unknown_path};
use crate::dto::{BookingRequest, DayRequest, DisplayRequest};

type Coordinator<R> = ReservationCoordinator<RemoteActivityDirectory, RemoteRoomService, R>;

pub struct ReservationHandler<R: ReservationRepository> {
    coordinator: Coordinator<R>,
    rooms: Arc<RemoteRoomService>,
}

impl<R: ReservationRepository> ReservationHandler<R> {
    pub fn new(
        activities: Arc<RemoteActivityDirectory>,
        rooms: Arc<RemoteRoomService>,
        bookings: Arc<R>,
    ) -> Self {
        Self {
            coordinator: ReservationCoordinator::new(activities, rooms.clone(), bookings),
            rooms,
        }
    }

    async fn reserve(&self, params: &Params) -> Response {
        let request = match BookingRequest::from_params(params) {
            Ok(request) => request,
            Err(e) => {
                warn!("Bad reservation request: {}", e);
                return Response::from_error(&e);
            }
        };

        match self.coordinator.reserve(&request.into()).await {
            ReservationOutcome::Confirmed(booking) => Response::ok(format!(
                "Reservation confirmed\nReservation ID: {}\n",
                booking.id
            )),
            ReservationOutcome::Rejected(reason) => {
                let status = match reason {
                    RejectReason::InvalidRange => Status::BadRequest,
                    RejectReason::ActivityNotFound | RejectReason::RoomNotFound => Status::NotFound,
                    RejectReason::SlotConflict => Status::Forbidden,
                };
                Response::new(status, format!("Reservation rejected: {}\n", reason))
            }
            ReservationOutcome::Failed(e) => {
                error!("Reservation failed: {}", e);
                Response::from_error(&e)
            }
        }
    }

    async fn display(&self, params: &Params) -> AppResult<String> {
        let request = DisplayRequest::from_params(params)?;
        let booking = self.coordinator.display(request.id).await?;
        Ok(format!(
            "Reservation ID: {}\nRoom: {}\nActivity: {}\nDay: {}\nHour: {}\nDuration: {}\n",
            booking.id,
            booking.room_name,
            booking.activity_name.as_deref().unwrap_or("-"),
            booking.day,
            booking.hour,
            booking.duration
        ))
    }

    async fn list_availability(&self, params: &Params) -> AppResult<String> {
        let request = DayRequest::from_params(params, &["room", "room_name", "name"])?;
        let hours = self.rooms.available_hours(&request.name, request.day).await?;
        Ok(format_hours(&hours))
    }
}

#[async_trait]
impl<R: ReservationRepository + 'static> Handler for ReservationHandler<R> {
    async fn handle(&self, request: Request) -> Response {
        let params = match prepare(&request) {
            Ok(params) => params,
            Err(response) => return response,
        };

        match request.path.as_str() {
            "/health" => health("reservation"),
            "/reserve" => self.reserve(&params).await,
            "/display" => reply(self.display(&params).await, default_status),
            "/listavailability" => reply(self.list_availability(&params).await, default_status),
            other => unknown_path(other),
        }
    }
}
