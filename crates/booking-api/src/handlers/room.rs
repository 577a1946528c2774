//! Room service handler

use async_trait::async_trait;
use booking_core::{
    traits::{ReservationRepository, RoomRepository},
    AppError, AppResult,
};
use booking_net::{Handler, Params, Request, Response, Status};
use booking_services::RoomService;
use std::sync::Arc;

use super::{
    default_status, format_hours, format_week, health, missing_is_forbidden, prepare, reply,
    unknown_path,
};
use crate::dto::{DayRequest, NameRequest, SlotRequest, ROOM_NAME};

pub struct RoomHandler<M: RoomRepository, R: ReservationRepository> {
    service: Arc<RoomService<M, R>>,
}

impl<M: RoomRepository, R: ReservationRepository> RoomHandler<M, R> {
    pub fn new(service: Arc<RoomService<M, R>>) -> Self {
        Self { service }
    }

    async fn add(&self, params: &Params) -> AppResult<String> {
        let request = NameRequest::from_params(params, ROOM_NAME)?;
        let room = self.service.add_room(&request.name).await?;
        Ok(format!("Room {} added\n", room.name))
    }

    async fn remove(&self, params: &Params) -> AppResult<String> {
        let request = NameRequest::from_params(params, ROOM_NAME)?;
        let released = self.service.remove_room(&request.name).await?;
        Ok(format!(
            "Room {} removed ({} holds released)\n",
            request.name, released
        ))
    }

    async fn reserve(&self, params: &Params) -> AppResult<String> {
        let request = SlotRequest::from_params(params)?;
        let hold = self
            .service
            .reserve_slot(&request.name, request.slot())
            .await?;
        Ok(format!("Reserved {} {}\n", hold.room_name, hold.slot()))
    }

    async fn release(&self, params: &Params) -> AppResult<String> {
        let request = SlotRequest::from_params(params)?;
        self.service
            .release_slot(&request.name, request.slot())
            .await?;
        Ok(format!("Released {} {}\n", request.name, request.slot()))
    }

    async fn check_availability(&self, params: &Params) -> AppResult<String> {
        let request = DayRequest::from_params(params, ROOM_NAME)?;
        let hours = self
            .service
            .available_hours(&request.name, request.day)
            .await?;
        Ok(format_hours(&hours))
    }

    async fn check_weekly_availability(&self, params: &Params) -> AppResult<String> {
        let request = NameRequest::from_params(params, ROOM_NAME)?;
        let week = self.service.weekly_availability(&request.name).await?;
        Ok(format_week(&week))
    }
}

/// `/reserve` answers 400 for anything that is not a lookup or conflict failure
fn reserve_status(err: &AppError) -> Status {
    match default_status(err) {
        status if status.code() >= 500 => Status::BadRequest,
        status => status,
    }
}

#[async_trait]
impl<M, R> Handler for RoomHandler<M, R>
where
    M: RoomRepository + 'static,
    R: ReservationRepository + 'static,
{
    async fn handle(&self, request: Request) -> Response {
        let params = match prepare(&request) {
            Ok(params) => params,
            Err(response) => return response,
        };

        match request.path.as_str() {
            "/health" => health("room"),
            "/add" => reply(self.add(&params).await, default_status),
            "/remove" => reply(self.remove(&params).await, missing_is_forbidden),
            "/reserve" => reply(self.reserve(&params).await, reserve_status),
            "/release" => reply(self.release(&params).await, default_status),
            "/checkavailability" => reply(self.check_availability(&params).await, default_status),
            "/checkweeklyavailability" => {
                reply(self.check_weekly_availability(&params).await, default_status)
            }
            other => unknown_path(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_db::{MemoryReservationRepository, MemoryRoomRepository};

    fn handler() -> RoomHandler<MemoryRoomRepository, MemoryReservationRepository> {
        RoomHandler::new(Arc::new(RoomService::new(
            Arc::new(MemoryRoomRepository::new()),
            Arc::new(MemoryReservationRepository::new()),
            true,
        )))
    }

    async fn call(handler: &RoomHandler<MemoryRoomRepository, MemoryReservationRepository>, raw: &str) -> Response {
        handler.handle(Request::parse(raw).unwrap()).await
    }

    #[tokio::test]
    async fn test_add_and_duplicate() {
        let handler = handler();
        let response = call(&handler, "GET /add?name=R1 HTTP/1.0\r\n\r\n").await;
        assert_eq!(response.status, Status::Ok);

        let response = call(&handler, "POST /add HTTP/1.0\r\n\r\n{\"room_name\":\"R1\"}").await;
        assert_eq!(response.status, Status::Forbidden);
    }

    #[tokio::test]
    async fn test_remove_missing_is_forbidden() {
        let response = call(&handler(), "GET /remove?name=R9 HTTP/1.0\r\n\r\n").await;
        assert_eq!(response.status, Status::Forbidden);
    }

    #[tokio::test]
    async fn test_reserve_statuses() {
        let handler = handler();
        call(&handler, "GET /add?name=R1 HTTP/1.0\r\n\r\n").await;

        let ok = call(&handler, "GET /reserve?name=R1&day=3&hour=10&duration=2 HTTP/1.0\r\n\r\n").await;
        assert_eq!(ok.status, Status::Ok);

        let conflict =
            call(&handler, "GET /reserve?name=R1&day=3&hour=11&duration=1 HTTP/1.0\r\n\r\n").await;
        assert_eq!(conflict.status, Status::Forbidden);

        let missing =
            call(&handler, "GET /reserve?name=R9&day=3&hour=11&duration=1 HTTP/1.0\r\n\r\n").await;
        assert_eq!(missing.status, Status::NotFound);

        let invalid =
            call(&handler, "GET /reserve?name=R1&day=3&hour=16&duration=3 HTTP/1.0\r\n\r\n").await;
        assert_eq!(invalid.status, Status::BadRequest);

        let hours = call(&handler, "GET /checkavailability?name=R1&day=3 HTTP/1.0\r\n\r\n").await;
        assert_eq!(hours.body, "9 12 13 14 15 16 17\n");
    }

    #[tokio::test]
    async fn test_reserve_with_overflowing_duration() {
        let handler = handler();
        call(&handler, "GET /add?name=R1 HTTP/1.0\r\n\r\n").await;

        let huge = call(
            &handler,
            "GET /reserve?name=R1&day=1&hour=9&duration=2147483647 HTTP/1.0\r\n\r\n",
        )
        .await;
        assert_eq!(huge.status, Status::BadRequest);

        // nothing stored, the day is still bookable
        let hours = call(&handler, "GET /checkavailability?name=R1&day=1 HTTP/1.0\r\n\r\n").await;
        assert_eq!(hours.body, "9 10 11 12 13 14 15 16 17\n");
        let ok = call(&handler, "GET /reserve?name=R1&day=1&hour=13&duration=1 HTTP/1.0\r\n\r\n").await;
        assert_eq!(ok.status, Status::Ok);
    }

    #[tokio::test]
    async fn test_weekly_and_release() {
        let handler = handler();
        call(&handler, "GET /add?name=R1 HTTP/1.0\r\n\r\n").await;
        call(&handler, "GET /reserve?name=R1&day=1&hour=9&duration=8 HTTP/1.0\r\n\r\n").await;

        let week = call(&handler, "GET /checkweeklyavailability?name=R1 HTTP/1.0\r\n\r\n").await;
        let lines: Vec<&str> = week.body.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "1: 17");
        assert_eq!(lines[1], "2: 9 10 11 12 13 14 15 16 17");

        let released =
            call(&handler, "GET /release?name=R1&day=1&hour=9&duration=8 HTTP/1.0\r\n\r\n").await;
        assert_eq!(released.status, Status::Ok);

        let again =
            call(&handler, "GET /release?name=R1&day=1&hour=9&duration=8 HTTP/1.0\r\n\r\n").await;
        assert_eq!(again.status, Status::NotFound);
    }

    #[tokio::test]
    async fn test_unknown_path_and_missing_field() {
        let handler = handler();
        assert_eq!(
            call(&handler, "GET /nope HTTP/1.0\r\n\r\n").await.status,
            Status::NotFound
        );
        assert_eq!(
            call(&handler, "GET /add HTTP/1.0\r\n\r\n").await.status,
            Status::BadRequest
        );
        assert_eq!(
            call(&handler, "GET /health HTTP/1.0\r\n\r\n").await.status,
            Status::Ok
        );
    }
}
