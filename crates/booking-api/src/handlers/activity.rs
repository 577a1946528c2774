//! Activity service handler

use async_trait::async_trait;
use booking_core::{traits::ActivityRepository, AppError, AppResult};
use booking_net::{Handler, Params, Request, Response, Status};
use booking_services::ActivityService;
use std::sync::Arc;

use super::{default_status, health, missing_is_forbidden, prepare, reply, unknown_path};
use crate::dto::{NameRequest, ACTIVITY_NAME};

pub struct ActivityHandler<A: ActivityRepository> {
    service: Arc<ActivityService<A>>,
}

impl<A: ActivityRepository> ActivityHandler<A> {
    pub fn new(service: Arc<ActivityService<A>>) -> Self {
        Self { service }
    }

    async fn add(&self, params: &Params) -> AppResult<String> {
        let request = NameRequest::from_params(params, ACTIVITY_NAME)?;
        let activity = self.service.add_activity(&request.name).await?;
        Ok(format!("Activity {} added\n", activity.name))
    }

    async fn remove(&self, params: &Params) -> AppResult<String> {
        let request = NameRequest::from_params(params, ACTIVITY_NAME)?;
        self.service.remove_activity(&request.name).await?;
        Ok(format!("Activity {} removed\n", request.name))
    }

    async fn check(&self, params: &Params) -> AppResult<String> {
        let request = NameRequest::from_params(params, ACTIVITY_NAME)?;
        let activity = self.service.check_activity(&request.name).await?;
        Ok(format!("Activity {} exists\n", activity.name))
    }
}

/// `/add` answers 403 for a taken name and 400 for anything else
fn add_status(err: &AppError) -> Status {
    match err {
        AppError::AlreadyExists(_) => Status::Forbidden,
        _ => Status::BadRequest,
    }
}

#[async_trait]
impl<A: ActivityRepository + 'static> Handler for ActivityHandler<A> {
    async fn handle(&self, request: Request) -> Response {
        let params = match prepare(&request) {
            Ok(params) => params,
            Err(response) => return response,
        };

        match request.path.as_str() {
            "/health" => health("activity"),
            "/add" => reply(self.add(&params).await, add_status),
            "/remove" => reply(self.remove(&params).await, missing_is_forbidden),
            "/check" => reply(self.check(&params).await, default_status),
            other => unknown_path(other),
        }
    }
}
