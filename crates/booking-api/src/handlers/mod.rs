//! Request handlers
//!
//! One handler per service. Each routes on the exact path, accepts GET and
//! POST alike, and turns service results into plain-text responses. Error
//! statuses follow `AppError::status_code` unless an endpoint documents a
//! different code.

pub mod activity;
pub mod reservation;
pub mod room;

pub use activity::ActivityHandler;
pub use reservation::ReservationHandler;
pub use room::RoomHandler;

use booking_core::{AppError, AppResult};
use booking_net::{Method, Params, Request, Response, Status};
use std::collections::BTreeMap;
use tracing::{error, warn};

/// Method check and field extraction shared by all handlers
pub(crate) fn prepare(request: &Request) -> Result<Params, Response> {
    if !matches!(request.method, Method::Get | Method::Post) {
        let err = AppError::Protocol(format!("Method not supported: {}", request.method));
        warn!("{}", err);
        return Err(Response::from_error(&err));
    }

    request.params().map_err(|e| {
        warn!("Bad request to {}: {}", request.path, e);
        Response::from_error(&e)
    })
}

/// Build the response for an endpoint result.
///
/// `status_for` picks the status of a failure.
pub(crate) fn reply(result: AppResult<String>, status_for: fn(&AppError) -> Status) -> Response {
    match result {
        Ok(body) => Response::ok(body),
        Err(e) => {
            let status = status_for(&e);
            if status.code() >= 500 {
                error!("Request failed: {}", e);
            } else {
                warn!("Request rejected: {}", e);
            }
            Response::error_with_status(status, &e)
        }
    }
}

/// Default status of an error
pub(crate) fn default_status(err: &AppError) -> Status {
    Status::from_code(err.status_code())
}

/// Removal endpoints answer 403 when there is nothing to remove
pub(crate) fn missing_is_forbidden(err: &AppError) -> Status {
    if err.is_not_found() {
        Status::Forbidden
    } else {
        default_status(err)
    }
}

pub(crate) fn health(service: &str) -> Response {
    Response::ok(format!("{} service is up\n", service))
}

pub(crate) fn unknown_path(path: &str) -> Response {
    warn!("No such endpoint: {}", path);
    Response::new(Status::NotFound, format!("No such endpoint: {}\n", path))
}

/// Space-separated hour labels
pub(crate) fn format_hours(hours: &[i32]) -> String {
    let labels: Vec<String> = hours.iter().map(i32::to_string).collect();
    format!("{}\n", labels.join(" "))
}

/// One `<day>: <hours>` line per day, in day order
pub(crate) fn format_week(week: &BTreeMap<i32, Vec<i32>>) -> String {
    week.iter()
        .map(|(day, hours)| format!("{}: {}", day, format_hours(hours)))
        .collect()
}
