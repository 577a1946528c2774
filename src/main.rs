//! Booking platform server
//!
//! Runs one of the three services (Room, Activity or Reservation) per process:
//!
//! ```text
//! booking <room|activity|reservation> [port]
//! ```

use anyhow::{anyhow, Context};
use booking_api::ServiceKind;
use booking_core::AppConfig;
use std::env;
use tracing::info;

const USAGE: &str = "usage: booking <room|activity|reservation> [port]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    booking_api::init_tracing();

    let mut args = env::args().skip(1);
    let kind: ServiceKind = args
        .next()
        .ok_or_else(|| anyhow!(USAGE))?
        .parse()
        .context(USAGE)?;
    let port = args
        .next()
        .map(|raw| raw.parse::<u16>())
        .transpose()
        .context("port must be a number between 0 and 65535")?;

    info!(
        "Starting booking {} service v{}",
        kind,
        env!("CARGO_PKG_VERSION")
    );

    let config = AppConfig::load().context("failed to load configuration")?;
    booking_api::run(&config, kind, port).await?;

    Ok(())
}
