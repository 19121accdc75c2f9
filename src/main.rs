//! NewsNinja summary service, binary entrypoint.
//! Boots the Axum HTTP server with settings loaded once from file + environment.

use news_ninja::config::Settings;
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    news_ninja::telemetry::init();

    let settings = Settings::load()?;
    let router = news_ninja::app_with_settings(&settings)?;

    Ok(router.into())
}
