use std::net::TcpListener;

use anyhow::Context;

use sqlx::PgPool;

use launchlist::app;
use launchlist::limiter::RateLimiter;
use launchlist::settings::Settings;
use launchlist::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry("info", std::io::stdout)?;

    let settings = Settings::load().expect("Failed to load settings");

    let pool = PgPool::connect_with(settings.database.with_db()).await?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let limiter = RateLimiter::new(settings.limiter.max_attempts(), settings.limiter.window());

    let listener = TcpListener::bind(settings.app.addr())?;

    app::run(listener, pool, limiter)?.await.context("Failed to run app")
}
