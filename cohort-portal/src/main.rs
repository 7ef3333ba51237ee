//! Service entry point

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use cohort_portal::{
    config::AppConfig, email::SmtpMailer, observability, routes, state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init()?;

    let config = AppConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let mailer = Arc::new(SmtpMailer::connect(&config.smtp)?);

    let addr = format!("{}:{}", config.service.host, config.service.port);
    let state = AppState::new(config, pool, mailer)?;
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "cohort-portal listening");
    axum::serve(listener, app).await?;

    Ok(())
}
