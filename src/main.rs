use actix_web::{web, App, HttpServer};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use colleged::{api, config::Config, db};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::parse();
    let conn = db::open_db(&cfg.data_dir)?;
    let state = web::Data::new(api::AppState::new(conn));

    tracing::info!(bind = %cfg.bind, port = cfg.port, data_dir = %cfg.data_dir.display(), "starting colleged");

    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::routes))
        .bind((cfg.bind.as_str(), cfg.port))?
        .run()
        .await?;

    Ok(())
}
