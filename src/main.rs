mod config;
mod error;
mod handlers;
mod models;
mod services;
mod state;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};

use config::AppConfig;
use services::openai::OpenAiClient;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    if config.openai.api_key.is_none() {
        log::warn!("OPENAI_API_KEY is not set; chat and analysis requests will fail");
    }

    let backend = OpenAiClient::new(&config.openai).map_err(std::io::Error::other)?;
    let app_state = web::Data::new(AppState::new(&config, Arc::new(backend)));
    let max_body = config.max_body_bytes;

    log::info!(
        "starting on {}:{} (chat model {}, analysis model {})",
        config.host,
        config.port,
        config.chat.model,
        config.analysis.model
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .wrap(Cors::permissive())
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(max_body))
            .app_data(handlers::json_config(max_body))
            .configure(handlers::routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
