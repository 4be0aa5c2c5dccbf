#![warn(clippy::all, clippy::pedantic)]

use std::env::var;
use std::net::SocketAddr;

use actix_web::{App, HttpServer, web};
use tracing::info;

mod error;
mod routes;
mod state;

use error::AppError;
use state::ServerState;

const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    logger::init();

    let addr = bind_addr(var("HEALTHPULSE_BIND").ok())?;
    run_server(addr).await
}

fn bind_addr(value: Option<String>) -> Result<SocketAddr, AppError> {
    let value = value.unwrap_or_else(|| DEFAULT_BIND.to_string());
    value.parse().map_err(|source| AppError::InvalidBind { value, source })
}

async fn run_server(addr: SocketAddr) -> Result<(), AppError> {
    let state = web::Data::new(ServerState::new());
    info!(%addr, "serving health endpoint");

    HttpServer::new(move || App::new().app_data(state.clone()).configure(routes::routes))
        .bind(addr)?
        .run()
        .await?;

    Ok(())
}
