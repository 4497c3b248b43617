//! Backend entry-point: applies migrations, builds the pool and serves the
//! study API.

mod server;

use std::io;
use std::net::{IpAddr, SocketAddr};

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{AppSettings, ServerConfig, create_server};
use stability_backend::inbound::http::health::HealthState;
use stability_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|e| io::Error::other(format!("failed to load configuration: {e}")))?;
    let bind_addr = bind_addr(&settings)?;
    let database_url = settings.database_url().to_owned();

    let applied = run_migrations(&database_url).map_err(io::Error::other)?;
    info!(database = %database_url, applied, "schema is current");

    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(settings.pool_max_size()))
        .await
        .map_err(io::Error::other)?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), ServerConfig::new(bind_addr, pool))?;
    info!(%bind_addr, "listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result
}

fn bind_addr(settings: &AppSettings) -> io::Result<SocketAddr> {
    let host: IpAddr = settings.host().parse().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid host {}: {e}", settings.host()),
        )
    })?;
    Ok(SocketAddr::new(host, settings.port()))
}
