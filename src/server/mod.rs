pub mod error;
pub mod grams;
pub mod health;
pub mod model;

use crate::utils::error::{GramsError, Result};
use axum::Router;
use std::net::{IpAddr, SocketAddr};
use tower_http::trace::TraceLayer;

pub fn socket_addr(host: &str, port: u16) -> Result<SocketAddr> {
    let ip: IpAddr = host.parse().map_err(|e| GramsError::InvalidConfigValue {
        field: "server.host".to_string(),
        value: host.to_string(),
        reason: format!("{}", e),
    })?;
    Ok(SocketAddr::new(ip, port))
}

/// Binds `addr` and serves `app` until the process is stopped.
pub async fn serve(app: Router, addr: SocketAddr) -> Result<()> {
    let app = app.layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting server on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
