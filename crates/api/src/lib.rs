//! `api` crate — HTTP surface of the two dashboards.
//!
//! Admin console (`build_admin_router`):
//!   POST   /api/v1/rasters
//!   GET    /api/v1/rasters?search=
//!   DELETE /api/v1/rasters/{name}
//!   GET    /api/v1/datasets          POST /api/v1/datasets
//!   GET    /api/v1/datasets/{name}   DELETE /api/v1/datasets/{name}
//!   GET    /api/v1/contributions/files
//!   GET    /api/v1/contributions/files/{name}
//!   DELETE /api/v1/contributions/files/{name}
//!   GET    /api/v1/metrics, /metrics/size-over-time, /metrics/size-over-time.svg
//!
//! Public viewer (`build_viewer_router`):
//!   GET    /api/v1/rasters, /rasters/{name}, /rasters/{name}/analysis,
//!          /rasters/{name}/heatmap.png
//!   GET    /api/v1/water-bodies, /water-bodies/chart.svg, /water-bodies/pie.svg
//!   GET    /api/v1/contributions     POST /api/v1/contributions
//!   GET    /api/v1/metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;


pub use config::{ConfigError, Settings};
pub use error::AppError;
pub use router::{build_admin_router, build_viewer_router};
pub use state::{AppState, StartupError};

use axum::Router;
use tracing::info;

/// Bind `addr` and serve `router` until the process is stopped.
pub async fn serve(addr: &str, router: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await
}
