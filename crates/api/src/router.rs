//! Routers for the two dashboards.
//!
//! Both nest their API under `/api/v1`, expose `/health`, and fall back to
//! the configured static UI directory when one exists.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::handlers::{self, admin, viewer};
use crate::state::AppState;

/// Admin console: uploads, datasets, contribution files, metrics.
pub fn build_admin_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/rasters", post(admin::upload_raster).get(admin::list_rasters))
        .route("/rasters/{name}", delete(admin::delete_raster))
        .route("/datasets", get(admin::list_datasets).post(admin::upload_dataset))
        .route(
            "/datasets/{name}",
            get(admin::get_dataset).delete(admin::delete_dataset),
        )
        .route("/contributions/files", get(admin::contribution_files))
        .route(
            "/contributions/files/{name}",
            get(admin::download_contribution_file).delete(admin::delete_contribution_file),
        )
        .route("/metrics", get(admin::metrics))
        .route("/metrics/size-over-time", get(admin::size_over_time))
        .route("/metrics/size-over-time.svg", get(admin::size_over_time_chart));

    finish(api_routes, state)
}

/// Public viewer: raster analysis, water bodies, contributions.
pub fn build_viewer_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/rasters", get(viewer::list_rasters))
        .route("/rasters/{name}", get(viewer::download_raster))
        .route("/rasters/{name}/analysis", get(viewer::raster_analysis))
        .route("/rasters/{name}/heatmap.png", get(viewer::raster_heatmap))
        .route("/water-bodies", get(viewer::water_bodies))
        .route("/water-bodies/chart.svg", get(viewer::water_body_chart))
        .route("/water-bodies/pie.svg", get(viewer::water_body_share_chart))
        .route(
            "/contributions",
            get(viewer::contributions).post(viewer::submit_contribution),
        )
        .route("/metrics", get(viewer::metrics));

    finish(api_routes, state)
}

fn finish(api_routes: Router<AppState>, state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let web_dir = state.settings.web_dir.clone();
    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(handlers::health_check))
        .layer(DefaultBodyLimit::max(state.settings.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if let Some(dir) = web_dir.filter(|d| d.is_dir()) {
        let serve_dir = ServeDir::new(&dir).fallback(ServeFile::new(dir.join("index.html")));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %dir.display(), "static UI serving enabled");
    }

    router
}
