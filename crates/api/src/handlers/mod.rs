//! Route handlers, one module per dashboard.

pub mod admin;
pub mod form;
pub mod viewer;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

/// `?search=` on listing routes.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

pub async fn health_check() -> &'static str {
    "ok"
}

/// Attachment response carrying the stored file name.
pub(crate) fn file_response(name: &str, bytes: Vec<u8>, mime: &'static str) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", name.replace('"', "'"));
    (
        [
            (header::CONTENT_TYPE, mime.to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

pub(crate) fn svg_response(svg: String) -> Response {
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
}
