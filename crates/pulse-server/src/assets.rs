//! Embedded static assets for the demo front page.

use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;

/// Front-page files embedded into the binary.
#[derive(Embed)]
#[folder = "assets"]
#[include = "*.html"]
#[include = "*.js"]
#[include = "*.css"]
struct Assets;

/// Fallback handler serving embedded static files.
///
/// An unknown path is a plain 404. The front page is a single static
/// document, not a client-side router.
pub async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();

            let cache_control = if path.ends_with(".html") {
                "no-cache"
            } else {
                "public, max-age=3600"
            };

            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime.as_ref()),
                    (header::CACHE_CONTROL, cache_control),
                ],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}
