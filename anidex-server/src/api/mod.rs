//! HTTP API handlers for anidex-server

pub mod animals;
pub mod health;
pub mod upload;

pub use animals::animal_routes;
pub use health::health_routes;
pub use upload::upload_routes;

use axum::http::{header, uri::Authority, HeaderMap};

use crate::pipeline::RequestOrigin;

/// Origin used when building absolute URLs for a request
///
/// A configured public origin always wins. Otherwise the `Host` header is
/// used when it parses as an authority; anything else falls back to the bind
/// address.
pub(crate) fn request_origin(
    headers: &HeaderMap,
    public: Option<&RequestOrigin>,
    fallback: &RequestOrigin,
) -> RequestOrigin {
    if let Some(origin) = public {
        return origin.clone();
    }

    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|host| valid_authority(host))
        .map(|host| RequestOrigin::new("http", host))
        .unwrap_or_else(|| fallback.clone())
}

fn valid_authority(host: &str) -> bool {
    !host.is_empty() && !host.contains('@') && host.parse::<Authority>().is_ok()
}
