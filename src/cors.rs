use axum::http::{header, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// A layer that attaches CORS headers to all responses.
///
/// Credentialed requests require the allowed origin to match the request
/// origin, so the origin is mirrored back rather than using a wildcard.
pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::ORIGIN])
        .allow_credentials(true)
}
