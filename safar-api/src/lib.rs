use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use safar_store::app_config::{ServerConfig, UploadConfig};

pub mod auth;
pub mod bookings;
pub mod error;
pub mod extract;
pub mod state;
pub mod stats;
pub mod trash;
pub mod trips;

pub use state::AppState;

pub fn app(state: AppState, server: &ServerConfig, uploads: &UploadConfig) -> Router {
    // CORS Middleware
    let origins = server.allowed_origins.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|o| origin_allowed(o, &origins))
                .unwrap_or(false)
        }))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .merge(trips::routes())
        .merge(bookings::routes())
        .merge(trash::routes())
        .merge(stats::routes())
        .merge(auth::routes())
        .nest_service("/uploads", ServeDir::new(&uploads.dir))
        .layer(DefaultBodyLimit::max(uploads.max_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// An origin passes when it is a configured scheme+host, bare or with any port.
fn origin_allowed(origin: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|base| match origin.strip_prefix(base.as_str()) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix(':')
            .map(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
            .unwrap_or(false),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_matches_host_and_port_only() {
        let allowed = vec!["http://localhost".to_string(), "http://127.0.0.1".to_string()];

        assert!(origin_allowed("http://localhost", &allowed));
        assert!(origin_allowed("http://localhost:5173", &allowed));
        assert!(origin_allowed("http://127.0.0.1:3000", &allowed));

        assert!(!origin_allowed("http://localhost.evil.example", &allowed));
        assert!(!origin_allowed("http://127.0.0.1.attacker.net", &allowed));
        assert!(!origin_allowed("http://localhost:80@evil.example", &allowed));
        assert!(!origin_allowed("http://localhost:", &allowed));
        assert!(!origin_allowed("https://localhost", &allowed));
    }
}
