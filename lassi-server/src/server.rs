//! Axum server setup and router configuration.

use crate::api;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header, request::Parts},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Largest accepted JSON request body.
const BODY_LIMIT_BYTES: usize = 10 * 1024;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/fooditems", get(api::menu::list_food_items))
        .route("/orders/my", get(api::orders::my_orders))
        .nest("/users", api::users_router())
        .nest("/tunnel", api::tunnel::router())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the storefront. Origins are read from the live configuration
/// so a reload takes effect without restarting.
fn cors_layer(state: &AppState) -> CorsLayer {
    let storefront = state.config.storefront.clone();
    let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _parts: &Parts| {
        let Ok(origin) = origin.to_str() else {
            return false;
        };
        // A writer holds the lock only while a reload swaps the section.
        storefront
            .try_read()
            .is_ok_and(|config| config.allows_origin(origin))
    });

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn root() -> &'static str {
    "Server is running"
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run the server with graceful shutdown support.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::{
        AuthConfig, KioskConfig, ServerConfig, SharedConfig, StorefrontConfig,
    };
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use lassi_core::relay::OrderRelay;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    const KIOSK_SECRET: &str = "counter-kiosk";

    // The pool never connects; every request below is answered before any query.
    fn test_router() -> Router {
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://lassi@localhost/lassi")
            .unwrap();
        let config = SharedConfig {
            server: Arc::new(RwLock::new(ServerConfig {
                listen: "127.0.0.1:5000".parse().unwrap(),
            })),
            auth: Arc::new(RwLock::new(AuthConfig::new(
                b"router-test-session-secret",
                time::Duration::hours(1),
            ))),
            kiosk: Arc::new(RwLock::new(KioskConfig::new(
                lassi_core::auth::hash_password(KIOSK_SECRET).unwrap(),
            ))),
            storefront: Arc::new(RwLock::new(StorefrontConfig {
                allowed_origins: vec!["https://lassicorner.example".to_string()],
            })),
        };
        build_router(AppState::new(db, config, OrderRelay::new()))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Server is running");

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_relay_status_is_public() {
        let response = test_router()
            .oneshot(Request::get("/tunnel/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({
                "connected": false,
                "connectionState": "disconnected",
                "pendingOrders": 0
            })
        );
    }

    #[tokio::test]
    async fn test_bearer_token_rejections() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(Request::get("/users/profile").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await["error"],
            "Unauthorized: No token provided"
        );

        let response = router
            .clone()
            .oneshot(
                Request::get("/users/cart")
                    .header(header::AUTHORIZATION, "Token abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .oneshot(
                Request::get("/users/orders")
                    .header(header::AUTHORIZATION, "Bearer not-a-session-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["error"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_tunnel_register_requires_kiosk_secret() {
        let router = test_router();
        let body = r#"{"wsUrl":"ws://kiosk.example.com"}"#;

        let response = router
            .clone()
            .oneshot(
                Request::post("/tunnel/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .clone()
            .oneshot(
                Request::post("/tunnel/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(lassi_sdk::KIOSK_SECRET_HEADER, "wrong-secret")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Plain ws is refused before any connection attempt.
        let response = router
            .oneshot(
                Request::post("/tunnel/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(lassi_sdk::KIOSK_SECRET_HEADER, KIOSK_SECRET)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "tunnel url must use wss, got ws"
        );
    }

    #[tokio::test]
    async fn test_json_body_errors() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(
                Request::post("/users/signin")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());

        let oversized = format!(
            r#"{{"name":"a","email":"a@b.c","password":"{}"}}"#,
            "x".repeat(BODY_LIMIT_BYTES)
        );
        let response = router
            .oneshot(
                Request::post("/users/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(oversized))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin_only() {
        let router = test_router();
        let preflight = |origin: &str| {
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/users/signin")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap()
        };

        let response = router
            .clone()
            .oneshot(preflight("https://lassicorner.example"))
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://lassicorner.example"
        );

        let response = router
            .oneshot(preflight("https://elsewhere.example"))
            .await
            .unwrap();
        assert!(
            !response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }
}
