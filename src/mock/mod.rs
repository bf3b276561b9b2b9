//! A small in-memory stand-in for the marketplace backend.
//!
//! It covers auth, the catalog reads and the booking lifecycle, validates status
//! transitions the way the real server does, and exposes knobs for forcing
//! credential expiry. Used by `hirelink mock-server` and the integration tests.

pub mod error;
pub mod handlers;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::MockError;
pub use state::MockState;

/// Routes mounted under `/api`, matching the default client base URL.
pub fn router(state: Arc<MockState>) -> Router {
    let counter = middleware::from_fn_with_state(state.clone(), count_requests);
    let api = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/users/me", get(handlers::auth::profile))
        .route("/categories", get(handlers::catalog::categories))
        .route(
            "/categories/featured",
            get(handlers::catalog::featured_categories),
        )
        .route("/categories/:slug", get(handlers::catalog::category_by_slug))
        .route(
            "/services/featured",
            get(handlers::catalog::featured_services),
        )
        .route(
            "/services/category/:id",
            get(handlers::catalog::services_by_category),
        )
        .route("/services/:id", get(handlers::catalog::service))
        .route(
            "/providers/featured",
            get(handlers::catalog::featured_providers),
        )
        .route("/providers/:id", get(handlers::catalog::provider))
        .route("/bookings", post(handlers::bookings::create_booking))
        .route(
            "/bookings/my-bookings",
            get(handlers::bookings::my_bookings),
        )
        .route("/bookings/recent", get(handlers::bookings::recent_bookings))
        .route(
            "/bookings/number/:number",
            get(handlers::bookings::booking_by_number),
        )
        .route("/bookings/:id", get(handlers::bookings::booking))
        .route(
            "/bookings/:id/status",
            patch(handlers::bookings::update_status),
        )
        .route("/bookings/:id/review", post(handlers::bookings::add_review))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .layer(counter)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn count_requests(
    State(state): State<Arc<MockState>>,
    req: Request,
    next: Next,
) -> Response {
    state.record_request(req.uri().path());
    next.run(req).await
}

/// Binds `addr` and serves the mock in the background. Returns the bound address,
/// so `127.0.0.1:0` yields an ephemeral port.
pub async fn spawn(addr: SocketAddr, state: Arc<MockState>) -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let app = router(state);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "mock backend stopped");
        }
    });
    tracing::info!("mock backend listening on http://{local}/api");
    Ok(local)
}

/// Serves until the process is stopped.
pub async fn serve(addr: SocketAddr, state: Arc<MockState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("mock backend listening on http://{}/api", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
