//! HTTP surface for the listing lifecycle and ranking-entitlement engine.

use axum::routing::{get, post};
use axum::Router;

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        // Listings
        .route(
            "/api/v1/listings",
            get(handlers::listings::list_ranked).post(handlers::listings::create),
        )
        .route("/api/v1/listings/{id}", get(handlers::listings::get_by_id))
        .route("/api/v1/listings/{id}/submit", post(handlers::listings::submit))
        .route(
            "/api/v1/listings/{id}/activate",
            post(handlers::listings::activate),
        )
        .route(
            "/api/v1/listings/{id}/withdraw",
            post(handlers::listings::withdraw),
        )
        .route("/api/v1/listings/{id}/sold", post(handlers::listings::mark_sold))
        .route("/api/v1/listings/{id}/reject", post(handlers::listings::reject))
        .route("/api/v1/listings/{id}/bump", post(handlers::listings::bump))
        // Sellers
        .route(
            "/api/v1/sellers/{id}/listings",
            get(handlers::listings::list_by_seller),
        )
        .route(
            "/api/v1/sellers/{id}/can-activate",
            get(handlers::quota::can_activate),
        )
        .route(
            "/api/v1/sellers/{id}/notifications",
            get(handlers::notifications::list_for_seller),
        )
        .route(
            "/api/v1/sellers/{id}/payments",
            get(handlers::payments::list_completed),
        )
        // Notifications
        .route(
            "/api/v1/notifications/{id}/read",
            post(handlers::notifications::mark_read),
        )
        // Entitlement configuration (read-only)
        .route("/api/v1/tiers", get(handlers::catalog::list_tiers))
        .route(
            "/api/v1/promotion-slots",
            get(handlers::catalog::list_promotion_slots),
        )
        // Operations
        .route("/api/v1/admin/sweep", post(handlers::sweep::run_sweep))
        .with_state(state)
}
