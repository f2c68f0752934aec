//! HTTP-level tests for the engine's exposed surface: the quota peek, the
//! activation gate, the ranked read, and the admin sweep trigger.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::util::ServiceExt;

use sokoni_api::config::ServerConfig;
use sokoni_api::state::AppState;
use sokoni_core::types::DbId;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_state(pool: PgPool) -> AppState {
    let event_bus = Arc::new(sokoni_events::EventBus::default());
    let notifier = Arc::new(sokoni_events::Notifier::new(
        pool.clone(),
        Arc::clone(&event_bus),
    ));
    AppState {
        pool,
        config: Arc::new(ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origins: vec![],
            request_timeout_secs: 30,
            sweep_interval_secs: 60,
            sweep_batch_size: 500,
        }),
        event_bus,
        notifier,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn seed_seller(pool: &PgPool) -> DbId {
    let row: (DbId,) =
        sqlx::query_as("INSERT INTO sellers (display_name) VALUES ('api seller') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    row.0
}

async fn seed_subscription(pool: &PgPool, seller_id: DbId, max_listings: i32) {
    sqlx::query(
        "INSERT INTO subscriptions (seller_id, plan_name, max_listings, status_id, expires_at) \
         VALUES ($1, 'standard', $2, 1, NOW() + INTERVAL '30 days')",
    )
    .bind(seller_id)
    .bind(max_listings)
    .execute(pool)
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_ok(pool: PgPool) {
    let app = sokoni_api::app(test_state(pool));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

// ---------------------------------------------------------------------------
// Quota peek
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn can_activate_reports_reason_codes(pool: PgPool) {
    let seller = seed_seller(&pool).await;
    let app = sokoni_api::app(test_state(pool.clone()));

    let response = app
        .clone()
        .oneshot(get(&format!("/api/v1/sellers/{seller}/can-activate")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["allow"], false);
    assert_eq!(body["reason"], "no_subscription");

    seed_subscription(&pool, seller, 3).await;
    let response = app
        .oneshot(get(&format!("/api/v1/sellers/{seller}/can-activate")))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["allow"], true);
    assert!(body.get("reason").is_none());
}

// ---------------------------------------------------------------------------
// Lifecycle round trip
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_submit_activate_and_rank(pool: PgPool) {
    let seller = seed_seller(&pool).await;
    seed_subscription(&pool, seller, 3).await;
    let app = sokoni_api::app(test_state(pool.clone()));

    // Create a draft.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/listings",
            serde_json::json!({
                "seller_id": seller,
                "category": "phones",
                "title": "Nice phone",
                "price_cents": 120_000,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let listing = json_body(response).await;
    let id = listing["id"].as_i64().unwrap();
    assert_eq!(listing["status_id"], 1);

    // Submit for review.
    let response = app
        .clone()
        .oneshot(post_empty(&format!("/api/v1/listings/{id}/submit")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Approve (activate).
    let response = app
        .clone()
        .oneshot(post_empty(&format!("/api/v1/listings/{id}/activate")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status_id"], 3);
    assert!(body["listing_expires_at"].is_string());

    // It shows up on the ranked read.
    let response = app
        .oneshot(get("/api/v1/listings?category=phones"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activation_denial_is_reason_coded(pool: PgPool) {
    let seller = seed_seller(&pool).await;
    seed_subscription(&pool, seller, 0).await;
    let app = sokoni_api::app(test_state(pool.clone()));

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/listings",
            serde_json::json!({
                "seller_id": seller,
                "category": "phones",
                "title": "Over quota",
            }),
        ))
        .await
        .unwrap();
    let id = json_body(response).await["id"].as_i64().unwrap();

    let response = app
        .oneshot(post_empty(&format!("/api/v1/listings/{id}/activate")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["code"], "quota_exceeded");
}

// ---------------------------------------------------------------------------
// Admin sweep trigger
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sweep_endpoint_returns_per_phase_counts(pool: PgPool) {
    let seller = seed_seller(&pool).await;
    sqlx::query(
        "INSERT INTO listings (seller_id, category, title, status_id, listing_expires_at) \
         VALUES ($1, 'general', 'stale', 3, NOW() - INTERVAL '1 hour')",
    )
    .bind(seller)
    .execute(&pool)
    .await
    .unwrap();

    let app = sokoni_api::app(test_state(pool));

    let response = app
        .clone()
        .oneshot(post_empty("/api/v1/admin/sweep"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["listing_lifetime"], 1);
    assert_eq!(body["subscription"], 0);
    assert_eq!(body["failed_phases"].as_array().unwrap().len(), 0);

    // Idempotent: triggering again affects nothing.
    let response = app
        .oneshot(post_empty("/api/v1/admin/sweep"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["listing_lifetime"], 0);
}
