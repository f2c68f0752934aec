//! End-to-end tests for the expiry sweep service: per-phase counts,
//! notification accounting, idempotence, and failure isolation between
//! phases.

use std::sync::Arc;

use sqlx::PgPool;

use sokoni_core::notifications::{
    NOTIFY_LISTING_EXPIRED, NOTIFY_SUBSCRIPTION_EXPIRED, RELATED_LISTING, RELATED_SUBSCRIPTION,
};
use sokoni_core::types::DbId;
use sokoni_db::models::notification::NotificationListQuery;
use sokoni_db::repositories::NotificationRepo;
use sokoni_events::{EventBus, Notifier};
use sokoni_worker::ExpirySweep;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sweep(pool: &PgPool) -> ExpirySweep {
    let bus = Arc::new(EventBus::default());
    let notifier = Arc::new(Notifier::new(pool.clone(), Arc::clone(&bus)));
    ExpirySweep::new(pool.clone(), notifier, bus)
}

async fn seed_seller(pool: &PgPool) -> DbId {
    let row: (DbId,) =
        sqlx::query_as("INSERT INTO sellers (display_name) VALUES ('seed') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    row.0
}

async fn seed_listing(pool: &PgPool, seller_id: DbId, status_id: i16, title: &str) -> DbId {
    let row: (DbId,) = sqlx::query_as(
        "INSERT INTO listings (seller_id, category, title, status_id) \
         VALUES ($1, 'general', $2, $3) RETURNING id",
    )
    .bind(seller_id)
    .bind(title)
    .bind(status_id)
    .fetch_one(pool)
    .await
    .unwrap();
    row.0
}

async fn set(pool: &PgPool, listing_id: DbId, fragment: &str) {
    let query = format!("UPDATE listings SET {fragment} WHERE id = $1");
    sqlx::query(&query).bind(listing_id).execute(pool).await.unwrap();
}

async fn notifications_for(
    pool: &PgPool,
    user_id: DbId,
) -> Vec<sokoni_db::models::notification::Notification> {
    NotificationRepo::list_for_user(pool, user_id, &NotificationListQuery::default())
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Idempotence and notification accounting
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_sweep_is_a_noop(pool: PgPool) {
    let seller = seed_seller(&pool).await;
    let listing = seed_listing(&pool, seller, 3, "short lived").await;
    set(&pool, listing, "listing_expires_at = NOW() - INTERVAL '1 hour'").await;

    let sweep = sweep(&pool);

    let first = sweep.run_once().await;
    assert_eq!(first.listing_lifetime, 1);
    assert_eq!(first.total_affected(), 1);
    assert!(first.failed_phases.is_empty());

    let second = sweep.run_once().await;
    assert!(second.is_noop(), "second run must affect zero rows: {second:?}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn exactly_one_expiry_notification_across_repeated_sweeps(pool: PgPool) {
    let seller = seed_seller(&pool).await;
    let listing = seed_listing(&pool, seller, 3, "one notice only").await;
    set(&pool, listing, "listing_expires_at = NOW() - INTERVAL '1 hour'").await;

    let sweep = sweep(&pool);
    sweep.run_once().await;
    sweep.run_once().await;
    sweep.run_once().await;

    let notices = notifications_for(&pool, seller).await;
    let expiry_notices: Vec<_> = notices
        .iter()
        .filter(|n| n.notification_type == NOTIFY_LISTING_EXPIRED)
        .collect();
    assert_eq!(expiry_notices.len(), 1);
    assert_eq!(expiry_notices[0].related_id, Some(listing));
    assert_eq!(expiry_notices[0].related_type.as_deref(), Some(RELATED_LISTING));
}

// ---------------------------------------------------------------------------
// Subscription cascade
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn cascade_drafts_all_listings_with_correct_reasons(pool: PgPool) {
    let seller = seed_seller(&pool).await;
    let sub: (DbId,) = sqlx::query_as(
        "INSERT INTO subscriptions (seller_id, plan_name, max_listings, status_id, expires_at) \
         VALUES ($1, 'standard', 5, 1, NOW() - INTERVAL '1 minute') RETURNING id",
    )
    .bind(seller)
    .fetch_one(&pool)
    .await
    .unwrap();

    for i in 0..3 {
        let id = seed_listing(&pool, seller, 3, &format!("listing {i}")).await;
        // Lifetimes still open: only the subscription is the cause here.
        set(&pool, id, "listing_expires_at = NOW() + INTERVAL '30 days'").await;
    }

    let report = sweep(&pool).run_once().await;
    assert_eq!(report.subscription, 1);
    assert_eq!(report.subscription_cascade, 3);

    // No listing left active.
    let (active_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM listings WHERE seller_id = $1 AND status_id = 3",
    )
    .bind(seller)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(active_count, 0);

    let notices = notifications_for(&pool, seller).await;

    let listing_notices: Vec<_> = notices
        .iter()
        .filter(|n| {
            n.notification_type == NOTIFY_SUBSCRIPTION_EXPIRED
                && n.related_type.as_deref() == Some(RELATED_LISTING)
        })
        .collect();
    assert_eq!(listing_notices.len(), 3);

    let seller_notices: Vec<_> = notices
        .iter()
        .filter(|n| {
            n.notification_type == NOTIFY_SUBSCRIPTION_EXPIRED
                && n.related_type.as_deref() == Some(RELATED_SUBSCRIPTION)
        })
        .collect();
    assert_eq!(seller_notices.len(), 1);
    assert_eq!(seller_notices[0].related_id, Some(sub.0));
}

// ---------------------------------------------------------------------------
// All five phases in one run
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn full_sweep_reports_per_phase_counts(pool: PgPool) {
    let seller = seed_seller(&pool).await;
    let tier: (DbId,) = sqlx::query_as(
        "INSERT INTO tiers (name, priority_weight, max_ads) \
         VALUES ('gold', 30, 5) RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let slot: (DbId,) = sqlx::query_as(
        "INSERT INTO promotion_slots (placement_key, max_ads, duration_days) \
         VALUES ('homepage_top', 5, 7) RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let lifetime = seed_listing(&pool, seller, 3, "lifetime over").await;
    set(&pool, lifetime, "listing_expires_at = NOW() - INTERVAL '1 hour'").await;

    let tiered = seed_listing(&pool, seller, 3, "tier over").await;
    set(
        &pool,
        tiered,
        &format!(
            "tier_id = {}, tier_priority = 30, tier_expires_at = NOW() - INTERVAL '1 hour'",
            tier.0
        ),
    )
    .await;

    let was_featured = seed_listing(&pool, seller, 3, "featured over").await;
    set(
        &pool,
        was_featured,
        "is_featured = TRUE, featured_until = NOW() - INTERVAL '1 hour'",
    )
    .await;

    let promoted = seed_listing(&pool, seller, 3, "promo over").await;
    set(
        &pool,
        promoted,
        &format!(
            "promotion_slot_id = {}, promotion_expires_at = NOW() - INTERVAL '1 hour'",
            slot.0
        ),
    )
    .await;

    let report = sweep(&pool).run_once().await;
    assert_eq!(report.listing_lifetime, 1);
    assert_eq!(report.subscription, 0);
    assert_eq!(report.tier, 1);
    assert_eq!(report.featured, 1);
    assert_eq!(report.promotion, 1);
    assert!(report.failed_phases.is_empty());
    assert_eq!(report.total_affected(), 4);
}

// ---------------------------------------------------------------------------
// Failure isolation between phases
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn tier_phase_failure_does_not_stop_later_phases(pool: PgPool) {
    let seller = seed_seller(&pool).await;
    let tier: (DbId,) = sqlx::query_as(
        "INSERT INTO tiers (name, priority_weight, max_ads) \
         VALUES ('gold', 30, 5) RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let slot: (DbId,) = sqlx::query_as(
        "INSERT INTO promotion_slots (placement_key, max_ads, duration_days) \
         VALUES ('homepage_top', 5, 7) RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let tiered = seed_listing(&pool, seller, 3, "tier stuck").await;
    set(
        &pool,
        tiered,
        &format!(
            "tier_id = {}, tier_priority = 30, tier_expires_at = NOW() - INTERVAL '1 hour'",
            tier.0
        ),
    )
    .await;

    let was_featured = seed_listing(&pool, seller, 3, "featured over").await;
    set(
        &pool,
        was_featured,
        "is_featured = TRUE, featured_until = NOW() - INTERVAL '1 hour'",
    )
    .await;

    let promoted = seed_listing(&pool, seller, 3, "promo over").await;
    set(
        &pool,
        promoted,
        &format!(
            "promotion_slot_id = {}, promotion_expires_at = NOW() - INTERVAL '1 hour'",
            slot.0
        ),
    )
    .await;

    // Make the tier phase's update fail at the database level.
    sqlx::query(
        "CREATE FUNCTION block_tier_clear() RETURNS trigger AS $$ \
         BEGIN \
             IF OLD.tier_id IS NOT NULL AND NEW.tier_id IS NULL THEN \
                 RAISE EXCEPTION 'tier clear blocked for test'; \
             END IF; \
             RETURN NEW; \
         END; \
         $$ LANGUAGE plpgsql",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER block_tier_clear BEFORE UPDATE ON listings \
         FOR EACH ROW EXECUTE FUNCTION block_tier_clear()",
    )
    .execute(&pool)
    .await
    .unwrap();

    let report = sweep(&pool).run_once().await;

    assert_eq!(report.failed_phases, vec!["tier".to_string()]);
    assert_eq!(report.tier, 0);
    // Unrelated rows in later phases still completed.
    assert_eq!(report.featured, 1);
    assert_eq!(report.promotion, 1);

    // The tier row is untouched and the predicate still holds, so removing
    // the fault lets the next scheduled run repair it.
    sqlx::query("DROP TRIGGER block_tier_clear ON listings")
        .execute(&pool)
        .await
        .unwrap();
    let retry = sweep(&pool).run_once().await;
    assert_eq!(retry.tier, 1);
    assert!(retry.failed_phases.is_empty());
}
