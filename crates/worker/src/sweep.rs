//! The expiry sweep: the scheduled reconciler for all temporal grants.
//!
//! [`ExpirySweep::run_once`] is the single idempotent entry point exposed
//! to schedulers (timer, manual admin trigger, distributed retry). It walks
//! the five phases in order, but each phase re-derives eligibility from
//! current row state, so overlapping invocations and re-runs after partial
//! failure converge on the same final state and never double-fire a
//! notification: a row already transitioned simply fails the next run's
//! selection predicate.
//!
//! A failing phase is logged and recorded in the report; it never aborts
//! the remaining phases. Its predicate still holds, so the next scheduled
//! run retries it.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use sokoni_core::notifications::{
    NOTIFY_LISTING_EXPIRED, NOTIFY_SUBSCRIPTION_EXPIRED, RELATED_LISTING, RELATED_SUBSCRIPTION,
};
use sokoni_core::sweep::{SweepPhase, SweepReport};
use sokoni_db::repositories::sweep_repo::{ExpiredListing, ExpiredSubscription};
use sokoni_db::repositories::SweepRepo;
use sokoni_db::DbPool;
use sokoni_events::{EventBus, MarketEvent, Notifier};

/// How often the scheduled loop runs a sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Rows processed per phase query. Bounded batches keep a slow sweep
/// interruptible; the next trigger resumes whatever remains.
pub const DEFAULT_BATCH_SIZE: i64 = 500;

// ---------------------------------------------------------------------------
// ExpirySweep
// ---------------------------------------------------------------------------

/// Reconciles expired entitlements into their downgraded state.
pub struct ExpirySweep {
    pool: DbPool,
    notifier: Arc<Notifier>,
    bus: Arc<EventBus>,
    batch_size: i64,
    interval: Duration,
}

impl ExpirySweep {
    pub fn new(pool: DbPool, notifier: Arc<Notifier>, bus: Arc<EventBus>) -> Self {
        Self {
            pool,
            notifier,
            bus,
            batch_size: DEFAULT_BATCH_SIZE,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one full sweep and return the per-phase affected-row counts.
    ///
    /// Safe to call concurrently with itself and with the scheduled loop.
    pub async fn run_once(&self) -> SweepReport {
        let mut report = SweepReport::default();

        self.sweep_listing_lifetimes(&mut report).await;
        self.sweep_subscriptions(&mut report).await;
        self.sweep_counted_phase(SweepPhase::Tier, &mut report).await;
        self.sweep_counted_phase(SweepPhase::Featured, &mut report).await;
        self.sweep_counted_phase(SweepPhase::Promotion, &mut report).await;

        if !report.is_noop() {
            tracing::info!(
                listing_lifetime = report.listing_lifetime,
                subscription = report.subscription,
                subscription_cascade = report.subscription_cascade,
                tier = report.tier,
                featured = report.featured,
                promotion = report.promotion,
                failed = report.failed_phases.len(),
                "Expiry sweep applied changes"
            );
        }
        report
    }

    /// Run the scheduled loop until cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Expiry sweep cancelled");
                    break;
                }
                _ = interval.tick() => {
                    self.run_once().await;
                }
            }
        }
    }

    // -- phase 1 ------------------------------------------------------------

    async fn sweep_listing_lifetimes(&self, report: &mut SweepReport) {
        let phase = SweepPhase::ListingLifetime;
        loop {
            match SweepRepo::expire_listing_lifetimes(&self.pool, self.batch_size).await {
                Ok(rows) => {
                    report.record(phase, rows.len() as u64);
                    for listing in &rows {
                        self.announce_listing_expired(listing).await;
                    }
                    if (rows.len() as i64) < self.batch_size {
                        break;
                    }
                }
                Err(e) => {
                    Self::log_phase_failure(phase, &e);
                    report.record_failure(phase);
                    break;
                }
            }
        }
    }

    async fn announce_listing_expired(&self, listing: &ExpiredListing) {
        self.notifier
            .notify(
                listing.seller_id,
                NOTIFY_LISTING_EXPIRED,
                "Listing expired",
                &format!(
                    "Your listing \"{}\" reached the end of its lifetime and was moved back to draft.",
                    listing.title
                ),
                Some(listing.id),
                Some(RELATED_LISTING),
            )
            .await;
        self.bus.publish(
            MarketEvent::new("listing.expired")
                .with_entity("listing", listing.id)
                .with_seller(listing.seller_id),
        );
    }

    // -- phase 2 ------------------------------------------------------------

    async fn sweep_subscriptions(&self, report: &mut SweepReport) {
        let phase = SweepPhase::Subscription;
        loop {
            match SweepRepo::expire_subscriptions(&self.pool, self.batch_size).await {
                Ok(batch) => {
                    report.record(phase, batch.subscriptions.len() as u64);
                    report.subscription_cascade += batch.cascaded_listings.len() as u64;

                    for listing in &batch.cascaded_listings {
                        self.announce_cascaded_listing(listing).await;
                    }
                    for subscription in &batch.subscriptions {
                        self.announce_subscription_expired(subscription).await;
                    }
                    if (batch.subscriptions.len() as i64) < self.batch_size {
                        break;
                    }
                }
                Err(e) => {
                    Self::log_phase_failure(phase, &e);
                    report.record_failure(phase);
                    break;
                }
            }
        }
    }

    async fn announce_cascaded_listing(&self, listing: &ExpiredListing) {
        // Distinct reason from phase 1: the listing was fine, the
        // subscription behind it lapsed.
        self.notifier
            .notify(
                listing.seller_id,
                NOTIFY_SUBSCRIPTION_EXPIRED,
                "Listing deactivated",
                &format!(
                    "Your listing \"{}\" was moved back to draft because your subscription expired.",
                    listing.title
                ),
                Some(listing.id),
                Some(RELATED_LISTING),
            )
            .await;
    }

    async fn announce_subscription_expired(&self, subscription: &ExpiredSubscription) {
        self.notifier
            .notify(
                subscription.seller_id,
                NOTIFY_SUBSCRIPTION_EXPIRED,
                "Subscription expired",
                &format!(
                    "Your \"{}\" subscription has expired. Renew it to activate listings again.",
                    subscription.plan_name
                ),
                Some(subscription.id),
                Some(RELATED_SUBSCRIPTION),
            )
            .await;
        self.bus.publish(
            MarketEvent::new("subscription.expired")
                .with_entity("subscription", subscription.id)
                .with_seller(subscription.seller_id),
        );
    }

    // -- phases 3 to 5 (soft downgrades, no notifications) -------------------

    async fn sweep_counted_phase(&self, phase: SweepPhase, report: &mut SweepReport) {
        loop {
            let result = match phase {
                SweepPhase::Tier => SweepRepo::expire_tiers(&self.pool, self.batch_size).await,
                SweepPhase::Featured => {
                    SweepRepo::expire_featured(&self.pool, self.batch_size).await
                }
                SweepPhase::Promotion => {
                    SweepRepo::expire_promotions(&self.pool, self.batch_size).await
                }
                // Phases 1 and 2 carry notifications and have their own paths.
                SweepPhase::ListingLifetime | SweepPhase::Subscription => unreachable!(),
            };

            match result {
                Ok(count) => {
                    report.record(phase, count);
                    if (count as i64) < self.batch_size {
                        break;
                    }
                }
                Err(e) => {
                    Self::log_phase_failure(phase, &e);
                    report.record_failure(phase);
                    break;
                }
            }
        }
    }

    fn log_phase_failure(phase: SweepPhase, error: &sqlx::Error) {
        tracing::error!(
            phase = phase.as_str(),
            error = %error,
            "Sweep phase failed; will retry on the next scheduled run"
        );
    }
}
