use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sokoni_events::{EventBus, Notifier};
use sokoni_worker::sweep::{ExpirySweep, DEFAULT_BATCH_SIZE, DEFAULT_SWEEP_INTERVAL};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sokoni_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sokoni_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    sokoni_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let interval = std::env::var("SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_SWEEP_INTERVAL);

    let batch_size = std::env::var("SWEEP_BATCH_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_BATCH_SIZE);

    let bus = Arc::new(EventBus::default());
    let notifier = Arc::new(Notifier::new(pool.clone(), Arc::clone(&bus)));
    let sweep = ExpirySweep::new(pool, notifier, bus)
        .with_interval(interval)
        .with_batch_size(batch_size);

    tracing::info!(
        interval_secs = interval.as_secs(),
        batch_size,
        "Expiry sweep worker starting"
    );

    let cancel = tokio_util::sync::CancellationToken::new();
    let loop_cancel = cancel.clone();

    tokio::select! {
        _ = sweep.run(loop_cancel) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            cancel.cancel();
        }
    }
}
