//! Administrative sweep trigger.

use axum::extract::State;
use axum::Json;

use sokoni_core::sweep::SweepReport;
use sokoni_worker::ExpirySweep;

use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/admin/sweep
///
/// Runs one expiry sweep immediately and returns the per-phase counts.
/// Idempotent and safe to call while the scheduled worker loop is mid-run;
/// overlapping invocations skip each other's locked rows.
pub async fn run_sweep(State(state): State<AppState>) -> AppResult<Json<SweepReport>> {
    let sweep = ExpirySweep::new(
        state.pool.clone(),
        state.notifier.clone(),
        state.event_bus.clone(),
    )
    .with_batch_size(state.config.sweep_batch_size);

    Ok(Json(sweep.run_once().await))
}
