//! Handlers for the `/listings` resource and its lifecycle transitions.
//!
//! Every status write goes through a conditional repository update (or, for
//! activation, the quota gate); a transition that lost a race with the
//! sweep or another request surfaces as a 409, not a silent overwrite.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use sokoni_core::error::CoreError;
use sokoni_core::types::DbId;
use sokoni_db::models::listing::{ActivateListing, CreateListing, Listing, RankedListingQuery};
use sokoni_db::quota_gate::{ActivateError, ActivationOutcome, QuotaGate};
use sokoni_db::repositories::ListingRepo;
use sokoni_events::MarketEvent;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/listings
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateListing>,
) -> AppResult<(StatusCode, Json<Listing>)> {
    let listing = ListingRepo::create(&state.pool, &input).await?;
    state.event_bus.publish(
        MarketEvent::new("listing.created")
            .with_entity("listing", listing.id)
            .with_seller(listing.seller_id),
    );
    Ok((StatusCode::CREATED, Json(listing)))
}

/// GET /api/v1/listings/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Listing>> {
    let listing = ListingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Listing",
            id,
        }))?;
    Ok(Json(listing))
}

/// GET /api/v1/listings?category=...&placement=...
///
/// Ranked read path: promotion for the rendered placement, then effective
/// tier weight, then effective featured, then recency.
pub async fn list_ranked(
    State(state): State<AppState>,
    Query(params): Query<RankedListingQuery>,
) -> AppResult<Json<Vec<Listing>>> {
    let listings = ListingRepo::list_ranked(&state.pool, &params).await?;
    Ok(Json(listings))
}

/// GET /api/v1/sellers/{id}/listings
pub async fn list_by_seller(
    State(state): State<AppState>,
    Path(seller_id): Path<DbId>,
) -> AppResult<Json<Vec<Listing>>> {
    let listings = ListingRepo::list_by_seller(&state.pool, seller_id).await?;
    Ok(Json(listings))
}

/// POST /api/v1/listings/{id}/submit: `draft -> pending_review`.
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Listing>> {
    let submitted = ListingRepo::submit(&state.pool, id).await?;
    if !submitted {
        return Err(transition_conflict(&state, id, "draft").await);
    }
    let listing = fetch(&state, id).await?;
    state.event_bus.publish(
        MarketEvent::new("listing.submitted")
            .with_entity("listing", id)
            .with_seller(listing.seller_id),
    );
    Ok(Json(listing))
}

/// POST /api/v1/listings/{id}/activate
///
/// The moderator approval / seller re-activation instant: the quota gate
/// runs transactionally immediately before the status write. Denials come
/// back reason-coded. The body is optional; an empty body activates with
/// the default lifetime and no tier or promotion.
pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: axum::body::Bytes,
) -> AppResult<Json<Listing>> {
    let input: ActivateListing = if body.is_empty() {
        ActivateListing::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?
    };

    let outcome = QuotaGate::activate(&state.pool, id, &input)
        .await
        .map_err(|e| match e {
            ActivateError::ListingNotFound => AppError::Core(CoreError::NotFound {
                entity: "Listing",
                id,
            }),
            other => other.into(),
        })?;

    match outcome {
        ActivationOutcome::Activated(listing) => {
            state.event_bus.publish(
                MarketEvent::new("listing.activated")
                    .with_entity("listing", listing.id)
                    .with_seller(listing.seller_id),
            );
            Ok(Json(listing))
        }
        ActivationOutcome::Denied(reason) => Err(AppError::Denied(reason)),
    }
}

/// POST /api/v1/listings/{id}/withdraw: back to `draft`, entitlements
/// cleared.
pub async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Listing>> {
    let withdrawn = ListingRepo::withdraw(&state.pool, id).await?;
    if !withdrawn {
        return Err(transition_conflict(&state, id, "active or pending_review").await);
    }
    let listing = fetch(&state, id).await?;
    state.event_bus.publish(
        MarketEvent::new("listing.withdrawn")
            .with_entity("listing", id)
            .with_seller(listing.seller_id),
    );
    Ok(Json(listing))
}

/// POST /api/v1/listings/{id}/sold
pub async fn mark_sold(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Listing>> {
    let sold = ListingRepo::mark_sold(&state.pool, id).await?;
    if !sold {
        return Err(transition_conflict(&state, id, "active").await);
    }
    let listing = fetch(&state, id).await?;
    state.event_bus.publish(
        MarketEvent::new("listing.sold")
            .with_entity("listing", id)
            .with_seller(listing.seller_id),
    );
    Ok(Json(listing))
}

/// POST /api/v1/listings/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Listing>> {
    let rejected = ListingRepo::reject(&state.pool, id).await?;
    if !rejected {
        return Err(transition_conflict(&state, id, "active or pending_review").await);
    }
    let listing = fetch(&state, id).await?;
    state.event_bus.publish(
        MarketEvent::new("listing.rejected")
            .with_entity("listing", id)
            .with_seller(listing.seller_id),
    );
    Ok(Json(listing))
}

/// POST /api/v1/listings/{id}/bump: refresh the recency key.
pub async fn bump(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Listing>> {
    let bumped = ListingRepo::bump(&state.pool, id).await?;
    if !bumped {
        return Err(transition_conflict(&state, id, "active").await);
    }
    Ok(Json(fetch(&state, id).await?))
}

/// Load a listing that is known to exist (it was just updated).
async fn fetch(state: &AppState, id: DbId) -> AppResult<Listing> {
    ListingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Listing",
            id,
        }))
}

/// A conditional transition matched zero rows: distinguish "listing does
/// not exist" from "listing is not in the expected state".
async fn transition_conflict(state: &AppState, id: DbId, expected: &str) -> AppError {
    match ListingRepo::find_by_id(&state.pool, id).await {
        Ok(Some(_)) => AppError::Core(CoreError::Conflict(format!(
            "Listing {id} is not in the expected state ({expected})"
        ))),
        Ok(None) => AppError::Core(CoreError::NotFound {
            entity: "Listing",
            id,
        }),
        Err(e) => AppError::Database(e),
    }
}
