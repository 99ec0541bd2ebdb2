use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use railbook_core::{Caller, SectionId};
use serde::{Deserialize, Serialize};

use crate::{bookings::BookingResponse, error::AppError, middleware::require_admin, state::AppState};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SectionOccupancyResponse {
    pub section_id: SectionId,
    pub capacity: u32,
    pub occupied: u32,
    pub available: u32,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/sections", get(list_sections))
        .route("/v1/sections/{section}/bookings", get(bookings_by_section))
}

/// GET /v1/sections
async fn list_sections(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<SectionOccupancyResponse>>, AppError> {
    require_admin(&caller)?;

    let sections = state
        .datastore
        .occupancy()
        .into_iter()
        .map(|o| SectionOccupancyResponse {
            available: o.available(),
            section_id: o.section_id,
            capacity: o.capacity,
            occupied: o.occupied,
        })
        .collect();
    Ok(Json(sections))
}

/// GET /v1/sections/:section/bookings
/// Unknown sections return an empty list rather than 404.
async fn bookings_by_section(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(section): Path<SectionId>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    require_admin(&caller)?;

    let bookings = state.datastore.bookings_by_section(&section);
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}
