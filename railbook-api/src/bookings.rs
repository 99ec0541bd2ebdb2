use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use railbook_core::{Booking, BookingId, Caller, PurchaseRequest, Seat, SeatId, SectionId, User};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, middleware::require_admin, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BookingResponse {
    pub booking_id: BookingId,
    pub user: User,
    pub seat: Seat,
    pub from: String,
    pub to: String,
    pub price_paid: f64,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            booking_id: booking.booking_id,
            user: booking.user,
            seat: booking.seat,
            from: booking.from,
            to: booking.to,
            price_paid: booking.price_paid,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ModifySeatRequest {
    pub new_section_id: SectionId,
    pub new_seat_id: SeatId,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(purchase))
        .route("/v1/bookings/mine", get(my_bookings))
        .route("/v1/bookings/{booking_id}", delete(remove_user_from_train))
        .route("/v1/bookings/{booking_id}/seat", patch(modify_seat))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bookings
/// Any authenticated caller may buy a seat; the token subject becomes the owner.
async fn purchase(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let booking = state.datastore.purchase(&caller.identity, req)?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// GET /v1/bookings/mine
async fn my_bookings(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Json<Vec<BookingResponse>> {
    let bookings = state.datastore.bookings_for_owner(&caller.identity);
    Json(bookings.into_iter().map(BookingResponse::from).collect())
}

/// Administrators always pass. With ownership enforcement on, any caller
/// passes here and the engine checks they own the booking.
fn authorize_management(state: &AppState, caller: &Caller) -> Result<(), AppError> {
    if state.datastore.owner_or_admin_only() {
        Ok(())
    } else {
        require_admin(caller)
    }
}

/// DELETE /v1/bookings/:booking_id
async fn remove_user_from_train(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(booking_id): Path<BookingId>,
) -> Result<StatusCode, AppError> {
    authorize_management(&state, &caller)?;
    state.datastore.remove_user_from_train(&caller, &booking_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /v1/bookings/:booking_id/seat
async fn modify_seat(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(booking_id): Path<BookingId>,
    Json(req): Json<ModifySeatRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    authorize_management(&state, &caller)?;
    let booking = state.datastore.modify_seat(
        &caller,
        &booking_id,
        &req.new_section_id,
        &req.new_seat_id,
    )?;
    Ok(Json(booking.into()))
}
