use crate::models::{BookingId, SeatId, SectionId};

/// Reasons a `(section, seat)` claim is refused by the seat allocation table.
///
/// Checks run in a fixed order (section, capacity, seat number, occupancy) and
/// the first failing one is reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("section not found: {0}")]
    SectionNotFound(SectionId),

    #[error("section is full: {section} ({capacity} seats)")]
    SectionFull { section: SectionId, capacity: u32 },

    #[error("invalid seat id {seat} for section {section} (valid: 1..={capacity})")]
    InvalidSeat {
        section: SectionId,
        seat: SeatId,
        capacity: u32,
    },

    #[error("seat already allocated: {section}/{seat}")]
    SeatTaken { section: SectionId, seat: SeatId },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error("booking not found: {0}")]
    BookingNotFound(BookingId),

    #[error("booking id already exists: {0}")]
    DuplicateBookingId(BookingId),

    #[error("failed to generate booking id: {0}")]
    Generation(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("booking {booking_id} lost its seat while relocating: {source}")]
    SeatLost {
        booking_id: BookingId,
        source: AllocationError,
    },
}

impl BookingError {
    /// Failures that indicate a broken host or engine rather than an ordinary
    /// outcome of concurrent use.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Generation(_) | Self::SeatLost { .. })
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
