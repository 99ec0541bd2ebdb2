pub mod error;
pub mod ids;
pub mod models;

pub use error::{AllocationError, BookingError, BookingResult};
pub use ids::{IdSource, RandomIds};
pub use models::{
    Booking, BookingId, Caller, OwnerId, PurchaseRequest, Seat, SeatId, SectionId, User,
};
