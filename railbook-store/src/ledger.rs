use railbook_core::{Booking, BookingError, BookingId};
use std::collections::HashMap;

/// Authoritative store of booking records, keyed by booking id.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    bookings: HashMap<BookingId, Booking>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new booking. An id that is already live is refused and the
    /// ledger is left unchanged.
    pub fn insert(&mut self, booking: Booking) -> Result<(), BookingError> {
        if self.bookings.contains_key(&booking.booking_id) {
            return Err(BookingError::DuplicateBookingId(booking.booking_id));
        }
        self.bookings.insert(booking.booking_id.clone(), booking);
        Ok(())
    }

    pub fn get(&self, booking_id: &BookingId) -> Option<&Booking> {
        self.bookings.get(booking_id)
    }

    pub(crate) fn get_mut(&mut self, booking_id: &BookingId) -> Option<&mut Booking> {
        self.bookings.get_mut(booking_id)
    }

    pub fn remove(&mut self, booking_id: &BookingId) -> Option<Booking> {
        self.bookings.remove(booking_id)
    }

    pub fn contains(&self, booking_id: &BookingId) -> bool {
        self.bookings.contains_key(booking_id)
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.values()
    }
}
