//! The booking engine: seat allocation table, booking ledger and owner index
//! composed behind one reader/writer lock.
//!
//! Every write (purchase, removal, relocation) holds the write lock for its
//! whole critical section, so no reader ever sees a seat that is free while
//! its booking is still live, or the reverse. One lock for the whole engine
//! is enough at this scale and avoids any lock-ordering rules for relocations
//! that touch two sections.

use crate::app_config::{ConfigError, EngineConfig, RouteConfig};
use crate::ledger::Ledger;
use crate::owners::OwnerIndex;
use crate::seating::{SeatingTable, SectionOccupancy};
use parking_lot::RwLock;
use railbook_core::{
    Booking, BookingError, BookingId, BookingResult, Caller, IdSource, OwnerId, PurchaseRequest,
    RandomIds, Seat, SeatId, SectionId,
};
use railbook_shared::Masked;
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug)]
struct State {
    seating: SeatingTable,
    ledger: Ledger,
    owners: OwnerIndex,
}

impl State {
    /// Drop a booking from all three structures. Caller must know it is live.
    fn evict(&mut self, booking_id: &BookingId) -> Option<Booking> {
        let booking = self.ledger.remove(booking_id)?;
        self.seating
            .release(&booking.seat.section_id, &booking.seat.seat_id);
        self.owners.remove(&booking.owner, booking_id);
        Some(booking)
    }
}

/// Shared, injectable engine instance. Construct once per process and hand an
/// `Arc<Datastore>` to request handlers.
pub struct Datastore {
    route: RouteConfig,
    owner_or_admin_only: bool,
    ids: Arc<dyn IdSource>,
    state: RwLock<State>,
}

impl Datastore {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_id_source(config, Arc::new(RandomIds))
    }

    pub fn with_id_source(
        config: EngineConfig,
        ids: Arc<dyn IdSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let sections = config
            .sections
            .iter()
            .map(|s| SectionId::from(s.trim()));
        let state = State {
            seating: SeatingTable::new(sections, config.section_capacity),
            ledger: Ledger::new(),
            owners: OwnerIndex::new(),
        };

        info!(
            sections = ?config.sections,
            capacity = config.section_capacity,
            owner_or_admin_only = config.owner_or_admin_only,
            "Booking engine initialised"
        );

        Ok(Self {
            route: config.route,
            owner_or_admin_only: config.owner_or_admin_only,
            ids,
            state: RwLock::new(state),
        })
    }

    pub fn route(&self) -> &RouteConfig {
        &self.route
    }

    pub fn owner_or_admin_only(&self) -> bool {
        self.owner_or_admin_only
    }

    /// Sell a fresh booking for `request.seat` to `owner`.
    pub fn purchase(&self, owner: &OwnerId, request: PurchaseRequest) -> BookingResult<Booking> {
        if let Some(id) = request.supplied_id() {
            debug!(booking_id = %id, "Purchase rejected: booking id must be empty");
            return Err(BookingError::InvalidRequest(format!(
                "booking id must be empty: {}",
                id
            )));
        }

        let mut state = self.state.write();

        let booking_id = self.ids.next_id()?;
        let seat_id = state
            .seating
            .allocate(&request.seat.section_id, &request.seat.seat_id, &booking_id)
            .inspect_err(|e| debug!(owner = %Masked(owner), "Purchase rejected: {}", e))?;

        let booking = Booking {
            booking_id: booking_id.clone(),
            owner: owner.clone(),
            user: request.user,
            seat: Seat {
                section_id: request.seat.section_id,
                seat_id,
            },
            from: self.route.origin.clone(),
            to: self.route.destination.clone(),
            price_paid: self.route.fare,
        };

        if let Err(e) = state.ledger.insert(booking.clone()) {
            state
                .seating
                .release(&booking.seat.section_id, &booking.seat.seat_id);
            return Err(e);
        }
        state.owners.add(owner, &booking_id);

        info!(
            booking_id = %booking_id,
            owner = %Masked(owner),
            seat = %booking.seat,
            "Booking purchased"
        );
        Ok(booking)
    }

    pub fn get_booking(&self, booking_id: &BookingId) -> Option<Booking> {
        self.state.read().ledger.get(booking_id).cloned()
    }

    /// Live bookings seated in `section`. An unconfigured section is not an
    /// error here, it simply has no occupants.
    pub fn bookings_by_section(&self, section: &SectionId) -> Vec<Booking> {
        let state = self.state.read();
        state
            .seating
            .occupants(section)
            .iter()
            .filter_map(|id| state.ledger.get(id).cloned())
            .collect()
    }

    pub fn bookings_for_owner(&self, owner: &OwnerId) -> Vec<Booking> {
        let state = self.state.read();
        state
            .owners
            .bookings_of(owner)
            .iter()
            .filter_map(|id| state.ledger.get(id).cloned())
            .collect()
    }

    pub fn occupancy(&self) -> Vec<SectionOccupancy> {
        let state = self.state.read();
        state
            .seating
            .sections()
            .filter_map(|section| state.seating.occupancy(section))
            .collect()
    }

    /// Cancel a booking and free its seat. Returns the removed record.
    pub fn remove_user_from_train(
        &self,
        caller: &Caller,
        booking_id: &BookingId,
    ) -> BookingResult<Booking> {
        let mut state = self.state.write();
        self.authorize(&state, caller, booking_id)?;

        let booking = state
            .evict(booking_id)
            .ok_or_else(|| BookingError::BookingNotFound(booking_id.clone()))?;

        info!(
            booking_id = %booking_id,
            seat = %booking.seat,
            by = %Masked(&caller.identity),
            "Booking removed"
        );
        Ok(booking)
    }

    /// Move a booking to another seat, keeping its id, owner and passenger.
    ///
    /// If the new seat cannot be allocated the booking keeps its original seat
    /// and the allocation error is returned.
    pub fn modify_seat(
        &self,
        caller: &Caller,
        booking_id: &BookingId,
        new_section: &SectionId,
        new_seat: &SeatId,
    ) -> BookingResult<Booking> {
        let mut state = self.state.write();
        self.authorize(&state, caller, booking_id)?;

        let old_seat = state
            .ledger
            .get(booking_id)
            .map(|b| b.seat.clone())
            .ok_or_else(|| BookingError::BookingNotFound(booking_id.clone()))?;

        // Free the old seat first so a move inside a full section can succeed.
        state.seating.release(&old_seat.section_id, &old_seat.seat_id);

        let seat_id = match state.seating.allocate(new_section, new_seat, booking_id) {
            Ok(seat_id) => seat_id,
            Err(e) => {
                if let Err(lost) =
                    state
                        .seating
                        .allocate(&old_seat.section_id, &old_seat.seat_id, booking_id)
                {
                    state.evict(booking_id);
                    error!(
                        booking_id = %booking_id,
                        seat = %old_seat,
                        "Relocation failed and original seat could not be restored: {}",
                        lost
                    );
                    return Err(BookingError::SeatLost {
                        booking_id: booking_id.clone(),
                        source: lost,
                    });
                }
                debug!(booking_id = %booking_id, "Relocation rejected: {}", e);
                return Err(e.into());
            }
        };

        let booking = state
            .ledger
            .get_mut(booking_id)
            .ok_or_else(|| BookingError::BookingNotFound(booking_id.clone()))?;
        booking.seat = Seat {
            section_id: new_section.clone(),
            seat_id,
        };
        let updated = booking.clone();

        info!(
            booking_id = %booking_id,
            from = %old_seat,
            to = %updated.seat,
            "Booking relocated"
        );
        Ok(updated)
    }

    /// With ownership enforcement on, a non-admin caller may only touch their
    /// own bookings; anything else is reported as not found.
    fn authorize(&self, state: &State, caller: &Caller, booking_id: &BookingId) -> BookingResult<()> {
        let booking = state
            .ledger
            .get(booking_id)
            .ok_or_else(|| BookingError::BookingNotFound(booking_id.clone()))?;

        if self.owner_or_admin_only && !caller.can_manage(booking) {
            debug!(
                booking_id = %booking_id,
                caller = %Masked(&caller.identity),
                "Caller does not own booking"
            );
            return Err(BookingError::BookingNotFound(booking_id.clone()));
        }
        Ok(())
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        let state = self.state.read();
        assert_eq!(state.seating.total_occupied(), state.ledger.len());
        assert_eq!(state.owners.booking_count(), state.ledger.len());
        for booking in state.ledger.iter() {
            assert_eq!(
                state
                    .seating
                    .occupant(&booking.seat.section_id, &booking.seat.seat_id),
                Some(&booking.booking_id)
            );
            assert!(state.owners.owns(&booking.owner, &booking.booking_id));
        }
        for section in state.seating.sections() {
            let occupancy = state.seating.occupancy(section).unwrap();
            assert!(occupancy.occupied <= occupancy.capacity);
        }
    }
}
