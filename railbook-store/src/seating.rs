use railbook_core::{AllocationError, BookingId, SeatId, SectionId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Occupancy snapshot of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionOccupancy {
    pub section_id: SectionId,
    pub capacity: u32,
    pub occupied: u32,
}

impl SectionOccupancy {
    pub fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.occupied)
    }
}

/// Per-section map from seat number to the booking occupying it.
///
/// The set of sections is fixed at construction. A seat key is present iff a
/// live booking occupies it.
#[derive(Debug, Clone)]
pub struct SeatingTable {
    capacity: u32,
    sections: BTreeMap<SectionId, BTreeMap<u32, BookingId>>,
}

impl SeatingTable {
    pub fn new<I>(sections: I, capacity: u32) -> Self
    where
        I: IntoIterator<Item = SectionId>,
    {
        Self {
            capacity,
            sections: sections
                .into_iter()
                .map(|section| (section, BTreeMap::new()))
                .collect(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn has_section(&self, section: &SectionId) -> bool {
        self.sections.contains_key(section)
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionId> {
        self.sections.keys()
    }

    /// Claim `(section, seat)` for `booking_id`, returning the canonical seat id
    /// that was recorded.
    pub fn allocate(
        &mut self,
        section: &SectionId,
        seat: &SeatId,
        booking_id: &BookingId,
    ) -> Result<SeatId, AllocationError> {
        let capacity = self.capacity;
        let seating = self
            .sections
            .get_mut(section)
            .ok_or_else(|| AllocationError::SectionNotFound(section.clone()))?;

        if seating.len() as u64 >= u64::from(capacity) {
            return Err(AllocationError::SectionFull {
                section: section.clone(),
                capacity,
            });
        }

        let number = seat
            .number()
            .filter(|n| (1..=capacity).contains(n))
            .ok_or_else(|| AllocationError::InvalidSeat {
                section: section.clone(),
                seat: seat.clone(),
                capacity,
            })?;

        if seating.contains_key(&number) {
            return Err(AllocationError::SeatTaken {
                section: section.clone(),
                seat: SeatId::from_number(number),
            });
        }

        seating.insert(number, booking_id.clone());
        Ok(SeatId::from_number(number))
    }

    /// Free a seat. Releasing a free seat or an unknown section is a no-op.
    pub fn release(&mut self, section: &SectionId, seat: &SeatId) -> Option<BookingId> {
        let number = seat.number()?;
        self.sections.get_mut(section)?.remove(&number)
    }

    pub fn occupant(&self, section: &SectionId, seat: &SeatId) -> Option<&BookingId> {
        let number = seat.number()?;
        self.sections.get(section)?.get(&number)
    }

    /// Bookings seated in `section`, in seat order. Unknown sections are empty.
    pub fn occupants(&self, section: &SectionId) -> Vec<BookingId> {
        self.sections
            .get(section)
            .map(|seating| seating.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn occupancy(&self, section: &SectionId) -> Option<SectionOccupancy> {
        self.sections.get(section).map(|seating| SectionOccupancy {
            section_id: section.clone(),
            capacity: self.capacity,
            occupied: seating.len() as u32,
        })
    }

    pub fn total_occupied(&self) -> usize {
        self.sections.values().map(BTreeMap::len).sum()
    }
}
