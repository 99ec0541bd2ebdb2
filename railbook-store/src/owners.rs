use railbook_core::{BookingId, OwnerId};
use std::collections::{BTreeSet, HashMap};

/// Owner identity -> ids of the live bookings they purchased.
///
/// Kept in lock-step with the ledger: owners with no bookings left are dropped.
#[derive(Debug, Default, Clone)]
pub struct OwnerIndex {
    owners: HashMap<OwnerId, BTreeSet<BookingId>>,
}

impl OwnerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, owner: &OwnerId, booking_id: &BookingId) {
        self.owners
            .entry(owner.clone())
            .or_default()
            .insert(booking_id.clone());
    }

    pub fn remove(&mut self, owner: &OwnerId, booking_id: &BookingId) -> bool {
        let Some(ids) = self.owners.get_mut(owner) else {
            return false;
        };
        let removed = ids.remove(booking_id);
        if ids.is_empty() {
            self.owners.remove(owner);
        }
        removed
    }

    pub fn owns(&self, owner: &OwnerId, booking_id: &BookingId) -> bool {
        self.owners
            .get(owner)
            .is_some_and(|ids| ids.contains(booking_id))
    }

    pub fn bookings_of(&self, owner: &OwnerId) -> Vec<BookingId> {
        self.owners
            .get(owner)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn booking_count(&self) -> usize {
        self.owners.values().map(BTreeSet::len).sum()
    }
}
