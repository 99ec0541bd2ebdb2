use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! text_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

text_id!(
    /// Engine-assigned booking identifier (32 hex characters).
    BookingId
);
text_id!(
    /// Name of a configured train section, e.g. `A`.
    SectionId
);
text_id!(
    /// Seat number within a section, kept as text on the wire.
    SeatId
);
text_id!(
    /// Authenticated identity that purchased a booking (the token subject).
    OwnerId
);

impl SeatId {
    /// Canonical form of a seat number, so `"01"` and `"1"` name the same seat.
    pub fn from_number(number: u32) -> Self {
        Self(number.to_string())
    }

    pub fn number(&self) -> Option<u32> {
        self.0.trim().parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Main identifier of the passenger.
    pub email_address: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub section_id: SectionId,
    pub seat_id: SeatId,
}

impl Seat {
    pub fn new(section_id: impl Into<SectionId>, seat_id: impl Into<SeatId>) -> Self {
        Self {
            section_id: section_id.into(),
            seat_id: seat_id.into(),
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.section_id, self.seat_id)
    }
}

/// A confirmed reservation binding one passenger to one seat on the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: BookingId,
    pub owner: OwnerId,
    pub user: User,
    pub seat: Seat,
    pub from: String,
    pub to: String,
    pub price_paid: f64,
}

/// Input to a fresh purchase. `booking_id` exists only so that a caller who
/// accidentally supplies one gets a clear rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    #[serde(default)]
    pub booking_id: Option<BookingId>,
    pub user: User,
    pub seat: Seat,
}

impl PurchaseRequest {
    pub fn new(user: User, seat: Seat) -> Self {
        Self {
            booking_id: None,
            user,
            seat,
        }
    }

    /// The supplied booking id, ignoring an empty string.
    pub fn supplied_id(&self) -> Option<&BookingId> {
        self.booking_id.as_ref().filter(|id| !id.is_empty())
    }
}

/// Principal on whose behalf an operation runs, already vetted by the
/// authentication layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub identity: OwnerId,
    pub is_admin: bool,
}

impl Caller {
    pub fn user(identity: impl Into<OwnerId>) -> Self {
        Self {
            identity: identity.into(),
            is_admin: false,
        }
    }

    pub fn admin(identity: impl Into<OwnerId>) -> Self {
        Self {
            identity: identity.into(),
            is_admin: true,
        }
    }

    pub fn can_manage(&self, booking: &Booking) -> bool {
        self.is_admin || self.identity == booking.owner
    }
}
