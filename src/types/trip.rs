//! Trip-related types
//!
//! Trips are immutable facts: once the ledger has assigned an id, nothing
//! changes them.

use super::card::UserId;
use super::error::FareError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Trip identifier, assigned by the ledger in ascending order
pub type TripId = u64;

/// Mode of transport used for a trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripKind {
    Bus,
    Train,
}

impl TripKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TripKind::Bus => "bus",
            TripKind::Train => "train",
        }
    }
}

impl fmt::Display for TripKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripKind {
    type Err = FareError;

    /// Parse a trip type, ignoring case and surrounding whitespace
    ///
    /// Anything other than `bus` or `train` is rejected rather than carried
    /// along as an opaque string.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "bus" => Ok(TripKind::Bus),
            "train" => Ok(TripKind::Train),
            _ => Err(FareError::unknown_trip_kind(value)),
        }
    }
}

/// A single completed ride
///
/// `id` is `None` until the trip has been appended to a ledger. The ledger
/// does not check that `from_location` and `to_location` differ, nor that
/// `user_id` has a card.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    /// Ledger-assigned identifier
    pub id: Option<TripId>,

    /// Boarding stop
    pub from_location: String,

    /// Alighting stop
    pub to_location: String,

    /// Bus or train line identifier (e.g. "L12", "T2")
    pub line: String,

    /// Fare paid, always positive
    pub price: Decimal,

    /// When the trip happened; history is sorted on this alone
    pub time: NaiveDateTime,

    /// User the trip belongs to
    pub user_id: UserId,

    /// Mode of transport
    pub kind: TripKind,
}

impl Trip {
    /// Create a trip that has not yet been assigned an id
    pub fn new(
        from_location: impl Into<String>,
        to_location: impl Into<String>,
        line: impl Into<String>,
        price: Decimal,
        time: NaiveDateTime,
        user_id: impl Into<UserId>,
        kind: TripKind,
    ) -> Self {
        Trip {
            id: None,
            from_location: from_location.into(),
            to_location: to_location.into(),
            line: line.into(),
            price,
            time,
            user_id: user_id.into(),
            kind,
        }
    }

    /// Return this trip with a preset id
    pub fn with_id(mut self, id: TripId) -> Self {
        self.id = Some(id);
        self
    }
}
