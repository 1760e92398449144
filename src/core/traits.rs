//! Core traits for card storage and trip history
//!
//! The service is written against these traits so the in-memory stores can be
//! swapped for another backend. Every method takes `&self`: implementations
//! are shared between concurrent callers and do their own locking.

use crate::types::{Card, FareError, Trip};
use rust_decimal::Decimal;

/// Card storage with atomic balance updates
///
/// Implementations must serialize [`apply_credit`](AccountStore::apply_credit)
/// per card number without blocking credits to other cards, and must keep at
/// most one card per user.
pub trait AccountStore: Send + Sync {
    /// Look up the card owned by `user_id`
    fn get_by_user(&self, user_id: &str) -> Result<Card, FareError>;

    /// Look up a card by its number
    fn get_by_card_number(&self, card_number: &str) -> Result<Card, FareError>;

    /// Add `amount` to a card's balance and return the updated card
    ///
    /// Either the whole credit is applied or the balance is left untouched.
    fn apply_credit(&self, card_number: &str, amount: Decimal) -> Result<Card, FareError>;

    /// Insert or replace a card (provisioning only)
    fn save(&self, card: Card) -> Result<Card, FareError>;

    /// Number of stored cards
    fn count(&self) -> Result<usize, FareError>;

    /// Snapshot of every card, sorted by card number
    fn all(&self) -> Result<Vec<Card>, FareError>;
}

/// Append-only trip history
pub trait TripLedger: Send + Sync {
    /// Store a trip, assigning the next id if it has none
    fn append(&self, trip: Trip) -> Result<Trip, FareError>;

    /// Every trip for `user_id`, newest first
    fn list_by_user(&self, user_id: &str) -> Result<Vec<Trip>, FareError>;

    /// Store many trips (provisioning only)
    fn append_all(&self, trips: Vec<Trip>) -> Result<Vec<Trip>, FareError> {
        trips.into_iter().map(|trip| self.append(trip)).collect()
    }

    /// Number of stored trips
    fn count(&self) -> Result<usize, FareError>;

    /// Snapshot of every trip, sorted by id
    fn all(&self) -> Result<Vec<Trip>, FareError>;
}
