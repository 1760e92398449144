//! Fare account orchestration
//!
//! `FareAccountService` is the only component with business rules beyond
//! storage access. It resolves cards by user, validates and applies credits,
//! and records or lists trips.
//!
//! # Architecture
//!
//! ```text
//! FareAccountService
//!     ├── Arc<impl AccountStore>  (cards, atomic per-card credit)
//!     └── Arc<impl TripLedger>    (append-only trip history)
//! ```
//!
//! Trips and balances are independent: recording a trip never
//! touches a card, and there is no debit path. Store errors are passed up
//! unchanged and nothing is retried here.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use super::traits::{AccountStore, TripLedger};
use super::{InMemoryAccountStore, InMemoryTripLedger};
use crate::types::{amount_from_f64, validate_credit_amount, Card, FareError, Trip};

/// Service over the in-memory stores
pub type InMemoryFareService = FareAccountService<InMemoryAccountStore, InMemoryTripLedger>;

/// Orchestrates card and trip storage
///
/// Cloning is cheap and clones share the same stores, so one service can be
/// handed to many concurrent tasks.
pub struct FareAccountService<A, L> {
    accounts: Arc<A>,
    trips: Arc<L>,
}

impl<A, L> Clone for FareAccountService<A, L> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            trips: Arc::clone(&self.trips),
        }
    }
}

impl<A, L> fmt::Debug for FareAccountService<A, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FareAccountService").finish_non_exhaustive()
    }
}

impl InMemoryFareService {
    /// Create a service over fresh, empty in-memory stores
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(InMemoryTripLedger::new()),
        )
    }
}

impl<A: AccountStore, L: TripLedger> FareAccountService<A, L> {
    pub fn new(accounts: Arc<A>, trips: Arc<L>) -> Self {
        Self { accounts, trips }
    }

    /// The card store, for provisioning and export
    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    /// The trip ledger, for provisioning and export
    pub fn trips(&self) -> &L {
        &self.trips
    }

    /// Fetch the card owned by `user_id`
    #[instrument(skip(self))]
    pub fn get_card(&self, user_id: &str) -> Result<Card, FareError> {
        let card = self.accounts.get_by_user(user_id)?;
        debug!(card_number = %card.card_number, "card found");
        Ok(card)
    }

    /// Add `amount` to the balance of the card owned by `user_id`
    ///
    /// This is the only operation that changes a balance. The amount is
    /// validated before the card is looked up, and the store applies the
    /// addition under the card's own lock.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Owner of the card to top up
    /// * `amount` - Exact decimal amount to add, must be greater than zero
    ///
    /// # Returns
    ///
    /// The card as it stands right after this credit.
    ///
    /// # Errors
    ///
    /// - [`FareError::InvalidAmount`] if `amount` is zero or negative
    /// - [`FareError::AccountNotFound`] if the user has no card
    /// - whatever the store reports while applying the credit
    ///
    /// # Guarantees
    ///
    /// - The new balance is exactly the old balance plus `amount`
    /// - Concurrent credits to one card never lose an update
    /// - On error the balance is unchanged
    #[instrument(skip(self, amount), fields(amount = %amount))]
    pub fn credit(&self, user_id: &str, amount: Decimal) -> Result<Card, FareError> {
        let amount = validate_credit_amount(amount)?;
        let card = self.accounts.get_by_user(user_id)?;
        let updated = self.accounts.apply_credit(&card.card_number, amount)?;

        info!(
            card_number = %updated.card_number,
            balance = %updated.balance,
            "credit processed"
        );
        Ok(updated)
    }

    /// [`credit`](Self::credit) for callers that hold a binary float
    ///
    /// NaN and infinities are rejected with [`FareError::InvalidAmount`]
    /// before anything else happens.
    pub fn credit_f64(&self, user_id: &str, amount: f64) -> Result<Card, FareError> {
        self.credit(user_id, amount_from_f64(amount)?)
    }

    /// Record a completed trip without touching any card
    #[instrument(skip(self, trip), fields(user_id = %trip.user_id))]
    pub fn record_trip(&self, trip: Trip) -> Result<Trip, FareError> {
        let stored = self.trips.append(trip)?;
        debug!(trip_id = ?stored.id, "trip recorded");
        Ok(stored)
    }

    /// Trip history for `user_id`, newest first; empty if there is none
    #[instrument(skip(self))]
    pub fn list_trips(&self, user_id: &str) -> Result<Vec<Trip>, FareError> {
        let trips = self.trips.list_by_user(user_id)?;
        debug!(count = trips.len(), "trips found");
        Ok(trips)
    }
}
