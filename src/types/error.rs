//! Error types for the fare account store
//!
//! Every failure surfaced by the stores, the service, and the I/O layer is a
//! [`FareError`]. Each variant maps onto one [`ErrorKind`], which is what a
//! request layer needs to pick a response status.
//!
//! # Error Categories
//!
//! - **Lookup Errors**: no card for a user or card number
//! - **Input Errors**: non-positive or non-finite amounts, unknown trip types, malformed CSV
//! - **Conflict Errors**: a second card for one user, reassigning a card, reused trip ids
//! - **Storage Errors**: the backing store or file could not complete a read/write

use crate::types::trip::TripId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Coarse classification of a [`FareError`]
///
/// Callers map these onto their own status codes: `NotFound` and
/// `InvalidInput` are client-side conditions, `Storage` is a server failure.
/// None of them are retried inside the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    Conflict,
    Storage,
}

/// Main error type for fare account operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FareError {
    /// No card matches the given user id or card number
    #[error("No card found for {lookup} '{key}'")]
    AccountNotFound {
        /// What the lookup was keyed by ("user" or "card number")
        lookup: String,
        /// The key that matched nothing
        key: String,
    },

    /// Amount is non-positive, non-finite, or not a number at all
    #[error("Invalid amount '{amount}': {reason}")]
    InvalidAmount {
        /// The rejected amount as the caller supplied it
        amount: String,
        /// Why it was rejected
        reason: String,
    },

    /// The underlying store could not complete a read or write
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        /// Description of the storage failure
        message: String,
    },

    /// A user may own at most one card
    #[error("User {user_id} already owns card {existing_card}")]
    DuplicateUser {
        /// The user that already has a card
        user_id: String,
        /// The card the user already owns
        existing_card: String,
    },

    /// A card's owner is fixed once provisioned
    #[error("Card {card_number} belongs to {owner}, cannot reassign it to {requested}")]
    OwnerChange {
        /// The card being re-saved
        card_number: String,
        /// Its current owner
        owner: String,
        /// The owner the caller asked for
        requested: String,
    },

    /// Trip ids are unique across the ledger
    #[error("Trip {id} already exists")]
    DuplicateTrip {
        /// The id that is already taken
        id: TripId,
    },

    /// Preset trip id that would leave the ledger nothing to count up to
    #[error("Trip id {id} is out of range")]
    TripIdOutOfRange {
        /// The rejected id
        id: TripId,
    },

    /// The ledger's id counter has reached the end of the id range
    #[error("No trip ids left to assign")]
    TripIdsExhausted,

    /// Balance would exceed the decimal range
    #[error("Arithmetic overflow crediting card {card_number}")]
    ArithmeticOverflow {
        /// The card whose balance would overflow
        card_number: String,
    },

    /// Trip type outside the supported set
    #[error("Unknown trip type '{value}'")]
    UnknownTripKind {
        /// The rejected type string
        value: String,
    },

    /// CSV input could not be parsed
    #[error("CSV parse error{}: {message}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for FareError {
    fn from(error: std::io::Error) -> Self {
        FareError::StorageUnavailable {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for FareError {
    fn from(error: csv::Error) -> Self {
        if error.is_io_error() {
            return FareError::StorageUnavailable {
                message: error.to_string(),
            };
        }

        let line = error.position().map(|pos| pos.line());
        FareError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl FareError {
    /// Classify this error for the request layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            FareError::AccountNotFound { .. } => ErrorKind::NotFound,
            FareError::InvalidAmount { .. }
            | FareError::ArithmeticOverflow { .. }
            | FareError::UnknownTripKind { .. }
            | FareError::TripIdOutOfRange { .. }
            | FareError::ParseError { .. } => ErrorKind::InvalidInput,
            FareError::DuplicateUser { .. }
            | FareError::OwnerChange { .. }
            | FareError::DuplicateTrip { .. } => ErrorKind::Conflict,
            FareError::StorageUnavailable { .. } | FareError::TripIdsExhausted => {
                ErrorKind::Storage
            }
        }
    }

    /// Create an AccountNotFound error for a user id lookup
    pub fn account_not_found_for_user(user_id: &str) -> Self {
        FareError::AccountNotFound {
            lookup: "user".to_string(),
            key: user_id.to_string(),
        }
    }

    /// Create an AccountNotFound error for a card number lookup
    pub fn account_not_found_for_card(card_number: &str) -> Self {
        FareError::AccountNotFound {
            lookup: "card number".to_string(),
            key: card_number.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: &str, reason: &str) -> Self {
        FareError::InvalidAmount {
            amount: amount.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an InvalidAmount error for a decimal that is zero or negative
    pub fn non_positive_amount(amount: Decimal) -> Self {
        FareError::invalid_amount(&amount.to_string(), "amount must be greater than zero")
    }

    /// Create a StorageUnavailable error
    pub fn storage_unavailable(message: &str) -> Self {
        FareError::StorageUnavailable {
            message: message.to_string(),
        }
    }

    /// Create a DuplicateUser error
    pub fn duplicate_user(user_id: &str, existing_card: &str) -> Self {
        FareError::DuplicateUser {
            user_id: user_id.to_string(),
            existing_card: existing_card.to_string(),
        }
    }

    /// Create an OwnerChange error
    pub fn owner_change(card_number: &str, owner: &str, requested: &str) -> Self {
        FareError::OwnerChange {
            card_number: card_number.to_string(),
            owner: owner.to_string(),
            requested: requested.to_string(),
        }
    }

    /// Create a DuplicateTrip error
    pub fn duplicate_trip(id: TripId) -> Self {
        FareError::DuplicateTrip { id }
    }

    /// Create a TripIdOutOfRange error
    pub fn trip_id_out_of_range(id: TripId) -> Self {
        FareError::TripIdOutOfRange { id }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(card_number: &str) -> Self {
        FareError::ArithmeticOverflow {
            card_number: card_number.to_string(),
        }
    }

    /// Create an UnknownTripKind error
    pub fn unknown_trip_kind(value: &str) -> Self {
        FareError::UnknownTripKind {
            value: value.to_string(),
        }
    }

    /// Create a ParseError error
    pub fn parse_error(line: Option<u64>, message: &str) -> Self {
        FareError::ParseError {
            line,
            message: message.to_string(),
        }
    }
}
