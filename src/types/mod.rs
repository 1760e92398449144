//! Types module
//!
//! Contains core data structures used throughout the application:
//! - `card`: cards, user and card identifiers, credit requests
//! - `trip`: trips and trip kinds
//! - `amount`: decimal amount parsing and validation
//! - `error`: error types

pub mod amount;
pub mod card;
pub mod error;
pub mod trip;

pub use amount::{amount_from_f64, parse_amount, validate_credit_amount};
pub use card::{Card, CardNumber, CreditRequest, UserId};
pub use error::{ErrorKind, FareError};
pub use trip::{Trip, TripId, TripKind};
