//! Transit Fare Accounts Library
//! # Overview
//!
//! This library manages prepaid transit fare cards: looking up a user's card,
//! crediting its balance safely under concurrency, and recording and listing
//! completed trips.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Card, Trip, FareError, etc.)
//! - [`core`] - Business logic components:
//!   - [`core::account_store`] - Cards with atomic per-card credit
//!   - [`core::trip_ledger`] - Append-only trip history
//!   - [`core::service`] - Credit and trip orchestration
//!   - [`core::replay`] - Concurrent replay of credit files
//! - [`io`] - CSV reading and writing
//! - [`seed`] - Reproducible demo data
//! - [`cli`], [`app`], [`logging`] - Command-line front end
//!
//! # Cards
//!
//! Each card has:
//! - `card_number`: unique identifier
//! - `balance`: exact decimal amount, only ever increased by credits
//! - `user_id`: owner; a user has at most one card
//! - `discount`: percentage carried as data
//!
//! # Trips
//!
//! A trip is an immutable record of a completed journey by bus or train.
//! Recording a trip never changes a card balance.

pub mod app;
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod seed;
pub mod types;

pub use core::{
    AccountStore, FareAccountService, InMemoryAccountStore, InMemoryFareService,
    InMemoryTripLedger, TripLedger,
};
pub use io::{write_cards_csv, write_trips_csv};
pub use types::{Card, CardNumber, ErrorKind, FareError, Trip, TripId, TripKind, UserId};
