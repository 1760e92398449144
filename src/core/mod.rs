//! Core business logic module
//!
//! This module contains the fare account components:
//! - `traits` - Storage abstractions the service is generic over
//! - `account_store` - Cards with atomic per-card credit and a unique user index
//! - `trip_ledger` - Append-only trip history
//! - `service` - Credit and trip orchestration
//! - `replay` - Concurrent replay of credit files on a tokio runtime

pub mod account_store;
pub mod replay;
pub mod service;
pub mod traits;
pub mod trip_ledger;

pub use account_store::InMemoryAccountStore;
pub use replay::{
    replay_credits, BatchOutcome, CreditBatchProcessor, CreditOutcome, ReplayConfig, ReplaySummary,
};
pub use service::{FareAccountService, InMemoryFareService};
pub use traits::{AccountStore, TripLedger};
pub use trip_ledger::InMemoryTripLedger;
