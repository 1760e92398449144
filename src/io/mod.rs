//! I/O module
//!
//! Handles CSV provisioning input, CSV output, and credit replay input.
//!
//! # Components
//!
//! - `csv_format` - row types, row conversion, card/trip CSV reading and writing
//! - `credit_reader` - asynchronous batched reader for credit replay files

pub mod credit_reader;
pub mod csv_format;

pub use credit_reader::CreditReader;
pub use csv_format::{read_cards_csv, read_trips_csv, write_cards_csv, write_trips_csv};
