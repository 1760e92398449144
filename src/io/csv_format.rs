//! CSV format handling for cards, trips and credit requests
//!
//! This module centralizes all CSV format concerns:
//! - row structures for (de)serialization
//! - conversion from rows to domain types
//! - card and trip CSV reading (provisioning) and writing (output)
//!
//! Amounts travel as text and are parsed into decimals here, so nothing is
//! ever routed through `f64`.

use crate::types::{parse_amount, Card, CreditRequest, FareError, Trip, TripId, TripKind};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Timestamp layout used in trip CSV files
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Card row: `card_number,balance,user_id,discount`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CardRow {
    pub card_number: String,
    pub balance: String,
    pub user_id: String,
    pub discount: String,
}

/// Trip row: `id,from_location,to_location,line,price,time,user_id,type`
///
/// `id` may be left empty to let the ledger assign one.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TripRow {
    pub id: Option<TripId>,
    pub from_location: String,
    pub to_location: String,
    pub line: String,
    pub price: String,
    pub time: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Credit row: `user_id,amount`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CreditRow {
    pub user_id: String,
    pub amount: String,
}

fn require(field: &str, value: String) -> Result<String, FareError> {
    if value.trim().is_empty() {
        return Err(FareError::parse_error(None, &format!("{field} is required")));
    }
    Ok(value)
}

/// Convert a CardRow to a Card
pub fn convert_card_row(row: CardRow) -> Result<Card, FareError> {
    Ok(Card {
        card_number: require("card_number", row.card_number)?,
        balance: parse_amount(&row.balance)?,
        user_id: require("user_id", row.user_id)?,
        discount: parse_amount(&row.discount)?,
    })
}

/// Convert a TripRow to a Trip
///
/// The price must be positive and the type must be `bus` or `train`.
pub fn convert_trip_row(row: TripRow) -> Result<Trip, FareError> {
    let price = parse_amount(&row.price)?;
    if price <= rust_decimal::Decimal::ZERO {
        return Err(FareError::invalid_amount(&row.price, "price must be positive"));
    }

    let time = NaiveDateTime::parse_from_str(row.time.trim(), TIME_FORMAT).map_err(|e| {
        FareError::parse_error(None, &format!("invalid time '{}': {e}", row.time))
    })?;

    Ok(Trip {
        id: row.id,
        from_location: require("from_location", row.from_location)?,
        to_location: require("to_location", row.to_location)?,
        line: require("line", row.line)?,
        price,
        time,
        user_id: require("user_id", row.user_id)?,
        kind: row.kind.parse::<TripKind>()?,
    })
}

/// Convert a CreditRow to a CreditRequest
///
/// Only checks that the amount is a number; the sign is the service's call.
pub fn convert_credit_row(row: CreditRow) -> Result<CreditRequest, FareError> {
    Ok(CreditRequest {
        user_id: require("user_id", row.user_id)?,
        amount: parse_amount(&row.amount)?,
    })
}

impl From<&Card> for CardRow {
    fn from(card: &Card) -> Self {
        CardRow {
            card_number: card.card_number.clone(),
            balance: card.balance.to_string(),
            user_id: card.user_id.clone(),
            discount: card.discount.to_string(),
        }
    }
}

impl From<&Trip> for TripRow {
    fn from(trip: &Trip) -> Self {
        TripRow {
            id: trip.id,
            from_location: trip.from_location.clone(),
            to_location: trip.to_location.clone(),
            line: trip.line.clone(),
            price: trip.price.to_string(),
            time: trip.time.format(TIME_FORMAT).to_string(),
            user_id: trip.user_id.clone(),
            kind: trip.kind.to_string(),
        }
    }
}

/// Read and convert every row, failing on the first bad one
///
/// Conversion errors are re-tagged with the offending line number.
fn read_rows<T, U, F>(reader: impl Read, convert: F) -> Result<Vec<U>, FareError>
where
    T: DeserializeOwned,
    F: Fn(T) -> Result<U, FareError>,
{
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers: StringRecord = csv_reader.headers()?.clone();

    let mut items = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line());
        let row: T = record.deserialize(Some(&headers))?;
        let item = convert(row).map_err(|e| match e {
            FareError::ParseError { message, .. } => FareError::ParseError { line, message },
            other => FareError::parse_error(line, &other.to_string()),
        })?;
        items.push(item);
    }

    Ok(items)
}

/// Read cards from CSV for provisioning
pub fn read_cards_csv(reader: impl Read) -> Result<Vec<Card>, FareError> {
    read_rows(reader, convert_card_row)
}

/// Read trips from CSV for provisioning
pub fn read_trips_csv(reader: impl Read) -> Result<Vec<Trip>, FareError> {
    read_rows(reader, convert_trip_row)
}

/// Write cards as CSV with columns: card_number, balance, user_id, discount
pub fn write_cards_csv(cards: &[Card], output: &mut dyn Write) -> Result<(), FareError> {
    let mut writer = Writer::from_writer(output);
    if cards.is_empty() {
        writer.write_record(["card_number", "balance", "user_id", "discount"])?;
    }
    for card in cards {
        writer.serialize(CardRow::from(card))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write trips as CSV, in the order given
pub fn write_trips_csv(trips: &[Trip], output: &mut dyn Write) -> Result<(), FareError> {
    let mut writer = Writer::from_writer(output);
    if trips.is_empty() {
        writer.write_record([
            "id",
            "from_location",
            "to_location",
            "line",
            "price",
            "time",
            "user_id",
            "type",
        ])?;
    }
    for trip in trips {
        writer.serialize(TripRow::from(trip))?;
    }
    writer.flush()?;
    Ok(())
}
