//! Card-related types
//!
//! A card is the fare account itself: a balance and a discount rate owned by
//! exactly one user.

use rust_decimal::Decimal;

/// User identifier, as handed over by the request layer
pub type UserId = String;

/// Card number, the immutable primary key of a card
pub type CardNumber = String;

/// Fare account state
///
/// `balance` is only ever changed through a credit. `discount` is carried
/// along unchanged; nothing in the core consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// Unique card number
    pub card_number: CardNumber,

    /// Current balance, never negative
    pub balance: Decimal,

    /// The one user who owns this card
    pub user_id: UserId,

    /// Discount percentage applied to fares
    pub discount: Decimal,
}

impl Card {
    /// Create a card from its four fields
    pub fn new(
        card_number: impl Into<CardNumber>,
        balance: Decimal,
        user_id: impl Into<UserId>,
        discount: Decimal,
    ) -> Self {
        Card {
            card_number: card_number.into(),
            balance,
            user_id: user_id.into(),
            discount,
        }
    }
}

/// A single top-up request: add `amount` to the card owned by `user_id`
#[derive(Debug, Clone, PartialEq)]
pub struct CreditRequest {
    pub user_id: UserId,
    pub amount: Decimal,
}
