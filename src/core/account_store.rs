//! Thread-safe card storage
//!
//! This module provides the `InMemoryAccountStore` struct, which keeps cards
//! in a `DashMap` keyed by card number plus a second `DashMap` acting as a
//! unique index from user id to card number.
//!
//! # Thread Safety
//!
//! A credit runs entirely under the write lock of the card's map entry, so two
//! credits to the same card are serialized while credits to cards in other
//! shards proceed in parallel. `save` takes the user-index entry first and the
//! card entry second; nothing takes them in the opposite order.

use crate::core::traits::AccountStore;
use crate::types::{Card, CardNumber, FareError, UserId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::debug;

/// In-memory card store
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    /// Cards by card number
    cards: DashMap<CardNumber, Card>,

    /// Unique index: user id to the card number that user owns
    user_index: DashMap<UserId, CardNumber>,
}

impl InMemoryAccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get_by_user(&self, user_id: &str) -> Result<Card, FareError> {
        let card_number = self
            .user_index
            .get(user_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| FareError::account_not_found_for_user(user_id))?;

        self.get_by_card_number(&card_number)
    }

    fn get_by_card_number(&self, card_number: &str) -> Result<Card, FareError> {
        self.cards
            .get(card_number)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| FareError::account_not_found_for_card(card_number))
    }

    fn apply_credit(&self, card_number: &str, amount: Decimal) -> Result<Card, FareError> {
        if amount <= Decimal::ZERO {
            return Err(FareError::non_positive_amount(amount));
        }

        let mut entry = self
            .cards
            .get_mut(card_number)
            .ok_or_else(|| FareError::account_not_found_for_card(card_number))?;
        let card = entry.value_mut();

        // Compute first so a failed add leaves the balance untouched
        let new_balance = card
            .balance
            .checked_add(amount)
            .ok_or_else(|| FareError::arithmetic_overflow(card_number))?;
        card.balance = new_balance;

        debug!(card_number, %amount, balance = %new_balance, "credit applied");
        Ok(card.clone())
    }

    fn save(&self, card: Card) -> Result<Card, FareError> {
        if card.balance < Decimal::ZERO {
            return Err(FareError::invalid_amount(
                &card.balance.to_string(),
                "balance must not be negative",
            ));
        }

        let owner = self.user_index.entry(card.user_id.clone());
        if let Entry::Occupied(existing) = &owner {
            if existing.get() != &card.card_number {
                return Err(FareError::duplicate_user(&card.user_id, existing.get()));
            }
        }

        match self.cards.entry(card.card_number.clone()) {
            Entry::Occupied(mut current) => {
                if current.get().user_id != card.user_id {
                    return Err(FareError::owner_change(
                        &card.card_number,
                        &current.get().user_id,
                        &card.user_id,
                    ));
                }
                current.insert(card.clone());
            }
            Entry::Vacant(slot) => {
                slot.insert(card.clone());
            }
        }
        owner.or_insert_with(|| card.card_number.clone());

        Ok(card)
    }

    fn count(&self) -> Result<usize, FareError> {
        Ok(self.cards.len())
    }

    fn all(&self) -> Result<Vec<Card>, FareError> {
        let mut cards: Vec<Card> = self
            .cards
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        cards.sort_by(|a, b| a.card_number.cmp(&b.card_number));
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::sync::Arc;
    use std::thread;

    #[fixture]
    fn store() -> InMemoryAccountStore {
        let store = InMemoryAccountStore::new();
        store
            .save(Card::new(
                "M-358914",
                Decimal::new(750, 1),
                "user1",
                Decimal::new(15, 0),
            ))
            .unwrap();
        store
            .save(Card::new(
                "M-496238",
                Decimal::new(120, 0),
                "user2",
                Decimal::new(10, 0),
            ))
            .unwrap();
        store
    }

    #[rstest]
    fn test_get_by_user_returns_owned_card(store: InMemoryAccountStore) {
        let card = store.get_by_user("user1").unwrap();
        assert_eq!(card.card_number, "M-358914");
        assert_eq!(card.balance, Decimal::new(75, 0));
        assert_eq!(card.discount, Decimal::new(15, 0));
    }

    #[rstest]
    fn test_get_by_user_unknown(store: InMemoryAccountStore) {
        assert_eq!(
            store.get_by_user("ghost"),
            Err(FareError::account_not_found_for_user("ghost"))
        );
    }

    #[rstest]
    fn test_get_by_card_number_unknown(store: InMemoryAccountStore) {
        assert_eq!(
            store.get_by_card_number("M-000000"),
            Err(FareError::account_not_found_for_card("M-000000"))
        );
    }

    #[rstest]
    fn test_apply_credit_adds_amount(store: InMemoryAccountStore) {
        let card = store
            .apply_credit("M-358914", Decimal::new(250, 1))
            .unwrap();

        assert_eq!(card.balance, Decimal::new(100, 0));
        assert_eq!(card.discount, Decimal::new(15, 0));
        assert_eq!(
            store.get_by_card_number("M-358914").unwrap().balance,
            Decimal::new(100, 0)
        );
    }

    #[rstest]
    #[case::zero(Decimal::ZERO)]
    #[case::negative(Decimal::new(-10, 0))]
    fn test_apply_credit_rejects_non_positive(
        store: InMemoryAccountStore,
        #[case] amount: Decimal,
    ) {
        let result = store.apply_credit("M-358914", amount);

        assert!(matches!(result, Err(FareError::InvalidAmount { .. })));
        assert_eq!(
            store.get_by_card_number("M-358914").unwrap().balance,
            Decimal::new(75, 0)
        );
    }

    #[rstest]
    fn test_apply_credit_unknown_card(store: InMemoryAccountStore) {
        assert_eq!(
            store.apply_credit("M-000000", Decimal::ONE),
            Err(FareError::account_not_found_for_card("M-000000"))
        );
    }

    #[test]
    fn test_apply_credit_overflow_leaves_balance_unchanged() {
        let store = InMemoryAccountStore::new();
        store
            .save(Card::new("M-1", Decimal::MAX, "rich", Decimal::ZERO))
            .unwrap();

        let result = store.apply_credit("M-1", Decimal::ONE);

        assert_eq!(result, Err(FareError::arithmetic_overflow("M-1")));
        assert_eq!(store.get_by_card_number("M-1").unwrap().balance, Decimal::MAX);
    }

    #[test]
    fn test_repeated_small_credits_do_not_drift() {
        let store = InMemoryAccountStore::new();
        store
            .save(Card::new("M-1", Decimal::ZERO, "user", Decimal::ZERO))
            .unwrap();

        for _ in 0..1000 {
            store.apply_credit("M-1", Decimal::new(1, 1)).unwrap();
        }

        assert_eq!(
            store.get_by_card_number("M-1").unwrap().balance,
            Decimal::new(100, 0)
        );
    }

    #[rstest]
    fn test_save_rejects_second_card_for_user(store: InMemoryAccountStore) {
        let result = store.save(Card::new("M-999999", Decimal::ONE, "user1", Decimal::ZERO));

        assert_eq!(result, Err(FareError::duplicate_user("user1", "M-358914")));
        assert!(store.get_by_card_number("M-999999").is_err());
        assert_eq!(store.count().unwrap(), 2);
    }

    #[rstest]
    fn test_save_rejects_owner_change(store: InMemoryAccountStore) {
        let result = store.save(Card::new("M-358914", Decimal::ONE, "user9", Decimal::ZERO));

        assert_eq!(
            result,
            Err(FareError::owner_change("M-358914", "user1", "user9"))
        );
        assert!(store.get_by_user("user9").is_err());
        assert_eq!(store.get_by_user("user1").unwrap().balance, Decimal::new(75, 0));
    }

    #[rstest]
    fn test_save_replaces_card_for_same_owner(store: InMemoryAccountStore) {
        store
            .save(Card::new("M-358914", Decimal::new(5, 0), "user1", Decimal::new(20, 0)))
            .unwrap();

        let card = store.get_by_user("user1").unwrap();
        assert_eq!(card.balance, Decimal::new(5, 0));
        assert_eq!(card.discount, Decimal::new(20, 0));
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_save_rejects_negative_balance() {
        let store = InMemoryAccountStore::new();
        let result = store.save(Card::new("M-1", Decimal::new(-1, 0), "user", Decimal::ZERO));

        assert!(matches!(result, Err(FareError::InvalidAmount { .. })));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[rstest]
    fn test_all_is_sorted_by_card_number(store: InMemoryAccountStore) {
        let numbers: Vec<String> = store
            .all()
            .unwrap()
            .into_iter()
            .map(|card| card.card_number)
            .collect();
        assert_eq!(numbers, vec!["M-358914", "M-496238"]);
    }

    // Concurrent access tests
    #[test]
    fn test_concurrent_credits_same_card() {
        let store = Arc::new(InMemoryAccountStore::new());
        store
            .save(Card::new("M-1", Decimal::ZERO, "user", Decimal::ZERO))
            .unwrap();
        let mut handles = vec![];

        // 100 threads, each crediting 0.01 ten times
        for _ in 0..100 {
            let store_clone = Arc::clone(&store);
            let handle = thread::spawn(move || {
                for _ in 0..10 {
                    store_clone
                        .apply_credit("M-1", Decimal::new(1, 2))
                        .unwrap();
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(
            store.get_by_card_number("M-1").unwrap().balance,
            Decimal::new(10, 0)
        );
    }

    #[test]
    fn test_concurrent_credits_different_cards() {
        let store = Arc::new(InMemoryAccountStore::new());
        for i in 0..10 {
            store
                .save(Card::new(
                    format!("M-{i}"),
                    Decimal::ZERO,
                    format!("user{i}"),
                    Decimal::ZERO,
                ))
                .unwrap();
        }
        let mut handles = vec![];

        for i in 0..10i64 {
            let store_clone = Arc::clone(&store);
            let handle = thread::spawn(move || {
                store_clone
                    .apply_credit(&format!("M-{i}"), Decimal::new(i + 1, 0))
                    .unwrap();
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..10i64 {
            let card = store.get_by_user(&format!("user{i}")).unwrap();
            assert_eq!(card.balance, Decimal::new(i + 1, 0));
        }
    }

    #[test]
    fn test_concurrent_saves_keep_one_card_per_user() {
        let store = Arc::new(InMemoryAccountStore::new());
        let mut handles = vec![];

        // Ten different cards race to be the one owned by "contested"
        for i in 0..10 {
            let store_clone = Arc::clone(&store);
            let handle = thread::spawn(move || {
                store_clone
                    .save(Card::new(
                        format!("M-{i}"),
                        Decimal::ZERO,
                        "contested",
                        Decimal::ZERO,
                    ))
                    .is_ok()
            });
            handles.push(handle);
        }

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|saved| *saved)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(store.count().unwrap(), 1);
        let owned = store.get_by_user("contested").unwrap();
        assert_eq!(store.all().unwrap(), vec![owned]);
    }
}
