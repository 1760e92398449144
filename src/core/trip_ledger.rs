//! Append-only trip history
//!
//! `InMemoryTripLedger` keeps each user's trips in insertion order inside a
//! `DashMap`, and hands out ids from an atomic counter so that concurrent
//! appends always receive unique, ascending ids.
//!
//! There is no update or delete: a completed trip is an immutable fact.

use crate::core::traits::TripLedger;
use crate::types::{FareError, Trip, TripId, UserId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// First id handed out by a fresh ledger
const FIRST_TRIP_ID: TripId = 1;

/// In-memory trip ledger
#[derive(Debug)]
pub struct InMemoryTripLedger {
    /// Next id to hand out
    next_id: AtomicU64,

    /// Trips per user, in the order they were appended
    by_user: DashMap<UserId, Vec<Trip>>,

    /// Every id in use, for uniqueness of preset ids
    ids: DashMap<TripId, UserId>,
}

impl InMemoryTripLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(FIRST_TRIP_ID),
            by_user: DashMap::new(),
            ids: DashMap::new(),
        }
    }

    /// Reserve an id for `user_id`
    ///
    /// A preset id is kept if nobody holds it yet and pushes the counter past
    /// it. Otherwise ids come from the counter, skipping any that a preset
    /// trip already took. The counter never wraps: `TripId::MAX` is never
    /// handed out, and once the counter reaches it appends without a preset
    /// id fail with [`FareError::TripIdsExhausted`].
    fn claim_id(&self, preset: Option<TripId>, user_id: &str) -> Result<TripId, FareError> {
        if let Some(id) = preset {
            let after = id
                .checked_add(1)
                .ok_or_else(|| FareError::trip_id_out_of_range(id))?;
            match self.ids.entry(id) {
                Entry::Occupied(_) => return Err(FareError::duplicate_trip(id)),
                Entry::Vacant(slot) => {
                    slot.insert(user_id.to_string());
                }
            }
            self.next_id.fetch_max(after, Ordering::SeqCst);
            return Ok(id);
        }

        loop {
            let id = self
                .next_id
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
                .map_err(|_| FareError::TripIdsExhausted)?;
            if let Entry::Vacant(slot) = self.ids.entry(id) {
                slot.insert(user_id.to_string());
                return Ok(id);
            }
        }
    }
}

impl Default for InMemoryTripLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TripLedger for InMemoryTripLedger {
    fn append(&self, mut trip: Trip) -> Result<Trip, FareError> {
        let id = self.claim_id(trip.id, &trip.user_id)?;
        trip.id = Some(id);

        self.by_user
            .entry(trip.user_id.clone())
            .or_default()
            .push(trip.clone());

        Ok(trip)
    }

    fn list_by_user(&self, user_id: &str) -> Result<Vec<Trip>, FareError> {
        let mut trips = self
            .by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        // Stable sort: equal times keep insertion order
        trips.sort_by(|a, b| b.time.cmp(&a.time));
        Ok(trips)
    }

    fn count(&self) -> Result<usize, FareError> {
        Ok(self.ids.len())
    }

    fn all(&self) -> Result<Vec<Trip>, FareError> {
        let mut trips: Vec<Trip> = self
            .by_user
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect();
        trips.sort_by_key(|trip| trip.id);
        Ok(trips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TripKind;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn trip(user_id: &str, time: NaiveDateTime) -> Trip {
        Trip::new(
            "Gueliz",
            "Medina",
            "L12",
            Decimal::new(65, 1),
            time,
            user_id,
            TripKind::Bus,
        )
    }

    #[test]
    fn test_append_assigns_id() {
        let ledger = InMemoryTripLedger::new();

        let stored = ledger.append(trip("user1", at(1, 8))).unwrap();

        assert_eq!(stored.id, Some(FIRST_TRIP_ID));
        let listed = ledger.list_by_user("user1").unwrap();
        assert_eq!(listed, vec![stored]);
    }

    #[test]
    fn test_append_assigns_ascending_ids() {
        let ledger = InMemoryTripLedger::new();

        let ids: Vec<TripId> = (0..5)
            .map(|i| ledger.append(trip("user1", at(1, i))).unwrap().id.unwrap())
            .collect();

        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_list_by_user_newest_first() {
        let ledger = InMemoryTripLedger::new();
        let t1 = at(1, 8);
        let t2 = at(2, 8);
        let t3 = at(3, 8);

        // Appended out of time order on purpose
        ledger.append(trip("user1", t2)).unwrap();
        ledger.append(trip("user1", t3)).unwrap();
        ledger.append(trip("user1", t1)).unwrap();

        let times: Vec<NaiveDateTime> = ledger
            .list_by_user("user1")
            .unwrap()
            .into_iter()
            .map(|trip| trip.time)
            .collect();
        assert_eq!(times, vec![t3, t2, t1]);
    }

    #[test]
    fn test_list_by_user_ties_keep_insertion_order() {
        let ledger = InMemoryTripLedger::new();
        let first = ledger.append(trip("user1", at(1, 8))).unwrap();
        let second = ledger.append(trip("user1", at(1, 8))).unwrap();

        let listed = ledger.list_by_user("user1").unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[test]
    fn test_list_by_user_unknown_is_empty() {
        let ledger = InMemoryTripLedger::new();
        ledger.append(trip("user1", at(1, 8))).unwrap();

        assert!(ledger.list_by_user("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_list_by_user_only_returns_that_user() {
        let ledger = InMemoryTripLedger::new();
        ledger.append(trip("user1", at(1, 8))).unwrap();
        ledger.append(trip("user2", at(2, 8))).unwrap();

        let listed = ledger.list_by_user("user2").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user_id, "user2");
    }

    #[test]
    fn test_preset_id_is_kept_and_counter_moves_past_it() {
        let ledger = InMemoryTripLedger::new();

        let preset = ledger.append(trip("user1", at(1, 8)).with_id(10)).unwrap();
        let next = ledger.append(trip("user1", at(1, 9))).unwrap();

        assert_eq!(preset.id, Some(10));
        assert_eq!(next.id, Some(11));
    }

    #[test]
    fn test_preset_max_id_rejected_and_counter_unchanged() {
        let ledger = InMemoryTripLedger::new();
        ledger.append(trip("user1", at(1, 8))).unwrap(); // id 1

        let result = ledger.append(trip("user1", at(1, 9)).with_id(TripId::MAX));
        let next = ledger.append(trip("user1", at(1, 10))).unwrap();

        assert_eq!(result, Err(FareError::trip_id_out_of_range(TripId::MAX)));
        assert_eq!(next.id, Some(2));
        assert_eq!(ledger.count().unwrap(), 2);
    }

    #[test]
    fn test_exhausted_counter_does_not_wrap() {
        let ledger = InMemoryTripLedger::new();
        let last = ledger
            .append(trip("user1", at(1, 8)).with_id(TripId::MAX - 1))
            .unwrap();

        let result = ledger.append(trip("user1", at(1, 9)));

        assert_eq!(last.id, Some(TripId::MAX - 1));
        assert_eq!(result, Err(FareError::TripIdsExhausted));
        assert_eq!(ledger.count().unwrap(), 1);
        // Preset ids below the ceiling are still accepted
        assert_eq!(
            ledger.append(trip("user2", at(1, 10)).with_id(5)).unwrap().id,
            Some(5)
        );
    }

    #[test]
    fn test_counter_skips_ids_taken_by_preset_trips() {
        let ledger = InMemoryTripLedger::new();
        ledger.append(trip("user1", at(1, 8))).unwrap(); // id 1
        ledger.append(trip("user1", at(1, 9)).with_id(3)).unwrap();

        let next = ledger.append(trip("user1", at(1, 10))).unwrap();
        assert_eq!(next.id, Some(4));
    }

    #[test]
    fn test_duplicate_preset_id_rejected() {
        let ledger = InMemoryTripLedger::new();
        ledger.append(trip("user1", at(1, 8)).with_id(5)).unwrap();

        let result = ledger.append(trip("user2", at(1, 9)).with_id(5));

        assert_eq!(result, Err(FareError::duplicate_trip(5)));
        assert!(ledger.list_by_user("user2").unwrap().is_empty());
        assert_eq!(ledger.count().unwrap(), 1);
    }

    #[test]
    fn test_append_all_and_all_sorted_by_id() {
        let ledger = InMemoryTripLedger::new();
        let stored = ledger
            .append_all(vec![
                trip("user2", at(1, 8)),
                trip("user1", at(2, 8)),
                trip("user2", at(3, 8)),
            ])
            .unwrap();

        assert_eq!(stored.len(), 3);
        assert_eq!(ledger.count().unwrap(), 3);
        let ids: Vec<Option<TripId>> = ledger.all().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_concurrent_appends_get_unique_ids() {
        let ledger = Arc::new(InMemoryTripLedger::new());
        let mut handles = vec![];

        for i in 0..8 {
            let ledger_clone = Arc::clone(&ledger);
            let handle = thread::spawn(move || {
                let user = format!("user{}", i % 3);
                (0..50)
                    .map(|hour| {
                        ledger_clone
                            .append(trip(&user, at(1, hour % 24)))
                            .unwrap()
                            .id
                            .unwrap()
                    })
                    .collect::<Vec<TripId>>()
            });
            handles.push(handle);
        }

        let mut seen = HashSet::new();
        for handle in handles {
            let ids = handle.join().unwrap();
            // Ids handed to one thread are strictly increasing
            assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
            for id in ids {
                assert!(seen.insert(id), "id {id} assigned twice");
            }
        }

        assert_eq!(seen.len(), 400);
        assert_eq!(ledger.count().unwrap(), 400);
    }
}
