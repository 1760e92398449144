//! Reproducible demo data
//!
//! `SeedGenerator` produces the five demo cards and a randomized trip history
//! for them. All randomness comes from a `StdRng` seeded by the caller and all
//! timestamps are relative to a caller-supplied `now`, so the same seed and
//! `now` always give the same data. Nothing here is global.

use crate::core::{AccountStore, FareAccountService, TripLedger};
use crate::types::{Card, FareError, Trip, TripKind};
use chrono::{NaiveDateTime, TimeDelta};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::info;

/// Stops in Marrakesh
pub const LOCATIONS: [&str; 15] = [
    "Gueliz",
    "Jamaa el-Fna",
    "Medina",
    "Majorelle Garden",
    "Marrakesh Train Station",
    "Palmeraie",
    "Menara Mall",
    "Bahia Palace",
    "Marrakesh Airport",
    "City Center",
    "Agdal",
    "Hivernage",
    "Royal Palace",
    "Mellah",
    "Ben Youssef Madrasa",
];

pub const BUS_LINES: [&str; 9] = ["L1", "L3", "L8", "L9", "L12", "L16", "L19", "L20", "L25"];

pub const TRAIN_LINES: [&str; 5] = ["M1", "M2", "T1", "T2", "T3"];

/// Share of generated trips taken by bus
const BUS_SHARE: f64 = 0.8;

/// Fares in half-unit steps: bus 4.0..=30.0, train 50.0..=200.0
const BUS_FARE_HALVES: std::ops::RangeInclusive<i64> = 8..=60;
const TRAIN_FARE_HALVES: std::ops::RangeInclusive<i64> = 100..=400;

/// Demo users and how many trips each one gets
const TRIP_COUNTS: [(&str, usize); 5] = [
    ("user1", 20),
    ("user2", 10),
    ("user3", 5),
    ("user4", 15),
    ("admin", 3),
];

/// Cards and trips ready to be loaded into the stores
#[derive(Debug, Clone, PartialEq)]
pub struct SeedData {
    pub cards: Vec<Card>,
    pub trips: Vec<Trip>,
}

/// What [`load_seed_data`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Loaded { cards: usize, trips: usize },
    /// The account store already held cards
    Skipped,
}

/// Deterministic demo data generator
#[derive(Debug)]
pub struct SeedGenerator {
    rng: StdRng,
    now: NaiveDateTime,
}

impl SeedGenerator {
    pub fn new(seed: u64, now: NaiveDateTime) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            now,
        }
    }

    /// The fixed set of demo cards
    pub fn cards() -> Vec<Card> {
        vec![
            Card::new("M-358914", Decimal::new(750, 1), "user1", Decimal::new(15, 0)),
            Card::new("M-496238", Decimal::new(1200, 1), "user2", Decimal::new(10, 0)),
            Card::new("M-237651", Decimal::new(455, 1), "user3", Decimal::new(20, 0)),
            Card::new("M-789124", Decimal::new(2000, 1), "user4", Decimal::new(5, 0)),
            Card::new("M-123456", Decimal::new(5000, 1), "admin", Decimal::new(25, 0)),
        ]
    }

    /// Generate the cards plus every demo user's trips
    pub fn generate(&mut self) -> SeedData {
        let mut trips = Vec::new();
        for (user_id, count) in TRIP_COUNTS {
            trips.extend(self.generate_trips(user_id, count));
        }

        SeedData {
            cards: Self::cards(),
            trips,
        }
    }

    /// Generate `count` trips for `user_id`, in no particular time order
    pub fn generate_trips(&mut self, user_id: &str, count: usize) -> Vec<Trip> {
        (0..count).map(|_| self.generate_trip(user_id)).collect()
    }

    fn generate_trip(&mut self, user_id: &str) -> Trip {
        let from = self.pick(&LOCATIONS);
        let to = loop {
            let candidate = self.pick(&LOCATIONS);
            if candidate != from {
                break candidate;
            }
        };

        let (kind, line, halves) = if self.rng.random_bool(BUS_SHARE) {
            (
                TripKind::Bus,
                self.pick(&BUS_LINES),
                self.rng.random_range(BUS_FARE_HALVES),
            )
        } else {
            (
                TripKind::Train,
                self.pick(&TRAIN_LINES),
                self.rng.random_range(TRAIN_FARE_HALVES),
            )
        };
        // halves * 0.5
        let price = Decimal::new(halves * 5, 1);

        let ago = TimeDelta::days(self.rng.random_range(1..=30))
            + TimeDelta::hours(self.rng.random_range(0..24))
            + TimeDelta::minutes(self.rng.random_range(0..60));

        Trip::new(from, to, line, price, self.now - ago, user_id, kind)
    }

    fn pick(&mut self, options: &[&'static str]) -> &'static str {
        options[self.rng.random_range(0..options.len())]
    }
}

/// Load generated data unless the account store already has cards
pub fn load_seed_data<A: AccountStore, L: TripLedger>(
    service: &FareAccountService<A, L>,
    generator: &mut SeedGenerator,
) -> Result<SeedOutcome, FareError> {
    if service.accounts().count()? > 0 {
        info!("store already contains cards, skipping seed data");
        return Ok(SeedOutcome::Skipped);
    }

    let data = generator.generate();
    for card in &data.cards {
        service.accounts().save(card.clone())?;
    }
    let trips = service.trips().append_all(data.trips)?;

    info!(cards = data.cards.len(), trips = trips.len(), "seed data loaded");
    Ok(SeedOutcome::Loaded {
        cards: data.cards.len(),
        trips: trips.len(),
    })
}
