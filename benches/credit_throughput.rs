//! Credit throughput benchmarks
//!
//! Measures how the account store behaves when many threads credit cards at
//! once, both when they all hit the same card and when each thread owns one.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

use fare_accounts::seed::SeedGenerator;
use fare_accounts::{AccountStore, InMemoryFareService};
use rust_decimal::Decimal;
use std::thread;

const CREDITS_PER_THREAD: usize = 1_000;

fn main() {
    divan::main();
}

fn seeded_service() -> InMemoryFareService {
    let service = InMemoryFareService::in_memory();
    for card in SeedGenerator::cards() {
        service.accounts().save(card).expect("save failed");
    }
    service
}

fn run_credits(service: &InMemoryFareService, threads: usize, users: &[&'static str]) {
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let service = service.clone();
            let user = users[i % users.len()];
            thread::spawn(move || {
                for _ in 0..CREDITS_PER_THREAD {
                    service
                        .credit(user, Decimal::new(5, 1))
                        .expect("credit failed");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }
}

/// Every thread credits the same card
#[divan::bench(args = [1, 4, 8])]
fn same_card(bencher: divan::Bencher, threads: usize) {
    bencher
        .with_inputs(seeded_service)
        .bench_local_values(|service| run_credits(&service, threads, &["user1"]));
}

/// Threads spread over the five demo cards
#[divan::bench(args = [1, 4, 8])]
fn spread_cards(bencher: divan::Bencher, threads: usize) {
    bencher.with_inputs(seeded_service).bench_local_values(|service| {
        run_credits(
            &service,
            threads,
            &["user1", "user2", "user3", "user4", "admin"],
        )
    });
}
