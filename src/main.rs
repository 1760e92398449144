//! Transit fare accounts CLI
//!
//! Looks up and tops up transit fare cards held in in-memory stores that are
//! provisioned at start-up.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- card user1
//! cargo run -- credit user1 25.0
//! cargo run -- --seed 7 trips user1
//! cargo run -- --cards cards.csv --trips trips.csv trips user2
//! cargo run -- replay credits.csv --batch-size 500 --max-concurrent 4 > cards.csv
//! ```
//!
//! Results are written to stdout as CSV; logs go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (unknown user, invalid amount, file not found or not readable, etc.)

use fare_accounts::{app, cli, logging};
use std::process;

fn main() {
    let args = cli::parse_args();
    logging::init(args.log_level);

    let now = chrono::Local::now().naive_local();
    let mut output = std::io::stdout();
    if let Err(e) = app::run(&args, now, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
