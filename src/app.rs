//! Command dispatch
//!
//! `run` wires a fresh in-memory service, provisions it from generated demo
//! data or CSV files, runs one command and writes its CSV result.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command, Provisioning};
use crate::core::{replay_credits, AccountStore, InMemoryFareService, TripLedger};
use crate::io::{read_cards_csv, read_trips_csv, write_cards_csv, write_trips_csv};
use crate::seed::{load_seed_data, SeedGenerator};
use crate::types::{parse_amount, FareError};

/// Run the command in `args` and write its output to `output`
///
/// `now` anchors generated trip times.
pub fn run(args: &CliArgs, now: NaiveDateTime, output: &mut dyn Write) -> Result<(), FareError> {
    let service = InMemoryFareService::in_memory();
    provision(&service, &args.provisioning(), now)?;

    match &args.command {
        Command::Card { user_id } => {
            let card = service.get_card(user_id)?;
            write_cards_csv(&[card], output)
        }
        Command::Credit { user_id, amount } => {
            let amount = parse_amount(amount)?;
            let card = service.credit(user_id, amount)?;
            write_cards_csv(&[card], output)
        }
        Command::Trips { user_id } => {
            let trips = service.list_trips(user_id)?;
            write_trips_csv(&trips, output)
        }
        Command::Replay(replay) => {
            let summary =
                replay_credits(&service, &replay.input_file, &replay.to_replay_config())?;
            debug!(?summary, "replay summary");
            write_cards_csv(&service.accounts().all()?, output)
        }
    }
}

/// Fill the stores according to `provisioning`
pub fn provision(
    service: &InMemoryFareService,
    provisioning: &Provisioning,
    now: NaiveDateTime,
) -> Result<(), FareError> {
    match provisioning {
        Provisioning::Seeded(seed) => {
            load_seed_data(service, &mut SeedGenerator::new(*seed, now))?;
        }
        Provisioning::Files { cards, trips } => {
            if let Some(path) = cards {
                let cards = read_cards_csv(open(path)?)?;
                for card in cards {
                    service.accounts().save(card)?;
                }
            }
            if let Some(path) = trips {
                service.trips().append_all(read_trips_csv(open(path)?)?)?;
            }
            info!(
                cards = service.accounts().count()?,
                trips = service.trips().count()?,
                "stores loaded from files"
            );
        }
        Provisioning::Empty => debug!("starting with empty stores"),
    }
    Ok(())
}

fn open(path: &Path) -> Result<BufReader<File>, FareError> {
    let file = File::open(path).map_err(|e| {
        FareError::storage_unavailable(&format!("failed to open '{}': {e}", path.display()))
    })?;
    Ok(BufReader::new(file))
}
