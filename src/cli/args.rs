use crate::core::ReplayConfig;
use crate::logging::LogLevel;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Look up and top up transit fare cards
#[derive(Parser, Debug)]
#[command(name = "fare-accounts")]
#[command(about = "Look up and top up transit fare cards", long_about = None)]
pub struct CliArgs {
    /// Seed for the generated demo data
    #[arg(long = "seed", value_name = "SEED", default_value_t = 42)]
    pub seed: u64,

    /// Load cards from this CSV file instead of generating demo data
    #[arg(long = "cards", value_name = "CSV")]
    pub cards_file: Option<PathBuf>,

    /// Load trips from this CSV file instead of generating demo data
    #[arg(long = "trips", value_name = "CSV")]
    pub trips_file: Option<PathBuf>,

    /// Start with empty stores
    #[arg(long = "no-seed", conflicts_with_all = ["cards_file", "trips_file", "seed"])]
    pub no_seed: bool,

    /// Log verbosity when RUST_LOG is not set
    #[arg(long = "log-level", value_name = "LEVEL", value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the card owned by a user
    Card {
        #[arg(value_name = "USER")]
        user_id: String,
    },

    /// Add an amount to a user's card balance and print the updated card
    Credit {
        #[arg(value_name = "USER")]
        user_id: String,

        /// Decimal amount, e.g. 25.0
        #[arg(value_name = "AMOUNT", allow_hyphen_values = true)]
        amount: String,
    },

    /// Print a user's trips, newest first
    Trips {
        #[arg(value_name = "USER")]
        user_id: String,
    },

    /// Apply a CSV file of `user_id,amount` credits concurrently, then print all cards
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ReplayArgs {
    /// Credit CSV file path
    #[arg(value_name = "CREDITS_CSV")]
    pub input_file: PathBuf,

    /// Number of credit rows per batch
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of credit rows per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of worker threads
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,
}

/// Where the stores get their initial contents from
#[derive(Clone, Debug, PartialEq)]
pub enum Provisioning {
    /// Generated demo data from this seed
    Seeded(u64),
    /// Cards and/or trips read from CSV files
    Files {
        cards: Option<PathBuf>,
        trips: Option<PathBuf>,
    },
    Empty,
}

impl CliArgs {
    pub fn provisioning(&self) -> Provisioning {
        if self.no_seed {
            Provisioning::Empty
        } else if self.cards_file.is_some() || self.trips_file.is_some() {
            Provisioning::Files {
                cards: self.cards_file.clone(),
                trips: self.trips_file.clone(),
            }
        } else {
            Provisioning::Seeded(self.seed)
        }
    }
}

impl ReplayArgs {
    /// Create a ReplayConfig from the arguments, falling back to defaults
    pub fn to_replay_config(&self) -> ReplayConfig {
        if self.batch_size.is_some() || self.max_concurrent.is_some() {
            let default = ReplayConfig::default();
            ReplayConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent.unwrap_or(default.max_concurrent),
            )
        } else {
            ReplayConfig::default()
        }
    }
}
