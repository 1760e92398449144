//! Concurrent replay of credit requests
//!
//! Applies a CSV file of `user_id,amount` credits through the service using a
//! tokio multi-threaded runtime. The file is read in batches; each batch is
//! partitioned by user, every user's credits run in their own task in file
//! order, and the next batch is only read once the current one is done.
//!
//! Credits to one card commute, so the partitioning is not needed for the
//! final balance; it keeps per-user log output in file order and avoids
//! tasks piling up on one card's lock.
//!
//! # Architecture
//!
//! ```text
//! replay_credits
//!     ├── ReplayConfig          (batch_size, max_concurrent)
//!     ├── CreditReader          (batched CSV reading)
//!     └── CreditBatchProcessor  (user partitioning + tokio tasks)
//!         └── FareAccountService
//! ```

use std::collections::HashMap;
use std::path::Path;

use tracing::{error, info, warn};

use super::service::FareAccountService;
use super::traits::{AccountStore, TripLedger};
use crate::io::CreditReader;
use crate::types::{Card, CreditRequest, FareError, UserId};

const DEFAULT_BATCH_SIZE: usize = 1000;

/// Configuration for batched replay
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayConfig {
    /// Number of credit rows per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_concurrent: num_cpus::get(),
        }
    }
}

impl ReplayConfig {
    /// Create a ReplayConfig, replacing zero values with the defaults
    pub fn new(batch_size: usize, max_concurrent: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                default = default.batch_size,
                "invalid batch_size 0, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent = if max_concurrent == 0 {
            warn!(
                default = default.max_concurrent,
                "invalid max_concurrent 0, using default"
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self {
            batch_size,
            max_concurrent,
        }
    }
}

/// Result of applying a single credit request
#[derive(Debug, Clone)]
pub struct CreditOutcome {
    pub request: CreditRequest,
    pub result: Result<Card, FareError>,
}

/// Totals for one replay run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Credits applied to a card
    pub applied: usize,
    /// Well-formed rows the service refused (unknown user, bad amount, ...)
    pub rejected: usize,
    /// Rows that could not be parsed at all
    pub malformed: usize,
}

/// Everything one batch produced
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// One outcome per request whose task completed, per user in file order
    pub outcomes: Vec<CreditOutcome>,
    /// Requests whose task died before reporting back
    pub lost: usize,
}

impl ReplaySummary {
    fn record(&mut self, batch: &BatchOutcome) {
        for outcome in &batch.outcomes {
            match &outcome.result {
                Ok(_) => self.applied += 1,
                Err(_) => self.rejected += 1,
            }
        }
        self.rejected += batch.lost;
    }
}

/// Batch processor with user-based partitioning
pub struct CreditBatchProcessor<A, L> {
    service: FareAccountService<A, L>,
}

impl<A, L> Clone for CreditBatchProcessor<A, L> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<A, L> CreditBatchProcessor<A, L>
where
    A: AccountStore + 'static,
    L: TripLedger + 'static,
{
    pub fn new(service: FareAccountService<A, L>) -> Self {
        Self { service }
    }

    /// Split a batch into per-user groups, keeping file order inside each group
    pub fn partition_by_user(
        &self,
        batch: Vec<CreditRequest>,
    ) -> HashMap<UserId, Vec<CreditRequest>> {
        let mut user_batches: HashMap<UserId, Vec<CreditRequest>> = HashMap::new();

        for request in batch {
            user_batches
                .entry(request.user_id.clone())
                .or_default()
                .push(request);
        }

        user_batches
    }

    /// Apply one user's credits in order; failures are captured, not fatal
    pub fn process_user_credits(&self, requests: Vec<CreditRequest>) -> Vec<CreditOutcome> {
        requests
            .into_iter()
            .map(|request| {
                let result = self.service.credit(&request.user_id, request.amount);
                if let Err(e) = &result {
                    warn!(user_id = %request.user_id, amount = %request.amount, error = %e, "credit rejected");
                }
                CreditOutcome { request, result }
            })
            .collect()
    }

    /// Apply a batch with one tokio task per user and wait for all of them
    ///
    /// # Arguments
    ///
    /// * `batch` - Credit requests in file order
    ///
    /// # Returns
    ///
    /// A [`BatchOutcome`] holding the outcome of every request whose task
    /// completed, plus the number of requests whose task failed.
    ///
    /// # Guarantees
    ///
    /// - Each user's credits are applied in file order
    /// - Different users' credits run concurrently
    /// - `outcomes.len() + lost` equals the batch length
    /// - The call returns only once every task has finished
    pub async fn process_batch(&self, batch: Vec<CreditRequest>) -> BatchOutcome {
        let user_batches = self.partition_by_user(batch);

        let mut tasks = Vec::with_capacity(user_batches.len());
        for (user_id, requests) in user_batches {
            let processor = self.clone();
            let count = requests.len();
            let task = tokio::spawn(async move { processor.process_user_credits(requests) });
            tasks.push((user_id, count, task));
        }

        let mut result = BatchOutcome::default();
        for (user_id, count, task) in tasks {
            match task.await {
                Ok(user_outcomes) => result.outcomes.extend(user_outcomes),
                Err(e) => {
                    error!(%user_id, requests = count, error = %e, "credit task failed");
                    result.lost += count;
                }
            }
        }

        result
    }
}

/// Replay every credit in `input_path` against `service`
///
/// Builds a multi-threaded tokio runtime, then reads the file batch by batch
/// and hands each batch to a [`CreditBatchProcessor`].
///
/// # Arguments
///
/// * `service` - Service whose stores receive the credits
/// * `input_path` - CSV file with `user_id,amount` rows
/// * `config` - Batch size and worker thread count
///
/// # Returns
///
/// A [`ReplaySummary`] with applied, rejected and malformed row counts.
///
/// # Errors
///
/// Only failing to build the runtime or open the file is fatal. Per-row
/// failures are logged and counted in the summary.
///
/// # Guarantees
///
/// - Every row of the file is counted exactly once in the summary
/// - A batch is fully applied before the next one is read
pub fn replay_credits<A, L>(
    service: &FareAccountService<A, L>,
    input_path: &Path,
    config: &ReplayConfig,
) -> Result<ReplaySummary, FareError>
where
    A: AccountStore + 'static,
    L: TripLedger + 'static,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.max_concurrent)
        .build()?;

    runtime.block_on(async {
        let processor = CreditBatchProcessor::new(service.clone());

        let file = tokio::fs::File::open(input_path).await.map_err(|e| {
            FareError::storage_unavailable(&format!(
                "failed to open '{}': {e}",
                input_path.display()
            ))
        })?;
        let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
        let mut reader = CreditReader::new(compat_file);

        let mut summary = ReplaySummary::default();
        while let Some(batch) = reader.read_batch(config.batch_size).await {
            let outcome = processor.process_batch(batch).await;
            summary.record(&outcome);
        }
        summary.malformed = reader.malformed_rows();

        info!(
            applied = summary.applied,
            rejected = summary.rejected,
            malformed = summary.malformed,
            "replay finished"
        );
        Ok(summary)
    })
}
