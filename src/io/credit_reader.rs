//! Asynchronous CSV reader for credit requests
//!
//! Reads `user_id,amount` rows in batches so a large replay file is streamed
//! rather than loaded whole.
//!
//! ```text
//! CSV file → CreditReader → Batches of CreditRequests
//!                 ↓
//!          csv_format module
//!       (CreditRow, convert_credit_row)
//! ```

use crate::io::csv_format::{convert_credit_row, CreditRow};
use crate::types::CreditRequest;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Batched credit request reader
///
/// Malformed rows are logged, counted, and skipped.
pub struct CreditReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    malformed: usize,
    finished: bool,
}

impl<R: AsyncRead + Unpin + Send + 'static> CreditReader<R> {
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            malformed: 0,
            finished: false,
        }
    }

    /// Read up to `batch_size` valid credit requests
    ///
    /// Malformed rows do not count towards `batch_size`; reading continues
    /// until the batch is full or the input ends. Returns `None` once the
    /// input is exhausted, so a returned batch is never empty. Only the last
    /// batch may be shorter than `batch_size`.
    pub async fn read_batch(&mut self, batch_size: usize) -> Option<Vec<CreditRequest>> {
        if self.finished {
            return None;
        }

        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.csv_reader.deserialize::<CreditRow>();

        while batch.len() < batch_size {
            match rows.next().await {
                Some(Ok(row)) => match convert_credit_row(row) {
                    Ok(request) => batch.push(request),
                    Err(e) => {
                        warn!(error = %e, "skipping malformed credit row");
                        self.malformed += 1;
                    }
                },
                Some(Err(e)) => {
                    warn!(error = %e, "skipping unreadable credit row");
                    self.malformed += 1;
                }
                None => {
                    self.finished = true;
                    break;
                }
            }
        }

        if batch.is_empty() && self.finished {
            None
        } else {
            Some(batch)
        }
    }

    /// Number of rows skipped so far
    pub fn malformed_rows(&self) -> usize {
        self.malformed
    }
}
