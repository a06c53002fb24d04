//! Detail Batch Fetcher
//!
//! Splits the address list into contiguous batches no larger than the
//! endpoint allows and fetches each batch with one request. A failed batch
//! is logged and skipped; it never aborts the run.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::DetailRecord;
use crate::ports::DetailPort;

/// Documented maximum of the detail endpoint
pub const DEFAULT_BATCH_SIZE: usize = 30;

/// Outcome of fetching all batches
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// One record per requested address that came back, first pair wins
    pub records: Vec<DetailRecord>,
    /// Requests issued
    pub requests: usize,
    /// Addresses of batches that failed
    pub failed_batches: Vec<Vec<String>>,
    /// Returned records whose address was not requested
    pub unmatched: usize,
    /// Additional records for an address already kept
    pub duplicates: usize,
}

impl FetchReport {
    /// True when nothing usable came back (`NoData`)
    pub fn is_no_data(&self) -> bool {
        self.records.is_empty()
    }

    pub fn failed_addresses(&self) -> usize {
        self.failed_batches.iter().map(Vec::len).sum()
    }
}

/// Split `addresses` into ordered chunks of at most `batch_size`
pub fn partition(addresses: &[String], batch_size: usize) -> Vec<&[String]> {
    addresses.chunks(batch_size.max(1)).collect()
}

pub struct DetailBatchFetcher {
    source: Arc<dyn DetailPort>,
    batch_size: usize,
}

impl DetailBatchFetcher {
    /// Create a fetcher; the batch size is capped at the source's maximum
    pub fn new(source: Arc<dyn DetailPort>, batch_size: usize) -> Self {
        let batch_size = batch_size.clamp(1, source.max_batch_size().max(1));
        Self { source, batch_size }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Fetch details for every address, tolerating per-batch failure
    pub async fn fetch(&self, addresses: &[String]) -> FetchReport {
        let mut report = FetchReport::default();
        let requested: HashSet<&str> = addresses.iter().map(String::as_str).collect();
        let mut kept: HashSet<String> = HashSet::new();
        let batches = partition(addresses, self.batch_size);

        tracing::info!(
            "Fetching details for {} addresses in {} batches of up to {}",
            addresses.len(),
            batches.len(),
            self.batch_size
        );

        for (index, batch) in batches.into_iter().enumerate() {
            report.requests += 1;

            let records = match self.source.fetch_details(batch).await {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(
                        "Failed to fetch details for batch {} ({} addresses): {} - {:?}",
                        index + 1,
                        batch.len(),
                        e,
                        batch
                    );
                    report.failed_batches.push(batch.to_vec());
                    continue;
                }
            };

            tracing::debug!("Batch {} returned {} records", index + 1, records.len());

            for record in records {
                if !requested.contains(record.address.as_str()) {
                    tracing::warn!(
                        "Dropping detail record for unrequested address {}",
                        record.address
                    );
                    report.unmatched += 1;
                    continue;
                }
                if kept.insert(record.address.clone()) {
                    report.records.push(record);
                } else {
                    report.duplicates += 1;
                }
            }
        }

        if report.is_no_data() && !addresses.is_empty() {
            tracing::warn!(
                "No detail data returned ({} of {} batches failed)",
                report.failed_batches.len(),
                report.requests
            );
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockDetailPort, SourceError};

    fn addresses(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("addr{:02}", i)).collect()
    }

    fn echo(batch: &[String]) -> Vec<DetailRecord> {
        batch.iter().map(|a| DetailRecord::new(a.clone())).collect()
    }

    #[test]
    fn test_partition_sizes() {
        for len in [0usize, 1, 29, 30, 31, 45, 60, 61] {
            let input = addresses(len);
            let batches = partition(&input, 30);
            assert_eq!(batches.len(), len.div_ceil(30));
            let flattened: Vec<String> = batches.concat();
            assert_eq!(flattened, input);
            assert!(batches.iter().all(|b| b.len() <= 30));
        }
    }

    #[test]
    fn test_batch_size_capped_by_source() {
        let mut source = MockDetailPort::new();
        source.expect_max_batch_size().return_const(30usize);
        let fetcher = DetailBatchFetcher::new(Arc::new(source), 100);
        assert_eq!(fetcher.batch_size(), 30);
    }

    #[tokio::test]
    async fn test_second_batch_failure_keeps_first() {
        let mut source = MockDetailPort::new();
        source.expect_max_batch_size().return_const(30usize);
        source
            .expect_fetch_details()
            .withf(|batch: &[String]| batch.len() == 30)
            .times(1)
            .returning(|batch| Ok(echo(batch)));
        source
            .expect_fetch_details()
            .withf(|batch: &[String]| batch.len() == 15)
            .times(1)
            .returning(|_| {
                Err(SourceError::Status {
                    endpoint: "details".into(),
                    status: 500,
                })
            });

        let fetcher = DetailBatchFetcher::new(Arc::new(source), DEFAULT_BATCH_SIZE);
        let input = addresses(45);
        let report = fetcher.fetch(&input).await;

        assert_eq!(report.requests, 2);
        assert_eq!(report.records.len(), 30);
        assert_eq!(report.failed_batches.len(), 1);
        assert_eq!(report.failed_addresses(), 15);
        assert_eq!(report.records[0].address, "addr00");
    }

    #[tokio::test]
    async fn test_all_batches_failing_is_no_data() {
        let mut source = MockDetailPort::new();
        source.expect_max_batch_size().return_const(30usize);
        source
            .expect_fetch_details()
            .times(2)
            .returning(|_| Err(SourceError::Transport("connection reset".into())));

        let fetcher = DetailBatchFetcher::new(Arc::new(source), 30);
        let report = fetcher.fetch(&addresses(31)).await;

        assert!(report.is_no_data());
        assert_eq!(report.requests, 2);
    }

    #[tokio::test]
    async fn test_empty_input_issues_no_requests() {
        let mut source = MockDetailPort::new();
        source.expect_max_batch_size().return_const(30usize);
        source.expect_fetch_details().never();

        let fetcher = DetailBatchFetcher::new(Arc::new(source), 30);
        let report = fetcher.fetch(&[]).await;
        assert_eq!(report.requests, 0);
        assert!(report.is_no_data());
    }

    #[tokio::test]
    async fn test_exact_match_and_first_pair_wins() {
        let mut source = MockDetailPort::new();
        source.expect_max_batch_size().return_const(30usize);
        source
            .expect_fetch_details()
            .withf(|batch: &[String]| batch == ["AbC".to_string()])
            .times(1)
            .returning(|_| {
                Ok(vec![
                    DetailRecord::new("AbC").with_liquidity(900.0),
                    DetailRecord::new("AbC").with_liquidity(5.0),
                    DetailRecord::new("abc").with_liquidity(1.0),
                ])
            });

        let fetcher = DetailBatchFetcher::new(Arc::new(source), 30);
        let report = fetcher.fetch(&["AbC".to_string()]).await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].liquidity_usd, Some(900.0));
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.unmatched, 1);
    }
}
