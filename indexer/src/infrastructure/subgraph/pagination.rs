//! Offset pagination over subgraph collections

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::infrastructure::subgraph::error::SubgraphClientError;
use crate::utils::cancel::CancelSignal;

/// Which events of a collection to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    /// The whole collection
    All,
    /// Only events with `stakeId` strictly greater than the cursor
    StakeIdAfter(String),
    /// Only events mined in a block strictly after the cursor
    BlockAfter(i64),
}

/// Paging parameters for one collection fetch
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Records requested per page
    pub page_size: usize,
    /// Hard ceiling on records returned
    pub max_records: usize,
    /// Pause between consecutive page requests
    pub page_delay: Duration,
    pub filter: EventFilter,
}

impl FetchOptions {
    pub fn new(page_size: usize, max_records: usize, page_delay: Duration) -> Self {
        Self {
            page_size: page_size.max(1),
            max_records,
            page_delay,
            filter: EventFilter::All,
        }
    }

    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Fetch pages in order until a short page or the record ceiling
///
/// `fetch_page` receives `(first, skip)`. Pages are requested strictly one after another,
/// separated by `page_delay`; the final request is shrunk so `max_records` is never exceeded.
pub async fn paginate<T, F, Fut>(
    options: &FetchOptions,
    cancel: &CancelSignal,
    mut fetch_page: F,
) -> Result<Vec<T>, SubgraphClientError>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, SubgraphClientError>>,
{
    let mut records: Vec<T> = Vec::new();
    let mut pages_fetched = 0usize;

    loop {
        let remaining = options.max_records.saturating_sub(records.len());
        if remaining == 0 {
            break;
        }

        if pages_fetched > 0 && !options.page_delay.is_zero() {
            sleep(options.page_delay).await;
        }

        if cancel.is_cancelled() {
            return Err(SubgraphClientError::Cancelled);
        }

        let first = options.page_size.min(remaining);
        let skip = records.len();
        let mut page = fetch_page(first, skip).await?;
        pages_fetched += 1;

        let short_page = page.len() < first;
        page.truncate(first);
        records.extend(page);

        if short_page {
            break;
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    type CallLog = Arc<Mutex<Vec<(usize, usize, Instant)>>>;

    fn source(total: usize, calls: CallLog) -> impl FnMut(usize, usize) -> std::future::Ready<Result<Vec<usize>, SubgraphClientError>> {
        move |first, skip| {
            calls.lock().unwrap().push((first, skip, Instant::now()));
            let end = (skip + first).min(total);
            let page: Vec<usize> = (skip.min(end)..end).collect();
            std::future::ready(Ok(page))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ceiling_gives_exact_page_count_with_delays() {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let options = FetchOptions::new(100, 1000, Duration::from_millis(100));

        let records = paginate(&options, &CancelSignal::new(), source(5000, calls.clone()))
            .await
            .unwrap();

        assert_eq!(records.len(), 1000);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 10);
        for (i, (first, skip, _)) in calls.iter().enumerate() {
            assert_eq!(*first, 100);
            assert_eq!(*skip, i * 100);
        }
        for pair in calls.windows(2) {
            assert!(pair[1].2 - pair[0].2 >= Duration::from_millis(100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_page_stops_early() {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let options = FetchOptions::new(100, 1000, Duration::from_millis(100));

        let records = paginate(&options, &CancelSignal::new(), source(250, calls.clone()))
            .await
            .unwrap();

        assert_eq!(records, (0..250).collect::<Vec<_>>());
        assert_eq!(calls.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exact_multiple_needs_one_empty_page() {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let options = FetchOptions::new(100, 1000, Duration::ZERO);

        let records = paginate(&options, &CancelSignal::new(), source(200, calls.clone()))
            .await
            .unwrap();

        assert_eq!(records.len(), 200);
        assert_eq!(calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_last_page_is_shrunk_to_ceiling() {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let options = FetchOptions::new(100, 250, Duration::ZERO);

        let records = paginate(&options, &CancelSignal::new(), source(10_000, calls.clone()))
            .await
            .unwrap();

        assert_eq!(records.len(), 250);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!((calls[2].0, calls[2].1), (50, 200));
    }

    #[tokio::test]
    async fn test_page_error_aborts_fetch() {
        let mut attempts = 0;
        let options = FetchOptions::new(10, 100, Duration::ZERO);

        let result: Result<Vec<u8>, _> = paginate(&options, &CancelSignal::new(), |first, _skip| {
            attempts += 1;
            let outcome = if attempts == 2 {
                Err(SubgraphClientError::GraphqlError("indexing error".into()))
            } else {
                Ok(vec![0u8; first])
            };
            std::future::ready(outcome)
        })
        .await;

        assert!(matches!(result, Err(SubgraphClientError::GraphqlError(_))));
        assert_eq!(attempts, 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_page() {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let cancel = CancelSignal::new();
        cancel.cancel();

        let result = paginate(
            &FetchOptions::new(10, 100, Duration::ZERO),
            &cancel,
            source(100, calls.clone()),
        )
        .await;

        assert!(matches!(result, Err(SubgraphClientError::Cancelled)));
        assert!(calls.lock().unwrap().is_empty());
    }
}
