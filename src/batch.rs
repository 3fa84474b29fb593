//! # Batch Settling
//!
//! The aggregation core: [`settle`] waits for every operation in a
//! collection to reach a terminal state and records each outcome as data,
//! [`bifurcate`] stably partitions a sequence by predicate, and
//! [`RequestBatch`] queues verb calls for deferred joint settling.
//!
//! One failing request among many never aborts the aggregate: failures are
//! recovered into [`Outcome::Error`] records at the settle boundary, and only
//! the classification of a drain reflects them.

use std::future::Future;
use std::sync::Arc;

use futures::future;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::client::{RequestOptions, RestClient};
use crate::error::{ClientError, ClientResult};
use crate::transport::{ResponseData, Verb};

/// Terminal outcome of a settled operation.
///
/// Exactly one variant per record; the record's position in a settled
/// sequence matches the position of the operation that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T, E> {
    /// The operation succeeded with this value
    Response(T),
    /// The operation failed with this error
    Error(E),
}

impl<T, E> Outcome<T, E> {
    /// Capture a result as an outcome record
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Response(value),
            Err(error) => Outcome::Error(error),
        }
    }

    /// Whether this record carries a response
    #[must_use]
    pub fn is_response(&self) -> bool {
        matches!(self, Outcome::Response(_))
    }

    /// Whether this record carries an error
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    /// The response value, if present
    pub fn response(&self) -> Option<&T> {
        match self {
            Outcome::Response(value) => Some(value),
            Outcome::Error(_) => None,
        }
    }

    /// The error value, if present
    pub fn error(&self) -> Option<&E> {
        match self {
            Outcome::Response(_) => None,
            Outcome::Error(error) => Some(error),
        }
    }
}

/// Wait for every operation to terminate, capturing each outcome as data.
///
/// The output has the same length and order as the input regardless of
/// completion order, and the call itself never fails: a failing operation
/// becomes an [`Outcome::Error`] record rather than an error of the settle.
/// An empty input settles immediately to an empty vec.
///
/// ```rust
/// use acorn_client::batch::settle;
/// use futures::future::ready;
///
/// # tokio_test::block_on(async {
/// let outcomes = settle(vec![
///     ready(Ok::<_, String>("first")),
///     ready(Err("boom".to_string())),
///     ready(Ok("third")),
/// ])
/// .await;
///
/// assert_eq!(outcomes.len(), 3);
/// assert_eq!(outcomes[0].response(), Some(&"first"));
/// assert_eq!(outcomes[1].error(), Some(&"boom".to_string()));
/// assert_eq!(outcomes[2].response(), Some(&"third"));
/// # });
/// ```
pub async fn settle<I, F, T, E>(operations: I) -> Vec<Outcome<T, E>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    future::join_all(
        operations
            .into_iter()
            .map(|operation| async move { Outcome::from_result(operation.await) }),
    )
    .await
}

/// Stable two-way partition of a sequence by an `(element, index)` predicate.
///
/// Elements satisfying the predicate land in the first vec, the rest in the
/// second; relative order is preserved in both. Every input element appears
/// in exactly one output.
pub fn bifurcate<I, T, P>(items: I, mut predicate: P) -> (Vec<T>, Vec<T>)
where
    I: IntoIterator<Item = T>,
    P: FnMut(&T, usize) -> bool,
{
    let mut matching = Vec::new();
    let mut rest = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        if predicate(&item, index) {
            matching.push(item);
        } else {
            rest.push(item);
        }
    }

    (matching, rest)
}

/// Outcome record produced by draining a batch.
///
/// Payloads are shared so a non-clearing drain can hand out the same settled
/// records again on a later drain.
pub type BatchOutcome = Outcome<Arc<ResponseData>, Arc<ClientError>>;

/// Result of draining a batch: outcome records bucketed by the predicate.
#[derive(Debug, Clone, Default)]
pub struct DrainReport {
    /// Records the predicate classified as successes, in queue order
    pub success: Vec<BatchOutcome>,
    /// Records the predicate classified as errors, in queue order
    pub errors: Vec<BatchOutcome>,
}

impl DrainReport {
    /// Total number of records across both buckets
    #[must_use]
    pub fn len(&self) -> usize {
        self.success.len() + self.errors.len()
    }

    /// Whether the drained batch was empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.errors.is_empty()
    }
}

/// Default drain predicate: a record is a success when it carries a response.
pub fn default_predicate(outcome: &BatchOutcome, _index: usize) -> bool {
    outcome.is_response()
}

/// A queue slot: either a still-running spawned request or an outcome
/// memoized by an earlier non-clearing drain.
enum BatchSlot {
    Pending(JoinHandle<ClientResult<ResponseData>>),
    Settled(BatchOutcome),
}

/// Coordinator that queues verb calls for deferred joint settling.
///
/// Queuing a call starts the request immediately on the runtime; only the
/// awaiting is deferred. Queue methods return `&mut Self` so calls chain
/// fluently. [`RequestBatch::drain`] settles the whole queue at once and
/// splits the outcomes into successes and errors.
///
/// ```rust,no_run
/// # use acorn_client::{RequestOptions, RestClient};
/// # async fn example(client: RestClient) {
/// let mut batch = client.batch();
/// batch
///     .get(RequestOptions::path("v1/items"))
///     .get(RequestOptions::path("v1/owners"))
///     .post(RequestOptions::path("v1/audit").body(serde_json::json!({"seen": true})));
///
/// let report = batch.drain().await;
/// println!("{} ok, {} failed", report.success.len(), report.errors.len());
/// # }
/// ```
pub struct RequestBatch {
    client: RestClient,
    queue: Vec<BatchSlot>,
}

impl std::fmt::Debug for RequestBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBatch")
            .field("client", &self.client)
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl RequestBatch {
    pub(crate) fn new(client: RestClient) -> Self {
        Self {
            client,
            queue: Vec::new(),
        }
    }

    /// Number of queued, not-yet-drained operations
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queue an OPTIONS call
    pub fn options(&mut self, request: RequestOptions) -> &mut Self {
        self.enqueue(Verb::Options, request)
    }

    /// Queue a HEAD call
    pub fn head(&mut self, request: RequestOptions) -> &mut Self {
        self.enqueue(Verb::Head, request)
    }

    /// Queue a GET call
    pub fn get(&mut self, request: RequestOptions) -> &mut Self {
        self.enqueue(Verb::Get, request)
    }

    /// Queue a POST call
    pub fn post(&mut self, request: RequestOptions) -> &mut Self {
        self.enqueue(Verb::Post, request)
    }

    /// Queue a PUT call
    pub fn put(&mut self, request: RequestOptions) -> &mut Self {
        self.enqueue(Verb::Put, request)
    }

    /// Queue a DELETE call
    pub fn delete(&mut self, request: RequestOptions) -> &mut Self {
        self.enqueue(Verb::Delete, request)
    }

    fn enqueue(&mut self, verb: Verb, request: RequestOptions) -> &mut Self {
        let client = self.client.clone();
        // The request starts now; only the awaiting is deferred to drain.
        let handle = tokio::spawn(async move { client.request(verb, request).await });
        self.queue.push(BatchSlot::Pending(handle));

        debug!(verb = %verb, queued = self.queue.len(), "Queued batched request");
        self
    }

    /// Drain with the default success predicate, clearing the queue.
    pub async fn drain(&mut self) -> DrainReport {
        self.drain_with(default_predicate, true).await
    }

    /// Settle the entire current queue and bifurcate the outcomes.
    ///
    /// The queue snapshot is taken up front: calls queued after the snapshot
    /// belong to the next batch. With `clear` set (the default drain), the
    /// queue is left empty; with `clear` suppressed the settled outcomes are
    /// written back in place, so a later drain without new queue calls
    /// reproduces the identical classification without re-issuing requests.
    ///
    /// The drain itself always succeeds structurally, even when every queued
    /// operation failed. A queued task that panicked settles as an
    /// [`ClientError::Internal`] error record.
    pub async fn drain_with<P>(&mut self, predicate: P, clear: bool) -> DrainReport
    where
        P: FnMut(&BatchOutcome, usize) -> bool,
    {
        let snapshot = std::mem::take(&mut self.queue);
        let queued = snapshot.len();

        let outcomes: Vec<BatchOutcome> =
            settle(snapshot.into_iter().map(settle_slot)).await
                .into_iter()
                // settle_slot already folded task panics into the error arm
                .map(|outcome| match outcome {
                    Outcome::Response(record) => record,
                    Outcome::Error(record) => record,
                })
                .collect();

        if !clear {
            // The &mut borrow held across the settle means nothing queued in
            // the meantime; the settled snapshot takes the queue's place.
            self.queue = outcomes.iter().cloned().map(BatchSlot::Settled).collect();
        }

        let (success, errors) = bifurcate(outcomes, predicate);

        debug!(
            queued,
            success = success.len(),
            errors = errors.len(),
            cleared = clear,
            "Drained request batch"
        );

        DrainReport { success, errors }
    }

    /// Discard all queued, not-yet-drained operations without awaiting them.
    ///
    /// In-flight requests are not cancelled; they run to completion and may
    /// still mutate external state, but their outcomes are no longer
    /// observable through this batch.
    pub fn clear(&mut self) -> &mut Self {
        debug!(discarded = self.queue.len(), "Cleared request batch");
        self.queue.clear();
        self
    }
}

/// Resolve one queue slot to its outcome record.
///
/// Returned as a `Result` with the record on both arms so it can flow
/// through [`settle`]: a pending success is the `Ok` arm, everything else
/// (request failure, task panic, memoized error) the `Err` arm.
async fn settle_slot(slot: BatchSlot) -> Result<BatchOutcome, BatchOutcome> {
    match slot {
        BatchSlot::Settled(outcome @ Outcome::Response(_)) => Ok(outcome),
        BatchSlot::Settled(outcome) => Err(outcome),
        BatchSlot::Pending(handle) => match handle.await {
            Ok(Ok(response)) => Ok(Outcome::Response(Arc::new(response))),
            Ok(Err(error)) => Err(Outcome::Error(Arc::new(error))),
            Err(join_error) => Err(Outcome::Error(Arc::new(ClientError::Internal(format!(
                "Batched request task failed: {join_error}"
            ))))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::ready;
    use proptest::prelude::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_settle_empty_input() {
        let outcomes: Vec<Outcome<u32, String>> =
            settle(Vec::<future::Ready<Result<u32, String>>>::new()).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_settle_preserves_length_and_position() {
        let outcomes = settle(vec![
            ready(Ok::<_, String>(1)),
            ready(Err("two".to_string())),
            ready(Ok(3)),
        ])
        .await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].response(), Some(&1));
        assert_eq!(outcomes[1].error(), Some(&"two".to_string()));
        assert_eq!(outcomes[2].response(), Some(&3));
    }

    #[tokio::test]
    async fn test_settle_never_fails_when_all_inputs_fail() {
        let outcomes: Vec<Outcome<u32, &str>> =
            settle(vec![ready(Err("a")), ready(Err("b")), ready(Err("c"))]).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(Outcome::is_error));
    }

    #[tokio::test]
    async fn test_settle_orders_by_submission_not_completion() {
        // The first operation finishes last; its record must still come first.
        let slow = async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok::<_, String>("slow")
        };
        let fast = async { Ok::<_, String>("fast") };

        let outcomes = settle(vec![
            Box::pin(slow) as std::pin::Pin<Box<dyn Future<Output = Result<&str, String>>>>,
            Box::pin(fast),
        ])
        .await;

        assert_eq!(outcomes[0].response(), Some(&"slow"));
        assert_eq!(outcomes[1].response(), Some(&"fast"));
    }

    #[test]
    fn test_bifurcate_empty_input() {
        let (matching, rest) = bifurcate(Vec::<u32>::new(), |_, _| true);
        assert!(matching.is_empty());
        assert!(rest.is_empty());
    }

    #[test]
    fn test_bifurcate_is_a_stable_partition() {
        let (even, odd) = bifurcate(vec![1, 2, 3, 4, 5, 6], |n, _| n % 2 == 0);
        assert_eq!(even, vec![2, 4, 6]);
        assert_eq!(odd, vec![1, 3, 5]);
    }

    #[test]
    fn test_bifurcate_predicate_sees_indices() {
        let items = vec!["a", "b", "c", "d"];
        let (head, tail) = bifurcate(items, |_, index| index < 2);
        assert_eq!(head, vec!["a", "b"]);
        assert_eq!(tail, vec!["c", "d"]);
    }

    proptest! {
        #[test]
        fn prop_bifurcate_partitions_completely(items: Vec<i64>, pivot: i64) {
            let (matching, rest) = bifurcate(items.clone(), |n, _| *n < pivot);

            prop_assert_eq!(matching.len() + rest.len(), items.len());
            prop_assert!(matching.iter().all(|n| *n < pivot));
            prop_assert!(rest.iter().all(|n| *n >= pivot));

            // Stable: each bucket is a subsequence of the input.
            let mut merged = matching.clone();
            merged.extend(rest.iter().copied());
            merged.sort_unstable();
            let mut sorted = items.clone();
            sorted.sort_unstable();
            prop_assert_eq!(merged, sorted);

            let filtered: Vec<i64> = items.iter().copied().filter(|n| *n < pivot).collect();
            prop_assert_eq!(matching, filtered);
        }
    }
}
