use crate::domain::model::{OperationResult, Rejection};
use crate::utils::error::Result;
use std::collections::HashSet;
use std::future::Future;
use std::hash::Hash;
use tokio::sync::mpsc;

/// Fans out one async operation per item, joins on all of them, and
/// returns the processed/rejected partition.
///
/// Every operation runs independently: a failing item never cancels or
/// delays its siblings, and no retry happens here. Callers that want to
/// retry re-invoke with the rejected subset. Completion order across items
/// is unspecified; the returned aggregate is computed only after every
/// item's outcome has arrived.
pub async fn run<T, F, Fut>(items: Vec<T>, operation: F) -> OperationResult<T>
where
    T: Clone + Eq + Hash + Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    if items.is_empty() {
        return OperationResult::empty();
    }

    let total = items.len();
    tracing::debug!("Dispatching {} concurrent item operations", total);

    // Each task reports over the channel; draining all N messages is the
    // join barrier. No shared mutable set is touched on the hot path.
    let (tx, mut rx) = mpsc::channel(total);
    for item in &items {
        let tx = tx.clone();
        let item = item.clone();
        let fut = operation(item.clone());
        tokio::spawn(async move {
            let outcome = fut.await;
            let _ = tx.send((item, outcome)).await;
        });
    }
    drop(tx);

    let mut rejections: HashSet<Rejection<T>> = HashSet::new();
    while let Some((item, outcome)) = rx.recv().await {
        if let Err(error) = outcome {
            tracing::debug!("Item operation failed: {}", error);
            rejections.insert(Rejection::new(item, error));
        }
    }

    let rejected_items: HashSet<T> = rejections.iter().map(|r| r.item.clone()).collect();
    let processed: HashSet<T> = items
        .into_iter()
        .filter(|item| !rejected_items.contains(item))
        .collect();

    tracing::debug!(
        "Operation complete: {} processed, {} rejected",
        processed.len(),
        rejections.len()
    );

    OperationResult {
        processed,
        rejections,
    }
}
