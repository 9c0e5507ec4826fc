use crate::domain::model::PostResponse;
use crate::utils::error::Result;
use std::collections::HashSet;
use std::future::Future;
use std::hash::Hash;

/// Submits all items in one round trip and partitions them by the server's
/// acceptance report.
///
/// Contrast with the coordinator: a batch is a single HTTP exchange, so a
/// failure here is all-or-nothing. A top-level error propagates as-is and
/// no partial `PostResponse` is produced. Per-item detail is limited to
/// accepted-or-not because the batch endpoint reports no cause.
pub async fn post<T, F, Fut>(items: Vec<T>, submit: F) -> Result<PostResponse<T>>
where
    T: Clone + Eq + Hash,
    F: FnOnce(Vec<T>) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let submitted: HashSet<T> = items.iter().cloned().collect();
    tracing::debug!("Submitting batch of {} items", submitted.len());

    let accepted = submit(items).await?;

    let uploaded: HashSet<T> = accepted.into_iter().collect();
    let rejected: HashSet<T> = submitted
        .into_iter()
        .filter(|item| !uploaded.contains(item))
        .collect();

    tracing::debug!(
        "Batch complete: {} uploaded, {} rejected",
        uploaded.len(),
        rejected.len()
    );

    Ok(PostResponse { uploaded, rejected })
}
