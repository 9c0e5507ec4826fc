use crate::core::atomic::Locked;
use crate::domain::model::{DeviceStatus, Entry, ProfileRecord, ServerStatus, Snapshot, Treatment};
use crate::domain::ports::SnapshotSource;
use crate::utils::error::{Result, TrackError};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;

enum Fetched {
    Status(ServerStatus),
    DeviceStatuses(Vec<DeviceStatus>),
    Profiles(Vec<ProfileRecord>),
    Entries(Vec<Entry>),
    Treatments(Vec<Treatment>),
    /// The error is already in the shared first-error slot.
    Failed,
}

const FETCH_COUNT: usize = 5;

/// Fetches the five remote endpoints concurrently and assembles them into
/// one `Snapshot` stamped with the call-start time.
///
/// All five fetches run to completion even after one has failed; the
/// transport work is already committed. Failures race for a shared
/// first-error slot and the first writer wins, so which error is reported
/// under truly concurrent failures is nondeterministic. If any fetch
/// failed the whole call fails with that single error and any payloads
/// already fetched are discarded.
pub async fn snapshot<S>(source: Arc<S>) -> Result<Snapshot>
where
    S: SnapshotSource + 'static,
{
    let timestamp = Utc::now();
    tracing::debug!("Fetching remote snapshot");

    let first_error: Arc<Locked<Option<TrackError>>> = Arc::new(Locked::new(None));
    let (tx, mut rx) = mpsc::channel(FETCH_COUNT);

    macro_rules! launch {
        ($fetch:ident, $variant:ident) => {{
            let source = Arc::clone(&source);
            let first_error = Arc::clone(&first_error);
            let tx = tx.clone();
            tokio::spawn(async move {
                let part = match source.$fetch().await {
                    Ok(payload) => Fetched::$variant(payload),
                    Err(error) => {
                        first_error.modify(|slot| {
                            if slot.is_none() {
                                *slot = Some(error);
                            }
                        });
                        Fetched::Failed
                    }
                };
                let _ = tx.send(part).await;
            });
        }};
    }

    launch!(fetch_status, Status);
    launch!(fetch_device_statuses, DeviceStatuses);
    launch!(fetch_profiles, Profiles);
    launch!(fetch_entries, Entries);
    launch!(fetch_treatments, Treatments);
    drop(tx);

    let mut status = None;
    let mut device_statuses = None;
    let mut profiles = None;
    let mut entries = None;
    let mut treatments = None;

    // Draining all five outcomes is the join barrier; no early exit.
    while let Some(part) = rx.recv().await {
        match part {
            Fetched::Status(payload) => status = Some(payload),
            Fetched::DeviceStatuses(payload) => device_statuses = Some(payload),
            Fetched::Profiles(payload) => profiles = Some(payload),
            Fetched::Entries(payload) => entries = Some(payload),
            Fetched::Treatments(payload) => treatments = Some(payload),
            Fetched::Failed => {}
        }
    }

    if let Some(error) = first_error.modify(Option::take) {
        tracing::debug!("Snapshot fetch failed: {}", error);
        return Err(error);
    }

    match (status, device_statuses, profiles, entries, treatments) {
        (Some(status), Some(device_statuses), Some(profiles), Some(entries), Some(treatments)) => {
            Ok(Snapshot {
                timestamp,
                status,
                device_statuses,
                profiles,
                entries,
                treatments,
            })
        }
        // Every fetch reports exactly one outcome, payload or recorded error.
        _ => unreachable!("snapshot fetch finished without payload or error"),
    }
}
