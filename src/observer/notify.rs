use crate::domain::model::{
    Entry, OperationResult, PostResponse, ProfileRecord, Snapshot, Treatment,
};
use crate::utils::error::TrackError;
use std::collections::HashSet;

/// Listener interface for aggregate outcomes. Every method is a no-op by
/// default; implementors override only the events they care about.
///
/// Observers are held by the registry as weak references: subscribing does
/// not extend the observer's lifetime, and a dropped observer is skipped
/// on the next notification pass.
pub trait TrackObserver: Send + Sync {
    fn treatments_updated(&self, _treatments: &HashSet<Treatment>) {}
    fn treatment_updates_rejected(&self, _treatments: &HashSet<Treatment>) {}

    fn treatments_deleted(&self, _treatments: &HashSet<Treatment>) {}
    fn treatment_deletes_rejected(&self, _treatments: &HashSet<Treatment>) {}

    fn profiles_updated(&self, _profiles: &HashSet<ProfileRecord>) {}
    fn profile_updates_rejected(&self, _profiles: &HashSet<ProfileRecord>) {}

    fn entries_uploaded(&self, _entries: &HashSet<Entry>) {}
    fn entries_rejected(&self, _entries: &HashSet<Entry>) {}

    fn snapshot_fetched(&self, _snapshot: &Snapshot) {}

    /// A whole-call failure: connectivity, protocol, credentials. Fired
    /// instead of, never alongside, the per-event callbacks above.
    fn operation_failed(&self, _error: &TrackError) {}
}

/// One computed aggregate outcome, borrowed from the operation that
/// produced it for the duration of the fan-out pass.
#[derive(Clone, Copy)]
pub enum TrackEvent<'a> {
    TreatmentsUpdated(&'a OperationResult<Treatment>),
    TreatmentsDeleted(&'a OperationResult<Treatment>),
    ProfilesUpdated(&'a OperationResult<ProfileRecord>),
    EntriesUploaded(&'a PostResponse<Entry>),
    SnapshotFetched(&'a Snapshot),
    OperationFailed(&'a TrackError),
}

/// Delivers one event to one observer. Success callbacks fire only for
/// non-empty processed/uploaded sets and rejection callbacks only for
/// non-empty rejection sets; an empty set never triggers a callback.
pub(crate) fn dispatch(observer: &dyn TrackObserver, event: TrackEvent<'_>) {
    match event {
        TrackEvent::TreatmentsUpdated(result) => {
            if !result.processed.is_empty() {
                observer.treatments_updated(&result.processed);
            }
            if !result.rejections.is_empty() {
                observer.treatment_updates_rejected(&result.rejected_items());
            }
        }
        TrackEvent::TreatmentsDeleted(result) => {
            if !result.processed.is_empty() {
                observer.treatments_deleted(&result.processed);
            }
            if !result.rejections.is_empty() {
                observer.treatment_deletes_rejected(&result.rejected_items());
            }
        }
        TrackEvent::ProfilesUpdated(result) => {
            if !result.processed.is_empty() {
                observer.profiles_updated(&result.processed);
            }
            if !result.rejections.is_empty() {
                observer.profile_updates_rejected(&result.rejected_items());
            }
        }
        TrackEvent::EntriesUploaded(response) => {
            if !response.uploaded.is_empty() {
                observer.entries_uploaded(&response.uploaded);
            }
            if !response.rejected.is_empty() {
                observer.entries_rejected(&response.rejected);
            }
        }
        TrackEvent::SnapshotFetched(snapshot) => observer.snapshot_fetched(snapshot),
        TrackEvent::OperationFailed(error) => observer.operation_failed(error),
    }
}
