use crate::adapters::HttpTransport;
use crate::config::ClientConfig;
use crate::core::{batch, coordinator, snapshot};
use crate::domain::model::{Entry, OperationResult, PostResponse, ProfileRecord, Snapshot, Treatment};
use crate::domain::ports::{EntryTransport, RecordTransport, SnapshotSource};
use crate::observer::{ObserverHandle, ObserverRegistry, TrackEvent, TrackObserver};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::sync::Arc;

/// Client for one remote data-tracking service.
///
/// Generic over the transport so tests can substitute in-memory fakes;
/// production code constructs it over [`HttpTransport`] via
/// [`TrackClient::from_config`]. Every multi-item operation fans out
/// concurrently, waits for all outcomes, and notifies subscribed
/// observers before handing the aggregate back to the caller.
pub struct TrackClient<T> {
    transport: Arc<T>,
    observers: ObserverRegistry,
}

impl TrackClient<HttpTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(HttpTransport::new(config)?))
    }
}

impl<T> TrackClient<T>
where
    T: RecordTransport + EntryTransport + SnapshotSource + 'static,
{
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            observers: ObserverRegistry::new(),
        }
    }

    pub fn subscribe(&self, observer: Arc<dyn TrackObserver>) -> ObserverHandle {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&self, handle: ObserverHandle) {
        self.observers.unsubscribe(handle)
    }

    /// Updates each treatment independently and concurrently. Failing
    /// items land in the rejection set without affecting their siblings;
    /// callers wanting a retry re-invoke with the rejected subset.
    pub async fn update_treatments(&self, treatments: Vec<Treatment>) -> OperationResult<Treatment> {
        tracing::info!("Updating {} treatment(s)", treatments.len());
        let transport = Arc::clone(&self.transport);
        let result = coordinator::run(treatments, move |treatment| {
            let transport = Arc::clone(&transport);
            async move { transport.update_treatment(&treatment).await }
        })
        .await;
        self.observers.notify(TrackEvent::TreatmentsUpdated(&result));
        result
    }

    /// Deletes each treatment independently and concurrently.
    pub async fn delete_treatments(&self, treatments: Vec<Treatment>) -> OperationResult<Treatment> {
        tracing::info!("Deleting {} treatment(s)", treatments.len());
        let transport = Arc::clone(&self.transport);
        let result = coordinator::run(treatments, move |treatment| {
            let transport = Arc::clone(&transport);
            async move { transport.delete_treatment(&treatment.id).await }
        })
        .await;
        self.observers.notify(TrackEvent::TreatmentsDeleted(&result));
        result
    }

    /// Updates each profile record independently and concurrently.
    pub async fn update_profiles(
        &self,
        profiles: Vec<ProfileRecord>,
    ) -> OperationResult<ProfileRecord> {
        tracing::info!("Updating {} profile record(s)", profiles.len());
        let transport = Arc::clone(&self.transport);
        let result = coordinator::run(profiles, move |profile| {
            let transport = Arc::clone(&transport);
            async move { transport.update_profile(&profile).await }
        })
        .await;
        self.observers.notify(TrackEvent::ProfilesUpdated(&result));
        result
    }

    /// Uploads entries in one batch round trip. The server's acceptance
    /// report drives the uploaded/rejected partition; a whole-call error
    /// fails the upload outright with no partial response.
    pub async fn upload_entries(&self, entries: Vec<Entry>) -> Result<PostResponse<Entry>> {
        tracing::info!("Uploading {} entry(ies)", entries.len());
        let transport = Arc::clone(&self.transport);
        let outcome = batch::post(entries, move |batch| async move {
            transport.post_entries(&batch).await
        })
        .await;

        match outcome {
            Ok(response) => {
                self.observers.notify(TrackEvent::EntriesUploaded(&response));
                Ok(response)
            }
            Err(error) => {
                tracing::warn!("Entry upload failed: {}", error);
                self.observers.notify(TrackEvent::OperationFailed(&error));
                Err(error)
            }
        }
    }

    /// Fetches the five snapshot endpoints concurrently and returns the
    /// composite, or the first fetch error with any partial data dropped.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot> {
        tracing::info!("Fetching snapshot");
        match snapshot::snapshot(Arc::clone(&self.transport)).await {
            Ok(snap) => {
                self.observers.notify(TrackEvent::SnapshotFetched(&snap));
                Ok(snap)
            }
            Err(error) => {
                tracing::warn!("Snapshot fetch failed: {}", error);
                self.observers.notify(TrackEvent::OperationFailed(&error));
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Locked;
    use crate::domain::model::{DeviceStatus, ServerStatus};
    use crate::utils::error::TrackError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashSet;

    struct FakeTransport {
        rejected_ids: Vec<String>,
        fail_batch: bool,
        deleted: Locked<Vec<String>>,
    }

    impl FakeTransport {
        fn new() -> Self {
            Self {
                rejected_ids: Vec::new(),
                fail_batch: false,
                deleted: Locked::new(Vec::new()),
            }
        }

        fn rejecting(ids: &[&str]) -> Self {
            Self {
                rejected_ids: ids.iter().map(|s| s.to_string()).collect(),
                ..Self::new()
            }
        }

        fn check(&self, id: &str) -> Result<()> {
            if self.rejected_ids.iter().any(|r| r == id) {
                Err(TrackError::ItemRejected {
                    id: id.to_string(),
                    reason: "rejected by fake".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RecordTransport for FakeTransport {
        async fn update_treatment(&self, treatment: &Treatment) -> Result<()> {
            self.check(&treatment.id)
        }

        async fn delete_treatment(&self, id: &str) -> Result<()> {
            self.check(id)?;
            self.deleted.modify(|v| v.push(id.to_string()));
            Ok(())
        }

        async fn update_profile(&self, profile: &ProfileRecord) -> Result<()> {
            self.check(&profile.id)
        }
    }

    #[async_trait]
    impl EntryTransport for FakeTransport {
        async fn post_entries(&self, entries: &[Entry]) -> Result<Vec<Entry>> {
            if self.fail_batch {
                return Err(TrackError::Unauthorized);
            }
            Ok(entries
                .iter()
                .filter(|e| !self.rejected_ids.iter().any(|r| r == &e.id))
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl SnapshotSource for FakeTransport {
        async fn fetch_status(&self) -> Result<ServerStatus> {
            Ok(ServerStatus {
                name: "fake".to_string(),
                version: "0.0.0".to_string(),
                api_enabled: true,
            })
        }

        async fn fetch_device_statuses(&self) -> Result<Vec<DeviceStatus>> {
            Ok(vec![])
        }

        async fn fetch_profiles(&self) -> Result<Vec<ProfileRecord>> {
            Ok(vec![])
        }

        async fn fetch_entries(&self) -> Result<Vec<Entry>> {
            Ok(vec![])
        }

        async fn fetch_treatments(&self) -> Result<Vec<Treatment>> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct Events {
        updated: Locked<Vec<HashSet<String>>>,
        update_rejected: Locked<Vec<HashSet<String>>>,
        uploaded: Locked<Vec<HashSet<String>>>,
        entry_rejected: Locked<Vec<HashSet<String>>>,
        failures: Locked<usize>,
        snapshots: Locked<usize>,
    }

    fn ids<T: Clone, F: Fn(&T) -> String>(set: &HashSet<T>, f: F) -> HashSet<String>
    where
        T: Eq + std::hash::Hash,
    {
        set.iter().map(f).collect()
    }

    impl TrackObserver for Events {
        fn treatments_updated(&self, treatments: &HashSet<Treatment>) {
            self.updated
                .modify(|v| v.push(ids(treatments, |t| t.id.clone())));
        }

        fn treatment_updates_rejected(&self, treatments: &HashSet<Treatment>) {
            self.update_rejected
                .modify(|v| v.push(ids(treatments, |t| t.id.clone())));
        }

        fn entries_uploaded(&self, entries: &HashSet<Entry>) {
            self.uploaded
                .modify(|v| v.push(ids(entries, |e| e.id.clone())));
        }

        fn entries_rejected(&self, entries: &HashSet<Entry>) {
            self.entry_rejected
                .modify(|v| v.push(ids(entries, |e| e.id.clone())));
        }

        fn snapshot_fetched(&self, _snapshot: &Snapshot) {
            self.snapshots.modify(|n| *n += 1);
        }

        fn operation_failed(&self, _error: &TrackError) {
            self.failures.modify(|n| *n += 1);
        }
    }

    fn treatment(id: &str) -> Treatment {
        Treatment {
            id: id.to_string(),
            event_type: "Temp Basal".to_string(),
            created_at: Utc::now(),
            insulin: None,
            carbs: None,
            notes: None,
        }
    }

    fn entry(id: &str) -> Entry {
        Entry {
            id: id.to_string(),
            date: Utc::now(),
            sgv: 120,
            direction: None,
            device: None,
        }
    }

    #[tokio::test]
    async fn update_treatments_partitions_and_notifies() {
        let client = TrackClient::new(FakeTransport::rejecting(&["T2"]));
        let observer = Arc::new(Events::default());
        client.subscribe(observer.clone() as Arc<dyn TrackObserver>);

        let result = client
            .update_treatments(vec![treatment("T1"), treatment("T2"), treatment("T3")])
            .await;

        let processed_ids: HashSet<String> = result.processed.iter().map(|t| t.id.clone()).collect();
        assert_eq!(
            processed_ids,
            HashSet::from(["T1".to_string(), "T3".to_string()])
        );
        assert_eq!(result.rejections.len(), 1);

        assert_eq!(
            observer.updated.get(),
            vec![HashSet::from(["T1".to_string(), "T3".to_string()])]
        );
        assert_eq!(
            observer.update_rejected.get(),
            vec![HashSet::from(["T2".to_string()])]
        );
        assert_eq!(observer.failures.get(), 0);
    }

    #[tokio::test]
    async fn delete_treatments_reaches_the_transport() {
        let client = TrackClient::new(FakeTransport::new());
        let result = client
            .delete_treatments(vec![treatment("T1"), treatment("T2")])
            .await;

        assert_eq!(result.processed.len(), 2);
        let mut deleted = client.transport.deleted.get();
        deleted.sort();
        assert_eq!(deleted, vec!["T1".to_string(), "T2".to_string()]);
    }

    #[tokio::test]
    async fn upload_entries_notifies_partition() {
        let client = TrackClient::new(FakeTransport::rejecting(&["e2"]));
        let observer = Arc::new(Events::default());
        client.subscribe(observer.clone() as Arc<dyn TrackObserver>);

        let response = client
            .upload_entries(vec![entry("e1"), entry("e2")])
            .await
            .unwrap();

        assert_eq!(response.uploaded.len(), 1);
        assert_eq!(response.rejected.len(), 1);
        assert_eq!(
            observer.uploaded.get(),
            vec![HashSet::from(["e1".to_string()])]
        );
        assert_eq!(
            observer.entry_rejected.get(),
            vec![HashSet::from(["e2".to_string()])]
        );
    }

    #[tokio::test]
    async fn batch_failure_fires_only_the_error_event() {
        let client = TrackClient::new(FakeTransport {
            fail_batch: true,
            ..FakeTransport::new()
        });
        let observer = Arc::new(Events::default());
        client.subscribe(observer.clone() as Arc<dyn TrackObserver>);

        let result = client.upload_entries(vec![entry("e1")]).await;

        assert!(matches!(result, Err(TrackError::Unauthorized)));
        assert_eq!(observer.failures.get(), 1);
        assert!(observer.uploaded.get().is_empty());
        assert!(observer.entry_rejected.get().is_empty());
    }

    #[tokio::test]
    async fn snapshot_success_notifies_observers() {
        let client = TrackClient::new(FakeTransport::new());
        let observer = Arc::new(Events::default());
        client.subscribe(observer.clone() as Arc<dyn TrackObserver>);

        let snap = client.fetch_snapshot().await.unwrap();
        assert_eq!(snap.status.name, "fake");
        assert_eq!(observer.snapshots.get(), 1);
    }

    #[tokio::test]
    async fn empty_update_completes_without_callbacks() {
        let client = TrackClient::new(FakeTransport::new());
        let observer = Arc::new(Events::default());
        client.subscribe(observer.clone() as Arc<dyn TrackObserver>);

        let result = client.update_treatments(Vec::new()).await;

        assert!(result.is_empty());
        assert!(observer.updated.get().is_empty());
        assert!(observer.update_rejected.get().is_empty());
    }
}
