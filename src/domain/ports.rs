use crate::domain::model::{DeviceStatus, Entry, ProfileRecord, ServerStatus, Treatment};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Per-item operations against the treatments and profile endpoints.
/// One call per item; the coordinator fans these out.
#[async_trait]
pub trait RecordTransport: Send + Sync {
    async fn update_treatment(&self, treatment: &Treatment) -> Result<()>;
    async fn delete_treatment(&self, id: &str) -> Result<()>;
    async fn update_profile(&self, profile: &ProfileRecord) -> Result<()>;
}

/// Single-round-trip batch submission. The response lists the entries the
/// server accepted; anything missing from it was rejected.
#[async_trait]
pub trait EntryTransport: Send + Sync {
    async fn post_entries(&self, entries: &[Entry]) -> Result<Vec<Entry>>;
}

/// The five independent fetches a snapshot is assembled from.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_status(&self) -> Result<ServerStatus>;
    async fn fetch_device_statuses(&self) -> Result<Vec<DeviceStatus>>;
    async fn fetch_profiles(&self) -> Result<Vec<ProfileRecord>>;
    async fn fetch_entries(&self) -> Result<Vec<Entry>>;
    async fn fetch_treatments(&self) -> Result<Vec<Treatment>>;
}
