pub mod adapters;
pub mod client;
pub mod config;
pub mod core;
pub mod domain;
pub mod observer;
pub mod utils;

pub use adapters::HttpTransport;
pub use client::TrackClient;
pub use config::ClientConfig;
pub use domain::model::{
    DeviceStatus, Entry, OperationResult, PostResponse, ProfileRecord, Rejection, ServerStatus,
    Snapshot, Treatment,
};
pub use domain::ports::{EntryTransport, RecordTransport, SnapshotSource};
pub use observer::{ObserverHandle, ObserverRegistry, TrackEvent, TrackObserver};
pub use utils::error::{Result, TrackError};
