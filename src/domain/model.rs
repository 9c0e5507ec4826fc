use crate::utils::error::TrackError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// Equality and hashing by the server-side identity key only. Two record
/// values with the same id are the same record for set membership, field
/// differences notwithstanding.
macro_rules! identity_eq {
    ($type:ty) => {
        impl PartialEq for $type {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $type {}

        impl Hash for $type {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
    };
}

/// A glucose measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "dateString")]
    pub date: DateTime<Utc>,
    /// Sensor glucose value in mg/dL.
    pub sgv: i32,
    pub direction: Option<String>,
    pub device: Option<String>,
}

identity_eq!(Entry);

/// A care event: bolus, carb correction, site change and the like.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treatment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "eventType")]
    pub event_type: String,
    pub created_at: DateTime<Utc>,
    pub insulin: Option<f64>,
    pub carbs: Option<f64>,
    pub notes: Option<String>,
}

identity_eq!(Treatment);

/// A therapy profile configuration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "defaultProfile")]
    pub default_profile: String,
    #[serde(rename = "startDate")]
    pub start_date: DateTime<Utc>,
    pub units: String,
}

identity_eq!(ProfileRecord);

/// A status report from an uploader device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStatus {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub device: String,
    pub battery: Option<i32>,
}

identity_eq!(DeviceStatus);

/// The remote service's own status document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub name: String,
    pub version: String,
    #[serde(rename = "apiEnabled")]
    pub api_enabled: bool,
}

/// One failed per-item operation. Compared and hashed by item identity
/// only, so a rejection set can never hold duplicate items.
#[derive(Debug)]
pub struct Rejection<T> {
    pub item: T,
    pub error: TrackError,
}

impl<T> Rejection<T> {
    pub fn new(item: T, error: TrackError) -> Self {
        Self { item, error }
    }
}

impl<T: PartialEq> PartialEq for Rejection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.item == other.item
    }
}

impl<T: Eq> Eq for Rejection<T> {}

impl<T: Hash> Hash for Rejection<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.item.hash(state);
    }
}

/// Aggregate of one coordinator run. `processed` and the items inside
/// `rejections` partition the input set: disjoint, jointly exhaustive.
#[derive(Debug)]
pub struct OperationResult<T: Eq + Hash> {
    pub processed: HashSet<T>,
    pub rejections: HashSet<Rejection<T>>,
}

impl<T: Eq + Hash> OperationResult<T> {
    pub fn empty() -> Self {
        Self {
            processed: HashSet::new(),
            rejections: HashSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty() && self.rejections.is_empty()
    }
}

impl<T: Eq + Hash + Clone> OperationResult<T> {
    pub fn rejected_items(&self) -> HashSet<T> {
        self.rejections.iter().map(|r| r.item.clone()).collect()
    }
}

/// Aggregate of one batch submission. The batch endpoint reports only
/// acceptance, so rejected items carry no per-item error.
#[derive(Debug)]
pub struct PostResponse<T: Eq + Hash> {
    pub uploaded: HashSet<T>,
    pub rejected: HashSet<T>,
}

/// Composite of the five independently fetched sub-results, stamped with
/// the time the snapshot call started.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub status: ServerStatus,
    pub device_statuses: Vec<DeviceStatus>,
    pub profiles: Vec<ProfileRecord>,
    pub entries: Vec<Entry>,
    pub treatments: Vec<Treatment>,
}
