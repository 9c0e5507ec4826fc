pub mod notify;
pub mod registry;

pub use notify::{TrackEvent, TrackObserver};
pub use registry::{ObserverHandle, ObserverRegistry};
