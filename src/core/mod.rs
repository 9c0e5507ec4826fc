pub mod atomic;
pub mod batch;
pub mod coordinator;
pub mod snapshot;

pub use atomic::Locked;
