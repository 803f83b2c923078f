//! Bucket health-check engine.
//!
//! Three layers: [`probe`] performs one HTTP round trip against a bucket's
//! health endpoint, [`aggregate`] turns the raw records into a grouped and
//! staleness-classified snapshot, and [`monitor`] drives the cancellable
//! polling loop that feeds a display sink.

pub mod aggregate;
pub mod monitor;
pub mod probe;

pub use aggregate::{
    aggregate, GroupedHealthRow, HealthSnapshot, NodeHealthRecord, NodeStatus, StalenessTier,
    TierThresholds,
};
pub use monitor::{CancelSignal, LiveMonitor, SnapshotSink};
pub use probe::{HealthProber, ProbeError, Sampler};
