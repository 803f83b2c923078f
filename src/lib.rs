//! # stateless-cli
//!
//! Command-line client for the Stateless RPC gateway control plane, built
//! around the bucket health-check engine: a live multi-provider health
//! dashboard, the paged selection flow that feeds it, and the
//! cross-provider response-integrity check for attested RPC calls.
//!
//! ## Architecture
//!
//! - **[`health`]**: the engine - [`health::probe`] performs one HTTP probe
//!   against a bucket's health endpoint, [`health::aggregate`] groups the
//!   records by (provider, region) and classifies staleness against the best
//!   height in the sample, [`health::monitor`] drives the cancellable
//!   polling loop.
//! - **[`integrity`]**: verifies that independent providers answering the
//!   same attested RPC call agree on the response digest.
//! - **[`select`]**: UI-agnostic paged selection over any offset/limit
//!   collection, used to pick a bucket interactively.
//! - **[`api`]**: thin typed client for the control-plane REST API (API key
//!   header, pagination envelope, account-type guard).
//! - **[`ui`]**: ratatui live dashboard, plain-text tables, and the
//!   line-based prompter.
//!
//! ## Usage
//!
//! ```bash
//! # One-shot health check
//! stateless-cli buckets health https://api.stateless.solutions/ethereum/v1/<bucket>
//!
//! # Live dashboard, refreshed every 670ms
//! stateless-cli buckets health <url> --live
//! ```
//!
//! Without a URL argument the CLI pages through the caller's buckets
//! (requires `STATELESS_API_KEY`) and builds the health URL from the pick.

pub mod api;
pub mod config;
pub mod duration;
pub mod health;
pub mod integrity;
pub mod routes;
pub mod select;
pub mod ui;

pub use api::{ApiClient, BucketSummary};
pub use config::Settings;
pub use health::{
    aggregate, CancelSignal, HealthProber, HealthSnapshot, LiveMonitor, NodeHealthRecord,
    ProbeError, SnapshotSink, StalenessTier, TierThresholds,
};
pub use integrity::{check_attestations, Attestation, AttestedResponse, IntegrityError};
pub use select::{select_paged, Page, Prompter};
