//! # Konband Core
//!
//! The deterministic assignment and analysis engine for Konband - THE LOGIC.
//!
//! Konband assigns members with per-role skill ratings to small bands,
//! detecting concurrency-policy violations across the proposed bands and
//! lineups that recreate a previously-seen band above a threshold.
//!
//! ## Architecture
//!
//! - [`roles`] - the fixed role catalog
//! - [`model`] - members, bands, and the application state
//! - [`policy`] - the clamped concurrency thresholds
//! - [`analysis`] - the pure conflict/collision engine
//! - [`report`] - the structured analysis output
//! - [`session`] - the single mutation point (closed command set)
//! - [`snapshot`] - the full-state export/import/replication bundle
//! - [`import`] - tab-separated roster import
//! - [`formats`] - binary persistence format (postcard + header)
//! - [`storage`] - redb-backed session store
//!
//! ## Constraints
//!
//! No async, no network, no floats, no randomness, no wall clock.
//! Keyed collections are `BTreeMap` so analysis output is deterministic
//! given identical inputs. The engine reads state by reference and never
//! fails; only the persistence edges return errors.

pub mod analysis;
pub mod error;
pub mod formats;
pub mod import;
pub mod model;
pub mod policy;
pub mod report;
pub mod roles;
pub mod session;
pub mod snapshot;
pub mod storage;

pub use analysis::analyze;
pub use error::{StoreError, StoreResult};
pub use import::ImportOutcome;
pub use model::{AppState, Band, BandId, BandMeta, Member, MemberId};
pub use policy::Policy;
pub use report::{BandMetrics, Collision, Conflict, ConflictReason, Report};
pub use roles::Role;
pub use session::{CommandError, Session, SwapOutcome};
pub use snapshot::Snapshot;
