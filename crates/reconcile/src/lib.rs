//! # Reconcile
//!
//! Converges remote usergroups towards a declared set of groups.
//!
//! ## Core Concepts
//!
//! - **UserDirectory**: username to identifier lookups, fetched once per run
//! - **GroupSnapshot**: memoized remote groups with active and all views
//! - **Diff**: desired vs. remote comparison on normalized records
//! - **Planner**: enable, mutation and disable passes producing [`Action`]s
//! - **Executor**: issues remote calls, resolving members just before writes
//! - **Reconciler**: runs the passes in order, applying or only reporting
//!
//! ## Example
//!
//! ```
//! use reconcile::{
//!     BufferSink, Call, DesiredGroup, ExecuteOptions, MockClient, RemoteUser, reconcile,
//! };
//!
//! let client = MockClient::new()
//!     .with_users([RemoteUser::new("U1", "alice"), RemoteUser::new("U2", "bob")]);
//! let desired = vec![
//!     DesiredGroup::new("eng", "Engineers", "eng").with_users(["alice", "bob"]),
//! ];
//!
//! let mut sink = BufferSink::new();
//! let report = reconcile(&client, &desired, ExecuteOptions::default(), &mut sink).unwrap();
//!
//! assert_eq!(report.summary.created, 1);
//! assert!(matches!(client.mutations()[0], Call::CreateGroup(_)));
//! ```
//!
//! ## Remote Access
//!
//! All remote reads and writes go through [`RemoteClient`]. The HTTP
//! implementation lives outside this crate; [`MockClient`] keeps state in
//! memory for tests.

pub mod client;
pub mod context;
pub mod diff;
pub mod directory;
pub mod error;
pub mod executor;
pub mod planner;
pub mod reconciler;
pub mod report;
pub mod snapshot;
pub mod types;

// Re-export main types at crate root
pub use client::{Call, MockClient, RemoteClient};
pub use context::{BufferSink, NoReport, ReportSink};
pub use diff::{Classification, DiffSummary, GroupDiff, MembershipDelta, NormalizedRecord};
pub use directory::{Resolution, UserDirectory};
pub use error::{Error, Result};
pub use executor::{ActionOutcome, Executor};
pub use planner::{Action, ActionKind, ActionPlan, Planner};
pub use reconciler::{Reconciler, RunReport, reconcile};
pub use snapshot::{GroupSnapshot, SnapshotView};
pub use types::{
    ApplyResult, DesiredGroup, ExecuteOptions, ExecuteSummary, GroupUpdate, MembershipUpdate,
    NewGroup, RemoteGroup, RemoteUser, RunMode,
};
