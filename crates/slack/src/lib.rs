//! # slack
//!
//! Blocking client for the Slack Web API methods that manage users and
//! usergroups.
//!
//! This crate provides:
//! - Cursor-paginated `users.list`
//! - `usergroups.list`, `create`, `enable`, `disable`, `update` and
//!   `users.update`
//! - Error categories with operator advice
//! - A [`reconcile::RemoteClient`] implementation, so a [`SlackClient`] can
//!   drive a reconciliation run directly
//!
//! ## Example
//!
//! ```no_run
//! use reconcile::{ExecuteOptions, NoReport, reconcile};
//! use slack::SlackClient;
//!
//! let client = SlackClient::new(std::env::var("SLACK_TOKEN").unwrap()).unwrap();
//! let report = reconcile(&client, &[], ExecuteOptions::dry_run(), &mut NoReport).unwrap();
//! println!("{} actions planned", report.plan.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod types;

pub use client::{DEFAULT_API_BASE, SlackClient};
pub use error::{Error, ErrorCategory, Result};
