//! Avatar Collector Core Library
//!
//! This library consumes a live status stream and downloads the avatar
//! image of each distinct posting user, bounded by a configured total
//! count, with a fixed cap on concurrent in-flight downloads.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`collector`] - Admission filter, shared state, and the coordinator
//! - [`download`] - Avatar fetch, format sniffing, and persistence
//! - [`stream`] - Sample-stream driver feeding events to the coordinator
//! - [`api`] - Remote service client for credential verification
//! - [`wizard`] - Interactive configuration and credential collection
//! - [`config`] - Validated run configuration
//! - [`event`] - Wire status records and the internal event model

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod collector;
pub mod config;
pub mod download;
pub mod event;
pub mod stream;
pub mod wizard;

// Re-export commonly used types
pub use api::{ApiClient, AuthError, Credentials, VerifiedUser};
pub use collector::{Admission, CollectorState, Coordinator, Decision, Flow, RejectReason, decide};
pub use config::{ConfigError, NamingMode, RunConfig};
pub use download::{AvatarClient, DownloadError, FETCH_TIMEOUT};
pub use event::{Event, Status};
pub use stream::{StreamDriver, StreamError};
pub use wizard::{Wizard, WizardError};
