//! Stream-driven bounded concurrent download coordination.
//!
//! The coordinator owns the per-run dedup and limit state, evaluates
//! the admission filter for every incoming event, spawns download tasks
//! for admitted events, and decides when the stream should stop.
//!
//! # Concurrency model
//!
//! - Events are admitted strictly one at a time by the stream driver
//! - Each admitted event runs in its own Tokio task
//! - All state mutation (admission and completion callbacks) happens
//!   inside a single mutex-guarded critical section
//! - Download tasks never touch the state directly, only through the
//!   coordinator's completion callbacks

mod admission;
mod coordinator;
mod state;

pub use admission::{Decision, RejectReason, decide};
pub use coordinator::{Admission, Coordinator, Flow};
pub use state::CollectorState;
