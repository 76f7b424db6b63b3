//! Avatar download: fetch, format sniffing, and persistence.
//!
//! One download task performs a single bounded-timeout GET of the
//! avatar URL, sniffs the payload to confirm it is an image, derives
//! the file extension from the sniffed format, and writes the payload
//! to the output directory. Tasks never retry; a failure releases the
//! user key back to eligibility.

mod error;
mod task;

pub use error::DownloadError;
pub use task::{AvatarClient, FETCH_TIMEOUT, image_extension, save_avatar};
