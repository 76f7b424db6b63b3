//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use avatar_collector::Credentials;

/// Default base URL for the account API (credential verification).
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com/1.1";

/// Default sample-stream endpoint.
pub const DEFAULT_STREAM_URL: &str = "https://stream.twitter.com/1.1/statuses/sample.json";

/// Collect user avatar images from a live status stream.
///
/// Any value not supplied as a flag is collected interactively by the
/// wizard; a fully flagged invocation runs without prompts.
#[derive(Parser, Debug)]
#[command(name = "avatar-collector")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Only download avatars of users with this language (e.g. ja, en)
    #[arg(long)]
    pub language: Option<String>,

    /// Total number of avatars to download before stopping
    #[arg(short = 'n', long)]
    pub max: Option<usize>,

    /// Name saved files by screen name instead of numeric user id
    #[arg(long)]
    pub screen_name: bool,

    /// Directory downloaded images are saved into (must exist)
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Consumer key (API key)
    #[arg(long)]
    pub consumer_key: Option<String>,

    /// Consumer secret (API secret)
    #[arg(long)]
    pub consumer_secret: Option<String>,

    /// Access token
    #[arg(long)]
    pub access_token: Option<String>,

    /// Access token secret
    #[arg(long)]
    pub access_token_secret: Option<String>,

    /// Base URL of the account API
    #[arg(long, default_value = DEFAULT_API_BASE, hide = true)]
    pub api_base: String,

    /// Streaming endpoint URL
    #[arg(long, default_value = DEFAULT_STREAM_URL, hide = true)]
    pub stream_url: String,
}

impl Args {
    /// The credentials, when all four were supplied as flags.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            consumer_key: self.consumer_key.clone()?,
            consumer_secret: self.consumer_secret.clone()?,
            access_token: self.access_token.clone()?,
            access_token_secret: self.access_token_secret.clone()?,
        })
    }

    /// Whether everything the wizard would ask for was already given
    /// as flags, so no prompt is ever shown.
    #[must_use]
    pub fn scripted(&self) -> bool {
        self.max.is_some() && self.output_dir.is_some() && self.credentials().is_some()
    }
}
