//! CLI entry point for the avatar collector.

use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, error, info};

use avatar_collector::{
    ApiClient, AvatarClient, Coordinator, Credentials, NamingMode, RunConfig, StreamDriver, Wizard,
    wizard,
};

mod cli;

use cli::Args;

const BANNER: &str = r"
****************************************
*                                      *
*       Avatar Collector Wizard        *
*                                      *
****************************************
";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let mut wizard = Wizard::new(BufReader::new(io::stdin()));
    let scripted = args.scripted();

    if !scripted {
        println!("{BANNER}");
        println!("Please input Ctrl + C when you want to abort.\n");
    }

    let config = collect_config(&args, &mut wizard)?;
    let credentials = collect_credentials(&args, &mut wizard).await?;

    let coordinator = Arc::new(Coordinator::new(config, AvatarClient::new()));
    let driver = StreamDriver::new(&args.stream_url, credentials)?;

    info!(endpoint = %args.stream_url, "connecting to sample stream");

    loop {
        match driver.run(&coordinator).await {
            Ok(()) => break,
            Err(stream_error) => {
                error!(error = %stream_error, "stream connection lost");
                if !wizard.yes_or_no("Reconnect?", None)? {
                    bail!("reconnect declined");
                }
                // Dedup/limit state intentionally survives the
                // reconnect; the run resumes where it left off.
                info!("reconnecting to sample stream");
            }
        }
    }

    // Let in-flight downloads run to completion rather than cancelling.
    coordinator.drain().await;

    info!(saved = coordinator.saved_count(), "collection complete");
    Ok(())
}

/// Assembles the run configuration from flags, prompting for anything
/// missing.
fn collect_config(args: &Args, wizard: &mut Wizard<impl io::BufRead>) -> Result<RunConfig> {
    let language = match &args.language {
        Some(language) => language.clone(),
        None if args.scripted() => String::new(),
        None => wizard.prompt("Filtered Language (e.g. ja, en, fr, ...)", Some(""), |_| true)?,
    };

    let max = match args.max {
        Some(max) => max,
        None => wizard
            .prompt(
                "The number of downloaded files limit",
                None,
                wizard::is_digits,
            )?
            .parse()
            .context("download limit out of range")?,
    };

    let naming = if args.screen_name {
        NamingMode::ScreenName
    } else if args.scripted() {
        NamingMode::UserId
    } else if wizard.yes_or_no(
        "Use screen_name instead of user_id for saved filenames?",
        Some(false),
    )? {
        NamingMode::ScreenName
    } else {
        NamingMode::UserId
    };

    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => {
            let pictures = home_pictures_dir();
            let default = pictures.as_deref();
            PathBuf::from(wizard.prompt(
                "Directory which downloaded images saved into",
                default,
                wizard::is_directory,
            )?)
        }
    };

    Ok(RunConfig::new(max, Some(language), output_dir, naming)?)
}

/// Obtains verified credentials: from flags (verified once, fatal on
/// rejection) or through the wizard's prompt-verify-retry loop.
async fn collect_credentials(
    args: &Args,
    wizard: &mut Wizard<impl io::BufRead>,
) -> Result<Credentials> {
    let api = ApiClient::new(&args.api_base);

    if let Some(credentials) = args.credentials() {
        let user = api
            .verify_credentials(&credentials)
            .await
            .context("credential verification failed")?;
        info!(screen_name = %user.screen_name, user_id = %user.id_str, "logged in");
        return Ok(credentials);
    }

    let (credentials, _user) = wizard.obtain_verified_credentials(&api).await?;
    Ok(credentials)
}

/// The platform home Pictures directory, offered as the wizard default
/// when it exists.
fn home_pictures_dir() -> Option<String> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    let home = std::env::var_os(var)?;
    let dir = PathBuf::from(home).join("Pictures");
    dir.is_dir().then(|| dir.to_string_lossy().into_owned())
}
