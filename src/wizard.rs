//! Interactive configuration and credential collection.
//!
//! Prompts are read from a generic [`BufRead`] so the whole flow is
//! unit-testable with an in-memory reader. EOF on any prompt means the
//! operator aborted the run; the binary maps that to exit code 1.

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{error, info};

use crate::api::{ApiClient, AuthError, Credentials, VerifiedUser};

/// Errors from the interactive prompt flow.
#[derive(Debug, Error)]
pub enum WizardError {
    /// Input ended (EOF) before a value was supplied.
    #[error("command aborted")]
    Aborted,

    /// Reading from the input source failed.
    #[error("input error: {source}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Line-oriented prompt wizard over an arbitrary input source.
#[derive(Debug)]
pub struct Wizard<R> {
    input: R,
}

impl<R: BufRead> Wizard<R> {
    /// Wraps an input source.
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Prompts for one value.
    ///
    /// Display varies with the default: `[Required]` (no default, empty
    /// input re-prompts), `(Optional)` (empty default, empty input
    /// accepted), or `(Default: x)` (empty input substitutes `x`).
    /// Values failing the validator re-prompt.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Aborted`] on EOF.
    pub fn prompt(
        &mut self,
        label: &str,
        default: Option<&str>,
        validator: impl Fn(&str) -> bool,
    ) -> Result<String, WizardError> {
        loop {
            match default {
                None => print!("{label} [Required] $ "),
                Some("") => print!("{label} (Optional) $ "),
                Some(value) => print!("{label} (Default: {value}) $ "),
            }
            let _ = io::stdout().flush();

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|source| WizardError::Io { source })?;
            if read == 0 {
                return Err(WizardError::Aborted);
            }

            let value = line.trim();
            if value.is_empty() {
                match default {
                    None => {
                        println!("This field cannot be empty.");
                        continue;
                    }
                    Some(default) => return Ok(default.to_string()),
                }
            }

            if !validator(value) {
                println!("Invalid input.");
                continue;
            }

            return Ok(value.to_string());
        }
    }

    /// Prompts for a yes/no answer, accepting `yes`/`no`/`y`/`n` in any
    /// case.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Aborted`] on EOF.
    pub fn yes_or_no(&mut self, label: &str, default: Option<bool>) -> Result<bool, WizardError> {
        let default_text = default.map(|value| if value { "yes" } else { "no" });
        let answer = self.prompt(&format!("{label} (yes or no)"), default_text, |value| {
            matches!(
                value.to_ascii_lowercase().as_str(),
                "yes" | "no" | "y" | "n"
            )
        })?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "yes" | "y"))
    }

    /// Prompts for the four service credentials.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Aborted`] on EOF.
    pub fn collect_credentials(&mut self) -> Result<Credentials, WizardError> {
        Ok(Credentials {
            consumer_key: self.prompt("Consumer Key (API Key)", None, |_| true)?,
            consumer_secret: self.prompt("Consumer Secret (API Secret)", None, |_| true)?,
            access_token: self.prompt("Access Token", None, |_| true)?,
            access_token_secret: self.prompt("Access Token Secret", None, |_| true)?,
        })
    }

    /// Full credential flow: prompt, verify against the service, and on
    /// rejection offer a retry with the same credentials (default yes)
    /// or a fresh prompt for all four.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Aborted`] when the operator aborts.
    pub async fn obtain_verified_credentials(
        &mut self,
        api: &ApiClient,
    ) -> Result<(Credentials, VerifiedUser), WizardError> {
        loop {
            let credentials = self.collect_credentials()?;
            match self.verify_with_retry(api, &credentials).await? {
                Some(user) => return Ok((credentials, user)),
                None => continue,
            }
        }
    }

    async fn verify_with_retry(
        &mut self,
        api: &ApiClient,
        credentials: &Credentials,
    ) -> Result<Option<VerifiedUser>, WizardError> {
        loop {
            info!("verifying credentials");
            match api.verify_credentials(credentials).await {
                Ok(user) => {
                    info!(
                        screen_name = %user.screen_name,
                        user_id = %user.id_str,
                        "logged in",
                    );
                    return Ok(Some(user));
                }
                Err(error @ (AuthError::Rejected { .. } | AuthError::Malformed { .. })) => {
                    error!(error = %error, "credential verification failed");
                }
                Err(error @ AuthError::Network { .. }) => {
                    error!(error = %error, "could not reach verification endpoint");
                }
            }
            if !self.yes_or_no("Retry with the same credential?", Some(true))? {
                return Ok(None);
            }
        }
    }
}

/// Validator: non-negative integer input.
#[must_use]
pub fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Validator: existing directory path.
#[must_use]
pub fn is_directory(value: &str) -> bool {
    std::path::Path::new(value).is_dir()
}
