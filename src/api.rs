//! Remote service client: credential verification.
//!
//! Credential checking happens once, before the stream is opened. The
//! base URL is injectable so tests can stand up a mock server.

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use thiserror::Error;

/// Errors from the credential verification call.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Transport-level failure reaching the verification endpoint.
    #[error("network error verifying credentials: {source}")]
    Network {
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The service rejected the supplied credentials.
    #[error("credentials rejected (HTTP {status})")]
    Rejected {
        /// The HTTP status code of the rejection.
        status: u16,
    },

    /// The verification response body could not be parsed.
    #[error("malformed verification response: {source}")]
    Malformed {
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },
}

/// The four opaque credentials the service expects.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl Credentials {
    /// Builds the `Authorization` header value carrying all four
    /// values. Request signing is the service collaborator's concern;
    /// the collector only transports the credentials.
    #[must_use]
    pub(crate) fn authorization_header(&self) -> String {
        format!(
            "OAuth oauth_consumer_key=\"{}\", oauth_token=\"{}\", oauth_signature=\"{}&{}\"",
            self.consumer_key, self.access_token, self.consumer_secret, self.access_token_secret
        )
    }
}

/// The authenticated user returned by a successful verification.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedUser {
    /// Handle of the authenticated account.
    pub screen_name: String,
    /// Stable numeric identifier as a string.
    pub id_str: String,
}

/// Thin typed client for the account API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    /// Creates a client against the given API base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    /// Verifies the credentials against the service.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] on a non-success response and
    /// [`AuthError::Network`] / [`AuthError::Malformed`] on transport
    /// or decode failure.
    pub async fn verify_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<VerifiedUser, AuthError> {
        let url = format!(
            "{}/account/verify_credentials.json",
            self.base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, credentials.authorization_header())
            .send()
            .await
            .map_err(|source| AuthError::Network { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
            });
        }

        response
            .json::<VerifiedUser>()
            .await
            .map_err(|source| AuthError::Malformed { source })
    }
}
