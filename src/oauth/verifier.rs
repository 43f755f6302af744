// ABOUTME: Inbound launch verification - credential lookup, freshness, signature, replay
// ABOUTME: Any failure is terminal for the request; no partial trust is granted

//! Inbound request verification.
//!
//! [`LaunchVerifier`] authenticates one launch request at a time:
//! credential lookup by consumer key, timestamp freshness against the
//! caller-supplied clock, HMAC-SHA1 signature recomputation compared in
//! constant time, and atomic nonce recording. The nonce is recorded only
//! after the signature verifies, so unauthenticated traffic cannot poison
//! the replay cache.

use crate::config::{CredentialStore, VerifierConfig};
use crate::constants::oauth;
use crate::errors::VerifyError;
use crate::oauth::nonce::NonceCache;
use crate::oauth::signature;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

/// One inbound launch request: method, full URL, and the decoded form
/// parameters (OAuth fields included). Consumed by verification and
/// discarded.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    method: String,
    url: String,
    params: HashMap<String, String>,
}

impl LaunchRequest {
    /// Wrap a decoded inbound request.
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        params: HashMap<String, String>,
    ) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            params,
        }
    }

    /// HTTP method of the request.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Full request URL as the consumer addressed it.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The complete parameter mapping.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Look up a single parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Verifies inbound launch requests against a credential store.
pub struct LaunchVerifier {
    credentials: Arc<CredentialStore>,
    nonces: NonceCache,
    tolerance_secs: i64,
}

impl LaunchVerifier {
    /// Create a verifier over a credential store with the given settings.
    #[must_use]
    pub fn new(credentials: Arc<CredentialStore>, config: &VerifierConfig) -> Self {
        Self {
            nonces: NonceCache::new(
                config.timestamp_tolerance,
                config.nonce_cleanup_threshold,
            ),
            tolerance_secs: i64::try_from(config.timestamp_tolerance.as_secs())
                .unwrap_or(i64::MAX),
            credentials,
        }
    }

    /// Authenticate one launch request against the clock value `now`.
    ///
    /// # Errors
    ///
    /// - [`VerifyError::UnknownConsumer`] when the consumer key resolves to
    ///   no credential.
    /// - [`VerifyError::ExpiredTimestamp`] when `oauth_timestamp` is
    ///   outside the freshness window.
    /// - [`VerifyError::InvalidSignature`] when required OAuth fields are
    ///   missing or malformed, the signature method is unsupported, or the
    ///   recomputed signature differs from the provided one.
    /// - [`VerifyError::ReplayDetected`] when the (consumer key, nonce)
    ///   pair was already accepted inside the window.
    pub fn verify(&self, request: &LaunchRequest, now: DateTime<Utc>) -> Result<(), VerifyError> {
        let consumer_key = request
            .param(oauth::CONSUMER_KEY_PARAM)
            .ok_or_else(|| missing(oauth::CONSUMER_KEY_PARAM))?;

        let Some(credential) = self.credentials.lookup(consumer_key) else {
            warn!(consumer_key = %consumer_key, "launch from unknown consumer rejected");
            return Err(VerifyError::UnknownConsumer(consumer_key.to_owned()));
        };

        match request.param(oauth::SIGNATURE_METHOD_PARAM) {
            Some(oauth::SIGNATURE_METHOD) => {}
            Some(other) => {
                return Err(VerifyError::InvalidSignature(format!(
                    "unsupported signature method: {other}"
                )))
            }
            None => return Err(missing(oauth::SIGNATURE_METHOD_PARAM)),
        }

        let timestamp: i64 = request
            .param(oauth::TIMESTAMP_PARAM)
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| missing(oauth::TIMESTAMP_PARAM))?;
        let age_secs = (now.timestamp() - timestamp).abs();
        if age_secs > self.tolerance_secs {
            warn!(
                consumer_key = %consumer_key,
                age_secs,
                "launch timestamp outside freshness window"
            );
            return Err(VerifyError::ExpiredTimestamp { age_secs });
        }

        let nonce = request
            .param(oauth::NONCE_PARAM)
            .ok_or_else(|| missing(oauth::NONCE_PARAM))?;
        let provided = request
            .param(oauth::SIGNATURE_PARAM)
            .ok_or_else(|| missing(oauth::SIGNATURE_PARAM))?;

        let pairs: Vec<(String, String)> = request
            .params
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let expected = signature::sign(
            request.method(),
            request.url(),
            &pairs,
            credential.secret(),
        )
        .map_err(|err| VerifyError::InvalidSignature(err.to_string()))?;

        let signatures_match: bool = expected
            .as_bytes()
            .ct_eq(provided.as_bytes())
            .into();
        if !signatures_match {
            warn!(consumer_key = %consumer_key, "launch signature mismatch");
            return Err(VerifyError::InvalidSignature("signature mismatch".into()));
        }

        if !self
            .nonces
            .check_and_record(consumer_key, nonce, timestamp, now.timestamp())
        {
            warn!(consumer_key = %consumer_key, "replayed launch nonce rejected");
            return Err(VerifyError::ReplayDetected);
        }

        debug!(consumer_key = %consumer_key, "launch request verified");
        Ok(())
    }

    /// The verifier's replay cache, exposed for periodic sweeps by the
    /// hosting layer.
    #[must_use]
    pub fn nonce_cache(&self) -> &NonceCache {
        &self.nonces
    }
}

fn missing(param: &str) -> VerifyError {
    VerifyError::InvalidSignature(format!("missing or malformed {param}"))
}
