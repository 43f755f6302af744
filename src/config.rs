// ABOUTME: Consumer credential store and tunable settings for verification and outcome posting
// ABOUTME: Credentials are looked up per request; there is no ambient shared secret

//! Configuration types.
//!
//! Every operation that needs a shared secret receives a
//! [`ConsumerCredential`] resolved through the read-only
//! [`CredentialStore`]; nothing in the crate reads a process-wide secret.
//! Tolerances and timeouts are explicit values with environment overrides,
//! never library-internal defaults.

use crate::constants::defaults;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

/// Shared-secret credential for one tool consumer.
#[derive(Clone)]
pub struct ConsumerCredential {
    /// Consumer key presented as `oauth_consumer_key` on launches.
    pub key: String,
    secret: String,
}

impl ConsumerCredential {
    /// Create a credential from a key and shared secret.
    #[must_use]
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// The shared secret used for signing and verification.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// SHA-256 fingerprint of the secret (first 8 hex chars), for
    /// diagnostics that must not reveal the secret itself.
    #[must_use]
    pub fn secret_fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        let digest = hasher.finalize();
        format!("{digest:x}").chars().take(8).collect()
    }
}

impl fmt::Debug for ConsumerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerCredential")
            .field("key", &self.key)
            .field("secret", &format_args!("<{}>", self.secret_fingerprint()))
            .finish()
    }
}

/// Read-only lookup table from consumer key to credential.
///
/// Built once at startup and shared by reference; lookups never mutate it.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    credentials: HashMap<String, ConsumerCredential>,
}

impl CredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a single-consumer store from `LTI_CONSUMER_KEY` /
    /// `LTI_CONSUMER_SECRET`. Returns an empty store when either variable
    /// is unset.
    #[must_use]
    pub fn from_env() -> Self {
        let mut store = Self::new();
        if let (Ok(key), Ok(secret)) = (env::var("LTI_CONSUMER_KEY"), env::var("LTI_CONSUMER_SECRET"))
        {
            store.insert(ConsumerCredential::new(key, secret));
        }
        store
    }

    /// Register a credential, replacing any existing one under the same key.
    pub fn insert(&mut self, credential: ConsumerCredential) {
        self.credentials.insert(credential.key.clone(), credential);
    }

    /// Builder-style registration.
    #[must_use]
    pub fn with_credential(mut self, credential: ConsumerCredential) -> Self {
        self.insert(credential);
        self
    }

    /// Resolve a consumer key to its credential.
    #[must_use]
    pub fn lookup(&self, consumer_key: &str) -> Option<&ConsumerCredential> {
        self.credentials.get(consumer_key)
    }

    /// Number of registered consumers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Whether the store holds no credentials.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Log per-consumer diagnostics and report whether the store is usable.
    /// Secrets are only ever logged as fingerprints.
    pub fn validate_and_log(&self) -> bool {
        if self.credentials.is_empty() {
            warn!("credential store is empty; every launch will be rejected as unknown");
            return false;
        }
        let mut usable = true;
        for credential in self.credentials.values() {
            if credential.secret.is_empty() {
                warn!(consumer_key = %credential.key, "consumer has an empty shared secret");
                usable = false;
            } else {
                info!(
                    consumer_key = %credential.key,
                    secret_fingerprint = %credential.secret_fingerprint(),
                    "consumer credential registered"
                );
            }
        }
        usable
    }
}

/// Settings for inbound launch verification.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Accepted distance between `oauth_timestamp` and the verifier clock.
    pub timestamp_tolerance: Duration,
    /// Nonce cache size above which stale entries are swept.
    pub nonce_cleanup_threshold: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            timestamp_tolerance: Duration::from_secs(defaults::TIMESTAMP_TOLERANCE_SECS),
            nonce_cleanup_threshold: defaults::NONCE_CLEANUP_THRESHOLD,
        }
    }
}

impl VerifierConfig {
    /// Load settings from the environment
    /// (`LTI_TIMESTAMP_TOLERANCE_SECS`), falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(secs) = env_u64("LTI_TIMESTAMP_TOLERANCE_SECS") {
            config.timestamp_tolerance = Duration::from_secs(secs);
        }
        config
    }

    /// Builder-style tolerance override.
    #[must_use]
    pub const fn with_timestamp_tolerance(mut self, tolerance: Duration) -> Self {
        self.timestamp_tolerance = tolerance;
        self
    }
}

/// Settings for the outcomes service client.
#[derive(Debug, Clone)]
pub struct OutcomeConfig {
    /// Bound on one complete outcome exchange.
    pub request_timeout: Duration,
    /// Bound on establishing the connection.
    pub connect_timeout: Duration,
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(defaults::OUTCOME_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS),
        }
    }
}

impl OutcomeConfig {
    /// Load settings from the environment (`LTI_OUTCOME_TIMEOUT_SECS`,
    /// `LTI_OUTCOME_CONNECT_TIMEOUT_SECS`), falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(secs) = env_u64("LTI_OUTCOME_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("LTI_OUTCOME_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout = Duration::from_secs(secs);
        }
        config
    }

    /// Builder-style request timeout override.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|value| value.parse().ok())
}
