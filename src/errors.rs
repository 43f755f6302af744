// ABOUTME: Error taxonomy for launch verification, parsing, sessions, and outcome posting
// ABOUTME: Every failure is a typed variant; nothing is reported through defaults or booleans

//! Error types for the tool provider core.
//!
//! Verification failures are terminal for the inbound request: the hosting
//! layer must reject the launch and create no context. Outcome errors split
//! into pre-flight rejections (`UnsupportedOperation`, `Validation` — no
//! network call was made) and exchange failures (`Transport`, `Protocol` —
//! the remote exchange was attempted but failed or was unintelligible).

use thiserror::Error;

/// Failure to authenticate an inbound launch request.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The computed signature does not match the provided one, or the
    /// request is missing the fields needed to compute it.
    #[error("request signature is invalid: {0}")]
    InvalidSignature(String),

    /// The (consumer key, nonce) pair was already accepted within the
    /// freshness window.
    #[error("nonce has already been used by this consumer")]
    ReplayDetected,

    /// The request timestamp lies outside the configured freshness window.
    #[error("request timestamp is {age_secs}s away from the verifier clock")]
    ExpiredTimestamp {
        /// Absolute distance between the request timestamp and the
        /// verifier's clock, in seconds.
        age_secs: i64,
    },

    /// No credential is registered for the presented consumer key.
    #[error("unknown consumer key: {0}")]
    UnknownConsumer(String),
}

/// Failure to build a signature for a request.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The request URL could not be parsed into a normalizable form.
    #[error("request URL could not be normalized: {0}")]
    InvalidUrl(String),
}

/// Failure to interpret a verified parameter set as a launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The message type or LTI version is not a supported launch.
    #[error("not a supported launch: {0}")]
    InvalidLaunch(String),

    /// The launch names no resource link.
    #[error("launch carries no resource link")]
    MissingContext,
}

/// Misuse of the launch session state machine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No launch has been verified for this session.
    #[error("no launch has been verified for this session")]
    NotLaunched,

    /// An outcome has already been submitted for the stored launch.
    #[error("an outcome was already submitted for this launch")]
    AlreadySubmitted,
}

/// Failure to post, read, or delete an outcome.
#[derive(Debug, Error)]
pub enum OutcomeError {
    /// The launch context does not support the outcomes service; no
    /// network call was attempted.
    #[error("launch does not support the outcomes service")]
    UnsupportedOperation,

    /// The request failed local validation; no network call was attempted.
    #[error("invalid outcome request: {0}")]
    Validation(String),

    /// The exchange could not be completed at the transport level
    /// (connection refused, timeout, TLS failure). The consumer may or
    /// may not have seen the request.
    #[error("outcome exchange failed in transit: {0}")]
    Transport(String),

    /// The consumer responded, but not with an intelligible outcome
    /// envelope.
    #[error("consumer returned an unintelligible outcome response: {0}")]
    Protocol(String),
}

impl OutcomeError {
    /// Whether a caller-level retry (reusing the same message identifier)
    /// is appropriate for this error. Pre-flight rejections never are;
    /// transport failures are. Protocol failures are left to caller
    /// judgment and report `false` here.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
