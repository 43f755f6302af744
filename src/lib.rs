// ABOUTME: Main library entry point for the LTI tool provider core
// ABOUTME: Signed launch verification, outcomes grade passback, and redirect sanitizing

#![deny(unsafe_code)]

//! # LTI Tool Provider Core
//!
//! Protocol logic for an LTI 1.x tool provider: a Learning Management
//! System (the tool consumer) launches this tool with an OAuth1-signed
//! request, and — for assignment launches — the tool later reports a
//! score back through the consumer's outcomes service.
//!
//! The crate owns the protocol layer only. The hosting web layer supplies
//! routing, session storage, and rendering, and drives these operations:
//!
//! - **Verify**: [`oauth::LaunchVerifier`] authenticates an inbound
//!   launch (signature, freshness, replay, known consumer).
//! - **Parse**: [`launch::parse_launch`] turns the verified parameters
//!   into a typed [`launch::LaunchContext`].
//! - **Hold**: [`launch::LaunchSession`] carries the context across the
//!   start → take assessment → submit flow.
//! - **Report**: [`outcomes::OutcomesClient`] posts (or reads, or
//!   deletes) the grade over a signed POX exchange.
//! - **Forward**: [`redirect::build_redirect`] passes an allow-listed
//!   parameter subset to a content URL.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use lti_tool_provider::config::{ConsumerCredential, CredentialStore, VerifierConfig};
//! use lti_tool_provider::launch::parse_launch;
//! use lti_tool_provider::oauth::{LaunchRequest, LaunchVerifier};
//!
//! # fn handle(params: HashMap<String, String>) -> anyhow::Result<()> {
//! let store = Arc::new(
//!     CredentialStore::new().with_credential(ConsumerCredential::new("test", "secret")),
//! );
//! let verifier = LaunchVerifier::new(store, &VerifierConfig::default());
//!
//! let request = LaunchRequest::new("POST", "https://tool.example/assessment/start", params);
//! verifier.verify(&request, chrono::Utc::now())?;
//! let context = parse_launch(request.params())?;
//! println!("launched resource {}", context.resource_link_id);
//! # Ok(())
//! # }
//! ```

/// Consumer credentials and tunable settings
pub mod config;

/// Protocol constants grouped by domain
pub mod constants;

/// Error taxonomy for every operation
pub mod errors;

/// Launch parsing and the per-user session
pub mod launch;

/// Logging configuration and subscriber setup
pub mod logging;

/// OAuth1 signing, verification, and replay protection
pub mod oauth;

/// Outcomes service client and transport
pub mod outcomes;

/// Allow-list redirect parameter forwarding
pub mod redirect;

pub use config::{ConsumerCredential, CredentialStore, OutcomeConfig, VerifierConfig};
pub use errors::{
    LaunchError, OutcomeError, SessionError, SignatureError, VerifyError,
};
pub use launch::{parse_launch, LaunchContext, LaunchSession, SessionState};
pub use oauth::{LaunchRequest, LaunchVerifier, NonceCache};
pub use outcomes::{
    HttpTransport, OutcomeResponse, OutcomeStatus, OutcomeTransport, OutcomesClient,
    TransportResponse,
};
pub use redirect::build_redirect;
