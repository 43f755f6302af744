// ABOUTME: OAuth1 module organizing request signing, verification, and replay protection
// ABOUTME: Single-legged HMAC-SHA1 flow; no token exchange or user delegation

//! # OAuth1 signing layer
//!
//! Implements the single-legged OAuth1 flow the LTI launch protocol uses:
//! a shared consumer secret signs every request with HMAC-SHA1 over a
//! canonical base string. The same canonicalization serves both inbound
//! verification ([`LaunchVerifier`]) and outbound signing (the outcomes
//! client). Replay protection lives in [`NonceCache`].

pub mod nonce;
pub mod signature;
pub mod verifier;

pub use nonce::NonceCache;
pub use verifier::{LaunchRequest, LaunchVerifier};
