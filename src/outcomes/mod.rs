// ABOUTME: Outcomes service module organizing envelope handling, transport, and the client
// ABOUTME: Grade passback to the consumer over signed POX exchanges

//! # Outcomes service
//!
//! Builds, signs, sends, and interprets grade-passback exchanges with the
//! tool consumer. [`OutcomesClient`] is the entry point; the
//! [`OutcomeTransport`] seam lets tests substitute a stub for the
//! production HTTP transport.

pub mod client;
pub mod pox;
pub mod transport;

pub use client::{OutcomeResponse, OutcomeStatus, OutcomesClient};
pub use transport::{HttpTransport, OutcomeTransport, TransportResponse};
