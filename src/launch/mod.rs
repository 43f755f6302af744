// ABOUTME: Launch module organizing the typed launch context and the per-user session
// ABOUTME: Parsing is pure; the session guards the start-to-submit flow

//! # Launch handling
//!
//! [`parse_launch`] turns a verified parameter set into a typed, immutable
//! [`LaunchContext`]; [`LaunchSession`] holds that context across the
//! start → take assessment → submit flow and refuses duplicate grade
//! postings.

pub mod context;
pub mod session;

pub use context::{parse_launch, LaunchContext};
pub use session::{LaunchSession, SessionState};
