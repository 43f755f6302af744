// ABOUTME: Shared test utilities - signed launch fixtures and quiet logging setup
// ABOUTME: Builders produce requests signed exactly as a real consumer would sign them

#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]

//! Shared test utilities for `lti_tool_provider`.

use chrono::{DateTime, Utc};
use lti_tool_provider::oauth::signature;
use lti_tool_provider::oauth::LaunchRequest;
use std::collections::HashMap;
use std::sync::Once;

/// Consumer key used by launch fixtures.
pub const TEST_KEY: &str = "test";

/// Shared secret used by launch fixtures.
pub const TEST_SECRET: &str = "secret";

/// Launch URL used by launch fixtures.
pub const LAUNCH_URL: &str = "https://tool.example/assessment/start";

/// Fixed clock value fixtures sign against.
pub const NOW_SECS: i64 = 1_700_000_000;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process).
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .try_init();
    });
}

/// The fixed clock as a `DateTime<Utc>`.
pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(NOW_SECS, 0).unwrap()
}

/// A complete assignment-launch parameter set, unsigned.
pub fn launch_params(nonce: &str) -> HashMap<String, String> {
    [
        ("lti_message_type", "basic-lti-launch-request"),
        ("lti_version", "LTI-1p0"),
        ("resource_link_id", "link-1"),
        ("user_id", "user-7"),
        ("roles", "Learner"),
        ("context_id", "course-9"),
        ("lis_outcome_service_url", "https://lms.example/grade_passback"),
        ("lis_result_sourcedid", "sourced-55"),
        ("custom_fish_name", "wanda"),
        ("oauth_consumer_key", TEST_KEY),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_version", "1.0"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_owned(), value.to_owned()))
    .chain([
        ("oauth_nonce".to_owned(), nonce.to_owned()),
        ("oauth_timestamp".to_owned(), NOW_SECS.to_string()),
    ])
    .collect()
}

/// Sign a parameter set the way a consumer would and wrap it as a request.
pub fn signed_request(
    url: &str,
    mut params: HashMap<String, String>,
    secret: &str,
) -> LaunchRequest {
    let pairs: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let sig = signature::sign("POST", url, &pairs, secret).unwrap();
    params.insert("oauth_signature".to_owned(), sig);
    LaunchRequest::new("POST", url, params)
}

/// A fully signed assignment launch request.
pub fn signed_launch(nonce: &str) -> LaunchRequest {
    signed_request(LAUNCH_URL, launch_params(nonce), TEST_SECRET)
}
