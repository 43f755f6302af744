// ABOUTME: Allow-list redirect parameter forwarding for embedded tool redirect chains
// ABOUTME: Drops every key the tool did not ask for; an anti-injection boundary

//! Redirect sanitizer.
//!
//! Incoming parameters originate from a redirect chain the tool did not
//! fully control, so forwarding is allow-list only: `custom_*` keys plus
//! `launch_presentation_return_url` and `selection_directive`. Everything
//! else is dropped. Forwarded keys are sorted so one implementation
//! always renders the same URL for the same input.

use crate::constants::lti;
use crate::oauth::signature::percent_encode;
use std::collections::HashMap;

const FORWARDED_KEYS: &[&str] = &["launch_presentation_return_url", "selection_directive"];

/// Append the allow-listed subset of `incoming_params` to `base_url`,
/// percent-encoded, using `?` when the base has no query string and `&`
/// otherwise.
#[must_use]
pub fn build_redirect(base_url: &str, incoming_params: &HashMap<String, String>) -> String {
    let mut forwarded: Vec<(&str, &str)> = incoming_params
        .iter()
        .filter(|(key, _)| is_forwardable(key))
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    if forwarded.is_empty() {
        return base_url.to_owned();
    }
    forwarded.sort_unstable();

    let query = forwarded
        .iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}{query}")
}

fn is_forwardable(key: &str) -> bool {
    key.starts_with(lti::CUSTOM_PREFIX) || FORWARDED_KEYS.contains(&key)
}
