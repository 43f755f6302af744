// ABOUTME: OAuth1 request canonicalization, HMAC-SHA1 signing, and body hashing
// ABOUTME: Shared by inbound launch verification and outbound outcome posting

//! Request canonicalization and signing.
//!
//! The base string is `METHOD & encoded-url & encoded-sorted-params` with
//! RFC 3986 percent-encoding (uppercase hex, unreserved characters
//! untouched). The signing key is the percent-encoded consumer secret
//! followed by `&`; there is no token secret in this flow. Outbound
//! requests that carry a body also sign `oauth_body_hash`, the base64
//! SHA-1 of the exact body bytes.

use crate::constants::oauth;
use crate::errors::SignatureError;
use base64::{engine::general_purpose, Engine as _};
use ring::{digest, hmac};
use std::borrow::Cow;
use url::Url;

/// Percent-encode a value per RFC 3986: uppercase hex, `A-Za-z0-9-._~`
/// left untouched.
#[must_use]
pub fn percent_encode(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Normalize a request URL for the base string: lowercase scheme and host,
/// default ports dropped, query and fragment excluded.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidUrl`] when the URL cannot be parsed or
/// has no host.
pub fn normalize_url(raw: &str) -> Result<String, SignatureError> {
    let parsed =
        Url::parse(raw).map_err(|err| SignatureError::InvalidUrl(format!("{raw}: {err}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| SignatureError::InvalidUrl(format!("{raw}: no host")))?;
    // Url reports the port only when it differs from the scheme default.
    match parsed.port() {
        Some(port) => Ok(format!("{}://{host}:{port}{}", parsed.scheme(), parsed.path())),
        None => Ok(format!("{}://{host}{}", parsed.scheme(), parsed.path())),
    }
}

/// Build the signature base string over every parameter except
/// `oauth_signature`, sorted lexicographically by encoded key then
/// encoded value.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidUrl`] when the request URL cannot be
/// normalized.
pub fn signature_base_string(
    method: &str,
    url: &str,
    params: &[(String, String)],
) -> Result<String, SignatureError> {
    let normalized_url = normalize_url(url)?;
    let mut encoded: Vec<(Cow<'_, str>, Cow<'_, str>)> = params
        .iter()
        .filter(|(key, _)| key != oauth::SIGNATURE_PARAM)
        .map(|(key, value)| (percent_encode(key), percent_encode(value)))
        .collect();
    encoded.sort();
    let normalized_params = encoded
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    Ok(format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(&normalized_url),
        percent_encode(&normalized_params)
    ))
}

/// Sign a request, returning the base64 HMAC-SHA1 signature.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidUrl`] when the request URL cannot be
/// normalized.
pub fn sign(
    method: &str,
    url: &str,
    params: &[(String, String)],
    consumer_secret: &str,
) -> Result<String, SignatureError> {
    let base_string = signature_base_string(method, url, params)?;
    let key_material = format!("{}&", percent_encode(consumer_secret));
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, key_material.as_bytes());
    let tag = hmac::sign(&key, base_string.as_bytes());
    Ok(general_purpose::STANDARD.encode(tag.as_ref()))
}

/// Base64 SHA-1 of the exact body bytes, for the `oauth_body_hash`
/// parameter.
#[must_use]
pub fn body_hash(body: &[u8]) -> String {
    let digest = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, body);
    general_purpose::STANDARD.encode(digest.as_ref())
}

/// Assemble an `Authorization: OAuth ...` header value from signed
/// parameters, percent-encoded and sorted for a deterministic rendering.
#[must_use]
pub fn authorization_header(params: &[(String, String)]) -> String {
    let mut parts: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", percent_encode(key), percent_encode(value)))
        .collect();
    parts.sort();
    format!("OAuth {}", parts.join(", "))
}
