// ABOUTME: Outcomes service client - validates, signs, sends, and interprets grade passback
// ABOUTME: Pre-flight rejections never touch the network; exchange failures stay distinguishable

//! The outcomes client.
//!
//! One exchange per call: build the POX envelope, sign it with the
//! consumer credential (body hash included), POST it to the launch's
//! outcomes endpoint, and interpret the response envelope. The client
//! defines no retry loop; callers that retry on a transport failure can
//! reuse the message identifier through the `*_with_message_id` variants
//! so the consumer sees one logical grade update.

use crate::config::{ConsumerCredential, OutcomeConfig};
use crate::constants::{oauth, pox as pox_consts};
use crate::errors::OutcomeError;
use crate::launch::LaunchContext;
use crate::oauth::signature;
use crate::outcomes::pox;
use crate::outcomes::transport::{HttpTransport, OutcomeTransport};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

/// Interpreted consumer verdict on an outcome exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// The consumer processed the operation.
    Success,
    /// The consumer reported a failure.
    Failure,
    /// The consumer does not support the operation.
    Unsupported,
}

/// Interpreted response to an outcome exchange.
#[derive(Debug, Clone)]
pub struct OutcomeResponse {
    /// Consumer verdict.
    pub status: OutcomeStatus,
    /// The raw code-major value the consumer sent.
    pub raw_code: String,
    /// Human-readable description from the consumer, when present.
    pub description: Option<String>,
    /// The message identifier the consumer echoed back, for correlation
    /// with the request.
    pub message_ref: Option<String>,
    /// Stored score reported by a read exchange, when the consumer has
    /// one recorded.
    pub score: Option<f64>,
}

impl OutcomeResponse {
    /// Whether the consumer processed the operation.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Builds, signs, sends, and interprets outcome exchanges.
pub struct OutcomesClient {
    transport: Arc<dyn OutcomeTransport>,
    config: OutcomeConfig,
}

impl OutcomesClient {
    /// Create a client over the production HTTP transport.
    #[must_use]
    pub fn new(config: OutcomeConfig) -> Self {
        Self {
            transport: Arc::new(HttpTransport::new(&config)),
            config,
        }
    }

    /// Create a client over a caller-supplied transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn OutcomeTransport>, config: OutcomeConfig) -> Self {
        Self { transport, config }
    }

    /// Generate a fresh message identifier, usable across retries of the
    /// same logical grade update.
    #[must_use]
    pub fn new_message_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Post a score in `[0.0, 1.0]` to the launch's gradebook entry.
    ///
    /// # Errors
    ///
    /// See [`Self::post_outcome_with_message_id`].
    pub async fn post_outcome(
        &self,
        context: &LaunchContext,
        score: f64,
        credential: &ConsumerCredential,
    ) -> Result<OutcomeResponse, OutcomeError> {
        self.post_outcome_with_message_id(context, score, credential, &Self::new_message_id())
            .await
    }

    /// Post a score, reusing a caller-supplied message identifier so a
    /// retried delivery stays one logical grade update.
    ///
    /// # Errors
    ///
    /// - [`OutcomeError::UnsupportedOperation`] when the launch carries no
    ///   outcomes endpoint; no network call is attempted.
    /// - [`OutcomeError::Validation`] when the score is outside
    ///   `[0.0, 1.0]`; no network call is attempted.
    /// - [`OutcomeError::Transport`] when no response was received.
    /// - [`OutcomeError::Protocol`] when the consumer's response was not
    ///   an intelligible outcome envelope.
    pub async fn post_outcome_with_message_id(
        &self,
        context: &LaunchContext,
        score: f64,
        credential: &ConsumerCredential,
        message_id: &str,
    ) -> Result<OutcomeResponse, OutcomeError> {
        if !(0.0..=1.0).contains(&score) {
            return Err(OutcomeError::Validation(format!(
                "score {score} is outside [0.0, 1.0]"
            )));
        }
        let (service_url, sourced_id) = outcome_target(context)?;
        let envelope = pox::build_replace_result(message_id, sourced_id, &pox::format_score(score));

        let response = self
            .exchange(service_url, credential, envelope, message_id)
            .await?;
        match response.status {
            OutcomeStatus::Success => {
                info!(message_id, score, "outcome posted");
            }
            OutcomeStatus::Failure | OutcomeStatus::Unsupported => {
                warn!(
                    message_id,
                    code = %response.raw_code,
                    description = response.description.as_deref().unwrap_or(""),
                    "consumer did not accept the outcome"
                );
            }
        }
        Ok(response)
    }

    /// Read the score currently stored for the launch's gradebook entry.
    /// `score` on the response is `None` when the consumer has no score
    /// recorded.
    ///
    /// # Errors
    ///
    /// As [`Self::post_outcome_with_message_id`], minus score validation.
    pub async fn read_outcome(
        &self,
        context: &LaunchContext,
        credential: &ConsumerCredential,
    ) -> Result<OutcomeResponse, OutcomeError> {
        self.read_outcome_with_message_id(context, credential, &Self::new_message_id())
            .await
    }

    /// Read the stored score, reusing a caller-supplied message
    /// identifier.
    ///
    /// # Errors
    ///
    /// As [`Self::post_outcome_with_message_id`], minus score validation.
    pub async fn read_outcome_with_message_id(
        &self,
        context: &LaunchContext,
        credential: &ConsumerCredential,
        message_id: &str,
    ) -> Result<OutcomeResponse, OutcomeError> {
        let (service_url, sourced_id) = outcome_target(context)?;
        let envelope = pox::build_read_result(message_id, sourced_id);
        self.exchange(service_url, credential, envelope, message_id)
            .await
    }

    /// Delete the score stored for the launch's gradebook entry.
    ///
    /// # Errors
    ///
    /// As [`Self::post_outcome_with_message_id`], minus score validation.
    pub async fn delete_outcome(
        &self,
        context: &LaunchContext,
        credential: &ConsumerCredential,
    ) -> Result<OutcomeResponse, OutcomeError> {
        self.delete_outcome_with_message_id(context, credential, &Self::new_message_id())
            .await
    }

    /// Delete the stored score, reusing a caller-supplied message
    /// identifier.
    ///
    /// # Errors
    ///
    /// As [`Self::post_outcome_with_message_id`], minus score validation.
    pub async fn delete_outcome_with_message_id(
        &self,
        context: &LaunchContext,
        credential: &ConsumerCredential,
        message_id: &str,
    ) -> Result<OutcomeResponse, OutcomeError> {
        let (service_url, sourced_id) = outcome_target(context)?;
        let envelope = pox::build_delete_result(message_id, sourced_id);
        self.exchange(service_url, credential, envelope, message_id)
            .await
    }

    /// Sign and send one envelope, then interpret the response.
    async fn exchange(
        &self,
        service_url: &str,
        credential: &ConsumerCredential,
        envelope: String,
        message_id: &str,
    ) -> Result<OutcomeResponse, OutcomeError> {
        let body = envelope.into_bytes();

        let mut oauth_params: Vec<(String, String)> = vec![
            (oauth::CONSUMER_KEY_PARAM.to_owned(), credential.key.clone()),
            (
                oauth::NONCE_PARAM.to_owned(),
                Uuid::new_v4().simple().to_string(),
            ),
            (
                oauth::TIMESTAMP_PARAM.to_owned(),
                Utc::now().timestamp().to_string(),
            ),
            (
                oauth::SIGNATURE_METHOD_PARAM.to_owned(),
                oauth::SIGNATURE_METHOD.to_owned(),
            ),
            (oauth::VERSION_PARAM.to_owned(), oauth::VERSION.to_owned()),
            (
                oauth::BODY_HASH_PARAM.to_owned(),
                signature::body_hash(&body),
            ),
        ];

        // Query parameters on the consumer-supplied endpoint are part of
        // the signed set.
        let mut signed_set = oauth_params.clone();
        if let Ok(parsed) = Url::parse(service_url) {
            signed_set.extend(
                parsed
                    .query_pairs()
                    .map(|(key, value)| (key.into_owned(), value.into_owned())),
            );
        }
        let sig = signature::sign("POST", service_url, &signed_set, credential.secret())
            .map_err(|err| OutcomeError::Validation(err.to_string()))?;
        oauth_params.push((oauth::SIGNATURE_PARAM.to_owned(), sig));

        let headers = vec![
            (
                "Authorization".to_owned(),
                signature::authorization_header(&oauth_params),
            ),
            ("Content-Type".to_owned(), "application/xml".to_owned()),
        ];

        debug!(message_id, url = %service_url, "sending outcome exchange");
        let response = self
            .transport
            .post(service_url, &headers, &body, self.config.request_timeout)
            .await?;

        if !(200..300).contains(&response.status) {
            return Err(OutcomeError::Protocol(format!(
                "consumer answered with HTTP {}",
                response.status
            )));
        }

        let parsed = pox::parse_response(&response.body)?;
        let status = match parsed.code_major.as_str() {
            pox_consts::CODE_MAJOR_SUCCESS => OutcomeStatus::Success,
            pox_consts::CODE_MAJOR_UNSUPPORTED => OutcomeStatus::Unsupported,
            _ => OutcomeStatus::Failure,
        };

        Ok(OutcomeResponse {
            status,
            raw_code: parsed.code_major,
            description: parsed.description,
            message_ref: parsed.message_ref,
            score: parsed.score_text.as_deref().and_then(|raw| raw.parse().ok()),
        })
    }
}

fn outcome_target(context: &LaunchContext) -> Result<(&str, &str), OutcomeError> {
    match (&context.outcome_service_url, &context.result_sourced_id) {
        (Some(url), Some(sourced_id)) => Ok((url, sourced_id)),
        _ => Err(OutcomeError::UnsupportedOperation),
    }
}
