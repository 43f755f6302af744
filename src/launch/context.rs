// ABOUTME: Typed launch context parsed from a verified parameter set
// ABOUTME: Pure validation of message type, version, and resource link; no I/O

//! Launch parsing and the typed launch context.

use crate::constants::lti;
use crate::errors::LaunchError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Validated, immutable result of parsing a verified launch.
///
/// Built exactly once per successful launch and held by the session for
/// the duration of the user's assessment attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchContext {
    /// The launch message type (always the basic launch request).
    pub message_type: String,
    /// The LTI version the consumer spoke.
    pub lti_version: String,
    /// Identifier of the launched resource within the consumer.
    pub resource_link_id: String,
    /// Identifier of the launching user, when the consumer shared it.
    pub user_id: Option<String>,
    /// Role tokens asserted by the consumer.
    pub roles: BTreeSet<String>,
    /// Identifier of the course context, when present.
    pub context_id: Option<String>,
    /// Title of the course context, when present.
    pub context_title: Option<String>,
    /// Outcomes service endpoint, present only on assignment launches.
    pub outcome_service_url: Option<String>,
    /// Gradebook entry identifier, present only on assignment launches.
    pub result_sourced_id: Option<String>,
    /// Full name of the launching user, when the consumer shared it.
    pub person_name: Option<String>,
    /// Email of the launching user, when the consumer shared it.
    pub person_email: Option<String>,
    /// Consumer page to return the user to after the tool finishes.
    pub return_url: Option<String>,
    /// Tool-defined parameters, with the `custom_` prefix stripped.
    pub custom: BTreeMap<String, String>,
}

impl LaunchContext {
    /// Whether this launch can receive a grade: both the outcomes service
    /// URL and the result sourced id must be present.
    #[must_use]
    pub fn supports_outcomes(&self) -> bool {
        self.outcome_service_url.is_some() && self.result_sourced_id.is_some()
    }

    /// Case-insensitive role membership test. Consumer role URNs
    /// (`urn:lti:role:ims/lis/Learner`) match on their final segment.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|token| {
            let local = token.rsplit('/').next().unwrap_or(token);
            local.eq_ignore_ascii_case(role)
        })
    }

    /// Whether the launching user is a learner.
    #[must_use]
    pub fn is_student(&self) -> bool {
        lti::LEARNER_ROLES.iter().any(|role| self.has_role(role))
    }

    /// Whether the launching user is an instructor.
    #[must_use]
    pub fn is_instructor(&self) -> bool {
        lti::INSTRUCTOR_ROLES.iter().any(|role| self.has_role(role))
    }
}

/// Parse a verified parameter set into a [`LaunchContext`].
///
/// A pure function of its input: no I/O, no side effects. Values are
/// copied verbatim; the only transformations are the comma-split of
/// `roles` and the `custom_` prefix strip.
///
/// # Errors
///
/// - [`LaunchError::InvalidLaunch`] when the message type or LTI version
///   is not a supported launch.
/// - [`LaunchError::MissingContext`] when the launch names no resource
///   link.
pub fn parse_launch(params: &HashMap<String, String>) -> Result<LaunchContext, LaunchError> {
    let message_type = require_value(params, lti::MESSAGE_TYPE_PARAM)
        .ok_or_else(|| LaunchError::InvalidLaunch("missing lti_message_type".into()))?;
    if message_type != lti::LAUNCH_MESSAGE_TYPE {
        return Err(LaunchError::InvalidLaunch(format!(
            "unsupported message type: {message_type}"
        )));
    }

    let lti_version = require_value(params, lti::VERSION_PARAM)
        .ok_or_else(|| LaunchError::InvalidLaunch("missing lti_version".into()))?;
    if !lti::SUPPORTED_VERSIONS.contains(&lti_version) {
        return Err(LaunchError::InvalidLaunch(format!(
            "unsupported LTI version: {lti_version}"
        )));
    }

    let resource_link_id = require_value(params, lti::RESOURCE_LINK_ID_PARAM)
        .ok_or(LaunchError::MissingContext)?;

    let roles = params
        .get(lti::ROLES_PARAM)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default();

    let custom = params
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(lti::CUSTOM_PREFIX)
                .map(|stripped| (stripped.to_owned(), value.clone()))
        })
        .collect();

    Ok(LaunchContext {
        message_type: message_type.to_owned(),
        lti_version: lti_version.to_owned(),
        resource_link_id: resource_link_id.to_owned(),
        user_id: optional_value(params, lti::USER_ID_PARAM),
        roles,
        context_id: optional_value(params, lti::CONTEXT_ID_PARAM),
        context_title: optional_value(params, lti::CONTEXT_TITLE_PARAM),
        outcome_service_url: optional_value(params, lti::OUTCOME_SERVICE_URL_PARAM),
        result_sourced_id: optional_value(params, lti::RESULT_SOURCEDID_PARAM),
        person_name: optional_value(params, lti::PERSON_NAME_PARAM),
        person_email: optional_value(params, lti::PERSON_EMAIL_PARAM),
        return_url: optional_value(params, lti::RETURN_URL_PARAM),
        custom,
    })
}

fn require_value<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn optional_value(params: &HashMap<String, String>, name: &str) -> Option<String> {
    params
        .get(name)
        .filter(|value| !value.is_empty())
        .cloned()
}
