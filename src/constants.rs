// ABOUTME: Protocol constants organized by domain (LTI launch, OAuth1, POX outcomes)
// ABOUTME: Field names and wire values live here so the modules share one vocabulary

//! Constants module
//!
//! Wire-level names and values for the LTI launch protocol, the OAuth1
//! signing layer, and the POX outcomes envelope, grouped by domain.

/// LTI launch parameter names and required values.
pub mod lti {
    /// The only message type accepted as a launch.
    pub const LAUNCH_MESSAGE_TYPE: &str = "basic-lti-launch-request";

    /// LTI versions this provider accepts.
    pub const SUPPORTED_VERSIONS: &[&str] = &["LTI-1p0"];

    /// Parameter carrying the message type.
    pub const MESSAGE_TYPE_PARAM: &str = "lti_message_type";

    /// Parameter carrying the LTI version.
    pub const VERSION_PARAM: &str = "lti_version";

    /// Parameter identifying the launched resource.
    pub const RESOURCE_LINK_ID_PARAM: &str = "resource_link_id";

    /// Parameter identifying the launching user.
    pub const USER_ID_PARAM: &str = "user_id";

    /// Parameter carrying the comma-separated role list.
    pub const ROLES_PARAM: &str = "roles";

    /// Parameter identifying the course context.
    pub const CONTEXT_ID_PARAM: &str = "context_id";

    /// Parameter carrying the course context title.
    pub const CONTEXT_TITLE_PARAM: &str = "context_title";

    /// Parameter carrying the outcomes service endpoint.
    pub const OUTCOME_SERVICE_URL_PARAM: &str = "lis_outcome_service_url";

    /// Parameter carrying the gradebook entry identifier.
    pub const RESULT_SOURCEDID_PARAM: &str = "lis_result_sourcedid";

    /// Parameter carrying the launching user's full name.
    pub const PERSON_NAME_PARAM: &str = "lis_person_name_full";

    /// Parameter carrying the launching user's email address.
    pub const PERSON_EMAIL_PARAM: &str = "lis_person_contact_email_primary";

    /// Parameter carrying the consumer's return URL.
    pub const RETURN_URL_PARAM: &str = "launch_presentation_return_url";

    /// Prefix marking tool-defined custom parameters.
    pub const CUSTOM_PREFIX: &str = "custom_";

    /// Role tokens identifying a learner, matched case-insensitively.
    pub const LEARNER_ROLES: &[&str] = &["learner", "student"];

    /// Role tokens identifying an instructor, matched case-insensitively.
    pub const INSTRUCTOR_ROLES: &[&str] = &["instructor", "teacher"];
}

/// OAuth1 parameter names and protocol values.
pub mod oauth {
    /// The only signature method this provider signs or accepts.
    pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

    /// OAuth protocol version value.
    pub const VERSION: &str = "1.0";

    /// Consumer key parameter.
    pub const CONSUMER_KEY_PARAM: &str = "oauth_consumer_key";

    /// Nonce parameter.
    pub const NONCE_PARAM: &str = "oauth_nonce";

    /// Timestamp parameter (seconds since the Unix epoch).
    pub const TIMESTAMP_PARAM: &str = "oauth_timestamp";

    /// Signature parameter; always excluded from the signed set.
    pub const SIGNATURE_PARAM: &str = "oauth_signature";

    /// Signature method parameter.
    pub const SIGNATURE_METHOD_PARAM: &str = "oauth_signature_method";

    /// Protocol version parameter.
    pub const VERSION_PARAM: &str = "oauth_version";

    /// Body hash parameter (OAuth body-hash extension).
    pub const BODY_HASH_PARAM: &str = "oauth_body_hash";
}

/// POX outcomes envelope values.
pub mod pox {
    /// Namespace of the outcomes request/response envelope.
    pub const OUTCOMES_NAMESPACE: &str =
        "http://www.imsglobal.org/services/ltiv1p1/xsd/imsoms_v1p0";

    /// Envelope version value.
    pub const VERSION: &str = "V1.0";

    /// Code-major value reporting success.
    pub const CODE_MAJOR_SUCCESS: &str = "success";

    /// Code-major value reporting an unsupported operation.
    pub const CODE_MAJOR_UNSUPPORTED: &str = "unsupported";
}

/// Default configuration values.
pub mod defaults {
    /// Accepted clock skew for inbound launch timestamps, in seconds.
    pub const TIMESTAMP_TOLERANCE_SECS: u64 = 300;

    /// Outcome request timeout, in seconds.
    pub const OUTCOME_TIMEOUT_SECS: u64 = 30;

    /// Connection timeout for the outcomes transport, in seconds.
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Nonce cache size above which stale entries are swept.
    pub const NONCE_CLEANUP_THRESHOLD: usize = 10_000;
}
