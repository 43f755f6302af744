// ABOUTME: Integration tests for launch parsing and the typed launch context
// ABOUTME: Covers required fields, outcomes capability, roles, and custom parameters

#![allow(missing_docs)]

mod common;

use common::launch_params;
use lti_tool_provider::errors::LaunchError;
use lti_tool_provider::launch::parse_launch;

#[test]
fn a_complete_assignment_launch_parses() {
    let params = launch_params("nonce");
    let context = parse_launch(&params).unwrap();

    assert_eq!(context.message_type, "basic-lti-launch-request");
    assert_eq!(context.lti_version, "LTI-1p0");
    assert_eq!(context.resource_link_id, "link-1");
    assert_eq!(context.user_id.as_deref(), Some("user-7"));
    assert_eq!(context.context_id.as_deref(), Some("course-9"));
    assert!(context.supports_outcomes());
    assert_eq!(
        context.outcome_service_url.as_deref(),
        Some("https://lms.example/grade_passback")
    );
    assert_eq!(context.result_sourced_id.as_deref(), Some("sourced-55"));
}

#[test]
fn custom_parameters_lose_their_prefix_and_nothing_else() {
    let mut params = launch_params("nonce");
    params.insert("custom_difficulty".to_owned(), "Hard Mode".to_owned());
    let context = parse_launch(&params).unwrap();

    assert_eq!(context.custom.get("fish_name").map(String::as_str), Some("wanda"));
    assert_eq!(
        context.custom.get("difficulty").map(String::as_str),
        Some("Hard Mode")
    );
    assert!(!context.custom.contains_key("custom_fish_name"));
}

#[test]
fn outcomes_support_requires_both_lis_fields() {
    let mut params = launch_params("nonce");
    params.remove("lis_outcome_service_url");
    assert!(!parse_launch(&params).unwrap().supports_outcomes());

    let mut params = launch_params("nonce");
    params.remove("lis_result_sourcedid");
    assert!(!parse_launch(&params).unwrap().supports_outcomes());
}

#[test]
fn roles_are_split_and_matched_case_insensitively() {
    let mut params = launch_params("nonce");
    params.insert(
        "roles".to_owned(),
        "urn:lti:role:ims/lis/Instructor, learner".to_owned(),
    );
    let context = parse_launch(&params).unwrap();

    assert_eq!(context.roles.len(), 2);
    assert!(context.is_instructor());
    assert!(context.is_student());
    assert!(context.has_role("INSTRUCTOR"));
    assert!(!context.has_role("administrator"));
}

#[test]
fn a_wrong_message_type_is_an_invalid_launch() {
    let mut params = launch_params("nonce");
    params.insert(
        "lti_message_type".to_owned(),
        "ContentItemSelectionRequest".to_owned(),
    );
    assert!(matches!(
        parse_launch(&params),
        Err(LaunchError::InvalidLaunch(_))
    ));
}

#[test]
fn an_unsupported_version_is_an_invalid_launch() {
    let mut params = launch_params("nonce");
    params.insert("lti_version".to_owned(), "LTI-2p0".to_owned());
    assert!(matches!(
        parse_launch(&params),
        Err(LaunchError::InvalidLaunch(_))
    ));
}

#[test]
fn a_missing_or_empty_resource_link_is_missing_context() {
    let mut params = launch_params("nonce");
    params.remove("resource_link_id");
    assert!(matches!(
        parse_launch(&params),
        Err(LaunchError::MissingContext)
    ));

    let mut params = launch_params("nonce");
    params.insert("resource_link_id".to_owned(), String::new());
    assert!(matches!(
        parse_launch(&params),
        Err(LaunchError::MissingContext)
    ));
}

#[test]
fn person_fields_are_copied_when_present() {
    let mut params = launch_params("nonce");
    params.insert("lis_person_name_full".to_owned(), "Wanda Fish".to_owned());
    params.insert(
        "lis_person_contact_email_primary".to_owned(),
        "wanda@example.edu".to_owned(),
    );
    let context = parse_launch(&params).unwrap();

    assert_eq!(context.person_name.as_deref(), Some("Wanda Fish"));
    assert_eq!(context.person_email.as_deref(), Some("wanda@example.edu"));
}
