// ABOUTME: Integration tests for the outcomes client against stub transports
// ABOUTME: Verifies pre-flight rejections never touch the network and responses map faithfully

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use async_trait::async_trait;
use common::{init_test_logging, launch_params, TEST_KEY, TEST_SECRET};
use lti_tool_provider::config::{ConsumerCredential, OutcomeConfig};
use lti_tool_provider::errors::OutcomeError;
use lti_tool_provider::launch::{parse_launch, LaunchContext};
use lti_tool_provider::outcomes::{
    OutcomeStatus, OutcomeTransport, OutcomesClient, TransportResponse,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
enum StubReply {
    Respond(u16, String),
    FailInTransit(String),
}

struct CapturedRequest {
    url: String,
    headers: Vec<(String, String)>,
    body: String,
}

struct StubTransport {
    reply: StubReply,
    calls: AtomicUsize,
    requests: Mutex<Vec<CapturedRequest>>,
}

impl StubTransport {
    fn new(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> CapturedRequest {
        let mut requests = self.requests.lock().unwrap();
        requests.pop().unwrap()
    }
}

#[async_trait]
impl OutcomeTransport for StubTransport {
    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &[u8],
        _timeout: Duration,
    ) -> Result<TransportResponse, OutcomeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(CapturedRequest {
            url: url.to_owned(),
            headers: headers.to_vec(),
            body: String::from_utf8(body.to_vec()).unwrap(),
        });
        match &self.reply {
            StubReply::Respond(status, body) => Ok(TransportResponse {
                status: *status,
                body: body.clone(),
            }),
            StubReply::FailInTransit(message) => Err(OutcomeError::Transport(message.clone())),
        }
    }
}

fn pox_response(code_major: &str, message_ref: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <imsx_POXEnvelopeResponse xmlns=\"http://www.imsglobal.org/services/ltiv1p1/xsd/imsoms_v1p0\">\
         <imsx_POXHeader><imsx_POXResponseHeaderInfo>\
         <imsx_version>V1.0</imsx_version>\
         <imsx_messageIdentifier>reply-1</imsx_messageIdentifier>\
         <imsx_statusInfo>\
         <imsx_codeMajor>{code_major}</imsx_codeMajor>\
         <imsx_severity>status</imsx_severity>\
         <imsx_description>handled</imsx_description>\
         <imsx_messageRefIdentifier>{message_ref}</imsx_messageRefIdentifier>\
         </imsx_statusInfo>\
         </imsx_POXResponseHeaderInfo></imsx_POXHeader>\
         <imsx_POXBody><replaceResultResponse/></imsx_POXBody>\
         </imsx_POXEnvelopeResponse>"
    )
}

fn assignment_context() -> LaunchContext {
    parse_launch(&launch_params("nonce")).unwrap()
}

fn credential() -> ConsumerCredential {
    ConsumerCredential::new(TEST_KEY, TEST_SECRET)
}

fn client_with(transport: Arc<StubTransport>) -> OutcomesClient {
    init_test_logging();
    OutcomesClient::with_transport(transport, OutcomeConfig::default())
}

#[tokio::test]
async fn boundary_scores_pass_validation_and_reach_the_transport() {
    for score in [0.0, 1.0] {
        let transport = StubTransport::new(StubReply::Respond(200, pox_response("success", "m")));
        let client = client_with(transport.clone());

        let response = client
            .post_outcome(&assignment_context(), score, &credential())
            .await
            .unwrap();
        assert!(response.is_success());
        assert_eq!(transport.call_count(), 1);
    }
}

#[tokio::test]
async fn out_of_range_scores_are_rejected_before_any_network_call() {
    for score in [-0.01, 1.01, f64::NAN] {
        let transport = StubTransport::new(StubReply::Respond(200, pox_response("success", "m")));
        let client = client_with(transport.clone());

        let result = client
            .post_outcome(&assignment_context(), score, &credential())
            .await;
        assert!(matches!(result, Err(OutcomeError::Validation(_))));
        assert_eq!(transport.call_count(), 0, "transport must not be called");
    }
}

#[tokio::test]
async fn a_launch_without_outcome_fields_is_rejected_before_any_network_call() {
    let mut params = launch_params("nonce");
    params.remove("lis_result_sourcedid");
    let context = parse_launch(&params).unwrap();

    let transport = StubTransport::new(StubReply::Respond(200, pox_response("success", "m")));
    let client = client_with(transport.clone());

    let result = client.post_outcome(&context, 0.5, &credential()).await;
    assert!(matches!(result, Err(OutcomeError::UnsupportedOperation)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn a_success_envelope_maps_to_a_success_response() {
    let transport = StubTransport::new(StubReply::Respond(200, pox_response("success", "msg-7")));
    let client = client_with(transport);

    let response = client
        .post_outcome_with_message_id(&assignment_context(), 0.75, &credential(), "msg-7")
        .await
        .unwrap();
    assert_eq!(response.status, OutcomeStatus::Success);
    assert_eq!(response.raw_code, "success");
    assert_eq!(response.message_ref.as_deref(), Some("msg-7"));
}

#[tokio::test]
async fn failure_and_unsupported_envelopes_map_to_their_statuses() {
    let transport = StubTransport::new(StubReply::Respond(200, pox_response("failure", "m")));
    let client = client_with(transport);
    let response = client
        .post_outcome(&assignment_context(), 0.5, &credential())
        .await
        .unwrap();
    assert_eq!(response.status, OutcomeStatus::Failure);
    assert!(!response.is_success());

    let transport = StubTransport::new(StubReply::Respond(200, pox_response("unsupported", "m")));
    let client = client_with(transport);
    let response = client
        .post_outcome(&assignment_context(), 0.5, &credential())
        .await
        .unwrap();
    assert_eq!(response.status, OutcomeStatus::Unsupported);
}

#[tokio::test]
async fn a_malformed_response_is_a_protocol_error() {
    let transport =
        StubTransport::new(StubReply::Respond(200, "<html>oops</html>".to_owned()));
    let client = client_with(transport);

    let result = client
        .post_outcome(&assignment_context(), 0.5, &credential())
        .await;
    match result {
        Err(err @ OutcomeError::Protocol(_)) => assert!(!err.is_retryable()),
        other => panic!("expected Protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn a_transit_failure_is_a_retryable_transport_error() {
    let transport =
        StubTransport::new(StubReply::FailInTransit("operation timed out".to_owned()));
    let client = client_with(transport);

    let result = client
        .post_outcome(&assignment_context(), 0.5, &credential())
        .await;
    match result {
        Err(err @ OutcomeError::Transport(_)) => assert!(err.is_retryable()),
        other => panic!("expected Transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn a_non_2xx_status_is_a_protocol_error() {
    let transport = StubTransport::new(StubReply::Respond(500, String::new()));
    let client = client_with(transport);

    let result = client
        .post_outcome(&assignment_context(), 0.5, &credential())
        .await;
    assert!(matches!(result, Err(OutcomeError::Protocol(_))));
}

#[tokio::test]
async fn the_request_is_signed_xml_aimed_at_the_launch_endpoint() {
    let transport = StubTransport::new(StubReply::Respond(200, pox_response("success", "m")));
    let client = client_with(transport.clone());

    client
        .post_outcome_with_message_id(&assignment_context(), 0.75, &credential(), "msg-42")
        .await
        .unwrap();

    let request = transport.last_request();
    assert_eq!(request.url, "https://lms.example/grade_passback");
    assert!(request.body.contains("<sourcedId>sourced-55</sourcedId>"));
    assert!(request.body.contains("<textString>0.75</textString>"));
    assert!(request
        .body
        .contains("<imsx_messageIdentifier>msg-42</imsx_messageIdentifier>"));

    let content_type = request
        .headers
        .iter()
        .find(|(name, _)| name == "Content-Type")
        .map(|(_, value)| value.as_str());
    assert_eq!(content_type, Some("application/xml"));

    let authorization = request
        .headers
        .iter()
        .find(|(name, _)| name == "Authorization")
        .map(|(_, value)| value.as_str())
        .unwrap();
    assert!(authorization.starts_with("OAuth "));
    assert!(authorization.contains("oauth_consumer_key=\"test\""));
    assert!(authorization.contains("oauth_body_hash="));
    assert!(authorization.contains("oauth_signature="));
}

#[tokio::test]
async fn a_retried_delivery_with_the_same_message_id_sends_the_same_envelope() {
    let transport =
        StubTransport::new(StubReply::Respond(200, pox_response("success", "m")));
    let client = client_with(transport.clone());
    let context = assignment_context();

    client
        .post_outcome_with_message_id(&context, 0.5, &credential(), "retry-1")
        .await
        .unwrap();
    let first = transport.last_request();

    client
        .post_outcome_with_message_id(&context, 0.5, &credential(), "retry-1")
        .await
        .unwrap();
    let second = transport.last_request();

    assert_eq!(first.body, second.body);
}

#[tokio::test]
async fn reading_an_outcome_returns_the_stored_score() {
    let body = "<imsx_POXEnvelopeResponse>\
                <imsx_codeMajor>success</imsx_codeMajor>\
                <imsx_POXBody><readResultResponse><result><resultScore>\
                <language>en</language><textString>0.91</textString>\
                </resultScore></result></readResultResponse></imsx_POXBody>\
                </imsx_POXEnvelopeResponse>";
    let transport = StubTransport::new(StubReply::Respond(200, body.to_owned()));
    let client = client_with(transport.clone());

    let response = client
        .read_outcome(&assignment_context(), &credential())
        .await
        .unwrap();
    assert!(response.is_success());
    assert_eq!(response.score, Some(0.91));
    assert!(transport
        .last_request()
        .body
        .contains("<readResultRequest>"));
}

#[tokio::test]
async fn deleting_an_outcome_sends_a_delete_request() {
    let transport = StubTransport::new(StubReply::Respond(200, pox_response("success", "m")));
    let client = client_with(transport.clone());

    client
        .delete_outcome(&assignment_context(), &credential())
        .await
        .unwrap();
    assert!(transport
        .last_request()
        .body
        .contains("<deleteResultRequest>"));
}
