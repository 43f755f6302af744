// ABOUTME: POX envelope construction and response interpretation for the outcomes exchange
// ABOUTME: Builds replace/read/delete requests and extracts the response status elements

//! POX (plain-old-XML) envelope handling.
//!
//! The outcomes exchange uses a flat, fixed envelope; requests are
//! assembled from literal XML with escaped interpolations, and responses
//! are read with a minimal element extractor that tolerates namespace
//! prefixes. The extractor only ever targets leaf elements
//! (`imsx_codeMajor`, `imsx_description`, `imsx_messageRefIdentifier`,
//! `textString`).

use crate::constants::pox;
use crate::errors::OutcomeError;

/// Parsed response envelope fields.
#[derive(Debug, Clone)]
pub(crate) struct PoxResponse {
    /// Lowercased `imsx_codeMajor` value.
    pub code_major: String,
    /// `imsx_description`, when present and non-empty.
    pub description: Option<String>,
    /// `imsx_messageRefIdentifier` echoed by the consumer.
    pub message_ref: Option<String>,
    /// `textString` of a read response, verbatim.
    pub score_text: Option<String>,
}

/// Render a score as a fixed-point decimal string, e.g. `0.75`, `1.0`.
pub(crate) fn format_score(score: f64) -> String {
    let mut text = format!("{score:.4}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.push('0');
    }
    text
}

/// Build a `replaceResultRequest` envelope.
pub(crate) fn build_replace_result(
    message_id: &str,
    sourced_id: &str,
    score_text: &str,
) -> String {
    let operation = format!(
        "<replaceResultRequest>\
         <resultRecord>\
         <sourcedGUID><sourcedId>{}</sourcedId></sourcedGUID>\
         <result><resultScore>\
         <language>en</language>\
         <textString>{}</textString>\
         </resultScore></result>\
         </resultRecord>\
         </replaceResultRequest>",
        escape_xml(sourced_id),
        escape_xml(score_text)
    );
    envelope(message_id, &operation)
}

/// Build a `readResultRequest` envelope.
pub(crate) fn build_read_result(message_id: &str, sourced_id: &str) -> String {
    let operation = format!(
        "<readResultRequest>\
         <resultRecord>\
         <sourcedGUID><sourcedId>{}</sourcedId></sourcedGUID>\
         </resultRecord>\
         </readResultRequest>",
        escape_xml(sourced_id)
    );
    envelope(message_id, &operation)
}

/// Build a `deleteResultRequest` envelope.
pub(crate) fn build_delete_result(message_id: &str, sourced_id: &str) -> String {
    let operation = format!(
        "<deleteResultRequest>\
         <resultRecord>\
         <sourcedGUID><sourcedId>{}</sourcedId></sourcedGUID>\
         </resultRecord>\
         </deleteResultRequest>",
        escape_xml(sourced_id)
    );
    envelope(message_id, &operation)
}

fn envelope(message_id: &str, operation: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <imsx_POXEnvelopeRequest xmlns=\"{}\">\
         <imsx_POXHeader>\
         <imsx_POXRequestHeaderInfo>\
         <imsx_version>{}</imsx_version>\
         <imsx_messageIdentifier>{}</imsx_messageIdentifier>\
         </imsx_POXRequestHeaderInfo>\
         </imsx_POXHeader>\
         <imsx_POXBody>{operation}</imsx_POXBody>\
         </imsx_POXEnvelopeRequest>",
        pox::OUTCOMES_NAMESPACE,
        pox::VERSION,
        escape_xml(message_id)
    )
}

/// Interpret a response body as a POX outcome envelope.
///
/// # Errors
///
/// Returns [`OutcomeError::Protocol`] when the body is not a POX envelope
/// or carries no status code element.
pub(crate) fn parse_response(body: &str) -> Result<PoxResponse, OutcomeError> {
    if !body.contains("imsx_POXEnvelopeResponse") {
        return Err(OutcomeError::Protocol(
            "response is not a POX outcome envelope".into(),
        ));
    }
    let code_major = element_text(body, "imsx_codeMajor")
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| OutcomeError::Protocol("response envelope has no status code".into()))?
        .to_lowercase();

    Ok(PoxResponse {
        code_major,
        description: element_text(body, "imsx_description")
            .map(|value| unescape_xml(value.trim()))
            .filter(|value| !value.is_empty()),
        message_ref: element_text(body, "imsx_messageRefIdentifier")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty()),
        score_text: element_text(body, "textString")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty()),
    })
}

/// Text content of the first leaf element with the given local name,
/// tolerating a namespace prefix and attributes on the tag.
fn element_text<'a>(xml: &'a str, name: &str) -> Option<&'a str> {
    let mut cursor = 0;
    while let Some(offset) = xml.get(cursor..)?.find('<') {
        let open_at = cursor + offset;
        let after = xml.get(open_at + 1..)?;
        let gt_rel = after.find('>')?;
        let tag_body = &after[..gt_rel];
        cursor = open_at + 1 + gt_rel + 1;

        if tag_body.starts_with('/') || tag_body.starts_with('?') || tag_body.starts_with('!') {
            continue;
        }
        let tag_name = tag_body
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("");
        let local = tag_name.rsplit(':').next().unwrap_or(tag_name);
        if local != name {
            continue;
        }
        if tag_body.ends_with('/') {
            return Some("");
        }

        let content = xml.get(cursor..)?;
        let close_rel = content.find("</")?;
        let close_tag = content.get(close_rel + 2..)?;
        let close_gt = close_tag.find('>')?;
        let close_name = close_tag[..close_gt].trim();
        let close_local = close_name.rsplit(':').next().unwrap_or(close_name);
        if close_local != name {
            // The element we matched is not the leaf we expect.
            return None;
        }
        return Some(&content[..close_rel]);
    }
    None
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape_xml(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success_response(code_major: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <imsx_POXEnvelopeResponse xmlns=\"{}\">\
             <imsx_POXHeader><imsx_POXResponseHeaderInfo>\
             <imsx_version>V1.0</imsx_version>\
             <imsx_messageIdentifier>resp-1</imsx_messageIdentifier>\
             <imsx_statusInfo>\
             <imsx_codeMajor>{code_major}</imsx_codeMajor>\
             <imsx_severity>status</imsx_severity>\
             <imsx_description>Score for link-1 is now 0.75</imsx_description>\
             <imsx_messageRefIdentifier>msg-42</imsx_messageRefIdentifier>\
             </imsx_statusInfo>\
             </imsx_POXResponseHeaderInfo></imsx_POXHeader>\
             <imsx_POXBody><replaceResultResponse/></imsx_POXBody>\
             </imsx_POXEnvelopeResponse>",
            crate::constants::pox::OUTCOMES_NAMESPACE
        )
    }

    #[test]
    fn score_formatting_is_fixed_point() {
        assert_eq!(format_score(0.0), "0.0");
        assert_eq!(format_score(1.0), "1.0");
        assert_eq!(format_score(0.75), "0.75");
        assert_eq!(format_score(0.3333), "0.3333");
    }

    #[test]
    fn replace_request_carries_id_sourced_id_and_score() {
        let envelope = build_replace_result("msg-42", "sid-1", "0.75");
        assert!(envelope.contains("<imsx_messageIdentifier>msg-42</imsx_messageIdentifier>"));
        assert!(envelope.contains("<sourcedId>sid-1</sourcedId>"));
        assert!(envelope.contains("<textString>0.75</textString>"));
        assert!(envelope.contains("<replaceResultRequest>"));
    }

    #[test]
    fn sourced_ids_are_escaped() {
        let envelope = build_replace_result("msg", "a&b<c", "1.0");
        assert!(envelope.contains("<sourcedId>a&amp;b&lt;c</sourcedId>"));
    }

    #[test]
    fn a_success_response_parses() {
        let parsed = parse_response(&success_response("success")).unwrap();
        assert_eq!(parsed.code_major, "success");
        assert_eq!(parsed.message_ref.as_deref(), Some("msg-42"));
        assert!(parsed
            .description
            .as_deref()
            .unwrap()
            .contains("link-1"));
    }

    #[test]
    fn namespace_prefixes_are_tolerated() {
        let body = "<ims:imsx_POXEnvelopeResponse xmlns:ims=\"x\">\
                    <ims:imsx_codeMajor>success</ims:imsx_codeMajor>\
                    </ims:imsx_POXEnvelopeResponse>";
        let parsed = parse_response(body).unwrap();
        assert_eq!(parsed.code_major, "success");
    }

    #[test]
    fn non_envelope_bodies_are_protocol_errors() {
        assert!(matches!(
            parse_response("<html><body>502 Bad Gateway</body></html>"),
            Err(OutcomeError::Protocol(_))
        ));
        assert!(matches!(
            parse_response("not xml at all"),
            Err(OutcomeError::Protocol(_))
        ));
    }

    #[test]
    fn an_envelope_without_a_status_code_is_a_protocol_error() {
        let body = "<imsx_POXEnvelopeResponse></imsx_POXEnvelopeResponse>";
        assert!(matches!(
            parse_response(body),
            Err(OutcomeError::Protocol(_))
        ));
    }

    #[test]
    fn descriptions_are_unescaped() {
        let body = "<imsx_POXEnvelopeResponse>\
                    <imsx_codeMajor>failure</imsx_codeMajor>\
                    <imsx_description>bad &amp; worse</imsx_description>\
                    </imsx_POXEnvelopeResponse>";
        let parsed = parse_response(body).unwrap();
        assert_eq!(parsed.description.as_deref(), Some("bad & worse"));
    }
}
