use std::sync::Arc;
use std::time::Duration;

use super::common::ScriptedGateway;
use crate::workflows::pass::applications::domain::{ClaimedIdentity, DocumentReference};
use crate::workflows::pass::applications::verification::{recognize_bounded, verify};

fn claimed(full_name: &str, document_number: &str) -> ClaimedIdentity {
    ClaimedIdentity {
        full_name: full_name.to_string(),
        document_number: document_number.to_string(),
    }
}

#[test]
fn empty_text_never_verifies() {
    assert!(!verify(&claimed("Asha Verma", "AB1234"), ""));
}

#[test]
fn matching_name_and_number_verifies() {
    assert!(verify(
        &claimed("Asha Verma", "AB1234"),
        "asha verma voter id ab1234 dob 1990"
    ));
}

#[test]
fn name_match_is_case_insensitive_on_first_token() {
    assert!(verify(
        &claimed("ASHA Verma", "ab1234"),
        "govt of india asha r verma ab1234"
    ));
}

#[test]
fn number_match_ignores_whitespace_on_both_sides() {
    assert!(verify(&claimed("Asha Verma", "AB 123 4"), "asha ab12 34"));
    assert!(verify(&claimed("Asha Verma", "AB1234"), "asha a b 1 2 3 4"));
}

#[test]
fn number_missing_from_text_fails() {
    assert!(!verify(
        &claimed("Asha Verma", "AB1234"),
        "asha verma voter id zz9999"
    ));
}

#[test]
fn name_missing_from_text_fails() {
    assert!(!verify(&claimed("Asha Verma", "AB1234"), "voter id ab1234"));
}

#[test]
fn bounded_recognition_returns_backend_text() {
    let gateway: Arc<dyn crate::workflows::pass::applications::verification::ExtractionGateway> =
        Arc::new(ScriptedGateway::Text("hello".to_string()));
    let text = recognize_bounded(
        gateway,
        DocumentReference("doc".to_string()),
        "eng".to_string(),
        Duration::from_millis(200),
    );
    assert_eq!(text, "hello");
}

#[test]
fn bounded_recognition_degrades_failure_to_empty() {
    let gateway: Arc<dyn crate::workflows::pass::applications::verification::ExtractionGateway> =
        Arc::new(ScriptedGateway::Failure);
    let text = recognize_bounded(
        gateway,
        DocumentReference("doc".to_string()),
        "eng".to_string(),
        Duration::from_millis(200),
    );
    assert_eq!(text, "");
}

#[test]
fn bounded_recognition_degrades_timeout_to_empty() {
    let gateway: Arc<dyn crate::workflows::pass::applications::verification::ExtractionGateway> =
        Arc::new(ScriptedGateway::Hang(Duration::from_millis(500)));
    let text = recognize_bounded(
        gateway,
        DocumentReference("doc".to_string()),
        "eng".to_string(),
        Duration::from_millis(20),
    );
    assert_eq!(text, "");
}
