use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::domain::{ClaimedIdentity, DocumentReference};

/// Error raised by an extraction backend. The lifecycle engine never
/// surfaces this to the submitter; any failure degrades to empty text and
/// the application routes to manual review.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("extraction backend failed: {0}")]
    Backend(String),
    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),
}

/// Seam for the external text-recognition service (OCR). Implementations
/// wrap whatever transport they need; callers go through
/// [`recognize_bounded`] so a slow backend cannot stall submission.
pub trait ExtractionGateway: Send + Sync {
    fn recognize(
        &self,
        document: &DocumentReference,
        language_hint: &str,
    ) -> Result<String, ExtractionError>;
}

/// Knobs for the verification step, injected into the service the way the
/// rest of the workflow receives its configuration.
#[derive(Debug, Clone)]
pub struct VerificationConfig {
    pub language_hint: String,
    pub extraction_budget: Duration,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            language_hint: "eng".to_string(),
            extraction_budget: Duration::from_secs(20),
        }
    }
}

/// Run the gateway on a worker thread and wait at most `budget`.
///
/// Timeout, backend error, and a panicked worker all resolve to an empty
/// string so the submission path keeps its deterministic routing.
pub(crate) fn recognize_bounded(
    gateway: Arc<dyn ExtractionGateway>,
    document: DocumentReference,
    language_hint: String,
    budget: Duration,
) -> String {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(gateway.recognize(&document, &language_hint));
    });

    match rx.recv_timeout(budget) {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => {
            tracing::warn!(%err, "document text extraction failed");
            String::new()
        }
        Err(_) => {
            tracing::warn!(?budget, "document text extraction timed out");
            String::new()
        }
    }
}

/// Decide whether extracted document text backs up the claimed identity.
///
/// Coarse substring matching, deliberately: the first token of the claimed
/// name must appear in the lowercased text, and the claimed document number
/// must appear once whitespace is stripped from both sides. No ordering or
/// adjacency is required.
pub fn verify(claimed: &ClaimedIdentity, extracted_text: &str) -> bool {
    let text = extracted_text.to_lowercase();

    let name_token = claimed.first_name_token().to_lowercase();
    let name_match = text.contains(&name_token);

    let squashed: String = text.split_whitespace().collect();
    let number: String = claimed
        .document_number
        .split_whitespace()
        .collect::<String>()
        .to_lowercase();
    let number_match = squashed.contains(&number);

    name_match && number_match
}
