use super::domain::{PassPayload, TripDetails};

/// Error raised by a payload rendering backend.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("payload rendering failed: {0}")]
    Backend(String),
}

/// Seam for the scannable-code renderer (e.g. a QR encoder). The core owns
/// the payload text; rendering it into an opaque code is external.
pub trait PayloadRenderer: Send + Sync {
    fn render(&self, payload_text: &str) -> Result<PassPayload, RenderError>;
}

/// Build the textual payload encoded into an approved pass.
pub fn payload_text(trip: &TripDetails) -> String {
    format!(
        "From: {}, To: {}, Duration: {}, Valid Till: {}",
        trip.from,
        trip.to,
        trip.duration.label(),
        trip.valid_till_display()
    )
}
