use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted pass applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Weak reference to the applicant owned by the external user service.
///
/// The core never dereferences this beyond equality; callers needing profile
/// details perform their own lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

/// Opaque handle to the stored identity-document image. The upload transport
/// and the bytes themselves live outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentReference(pub String);

/// Identity data entered by the applicant, unverified until matched against
/// the extracted document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedIdentity {
    pub full_name: String,
    pub document_number: String,
}

impl ClaimedIdentity {
    /// First whitespace-delimited token of the claimed name, used by the
    /// verifier. Empty when the name is blank.
    pub fn first_name_token(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or("")
    }
}

/// Pass validity window offered to applicants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassDuration {
    SevenDays,
    FifteenDays,
    ThirtyDays,
}

impl PassDuration {
    pub const fn days(self) -> i64 {
        match self {
            Self::SevenDays => 7,
            Self::FifteenDays => 15,
            Self::ThirtyDays => 30,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SevenDays => "7 Days",
            Self::FifteenDays => "15 Days",
            Self::ThirtyDays => "30 Days",
        }
    }

    /// Parse a wire label. Unrecognized input falls back to thirty days.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "7 Days" => Self::SevenDays,
            "15 Days" => Self::FifteenDays,
            _ => Self::ThirtyDays,
        }
    }
}

impl Serialize for PassDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for PassDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Trip fields captured at submission. `valid_till` is derived once, from the
/// submission date plus the requested duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDetails {
    pub from: String,
    pub to: String,
    pub duration: PassDuration,
    pub valid_till: NaiveDate,
}

impl TripDetails {
    pub fn new(from: String, to: String, duration: PassDuration, submitted_on: NaiveDate) -> Self {
        let valid_till = submitted_on + Duration::days(duration.days());
        Self {
            from,
            to,
            duration,
            valid_till,
        }
    }

    /// Human-readable validity date, e.g. `Mon Apr 07 2025`.
    pub fn valid_till_display(&self) -> String {
        format_calendar_date(self.valid_till)
    }
}

/// Render a calendar date the way pass payloads and reminders present it.
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Lifecycle state of a pass application. Expiry is a notification event,
/// not a stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassStatus {
    ManualReview,
    Approved,
    Rejected,
}

impl PassStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ManualReview => "manual_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Opaque rendered pass code, present exactly when the application is
/// approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassPayload(pub String);

/// The central entity: one row per submission. An application is created
/// once and transitions at most once more (manual review to a decision).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub applicant_id: ApplicantId,
    pub document: DocumentReference,
    pub claimed: ClaimedIdentity,
    pub trip: TripDetails,
    pub status: PassStatus,
    pub rejection_reason: Option<String>,
    pub pass_payload: Option<PassPayload>,
    pub applied_at: DateTime<Utc>,
}

impl Application {
    /// Sanitized representation exposed to API callers.
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            applicant_id: self.applicant_id.clone(),
            full_name: self.claimed.full_name.clone(),
            status: self.status.label(),
            from: self.trip.from.clone(),
            to: self.trip.to.clone(),
            duration: self.trip.duration,
            valid_till: self.trip.valid_till,
            rejection_reason: self.rejection_reason.clone(),
            pass_payload: self.pass_payload.clone(),
            applied_at: self.applied_at,
        }
    }
}

/// Status snapshot returned by the HTTP surface and the demo output.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub applicant_id: ApplicantId,
    pub full_name: String,
    pub status: &'static str,
    pub from: String,
    pub to: String,
    pub duration: PassDuration,
    pub valid_till: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_payload: Option<PassPayload>,
    pub applied_at: DateTime<Utc>,
}

/// Counters backing the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplicationStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
}
