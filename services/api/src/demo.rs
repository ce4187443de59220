use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::Args;

use crate::infra::{Base64PayloadRenderer, InMemoryApplicationRepository, InMemoryNotificationStore};
use buspass::error::AppError;
use buspass::workflows::pass::applications::{
    ApplicantId, ApplicationStatusView, DocumentReference, ExtractionError, ExtractionGateway,
    PassApplicationService, PassDuration, PassServiceError, PassSubmission, VerificationConfig,
};
use buspass::workflows::pass::clock::FixedClock;
use buspass::workflows::pass::expiry::ExpirySweep;
use buspass::workflows::pass::notifications::{NotificationDispatcher, Recipient};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Calendar date the demo pretends to run on (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn morning_of(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(9, 0, 0)
        .expect("valid wall-clock time")
        .and_utc()
}

/// Gateway fed from a staged map of recognizer output, so the demo exercises
/// both the verified path and the extraction-failure path.
struct StagedGateway {
    texts: HashMap<String, String>,
}

impl ExtractionGateway for StagedGateway {
    fn recognize(
        &self,
        document: &DocumentReference,
        _language_hint: &str,
    ) -> Result<String, ExtractionError> {
        self.texts
            .get(&document.0)
            .cloned()
            .ok_or_else(|| ExtractionError::Backend("no recognizer output staged".to_string()))
    }
}

fn submission(applicant: &str, full_name: &str, document: &str, number: &str) -> PassSubmission {
    PassSubmission {
        applicant_id: ApplicantId(applicant.to_string()),
        document: DocumentReference(document.to_string()),
        full_name: full_name.to_string(),
        document_number: number.to_string(),
        from: "Madurai".to_string(),
        to: "Chennai".to_string(),
        duration: PassDuration::SevenDays,
    }
}

fn print_view(view: &ApplicationStatusView) {
    println!(
        "- {} ({}) -> status {}",
        view.application_id.0, view.full_name, view.status
    );
    println!("  Valid till {}", view.valid_till);
    if let Some(reason) = &view.rejection_reason {
        println!("  Rejection reason: {reason}");
    }
    if let Some(payload) = &view.pass_payload {
        println!("  Pass code: {}", payload.0);
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let mut texts = HashMap::new();
    texts.insert(
        "uploads/idproof-asha.png".to_string(),
        "asha verma voter id ab1234 dob 1990".to_string(),
    );
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let store = Arc::new(InMemoryNotificationStore::default());
    let dispatcher = Arc::new(NotificationDispatcher::new(store));
    let service = PassApplicationService::new(
        repository.clone(),
        dispatcher.clone(),
        Arc::new(StagedGateway { texts }),
        Arc::new(Base64PayloadRenderer),
        Arc::new(FixedClock(morning_of(today))),
        VerificationConfig {
            language_hint: "eng".to_string(),
            extraction_budget: Duration::from_secs(5),
        },
    );

    println!("Bus pass workflow demo (running as of {today})");

    println!("\nStep 1: submission with matching document text");
    let asha = service.submit(submission(
        "user-asha",
        "Asha Verma",
        "uploads/idproof-asha.png",
        "AB1234",
    ))?;
    print_view(&asha.status_view());

    println!("\nStep 2: submission whose document has no recognizer output");
    let ravi = service.submit(submission(
        "user-ravi",
        "Ravi Kumar",
        "uploads/idproof-ravi.png",
        "CD5678",
    ))?;
    print_view(&ravi.status_view());
    println!("  Admin inbox:");
    let alerts = dispatcher
        .list_unread(&Recipient::AdminBroadcast)
        .map_err(PassServiceError::from)?;
    for alert in alerts {
        println!("    - {}", alert.message);
    }

    println!("\nStep 3: admin approves the pending application");
    let approved = service.approve(&ravi.id)?;
    print_view(&approved.status_view());

    println!("\nStep 4: a third applicant is rejected after review");
    let meena = service.submit(submission(
        "user-meena",
        "Meena Iyer",
        "uploads/idproof-meena.png",
        "EF9012",
    ))?;
    let rejected = service.reject(&meena.id, Some("Photo mismatch on ID".to_string()))?;
    print_view(&rejected.status_view());

    println!("\nStep 5: expiry sweep six days later");
    let sweep = ExpirySweep::new(
        repository,
        dispatcher.clone(),
        Arc::new(FixedClock(morning_of(today + chrono::Duration::days(6)))),
    );
    match sweep.run() {
        Ok(outcome) => println!(
            "  Scanned {} approved passes, dispatched {} reminders",
            outcome.scanned, outcome.reminded
        ),
        Err(err) => println!("  Sweep unavailable: {err}"),
    }

    for applicant in ["user-asha", "user-ravi", "user-meena"] {
        let recipient = Recipient::User(ApplicantId(applicant.to_string()));
        let inbox = dispatcher
            .fetch_and_mark_read(&recipient)
            .map_err(PassServiceError::from)?;
        println!("\n{applicant} inbox ({} unread):", inbox.len());
        for notification in inbox {
            println!("  - {}", notification.message);
        }
    }

    let stats = service.stats()?;
    println!(
        "\nDashboard: {} total / {} pending / {} approved",
        stats.total, stats.pending, stats.approved
    );

    Ok(())
}
