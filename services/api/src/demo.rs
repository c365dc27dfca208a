use crate::cli::{print_registration_detail, print_registration_line};
use crate::infra::{notification_label, LoggingNotificationSink};
use bloodconnect::error::AppError;
use bloodconnect::workflows::eligibility::{
    self, AgeBand, EligibilityAnswers, HealthStatus, WeightBand,
};
use bloodconnect::workflows::registration::seed::demo_submissions;
use bloodconnect::workflows::registration::{
    Collection, InMemoryRegistrationStore, MoreInfoRequest, RegistrationApprovalService,
    RejectionReason, Reviewer, VerificationChecklist,
};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Administrator name recorded on review actions.
    #[arg(long, default_value = "demo-admin")]
    pub(crate) reviewer: String,
    /// Skip the donor eligibility portion of the demo.
    #[arg(long)]
    pub(crate) skip_eligibility: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        reviewer,
        skip_eligibility,
    } = args;

    println!("BloodConnect workflow demo");

    if !skip_eligibility {
        println!("\nDonor eligibility checks");
        for answers in sample_answers() {
            let result = eligibility::evaluate(&answers);
            println!(
                "- age {:?}, weight {:?}, health {:?}: {} (score {})",
                answers.age,
                answers.weight,
                answers.health,
                result.summary(),
                result.score
            );
        }
    }

    let store = Arc::new(InMemoryRegistrationStore::default());
    let sink = Arc::new(LoggingNotificationSink::buffered());
    let service = RegistrationApprovalService::new(store, sink.clone());
    let reviewer = Reviewer(reviewer);

    let registered = demo_submissions()
        .into_iter()
        .map(|submission| service.register(submission))
        .collect::<Result<Vec<_>, _>>()?;
    sink.take();

    println!("\nPending hospital registrations");
    for record in &registered {
        print_registration_line(record);
    }

    let Some([first, second, third]) = registered.get(0..3) else {
        return Ok(());
    };

    println!("\nApproving with an incomplete checklist (3 of 4)");
    match service.approve(
        &first.registration_id,
        VerificationChecklist::new(4, 3),
        &reviewer,
        None,
    ) {
        Ok(_) => println!("  unexpected approval"),
        Err(err) => println!("  refused: {err}"),
    }

    println!("\nReview decisions");
    let approved = service.approve(
        &first.registration_id,
        VerificationChecklist::complete(4),
        &reviewer,
        Some("License confirmed with the state health board".to_string()),
    )?;
    print_registration_detail(&approved);

    let rejected = service.reject(
        &second.registration_id,
        Some(RejectionReason::IncompleteDocuments),
        "Blood storage certification missing",
        true,
        &reviewer,
    )?;
    print_registration_detail(&rejected);

    let waiting = service.request_more_info(
        &third.registration_id,
        MoreInfoRequest::new(
            ["Operating license", "Blood bank accreditation"],
            "Provide the name of the transfusion officer",
        ),
        &reviewer,
    )?;
    print_registration_detail(&waiting);

    println!("\nNotifications");
    for notification in sink.take() {
        println!(
            "  [{}] {}",
            notification_label(notification.level),
            notification.message
        );
    }

    let summary = service.summary()?;
    println!(
        "\nCollections: {} pending ({} awaiting information), {} active, {} rejected",
        summary.pending, summary.awaiting_information, summary.active, summary.rejected
    );
    for collection in Collection::ordered() {
        println!("  {collection}: {}", service.list(collection)?.len());
    }

    Ok(())
}

fn sample_answers() -> Vec<EligibilityAnswers> {
    vec![
        EligibilityAnswers {
            age: AgeBand::Adult,
            weight: WeightBand::FiftyPlus,
            health: HealthStatus::Good,
        },
        EligibilityAnswers {
            age: AgeBand::Over65,
            weight: WeightBand::FiftyPlus,
            health: HealthStatus::Good,
        },
        EligibilityAnswers {
            age: AgeBand::Adult,
            weight: WeightBand::Under50,
            health: HealthStatus::Issues,
        },
    ]
}
