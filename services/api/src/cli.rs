use crate::demo::{run_demo, DemoArgs};
use crate::infra::{
    notification_label, parse_wire_value, ConfiguredStore, LoggingNotificationSink,
};
use crate::server;
use bloodconnect::config::AppConfig;
use bloodconnect::error::AppError;
use bloodconnect::workflows::eligibility::{
    self, AgeBand, EligibilityAnswers, HealthStatus, WeightBand,
};
use bloodconnect::workflows::registration::{
    Collection, HospitalRegistration, MoreInfoRequest, RegistrationApprovalService,
    RegistrationId, RejectionReason, Reviewer, VerificationChecklist, DEFAULT_INFO_DEADLINE_DAYS,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "BloodConnect",
    about = "Run the BloodConnect coordination service and administer hospital registrations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Check donor eligibility from questionnaire answers
    Eligibility(EligibilityArgs),
    /// Review hospital registrations stored in the data file
    Registrations {
        #[command(subcommand)]
        command: RegistrationCommand,
        /// Registration data file (overrides APP_DATA_PATH)
        #[arg(long, global = true)]
        data_path: Option<PathBuf>,
    },
    /// Run an in-memory walkthrough of the eligibility and approval workflows
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
struct EligibilityArgs {
    /// Age bracket: under-17, 17-65, or over-65
    #[arg(long, value_parser = parse_wire_value::<AgeBand>)]
    age: AgeBand,
    /// Weight bracket: under-50 or 50-plus
    #[arg(long, value_parser = parse_wire_value::<WeightBand>)]
    weight: WeightBand,
    /// Health status: good or issues
    #[arg(long, value_parser = parse_wire_value::<HealthStatus>)]
    health: HealthStatus,
}

#[derive(Subcommand, Debug)]
enum RegistrationCommand {
    /// List registrations in one collection
    List {
        /// pending, active, or rejected
        #[arg(long, default_value = "pending", value_parser = parse_wire_value::<Collection>)]
        status: Collection,
    },
    /// Show a single registration
    Show { registration_id: String },
    /// Approve a pending registration
    Approve {
        registration_id: String,
        /// Number of verification checks on the checklist
        #[arg(long)]
        total_checks: usize,
        /// Number of verification checks completed
        #[arg(long)]
        checked: usize,
        /// Administrator performing the approval
        #[arg(long)]
        reviewer: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Reject a pending registration
    Reject {
        registration_id: String,
        /// invalid-license, incomplete-documents, compliance-issues, verification-failed,
        /// duplicate-registration, or other
        #[arg(long, value_parser = parse_wire_value::<RejectionReason>)]
        reason: Option<RejectionReason>,
        #[arg(long, default_value = "")]
        comments: String,
        #[arg(long)]
        allow_resubmission: bool,
        /// Administrator performing the rejection
        #[arg(long)]
        reviewer: String,
    },
    /// Ask a pending hospital for additional information
    RequestInfo {
        registration_id: String,
        /// Missing item to request (repeatable)
        #[arg(long = "item")]
        items: Vec<String>,
        #[arg(long, default_value = "")]
        requirements: String,
        #[arg(long, default_value_t = DEFAULT_INFO_DEADLINE_DAYS)]
        deadline_days: u32,
        /// Administrator sending the request
        #[arg(long)]
        reviewer: String,
    },
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Eligibility(args) => {
            run_eligibility(args);
            Ok(())
        }
        Command::Registrations { command, data_path } => run_registrations(command, data_path),
        Command::Demo(args) => run_demo(args),
    }
}

fn run_eligibility(args: EligibilityArgs) {
    let result = eligibility::evaluate(&EligibilityAnswers {
        age: args.age,
        weight: args.weight,
        health: args.health,
    });

    println!("Eligibility: {} (score {})", result.summary(), result.score);
    for issue in &result.issues {
        println!("- [{}] {}", issue.kind.label(), issue.message);
        println!("  {}", issue.solution);
    }
}

fn run_registrations(
    command: RegistrationCommand,
    data_path: Option<PathBuf>,
) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = Arc::new(ConfiguredStore::open_file(data_path, &config.storage)?);
    let sink = Arc::new(LoggingNotificationSink::buffered());
    let service = RegistrationApprovalService::new(store, sink.clone());

    match command {
        RegistrationCommand::List { status } => {
            let records = service.list(status)?;
            println!("{} registration(s) in {}", records.len(), status);
            for record in &records {
                print_registration_line(record);
            }
        }
        RegistrationCommand::Show { registration_id } => {
            let record = service.get(&RegistrationId(registration_id))?;
            print_registration_detail(&record);
        }
        RegistrationCommand::Approve {
            registration_id,
            total_checks,
            checked,
            reviewer,
            notes,
        } => {
            let record = service.approve(
                &RegistrationId(registration_id),
                VerificationChecklist::new(total_checks, checked),
                &Reviewer(reviewer),
                notes,
            )?;
            print_registration_detail(&record);
        }
        RegistrationCommand::Reject {
            registration_id,
            reason,
            comments,
            allow_resubmission,
            reviewer,
        } => {
            let record = service.reject(
                &RegistrationId(registration_id),
                reason,
                comments,
                allow_resubmission,
                &Reviewer(reviewer),
            )?;
            print_registration_detail(&record);
        }
        RegistrationCommand::RequestInfo {
            registration_id,
            items,
            requirements,
            deadline_days,
            reviewer,
        } => {
            let request = MoreInfoRequest::new(items, requirements).with_deadline(deadline_days);
            let record = service.request_more_info(
                &RegistrationId(registration_id),
                request,
                &Reviewer(reviewer),
            )?;
            print_registration_detail(&record);
        }
    }

    for notification in sink.take() {
        println!(
            "[{}] {}",
            notification_label(notification.level),
            notification.message
        );
    }
    Ok(())
}

pub(crate) fn print_registration_line(record: &HospitalRegistration) {
    println!(
        "  {:<24} {:<32} {:<14} {}",
        record.registration_id,
        record.hospital_name,
        record.license_number,
        record.decision_rationale()
    );
}

pub(crate) fn print_registration_detail(record: &HospitalRegistration) {
    println!("{} ({})", record.hospital_name, record.registration_id);
    println!("  License: {}", record.license_number);
    println!("  Status: {}", record.status.label());
    println!(
        "  Submitted: {}",
        record.submitted_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!("  Review: {}", record.decision_rationale());
    if let Some(notes) = &record.admin_notes {
        println!("  Notes: {notes}");
    }
    if let Some(comments) = record
        .rejection_comments
        .as_deref()
        .filter(|comments| !comments.is_empty())
    {
        println!("  Comments: {comments}");
    }
    if let Some(request) = &record.info_requested {
        let items: Vec<&str> = request.items.iter().map(String::as_str).collect();
        if !items.is_empty() {
            println!("  Requested items: {}", items.join(", "));
        }
        if !request.requirements.is_empty() {
            println!("  Requirements: {}", request.requirements);
        }
        println!("  Respond by: {}", request.due_on().format("%Y-%m-%d"));
    }
}
