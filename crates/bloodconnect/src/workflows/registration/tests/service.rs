use std::sync::Arc;
use std::thread;

use super::common::*;
use crate::workflows::registration::domain::{RegistrationId, RegistrationStatus, RejectionReason};
use crate::workflows::registration::repository::{
    Collection, NotificationLevel, RegistrationRepository, RepositoryError,
};
use crate::workflows::registration::{
    MoreInfoRequest, RegistrationApprovalService, RegistrationServiceError, ValidationError,
    VerificationChecklist,
};

#[test]
fn register_places_new_hospital_in_pending() {
    let (service, store, notifications) = build_service();

    let record = service
        .register(submission("  Lakeside Clinic ", "HL-100"))
        .expect("registration succeeds");

    assert_eq!(record.status, RegistrationStatus::Pending);
    assert_eq!(record.hospital_name, "Lakeside Clinic");
    assert_eq!(record.submitted_at, fixed_now());
    assert!(record.registration_id.0.starts_with("REG-20250314-"));
    assert_eq!(
        ids_in(&store, Collection::Pending),
        vec![record.registration_id.0.clone()]
    );
    assert_eq!(notifications.events().len(), 1);
}

#[test]
fn register_assigns_distinct_ids() {
    let (service, _, _) = build_service();
    let first = service
        .register(submission("North Hospital", "HL-201"))
        .expect("first registration");
    let second = service
        .register(submission("South Hospital", "HL-202"))
        .expect("second registration");
    assert_ne!(first.registration_id, second.registration_id);
}

#[test]
fn register_rejects_duplicate_license_across_collections() {
    let (service, _, _, record) = service_with_pending();
    service
        .approve(
            &record.registration_id,
            VerificationChecklist::complete(4),
            &reviewer(),
            None,
        )
        .expect("approval succeeds");

    match service.register(submission("City General (again)", "hl-001")) {
        Err(RegistrationServiceError::DuplicateLicense(license)) => assert_eq!(license, "hl-001"),
        other => panic!("expected duplicate license conflict, got {other:?}"),
    }
}

#[test]
fn register_requires_core_fields() {
    let (service, store, _) = build_service();
    let mut incomplete = submission("Hillside Hospital", "HL-300");
    incomplete.contact.email = " ".to_string();

    match service.register(incomplete) {
        Err(RegistrationServiceError::Validation(ValidationError::MissingField(field))) => {
            assert_eq!(field, "contact email")
        }
        other => panic!("expected missing field, got {other:?}"),
    }
    assert!(ids_in(&store, Collection::Pending).is_empty());
}

#[test]
fn approve_with_incomplete_checklist_leaves_registration_pending() {
    let (service, store, notifications, record) = service_with_pending();

    match service.approve(
        &record.registration_id,
        VerificationChecklist::new(4, 3),
        &reviewer(),
        None,
    ) {
        Err(RegistrationServiceError::Validation(ValidationError::IncompleteChecklist {
            checked: 3,
            total: 4,
        })) => {}
        other => panic!("expected incomplete checklist, got {other:?}"),
    }

    let pending = store.load(Collection::Pending).expect("load pending");
    assert_eq!(pending, vec![record]);
    assert!(ids_in(&store, Collection::Active).is_empty());
    assert!(notifications.events().is_empty());
}

#[test]
fn approve_rejects_overcounted_checklist() {
    let (service, _, _, record) = service_with_pending();
    assert!(matches!(
        service.approve(
            &record.registration_id,
            VerificationChecklist::new(3, 4),
            &reviewer(),
            None,
        ),
        Err(RegistrationServiceError::Validation(
            ValidationError::InconsistentChecklist { .. }
        ))
    ));
}

#[test]
fn approve_moves_registration_to_active() {
    let (service, store, notifications, record) = service_with_pending();
    let id = record.registration_id.clone();

    let approved = service
        .approve(
            &id,
            VerificationChecklist::complete(4),
            &reviewer(),
            Some("  License verified with state board ".to_string()),
        )
        .expect("approval succeeds");

    assert_eq!(approved.status, RegistrationStatus::Active);
    assert_eq!(approved.approval_date, Some(fixed_now()));
    assert_eq!(approved.approved_by, Some(reviewer()));
    assert_eq!(
        approved.admin_notes.as_deref(),
        Some("License verified with state board")
    );
    assert!(ids_in(&store, Collection::Pending).is_empty());
    assert_eq!(ids_in(&store, Collection::Active), vec![id.0.clone()]);

    let events = notifications.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].level, NotificationLevel::Success);
    assert_eq!(events[1].level, NotificationLevel::Info);
    assert!(events[1].message.contains("j.lee@hospital.test"));
}

#[test]
fn approve_ignores_blank_notes() {
    let (service, _, _, record) = service_with_pending();
    let approved = service
        .approve(
            &record.registration_id,
            VerificationChecklist::complete(2),
            &reviewer(),
            Some("   ".to_string()),
        )
        .expect("approval succeeds");
    assert!(approved.admin_notes.is_none());
}

#[test]
fn approve_twice_reports_not_found() {
    let (service, store, _, record) = service_with_pending();
    service
        .approve(
            &record.registration_id,
            VerificationChecklist::complete(4),
            &reviewer(),
            None,
        )
        .expect("first approval");

    match service.approve(
        &record.registration_id,
        VerificationChecklist::complete(4),
        &reviewer(),
        None,
    ) {
        Err(RegistrationServiceError::NotFound(id)) => assert_eq!(id, record.registration_id),
        other => panic!("expected not found, got {other:?}"),
    }
    assert_eq!(ids_in(&store, Collection::Active).len(), 1);
}

#[test]
fn approve_requires_reviewer_identity() {
    let (service, _, _, record) = service_with_pending();
    assert!(matches!(
        service.approve(
            &record.registration_id,
            VerificationChecklist::complete(4),
            &crate::workflows::registration::Reviewer::new(""),
            None,
        ),
        Err(RegistrationServiceError::Validation(
            ValidationError::MissingReviewer
        ))
    ));
}

#[test]
fn approve_after_info_request_is_permitted() {
    let (service, store, _, record) = service_with_pending();
    service
        .request_more_info(
            &record.registration_id,
            MoreInfoRequest::new(["Operating license copy"], ""),
            &reviewer(),
        )
        .expect("info request succeeds");

    let approved = service
        .approve(
            &record.registration_id,
            VerificationChecklist::complete(4),
            &reviewer(),
            None,
        )
        .expect("approval still allowed");

    assert!(approved.info_requested.is_some());
    assert_eq!(ids_in(&store, Collection::Active).len(), 1);
}

#[test]
fn reject_moves_registration_with_reason_verbatim() {
    let (service, store, notifications, record) = service_with_pending();

    let rejected = service
        .reject(
            &record.registration_id,
            Some(RejectionReason::InvalidLicense),
            "License number does not match state registry",
            true,
            &reviewer(),
        )
        .expect("rejection succeeds");

    assert_eq!(rejected.status, RegistrationStatus::Rejected);
    assert_eq!(rejected.rejection_reason, Some(RejectionReason::InvalidLicense));
    assert_eq!(rejected.rejection_date, Some(fixed_now()));
    assert_eq!(rejected.allow_resubmission, Some(true));
    assert_eq!(rejected.rejected_by, Some(reviewer()));
    assert!(ids_in(&store, Collection::Pending).is_empty());
    assert_eq!(
        ids_in(&store, Collection::Rejected),
        vec![record.registration_id.0.clone()]
    );

    let stored = serde_json::to_value(&store.load(Collection::Rejected).expect("load")[0])
        .expect("serializes");
    assert_eq!(stored["rejectionReason"], "invalid-license");
    assert_eq!(stored["status"], "REJECTED");

    assert_eq!(notifications.events()[0].level, NotificationLevel::Warning);
}

#[test]
fn reject_without_reason_leaves_registration_pending() {
    let (service, store, _, record) = service_with_pending();

    match service.reject(&record.registration_id, None, "", false, &reviewer()) {
        Err(RegistrationServiceError::Validation(ValidationError::MissingRejectionReason)) => {}
        other => panic!("expected missing reason, got {other:?}"),
    }
    assert_eq!(
        ids_in(&store, Collection::Pending),
        vec![record.registration_id.0]
    );
    assert!(ids_in(&store, Collection::Rejected).is_empty());
}

#[test]
fn reject_unknown_registration_is_not_found() {
    let (service, _, _, _) = service_with_pending();
    assert!(matches!(
        service.reject(
            &RegistrationId("REG-missing".to_string()),
            Some(RejectionReason::Other),
            "",
            false,
            &reviewer(),
        ),
        Err(RegistrationServiceError::NotFound(_))
    ));
}

#[test]
fn request_more_info_requires_items_or_requirements() {
    let (service, store, _, record) = service_with_pending();

    match service.request_more_info(
        &record.registration_id,
        MoreInfoRequest::new(["  ", ""], "   "),
        &reviewer(),
    ) {
        Err(RegistrationServiceError::Validation(ValidationError::EmptyInfoRequest)) => {}
        other => panic!("expected empty info request, got {other:?}"),
    }
    let pending = store.load(Collection::Pending).expect("load pending");
    assert!(pending[0].info_requested.is_none());
}

#[test]
fn request_more_info_with_requirements_only_keeps_pending() {
    let (service, store, notifications, record) = service_with_pending();

    let updated = service
        .request_more_info(
            &record.registration_id,
            MoreInfoRequest::new(Vec::<String>::new(), "Provide blood bank accreditation")
                .with_deadline(14),
            &reviewer(),
        )
        .expect("info request succeeds");

    assert_eq!(updated.status, RegistrationStatus::Pending);
    let info = updated.info_requested.expect("info request attached");
    assert!(info.items.is_empty());
    assert_eq!(info.requirements, "Provide blood bank accreditation");
    assert_eq!(info.deadline, 14);
    assert_eq!(info.date, fixed_now());
    assert_eq!(info.due_on(), fixed_now() + chrono::Duration::days(14));
    assert!(!info.is_overdue(fixed_now()));

    let pending = store.load(Collection::Pending).expect("load pending");
    assert_eq!(pending.len(), 1);
    assert!(pending[0].info_requested.is_some());
    assert_eq!(notifications.events()[0].level, NotificationLevel::Info);
}

#[test]
fn request_more_info_rejects_zero_day_deadline() {
    let (service, _, _, record) = service_with_pending();
    assert!(matches!(
        service.request_more_info(
            &record.registration_id,
            MoreInfoRequest::new(["Tax certificate"], "").with_deadline(0),
            &reviewer(),
        ),
        Err(RegistrationServiceError::Validation(
            ValidationError::InvalidDeadline
        ))
    ));
}

#[test]
fn failed_commit_keeps_record_in_pending() {
    let store = Arc::new(CommitFailingStore::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service =
        RegistrationApprovalService::with_clock(store.clone(), notifications.clone(), fixed_now);
    let record = service
        .register(submission("Riverside Hospital", "HL-400"))
        .expect("registration uses plain save");
    notifications.clear();

    match service.approve(
        &record.registration_id,
        VerificationChecklist::complete(4),
        &reviewer(),
        None,
    ) {
        Err(RegistrationServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository failure, got {other:?}"),
    }

    assert_eq!(ids_in(&store.inner, Collection::Pending).len(), 1);
    assert!(ids_in(&store.inner, Collection::Active).is_empty());
    assert!(notifications.events().is_empty());
}

#[test]
fn notification_failures_do_not_fail_the_operation() {
    let store = Arc::new(crate::workflows::registration::InMemoryRegistrationStore::default());
    let service = RegistrationApprovalService::with_clock(
        store.clone(),
        Arc::new(FailingNotifications),
        fixed_now,
    );

    let record = service
        .register(submission("Harbor Hospital", "HL-500"))
        .expect("registration succeeds");
    service
        .approve(
            &record.registration_id,
            VerificationChecklist::complete(1),
            &reviewer(),
            None,
        )
        .expect("approval succeeds despite notification failure");

    assert_eq!(ids_in(&store, Collection::Active).len(), 1);
}

#[test]
fn get_and_summary_cover_every_collection() {
    let (service, _, _) = build_service();
    let approved = service
        .register(submission("Approved Hospital", "HL-601"))
        .expect("register");
    let rejected = service
        .register(submission("Rejected Hospital", "HL-602"))
        .expect("register");
    let waiting = service
        .register(submission("Waiting Hospital", "HL-603"))
        .expect("register");

    service
        .approve(
            &approved.registration_id,
            VerificationChecklist::complete(4),
            &reviewer(),
            None,
        )
        .expect("approve");
    service
        .reject(
            &rejected.registration_id,
            Some(RejectionReason::DuplicateRegistration),
            "Already registered under HL-601",
            false,
            &reviewer(),
        )
        .expect("reject");
    service
        .request_more_info(
            &waiting.registration_id,
            MoreInfoRequest::new(["Insurance certificate"], ""),
            &reviewer(),
        )
        .expect("request info");

    assert_eq!(
        service
            .get(&approved.registration_id)
            .expect("found")
            .status,
        RegistrationStatus::Active
    );
    assert_eq!(
        service
            .get(&rejected.registration_id)
            .expect("found")
            .decision_rationale(),
        "rejected: duplicate registration"
    );
    assert!(service
        .get(&waiting.registration_id)
        .expect("found")
        .decision_rationale()
        .contains("awaiting information"));

    let summary = service.summary().expect("summary");
    assert_eq!(summary.pending, 1);
    assert_eq!(summary.active, 1);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.awaiting_information, 1);
    assert_eq!(summary.total(), 3);

    assert!(matches!(
        service.get(&RegistrationId("REG-unknown".to_string())),
        Err(RegistrationServiceError::NotFound(_))
    ));
}

#[test]
fn list_surfaces_repository_failures() {
    let service = RegistrationApprovalService::new(
        Arc::new(UnavailableStore),
        Arc::new(MemoryNotifications::default()),
    );
    assert!(matches!(
        service.list(Collection::Active),
        Err(RegistrationServiceError::Repository(_))
    ));
}

#[test]
fn concurrent_decisions_settle_registration_exactly_once() {
    let (service, store, _, record) = service_with_pending();
    let service = Arc::new(service);

    let approver = {
        let service = Arc::clone(&service);
        let id = record.registration_id.clone();
        thread::spawn(move || {
            service.approve(&id, VerificationChecklist::complete(4), &reviewer(), None)
        })
    };
    let rejecter = {
        let service = Arc::clone(&service);
        let id = record.registration_id.clone();
        thread::spawn(move || {
            service.reject(
                &id,
                Some(RejectionReason::VerificationFailed),
                "License registry lookup failed",
                true,
                &reviewer(),
            )
        })
    };

    let approved = approver.join().expect("approver thread");
    let rejected = rejecter.join().expect("rejecter thread");

    assert_eq!(approved.is_ok() as usize + rejected.is_ok() as usize, 1);
    let loser = if approved.is_ok() {
        rejected.map(|_| ())
    } else {
        approved.map(|_| ())
    };
    assert!(matches!(loser, Err(RegistrationServiceError::NotFound(_))));

    assert!(ids_in(&store, Collection::Pending).is_empty());
    assert_eq!(
        ids_in(&store, Collection::Active).len() + ids_in(&store, Collection::Rejected).len(),
        1
    );
}

#[test]
fn move_refuses_id_already_settled_in_other_collection() {
    let (service, store, _, record) = service_with_pending();
    let mut stale = record.clone();
    stale.status = RegistrationStatus::Rejected;
    store
        .save(Collection::Rejected, vec![stale])
        .expect("seed rejected copy");

    match service.approve(
        &record.registration_id,
        VerificationChecklist::complete(4),
        &reviewer(),
        None,
    ) {
        Err(RegistrationServiceError::DuplicateRecord { collection, .. }) => {
            assert_eq!(collection, Collection::Rejected)
        }
        other => panic!("expected duplicate record, got {other:?}"),
    }

    assert_eq!(ids_in(&store, Collection::Pending).len(), 1);
    assert!(ids_in(&store, Collection::Active).is_empty());
}

#[test]
fn summary_never_double_counts_during_moves() {
    let (service, _, _) = build_service();
    let ids: Vec<_> = (0..20)
        .map(|n| {
            service
                .register(submission(&format!("Hospital {n}"), &format!("HL-9{n:02}")))
                .expect("register")
                .registration_id
        })
        .collect();
    let service = Arc::new(service);

    let mover = {
        let service = Arc::clone(&service);
        thread::spawn(move || {
            for id in ids {
                service
                    .approve(&id, VerificationChecklist::complete(1), &reviewer(), None)
                    .expect("approve");
            }
        })
    };

    for _ in 0..200 {
        assert_eq!(service.summary().expect("summary").total(), 20);
    }
    mover.join().expect("mover thread");
    assert_eq!(service.summary().expect("summary").active, 20);
}
