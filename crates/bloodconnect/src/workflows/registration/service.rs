use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::checklist::VerificationChecklist;
use super::domain::{
    HospitalRegistration, InfoRequest, RegistrationId, RegistrationStatus,
    RegistrationSubmission, RejectionDecision, RejectionReason, Reviewer, UnknownRejectionReason,
};
use super::repository::{
    Collection, Notification, NotificationLevel, NotificationSink, RegistrationRepository,
    RegistrationSummary, RepositoryError,
};

/// Default number of days a hospital gets to answer an information request.
pub const DEFAULT_INFO_DEADLINE_DAYS: u32 = 7;

static REGISTRATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_registration_id(now: DateTime<Utc>) -> RegistrationId {
    let id = REGISTRATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RegistrationId(format!("REG-{}-{id:06}", now.format("%Y%m%d")))
}

/// Documents or clarifications an administrator asks a pending hospital for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoreInfoRequest {
    pub items: BTreeSet<String>,
    pub requirements: String,
    pub deadline_days: u32,
}

impl MoreInfoRequest {
    pub fn new<I, S>(items: I, requirements: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            requirements: requirements.into(),
            deadline_days: DEFAULT_INFO_DEADLINE_DAYS,
        }
    }

    pub fn with_deadline(mut self, days: u32) -> Self {
        self.deadline_days = days;
        self
    }
}

/// Approval workflow over the pending, active, and rejected registration collections.
///
/// Every mutation runs its load, change, and save steps under one writer lock and
/// notifies only after the change is persisted.
pub struct RegistrationApprovalService<R, N> {
    repository: Arc<R>,
    notifications: Arc<N>,
    write_lock: Mutex<()>,
    clock: fn() -> DateTime<Utc>,
}

impl<R, N> RegistrationApprovalService<R, N>
where
    R: RegistrationRepository + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(repository: Arc<R>, notifications: Arc<N>) -> Self {
        Self::with_clock(repository, notifications, Utc::now)
    }

    pub fn with_clock(
        repository: Arc<R>,
        notifications: Arc<N>,
        clock: fn() -> DateTime<Utc>,
    ) -> Self {
        Self {
            repository,
            notifications,
            write_lock: Mutex::new(()),
            clock,
        }
    }

    /// Record a new hospital sign-up in the pending collection.
    pub fn register(
        &self,
        submission: RegistrationSubmission,
    ) -> Result<HospitalRegistration, RegistrationServiceError> {
        require("hospital name", &submission.hospital_name)?;
        require("license number", &submission.license_number)?;
        require("contact email", &submission.contact.email)?;
        require("administrator name", &submission.administrator.name)?;

        let now = (self.clock)();
        let record = {
            let _guard = self.writer()?;

            let mut known_ids = BTreeSet::new();
            for collection in Collection::ordered() {
                for existing in self.repository.load(collection)? {
                    if existing
                        .license_number
                        .trim()
                        .eq_ignore_ascii_case(submission.license_number.trim())
                    {
                        return Err(RegistrationServiceError::DuplicateLicense(
                            submission.license_number.trim().to_string(),
                        ));
                    }
                    known_ids.insert(existing.registration_id);
                }
            }

            let mut registration_id = next_registration_id(now);
            while known_ids.contains(&registration_id) {
                registration_id = next_registration_id(now);
            }

            let record = HospitalRegistration {
                registration_id,
                hospital_name: submission.hospital_name.trim().to_string(),
                license_number: submission.license_number.trim().to_string(),
                contact: submission.contact,
                administrator: submission.administrator,
                status: RegistrationStatus::Pending,
                submitted_at: now,
                approval_date: None,
                approved_by: None,
                rejection_date: None,
                rejection_reason: None,
                rejection_comments: None,
                allow_resubmission: None,
                rejected_by: None,
                admin_notes: None,
                info_requested: None,
            };

            let mut pending = self.repository.load(Collection::Pending)?;
            pending.push(record.clone());
            self.repository.save(Collection::Pending, pending)?;
            record
        };

        info!(registration_id = %record.registration_id, hospital = %record.hospital_name, "hospital registration received");
        self.notify(
            format!("Registration received for {}", record.hospital_name),
            NotificationLevel::Info,
        );
        Ok(record)
    }

    /// Approve a pending registration once every verification check has passed.
    pub fn approve(
        &self,
        registration_id: &RegistrationId,
        checklist: VerificationChecklist,
        approved_by: &Reviewer,
        notes: Option<String>,
    ) -> Result<HospitalRegistration, RegistrationServiceError> {
        require_reviewer(approved_by)?;
        if !checklist.is_consistent() {
            return Err(ValidationError::InconsistentChecklist {
                checked: checklist.checked,
                total: checklist.total,
            }
            .into());
        }
        if !checklist.is_complete() {
            return Err(ValidationError::IncompleteChecklist {
                checked: checklist.checked,
                total: checklist.total,
            }
            .into());
        }

        let notes = notes
            .map(|notes| notes.trim().to_string())
            .filter(|notes| !notes.is_empty());
        let now = (self.clock)();
        let record = self.move_pending(registration_id, Collection::Active, |record| {
            record.mark_approved(approved_by, now, notes)
        })?;

        info!(registration_id = %registration_id, reviewer = %approved_by, "hospital registration approved");
        self.notify(
            format!("{} has been approved", record.hospital_name),
            NotificationLevel::Success,
        );
        let recipient = if record.administrator.email.trim().is_empty() {
            &record.contact.email
        } else {
            &record.administrator.email
        };
        self.notify(
            format!("Approval email sent to {recipient}"),
            NotificationLevel::Info,
        );
        Ok(record)
    }

    /// Reject a pending registration for one of the fixed rejection reasons.
    pub fn reject(
        &self,
        registration_id: &RegistrationId,
        reason: Option<RejectionReason>,
        comments: impl Into<String>,
        allow_resubmission: bool,
        rejected_by: &Reviewer,
    ) -> Result<HospitalRegistration, RegistrationServiceError> {
        require_reviewer(rejected_by)?;
        let reason = reason.ok_or(ValidationError::MissingRejectionReason)?;

        let decision = RejectionDecision {
            reason,
            comments: comments.into().trim().to_string(),
            allow_resubmission,
            rejected_by: rejected_by.clone(),
        };
        let now = (self.clock)();
        let record = self.move_pending(registration_id, Collection::Rejected, |record| {
            record.mark_rejected(decision, now)
        })?;

        info!(registration_id = %registration_id, reviewer = %rejected_by, %reason, allow_resubmission, "hospital registration rejected");
        self.notify(
            format!("{} registration has been rejected", record.hospital_name),
            NotificationLevel::Warning,
        );
        Ok(record)
    }

    /// Attach an information request to a pending registration without changing its status.
    pub fn request_more_info(
        &self,
        registration_id: &RegistrationId,
        request: MoreInfoRequest,
        requested_by: &Reviewer,
    ) -> Result<HospitalRegistration, RegistrationServiceError> {
        require_reviewer(requested_by)?;

        let items: BTreeSet<String> = request
            .items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        let requirements = request.requirements.trim().to_string();
        if items.is_empty() && requirements.is_empty() {
            return Err(ValidationError::EmptyInfoRequest.into());
        }
        if request.deadline_days == 0 {
            return Err(ValidationError::InvalidDeadline.into());
        }

        let now = (self.clock)();
        let record = {
            let _guard = self.writer()?;
            let mut pending = self.repository.load(Collection::Pending)?;
            let record = pending
                .iter_mut()
                .find(|record| &record.registration_id == registration_id)
                .ok_or_else(|| RegistrationServiceError::NotFound(registration_id.clone()))?;

            record.info_requested = Some(InfoRequest {
                date: now,
                items,
                requirements,
                deadline: request.deadline_days,
                requested_by: requested_by.clone(),
            });
            let updated = record.clone();
            self.repository.save(Collection::Pending, pending)?;
            updated
        };

        info!(registration_id = %registration_id, reviewer = %requested_by, deadline_days = request.deadline_days, "additional information requested");
        self.notify(
            format!("Information request sent to {}", record.hospital_name),
            NotificationLevel::Info,
        );
        Ok(record)
    }

    /// Look a registration up in whichever collection currently holds it.
    pub fn get(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<HospitalRegistration, RegistrationServiceError> {
        for collection in Collection::ordered() {
            if let Some(record) = self
                .repository
                .load(collection)?
                .into_iter()
                .find(|record| &record.registration_id == registration_id)
            {
                return Ok(record);
            }
        }
        Err(RegistrationServiceError::NotFound(registration_id.clone()))
    }

    pub fn list(
        &self,
        collection: Collection,
    ) -> Result<Vec<HospitalRegistration>, RegistrationServiceError> {
        Ok(self.repository.load(collection)?)
    }

    /// Counts are read under the writer lock so a concurrent move is never counted twice.
    pub fn summary(&self) -> Result<RegistrationSummary, RegistrationServiceError> {
        let _guard = self.writer()?;
        let pending = self.repository.load(Collection::Pending)?;
        Ok(RegistrationSummary {
            awaiting_information: pending
                .iter()
                .filter(|record| record.info_requested.is_some())
                .count(),
            pending: pending.len(),
            active: self.repository.load(Collection::Active)?.len(),
            rejected: self.repository.load(Collection::Rejected)?.len(),
        })
    }

    /// Remove a record from `pending`, apply `update`, append it to `destination`, and
    /// persist both collections in one commit.
    fn move_pending<F>(
        &self,
        registration_id: &RegistrationId,
        destination: Collection,
        update: F,
    ) -> Result<HospitalRegistration, RegistrationServiceError>
    where
        F: FnOnce(&mut HospitalRegistration),
    {
        let _guard = self.writer()?;

        let mut pending = self.repository.load(Collection::Pending)?;
        let position = pending
            .iter()
            .position(|record| &record.registration_id == registration_id)
            .ok_or_else(|| RegistrationServiceError::NotFound(registration_id.clone()))?;

        // An id already settled in either terminal collection must not be moved again.
        let mut target = Vec::new();
        for collection in Collection::ordered() {
            if collection == Collection::Pending {
                continue;
            }
            let records = self.repository.load(collection)?;
            if records
                .iter()
                .any(|record| &record.registration_id == registration_id)
            {
                return Err(RegistrationServiceError::DuplicateRecord {
                    registration_id: registration_id.clone(),
                    collection,
                });
            }
            if collection == destination {
                target = records;
            }
        }

        let mut record = pending.remove(position);
        update(&mut record);
        debug_assert_eq!(record.status, destination.status());
        target.push(record.clone());

        self.repository
            .commit(vec![(Collection::Pending, pending), (destination, target)])?;
        Ok(record)
    }

    fn writer(&self) -> Result<MutexGuard<'_, ()>, RegistrationServiceError> {
        self.write_lock.lock().map_err(|_| {
            RepositoryError::Unavailable("registration writer lock poisoned".to_string()).into()
        })
    }

    fn notify(&self, message: String, level: NotificationLevel) {
        if let Err(err) = self.notifications.notify(Notification::new(message, level)) {
            warn!(error = %err, "notification dropped");
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

fn require_reviewer(reviewer: &Reviewer) -> Result<(), ValidationError> {
    if reviewer.is_blank() {
        Err(ValidationError::MissingReviewer)
    } else {
        Ok(())
    }
}

/// Input rejected before any registration is touched.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("verification checklist incomplete: {checked} of {total} checks completed")]
    IncompleteChecklist { checked: usize, total: usize },
    #[error("verification checklist reports {checked} checked out of {total}")]
    InconsistentChecklist { checked: usize, total: usize },
    #[error("a rejection reason must be selected")]
    MissingRejectionReason,
    #[error(transparent)]
    UnknownRejectionReason(#[from] UnknownRejectionReason),
    #[error("select at least one missing item or describe the additional requirements")]
    EmptyInfoRequest,
    #[error("response deadline must be at least one day")]
    InvalidDeadline,
    #[error("reviewer identity is required")]
    MissingReviewer,
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Error raised by the registration approval service.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("registration {0} not found")]
    NotFound(RegistrationId),
    #[error("a registration with license {0} already exists")]
    DuplicateLicense(String),
    #[error("registration {registration_id} already present in {collection}")]
    DuplicateRecord {
        registration_id: RegistrationId,
        collection: Collection,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
