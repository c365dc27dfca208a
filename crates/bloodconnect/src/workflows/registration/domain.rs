use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned to a hospital when it registers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(pub String);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Identity of the administrator performing a review action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reviewer(pub String);

impl Reviewer {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Reviewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Pending,
    Active,
    Rejected,
}

impl RegistrationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "PENDING",
            RegistrationStatus::Active => "ACTIVE",
            RegistrationStatus::Rejected => "REJECTED",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, RegistrationStatus::Pending)
    }
}

/// Fixed set of grounds an administrator may cite when rejecting a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    InvalidLicense,
    IncompleteDocuments,
    ComplianceIssues,
    VerificationFailed,
    DuplicateRegistration,
    Other,
}

impl RejectionReason {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::InvalidLicense,
            Self::IncompleteDocuments,
            Self::ComplianceIssues,
            Self::VerificationFailed,
            Self::DuplicateRegistration,
            Self::Other,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidLicense => "invalid-license",
            Self::IncompleteDocuments => "incomplete-documents",
            Self::ComplianceIssues => "compliance-issues",
            Self::VerificationFailed => "verification-failed",
            Self::DuplicateRegistration => "duplicate-registration",
            Self::Other => "other",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::InvalidLicense => "Invalid or expired license",
            Self::IncompleteDocuments => "Incomplete documentation",
            Self::ComplianceIssues => "Regulatory compliance issues",
            Self::VerificationFailed => "Verification failed",
            Self::DuplicateRegistration => "Duplicate registration",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rejection reason '{0}'")]
pub struct UnknownRejectionReason(pub String);

impl FromStr for RejectionReason {
    type Err = UnknownRejectionReason;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let needle = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|reason| reason.code() == needle)
            .ok_or_else(|| UnknownRejectionReason(raw.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministratorDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Outstanding request for additional documents sent to a pending hospital.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoRequest {
    pub date: DateTime<Utc>,
    pub items: BTreeSet<String>,
    pub requirements: String,
    /// Days the hospital has to respond.
    pub deadline: u32,
    pub requested_by: Reviewer,
}

impl InfoRequest {
    pub fn due_on(&self) -> DateTime<Utc> {
        self.date + Duration::days(i64::from(self.deadline))
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.due_on()
    }
}

/// Hospital account record as persisted in the registration collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalRegistration {
    pub registration_id: RegistrationId,
    pub hospital_name: String,
    pub license_number: String,
    #[serde(default)]
    pub contact: ContactDetails,
    #[serde(default)]
    pub administrator: AdministratorDetails,
    pub status: RegistrationStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<Reviewer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_resubmission: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<Reviewer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_requested: Option<InfoRequest>,
}

impl HospitalRegistration {
    pub(crate) fn mark_approved(
        &mut self,
        reviewer: &Reviewer,
        now: DateTime<Utc>,
        notes: Option<String>,
    ) {
        self.status = RegistrationStatus::Active;
        self.approval_date = Some(now);
        self.approved_by = Some(reviewer.clone());
        if let Some(notes) = notes {
            self.admin_notes = Some(notes);
        }
    }

    pub(crate) fn mark_rejected(&mut self, decision: RejectionDecision, now: DateTime<Utc>) {
        self.status = RegistrationStatus::Rejected;
        self.rejection_date = Some(now);
        self.rejection_reason = Some(decision.reason);
        self.rejection_comments = Some(decision.comments);
        self.allow_resubmission = Some(decision.allow_resubmission);
        self.rejected_by = Some(decision.rejected_by);
    }

    pub fn decision_rationale(&self) -> String {
        match self.status {
            RegistrationStatus::Pending => match &self.info_requested {
                Some(request) => format!(
                    "awaiting information requested by {} (due {})",
                    request.requested_by,
                    request.due_on().format("%Y-%m-%d")
                ),
                None => "awaiting review".to_string(),
            },
            RegistrationStatus::Active => match &self.approved_by {
                Some(reviewer) => format!("approved by {reviewer}"),
                None => "approved".to_string(),
            },
            RegistrationStatus::Rejected => match self.rejection_reason {
                Some(reason) => format!("rejected: {}", reason.label().to_lowercase()),
                None => "rejected".to_string(),
            },
        }
    }
}

/// Validated rejection payload applied to a pending registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RejectionDecision {
    pub reason: RejectionReason,
    pub comments: String,
    pub allow_resubmission: bool,
    pub rejected_by: Reviewer,
}

/// Details a hospital supplies when it signs up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationSubmission {
    pub hospital_name: String,
    pub license_number: String,
    #[serde(default)]
    pub contact: ContactDetails,
    #[serde(default)]
    pub administrator: AdministratorDetails,
}
