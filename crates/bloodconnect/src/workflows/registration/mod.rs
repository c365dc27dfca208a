//! Hospital registration review: approval, rejection, and information requests over the
//! pending, active, and rejected registration collections.

pub mod checklist;
pub mod domain;
pub mod repository;
pub mod router;
pub mod seed;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use checklist::VerificationChecklist;
pub use domain::{
    AdministratorDetails, ContactDetails, HospitalRegistration, InfoRequest, RegistrationId,
    RegistrationStatus, RegistrationSubmission, RejectionReason, Reviewer,
    UnknownRejectionReason,
};
pub use repository::{
    Collection, CollectionWrite, Notification, NotificationLevel, NotificationSink, NotifyError,
    RegistrationRepository, RegistrationSummary, RepositoryError,
};
pub use router::registration_router;
pub use service::{
    MoreInfoRequest, RegistrationApprovalService, RegistrationServiceError, ValidationError,
    DEFAULT_INFO_DEADLINE_DAYS,
};
pub use store::{InMemoryRegistrationStore, JsonFileStore};
