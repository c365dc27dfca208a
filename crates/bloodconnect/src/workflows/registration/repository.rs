use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{HospitalRegistration, RegistrationStatus};

/// One of the three disjoint collections partitioning registrations by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Pending,
    Active,
    Rejected,
}

impl Collection {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pending, Self::Active, Self::Rejected]
    }

    /// Key under which the collection is stored.
    pub const fn storage_key(self) -> &'static str {
        match self {
            Collection::Pending => "pendingHospitals",
            Collection::Active => "activeHospitals",
            Collection::Rejected => "rejectedHospitals",
        }
    }

    pub const fn status(self) -> RegistrationStatus {
        match self {
            Collection::Pending => RegistrationStatus::Pending,
            Collection::Active => RegistrationStatus::Active,
            Collection::Rejected => RegistrationStatus::Rejected,
        }
    }

    pub const fn for_status(status: RegistrationStatus) -> Self {
        match status {
            RegistrationStatus::Pending => Collection::Pending,
            RegistrationStatus::Active => Collection::Active,
            RegistrationStatus::Rejected => Collection::Rejected,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// Whole-collection writes applied together by [`RegistrationRepository::commit`].
pub type CollectionWrite = (Collection, Vec<HospitalRegistration>);

/// Storage abstraction over the three registration collections.
///
/// Reads and writes always cover a full collection; there are no partial updates.
pub trait RegistrationRepository: Send + Sync {
    fn load(&self, collection: Collection) -> Result<Vec<HospitalRegistration>, RepositoryError>;

    fn save(
        &self,
        collection: Collection,
        records: Vec<HospitalRegistration>,
    ) -> Result<(), RepositoryError>;

    /// Persist several collections as one unit. Implementations backed by a store that can
    /// fail halfway must override this so either every write lands or none does.
    fn commit(&self, writes: Vec<CollectionWrite>) -> Result<(), RepositoryError> {
        for (collection, records) in writes {
            self.save(collection, records)?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("storage io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored registrations are not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Severity attached to a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }
}

/// Fire-and-forget outlet for workflow notifications (toasts, e-mail relays, audit feeds).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Per-collection counts for the administrator dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistrationSummary {
    pub pending: usize,
    pub active: usize,
    pub rejected: usize,
    pub awaiting_information: usize,
}

impl RegistrationSummary {
    pub fn total(&self) -> usize {
        self.pending + self.active + self.rejected
    }
}
