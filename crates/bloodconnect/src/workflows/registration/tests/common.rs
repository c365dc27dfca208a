use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::registration::domain::{
    AdministratorDetails, ContactDetails, HospitalRegistration, RegistrationSubmission, Reviewer,
};
use crate::workflows::registration::repository::{
    Collection, CollectionWrite, Notification, NotificationSink, NotifyError,
    RegistrationRepository, RepositoryError,
};
use crate::workflows::registration::store::InMemoryRegistrationStore;
use crate::workflows::registration::{registration_router, RegistrationApprovalService};

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn reviewer() -> Reviewer {
    Reviewer::new("admin@bloodconnect.org")
}

pub(super) fn submission(name: &str, license: &str) -> RegistrationSubmission {
    RegistrationSubmission {
        hospital_name: name.to_string(),
        license_number: license.to_string(),
        contact: ContactDetails {
            email: "contact@hospital.test".to_string(),
            phone: "+1-555-0100".to_string(),
            address: "1 Main Street".to_string(),
            city: "Springfield".to_string(),
        },
        administrator: AdministratorDetails {
            name: "Dr. Jordan Lee".to_string(),
            email: "j.lee@hospital.test".to_string(),
            phone: "+1-555-0199".to_string(),
        },
    }
}

pub(super) type TestService =
    RegistrationApprovalService<InMemoryRegistrationStore, MemoryNotifications>;

pub(super) fn build_service() -> (
    TestService,
    Arc<InMemoryRegistrationStore>,
    Arc<MemoryNotifications>,
) {
    let store = Arc::new(InMemoryRegistrationStore::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service =
        RegistrationApprovalService::with_clock(store.clone(), notifications.clone(), fixed_now);
    (service, store, notifications)
}

/// Service with one pending registration already on file.
pub(super) fn service_with_pending() -> (
    TestService,
    Arc<InMemoryRegistrationStore>,
    Arc<MemoryNotifications>,
    HospitalRegistration,
) {
    let (service, store, notifications) = build_service();
    let record = service
        .register(submission("City General Hospital", "HL-001"))
        .expect("registration succeeds");
    notifications.clear();
    (service, store, notifications, record)
}

pub(super) fn ids_in(store: &InMemoryRegistrationStore, collection: Collection) -> Vec<String> {
    store
        .load(collection)
        .expect("load succeeds")
        .into_iter()
        .map(|record| record.registration_id.0)
        .collect()
}

#[derive(Default)]
pub(super) struct MemoryNotifications {
    events: Mutex<Vec<Notification>>,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notification mutex poisoned").clone()
    }

    pub(super) fn clear(&self) {
        self.events.lock().expect("notification mutex poisoned").clear();
    }
}

impl NotificationSink for MemoryNotifications {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct FailingNotifications;

impl NotificationSink for FailingNotifications {
    fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp relay offline".to_string()))
    }
}

/// Accepts single-collection saves but refuses multi-collection commits.
#[derive(Default)]
pub(super) struct CommitFailingStore {
    pub(super) inner: InMemoryRegistrationStore,
}

impl RegistrationRepository for CommitFailingStore {
    fn load(&self, collection: Collection) -> Result<Vec<HospitalRegistration>, RepositoryError> {
        self.inner.load(collection)
    }

    fn save(
        &self,
        collection: Collection,
        records: Vec<HospitalRegistration>,
    ) -> Result<(), RepositoryError> {
        self.inner.save(collection, records)
    }

    fn commit(&self, _writes: Vec<CollectionWrite>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }
}

pub(super) struct UnavailableStore;

impl RegistrationRepository for UnavailableStore {
    fn load(&self, _collection: Collection) -> Result<Vec<HospitalRegistration>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn save(
        &self,
        _collection: Collection,
        _records: Vec<HospitalRegistration>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    registration_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
