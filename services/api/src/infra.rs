use bloodconnect::config::{ConfigError, StorageConfig};
use bloodconnect::error::AppError;
use bloodconnect::workflows::registration::{
    Collection, CollectionWrite, HospitalRegistration, InMemoryRegistrationStore, JsonFileStore,
    Notification, NotificationLevel, NotificationSink, NotifyError, RegistrationRepository,
    RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Registration storage chosen from configuration.
pub(crate) enum ConfiguredStore {
    Memory(InMemoryRegistrationStore),
    File(JsonFileStore),
}

impl ConfiguredStore {
    pub(crate) fn open(storage: &StorageConfig) -> Result<Self, RepositoryError> {
        match &storage.data_path {
            Some(path) => {
                info!(path = %path.display(), "using file-backed registration store");
                Ok(Self::File(JsonFileStore::open(path)?))
            }
            None => {
                warn!("APP_DATA_PATH not set; registrations are kept in memory only");
                Ok(Self::Memory(InMemoryRegistrationStore::default()))
            }
        }
    }

    /// Open the file store a CLI command operates on, preferring the flag over configuration.
    pub(crate) fn open_file(
        flag: Option<PathBuf>,
        storage: &StorageConfig,
    ) -> Result<Self, AppError> {
        let path = flag
            .or_else(|| storage.data_path.clone())
            .ok_or(ConfigError::MissingDataPath)?;
        Ok(Self::File(JsonFileStore::open(path)?))
    }
}

impl RegistrationRepository for ConfiguredStore {
    fn load(&self, collection: Collection) -> Result<Vec<HospitalRegistration>, RepositoryError> {
        match self {
            Self::Memory(store) => store.load(collection),
            Self::File(store) => store.load(collection),
        }
    }

    fn save(
        &self,
        collection: Collection,
        records: Vec<HospitalRegistration>,
    ) -> Result<(), RepositoryError> {
        match self {
            Self::Memory(store) => store.save(collection, records),
            Self::File(store) => store.save(collection, records),
        }
    }

    fn commit(&self, writes: Vec<CollectionWrite>) -> Result<(), RepositoryError> {
        match self {
            Self::Memory(store) => store.commit(writes),
            Self::File(store) => store.commit(writes),
        }
    }
}

/// Sink that logs every notification and, for CLI runs, keeps them for printing.
pub(crate) struct LoggingNotificationSink {
    retain: bool,
    events: Mutex<Vec<Notification>>,
}

impl LoggingNotificationSink {
    pub(crate) fn buffered() -> Self {
        Self {
            retain: true,
            events: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn log_only() -> Self {
        Self {
            retain: false,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Drain collected notifications in the order they were raised.
    pub(crate) fn take(&self) -> Vec<Notification> {
        match self.events.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => Vec::new(),
        }
    }
}

impl NotificationSink for LoggingNotificationSink {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        match notification.level {
            NotificationLevel::Error | NotificationLevel::Warning => {
                warn!(level = ?notification.level, message = %notification.message, "notification")
            }
            NotificationLevel::Success | NotificationLevel::Info => {
                info!(level = ?notification.level, message = %notification.message, "notification")
            }
        }
        if self.retain {
            self.events
                .lock()
                .map_err(|_| NotifyError::Transport("notification buffer poisoned".to_string()))?
                .push(notification);
        }
        Ok(())
    }
}

pub(crate) fn notification_label(level: NotificationLevel) -> &'static str {
    match level {
        NotificationLevel::Success => "success",
        NotificationLevel::Error => "error",
        NotificationLevel::Warning => "warning",
        NotificationLevel::Info => "info",
    }
}

/// Parse a CLI value using the same spelling the JSON API accepts.
pub(crate) fn parse_wire_value<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
        .map_err(|err| format!("'{raw}' is not an accepted value ({err})"))
}
