use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::domain::HospitalRegistration;
use super::repository::{Collection, CollectionWrite, RegistrationRepository, RepositoryError};

type Collections = BTreeMap<Collection, Vec<HospitalRegistration>>;
type Document = BTreeMap<String, Vec<HospitalRegistration>>;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
}

/// Process-local store used by tests, demos, and servers without a data path.
#[derive(Debug, Default)]
pub struct InMemoryRegistrationStore {
    collections: Mutex<Collections>,
}

impl InMemoryRegistrationStore {
    pub fn with_pending(records: Vec<HospitalRegistration>) -> Self {
        let mut collections = Collections::new();
        collections.insert(Collection::Pending, records);
        Self {
            collections: Mutex::new(collections),
        }
    }
}

impl RegistrationRepository for InMemoryRegistrationStore {
    fn load(&self, collection: Collection) -> Result<Vec<HospitalRegistration>, RepositoryError> {
        let guard = lock(&self.collections)?;
        Ok(guard.get(&collection).cloned().unwrap_or_default())
    }

    fn save(
        &self,
        collection: Collection,
        records: Vec<HospitalRegistration>,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.collections)?;
        guard.insert(collection, records);
        Ok(())
    }

    fn commit(&self, writes: Vec<CollectionWrite>) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.collections)?;
        for (collection, records) in writes {
            guard.insert(collection, records);
        }
        Ok(())
    }
}

/// Keeps all three collections in a single JSON document keyed by storage key.
///
/// Writes go to a sibling temp file that is renamed over the document, so a
/// multi-collection commit is visible either completely or not at all.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let store = Self {
            path,
            write_lock: Mutex::new(()),
        };
        // Surface a corrupt document at startup rather than on the first review action.
        store.read_document()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Document, RepositoryError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(Document::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Document::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_document(&self, document: &Document) -> Result<(), RepositoryError> {
        let payload = serde_json::to_vec_pretty(document)?;
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        fs::write(&staging, payload)?;
        fs::rename(&staging, &self.path)?;
        debug!(path = %self.path.display(), "registration document written");
        Ok(())
    }
}

impl RegistrationRepository for JsonFileStore {
    fn load(&self, collection: Collection) -> Result<Vec<HospitalRegistration>, RepositoryError> {
        let mut document = self.read_document()?;
        Ok(document.remove(collection.storage_key()).unwrap_or_default())
    }

    fn save(
        &self,
        collection: Collection,
        records: Vec<HospitalRegistration>,
    ) -> Result<(), RepositoryError> {
        self.commit(vec![(collection, records)])
    }

    fn commit(&self, writes: Vec<CollectionWrite>) -> Result<(), RepositoryError> {
        let _guard = lock(&self.write_lock)?;
        let mut document = self.read_document()?;
        for (collection, records) in writes {
            document.insert(collection.storage_key().to_string(), records);
        }
        self.write_document(&document)
    }
}
