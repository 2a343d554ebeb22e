use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use trait_survey::assessment::{
    Questionnaire, QuestionnaireId, QuestionnaireRepository, RepositoryError, ResultId,
    ResultRepository, SurveyResult, SurveyService,
};
use trait_survey::config::{DataSourceKind, StorageConfig};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type QuestionnaireStore = Collection<Questionnaire>;
pub(crate) type ResultStore = Collection<SurveyResult>;
pub(crate) type AppSurveyService = SurveyService<QuestionnaireStore, ResultStore>;

/// A stored record addressable by a unique key.
pub(crate) trait Keyed: Clone + Serialize + DeserializeOwned + Send {
    type Key: PartialEq;

    fn key(&self) -> &Self::Key;
}

impl Keyed for Questionnaire {
    type Key = QuestionnaireId;

    fn key(&self) -> &QuestionnaireId {
        &self.id
    }
}

impl Keyed for SurveyResult {
    type Key = ResultId;

    fn key(&self) -> &ResultId {
        self.id()
    }
}

/// Ordered record collection held in memory and optionally mirrored to a JSON file.
///
/// Every mutation is applied to a copy, written out, and only then swapped in, so a
/// failed write leaves both the file and the in-memory view untouched.
pub(crate) struct Collection<T> {
    records: Mutex<Vec<T>>,
    file: Option<PathBuf>,
}

impl<T: Keyed> Collection<T> {
    pub(crate) fn in_memory() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            file: None,
        }
    }

    /// Open a file-backed collection, reading existing records if the file exists.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let records = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|err| unavailable(&path, err))?;
            serde_json::from_str(&raw).map_err(|err| unavailable(&path, err))?
        } else {
            Vec::new()
        };

        Ok(Self {
            records: Mutex::new(records),
            file: Some(path),
        })
    }

    pub(crate) fn all(&self) -> Result<Vec<T>, RepositoryError> {
        Ok(self.lock()?.clone())
    }

    pub(crate) fn find(&self, key: &T::Key) -> Result<Option<T>, RepositoryError> {
        Ok(self.lock()?.iter().find(|record| record.key() == key).cloned())
    }

    pub(crate) fn upsert(&self, record: T) -> Result<T, RepositoryError> {
        let mut guard = self.lock()?;
        let mut next = guard.clone();
        match next.iter_mut().find(|existing| existing.key() == record.key()) {
            Some(existing) => *existing = record.clone(),
            None => next.push(record.clone()),
        }
        self.commit(&mut guard, next)?;
        Ok(record)
    }

    pub(crate) fn insert(&self, record: T) -> Result<T, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.iter().any(|existing| existing.key() == record.key()) {
            return Err(RepositoryError::Conflict);
        }
        let mut next = guard.clone();
        next.push(record.clone());
        self.commit(&mut guard, next)?;
        Ok(record)
    }

    pub(crate) fn remove(&self, key: &T::Key) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let mut next = guard.clone();
        let before = next.len();
        next.retain(|record| record.key() != key);
        if next.len() == before {
            return Err(RepositoryError::NotFound);
        }
        self.commit(&mut guard, next)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<T>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("collection mutex poisoned".to_string()))
    }

    fn commit(&self, guard: &mut MutexGuard<'_, Vec<T>>, next: Vec<T>) -> Result<(), RepositoryError> {
        if let Some(path) = &self.file {
            write_atomically(path, &next)?;
        }
        **guard = next;
        Ok(())
    }
}

fn write_atomically<T: Serialize>(path: &Path, records: &[T]) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| unavailable(path, err))?;
    }
    let document = serde_json::to_vec_pretty(records).map_err(|err| unavailable(path, err))?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, document).map_err(|err| unavailable(&staging, err))?;
    fs::rename(&staging, path).map_err(|err| unavailable(path, err))
}

fn unavailable(path: &Path, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Unavailable(format!("{}: {err}", path.display()))
}

impl QuestionnaireRepository for Collection<Questionnaire> {
    fn list(&self) -> Result<Vec<Questionnaire>, RepositoryError> {
        self.all()
    }

    fn fetch(&self, id: &QuestionnaireId) -> Result<Option<Questionnaire>, RepositoryError> {
        self.find(id)
    }

    fn save(&self, questionnaire: Questionnaire) -> Result<Questionnaire, RepositoryError> {
        self.upsert(questionnaire)
    }

    fn delete(&self, id: &QuestionnaireId) -> Result<(), RepositoryError> {
        self.remove(id)
    }
}

impl ResultRepository for Collection<SurveyResult> {
    fn list(&self) -> Result<Vec<SurveyResult>, RepositoryError> {
        self.all()
    }

    fn fetch(&self, id: &ResultId) -> Result<Option<SurveyResult>, RepositoryError> {
        self.find(id)
    }

    fn insert(&self, result: SurveyResult) -> Result<SurveyResult, RepositoryError> {
        Collection::insert(self, result)
    }

    fn delete(&self, id: &ResultId) -> Result<(), RepositoryError> {
        self.remove(id)
    }
}

/// Build the questionnaire and result stores for the configured data source.
pub(crate) fn open_stores(
    storage: &StorageConfig,
) -> Result<(Arc<QuestionnaireStore>, Arc<ResultStore>), RepositoryError> {
    match storage.data_source {
        DataSourceKind::Memory => Ok((
            Arc::new(Collection::in_memory()),
            Arc::new(Collection::in_memory()),
        )),
        DataSourceKind::File => Ok((
            Arc::new(Collection::open(storage.data_dir.join("questionnaires.json"))?),
            Arc::new(Collection::open(storage.data_dir.join("results.json"))?),
        )),
    }
}

pub(crate) fn parse_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    serde_json::from_str(&raw).map_err(|err| format!("failed to parse {}: {err}", path.display()))
}
