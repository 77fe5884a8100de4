pub mod import;
pub mod mapping;
pub mod records;
pub mod reports;
pub mod servis;
pub mod store;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::models::record::Dataset;
use crate::models::registry::{MappingRegistry, ServisMapping};
use crate::models::report::CategoryStyle;

/// Everything one session works on. Threaded explicitly through every
/// command instead of living in a global, so independent sessions (tests,
/// multiple windows) can coexist.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub dataset: Dataset,
    #[serde(default)]
    pub registry: MappingRegistry,
    #[serde(default)]
    pub servis: ServisMapping,
    /// Presentation overlay keyed by ranked-category label.
    #[serde(default)]
    pub styles: BTreeMap<String, CategoryStyle>,
}

pub type SharedSession = Arc<Mutex<Session>>;

pub fn new_session() -> SharedSession {
    Arc::new(Mutex::new(Session::default()))
}

pub(crate) fn lock_session(session: &SharedSession) -> Result<std::sync::MutexGuard<'_, Session>, String> {
    session.lock().map_err(|_| "Session lock error".to_string())
}
