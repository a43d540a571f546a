// Application state module
// Holds the configuration and the storage services shared by all connections

use std::sync::Arc;

use super::types::Config;
use crate::auth::PlaintextVerifier;
use crate::files::FileRegistry;
use crate::store::JsonDirStore;
use crate::students::StudentStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub students: Arc<StudentStore>,
    pub files: FileRegistry,
    pub verifier: PlaintextVerifier,
}

impl AppState {
    /// Wire the stores onto the directories named in `config`
    ///
    /// Directories are not created here; see `Config::prepare_storage`.
    pub fn new(config: &Config) -> Self {
        let students = Arc::new(StudentStore::new(JsonDirStore::new(
            config.storage.students_dir(),
        )));
        let files = FileRegistry::new(
            JsonDirStore::new(&config.storage.data_dir),
            &config.storage.uploads_dir,
        );
        let verifier = PlaintextVerifier::new(Arc::clone(&students), config.admin.clone());

        Self {
            config: config.clone(),
            students,
            files,
            verifier,
        }
    }
}
