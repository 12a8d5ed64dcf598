//! Per-identity persistence of storage-state snapshots.
//!
//! One JSON file per identity under the session directory. File names are
//! derived from a hash of the username so account e-mails never appear on
//! disk. No locking: callers keep at most one operation in flight per
//! identity.
use super::state::{now_epoch_seconds, StorageState};
use prowl_common::{Identity, ProwlError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const FILE_PREFIX: &str = "session_";

#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Content-addressed location of `identity`'s snapshot.
    pub fn path_for(&self, identity: &Identity) -> PathBuf {
        let digest = blake3::hash(identity.username().as_bytes());
        let short = hex::encode(&digest.as_bytes()[..8]);
        self.dir.join(format!("{FILE_PREFIX}{short}.json"))
    }

    /// Load the stored snapshot; a missing or unreadable record yields the
    /// default empty state. The first access writes that default record.
    pub fn load(&self, identity: &Identity) -> StorageState {
        let path = self.path_for(identity);
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<StorageState>(&raw) {
                Ok(state) => state,
                Err(err) => {
                    warn!(
                        target: "prowl.session",
                        path = %path.display(),
                        error = %err,
                        "session snapshot unreadable; using empty state"
                    );
                    StorageState::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let state = StorageState::default();
                if let Err(err) = self.save(identity, &state) {
                    warn!(target: "prowl.session", error = %err, "could not create default session record");
                }
                state
            }
            Err(err) => {
                warn!(
                    target: "prowl.session",
                    path = %path.display(),
                    error = %err,
                    "session snapshot not readable; using empty state"
                );
                StorageState::default()
            }
        }
    }

    /// Overwrite `identity`'s snapshot. Written to a sibling temp file first
    /// and renamed into place.
    pub fn save(&self, identity: &Identity, state: &StorageState) -> Result<(), ProwlError> {
        let path = self.path_for(identity);
        let io_err = |source| ProwlError::Store {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let body = serde_json::to_vec_pretty(state)
            .map_err(|e| io_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;

        debug!(
            target: "prowl.session",
            path = %path.display(),
            cookies = state.cookies.len(),
            "session snapshot saved"
        );
        Ok(())
    }

    /// True iff the stored snapshot has a cookie expiring after now.
    /// Re-read on every call.
    pub fn is_authenticated(&self, identity: &Identity) -> bool {
        self.is_authenticated_at(identity, now_epoch_seconds())
    }

    pub fn is_authenticated_at(&self, identity: &Identity, now: f64) -> bool {
        self.load(identity).is_valid_at(now)
    }
}
