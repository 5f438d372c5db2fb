//! JSON state file holding at most one route record.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::route::RouteState;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to access state file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("state file {} is not valid: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Location of the persisted record. A missing file means the route is
/// absent.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StateError {
        StateError::Io {
            path: self.path.clone(),
            source,
        }
    }

    pub async fn load(&self) -> Result<Option<RouteState>, StateError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StateError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Write the record, or remove the file when the route is absent.
    pub async fn save(&self, state: Option<&RouteState>) -> Result<(), StateError> {
        let Some(state) = state else {
            debug!("Removing state file {}", self.path.display());
            return match tokio::fs::remove_file(&self.path).await {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(self.io_error(e)),
                _ => Ok(()),
            };
        };

        let json = serde_json::to_string_pretty(state).map_err(|source| StateError::Parse {
            path: self.path.clone(),
            source,
        })?;

        // Write-then-rename so an interrupted save never leaves half a file.
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!("Saved route {} to {}", state.id, self.path.display());
        Ok(())
    }
}
