//! The browser-localStorage equivalent: one JSON file holding the anonymous
//! identity and the sort-mode preference, surviving across runs.

#![deny(clippy::all, clippy::pedantic)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hottake_api_types::SortMode;

use crate::client::CliError;

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    uuid: Uuid,
    /// Numeric sort index stored as a string, like the browser original.
    sort: String,
}

#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    uuid: Uuid,
    sort_index: usize,
}

impl Session {
    /// Load the persisted session, or create a fresh one (new identity,
    /// default sort) on first run or when the file is unreadable.
    pub fn load_or_create(path: Option<PathBuf>) -> Result<Self, CliError> {
        let path = match path {
            Some(path) => path,
            None => default_state_file()?,
        };

        if let Ok(data) = fs::read_to_string(&path) {
            if let Ok(file) = serde_json::from_str::<SessionFile>(&data) {
                let sort_index = file.sort.parse().unwrap_or(0);
                return Ok(Self {
                    path,
                    uuid: file.uuid,
                    sort_index,
                });
            }
        }

        let session = Self {
            path,
            uuid: Uuid::new_v4(),
            sort_index: SortMode::default().index(),
        };
        session.save()?;
        Ok(session)
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn sort(&self) -> SortMode {
        SortMode::from_index(self.sort_index)
    }

    /// Persist a sort-mode change immediately.
    pub fn set_sort(&mut self, mode: SortMode) -> Result<(), CliError> {
        self.sort_index = mode.index();
        self.save()
    }

    fn save(&self) -> Result<(), CliError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = SessionFile {
            uuid: self.uuid,
            sort: self.sort_index.to_string(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CliError::Session(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

fn default_state_file() -> Result<PathBuf, CliError> {
    let base = env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".local/state")))
        .ok_or_else(|| CliError::Session("neither XDG_STATE_HOME nor HOME is set".to_string()))?;
    Ok(base.join("hottake").join("session.json"))
}
