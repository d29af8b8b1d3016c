/*
 *  persist.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Last channel persistence - a single integer in a text file, replaced atomically
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{debug, warn};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Stores the last selected channel index
#[derive(Debug, Clone)]
pub struct ChannelStore {
    path: PathBuf,
}

impl ChannelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored index, 0 when the file is missing or unreadable
    pub fn load(&self) -> usize {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("No saved channel at {}, starting at 0", self.path.display());
                return 0;
            }
            Err(e) => {
                warn!("Could not read {}: {}, starting at channel 0", self.path.display(), e);
                return 0;
            }
        };
        match raw.trim().parse::<usize>() {
            Ok(index) => index,
            Err(_) => {
                warn!("Corrupt channel file {} ({:?}), starting at channel 0", self.path.display(), raw.trim());
                0
            }
        }
    }

    /// Stored index when it addresses one of `count` channels, 0 otherwise
    pub fn load_within(&self, count: usize) -> usize {
        let index = self.load();
        if index < count {
            index
        } else {
            warn!("Saved channel {} out of range for {} channels, using 0", index, count);
            0
        }
    }

    /// Write the index next to the target, sync, then rename over it
    pub fn save(&self, index: usize) -> Result<(), PersistError> {
        let tmp = self.temp_path();
        let write = || -> std::io::Result<()> {
            let mut file = File::create(&tmp)?;
            writeln!(file, "{}", index)?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        };
        write().map_err(|source| {
            let _ = fs::remove_file(&tmp);
            PersistError::Write { path: self.path.clone(), source }
        })?;
        debug!("Saved channel {} to {}", index, self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "channel".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
