/*
 * Copyright 2021 Google LLC
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Stable on-disk references for material the bootstrap points at, such as
//! CA bundles.

use std::{
    collections::BTreeMap,
    path::PathBuf,
};

use parking_lot::RwLock;

/// Hands out stable paths for logical file names. Implementations must be
/// safe to share between threads.
pub trait FileReferences: Send + Sync {
    fn resolve(&self, logical_name: &str) -> Result<PathBuf, FileReferenceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FileReferenceError {
    #[error("no file registered as `{0}`")]
    NotFound(String),
    #[error("failed to store `{name}` at {}", path.display())]
    Io {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Content-addressed file store. Bytes are written once to
/// `<cache_dir>/<name>-<hash>` and never rewritten, so a path handed out
/// stays valid for as long as the directory exists.
#[derive(Debug)]
pub struct Manager {
    cache_dir: PathBuf,
    files: RwLock<BTreeMap<String, PathBuf>>,
}

impl Manager {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            files: <_>::default(),
        }
    }

    /// Stores `bytes` under `name` and returns the path. Storing identical
    /// bytes again returns the same path without touching the disk.
    pub fn add_bytes(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, FileReferenceError> {
        let path = self.cache_dir.join(format!(
            "{}-{:016x}",
            sanitize(name),
            seahash::hash(bytes)
        ));

        let io_error = |source| FileReferenceError::Io {
            name: name.to_owned(),
            path: path.clone(),
            source,
        };

        if !path.exists() {
            std::fs::create_dir_all(&self.cache_dir).map_err(io_error)?;
            std::fs::write(&path, bytes).map_err(io_error)?;
            tracing::debug!(name, path = %path.display(), "stored file reference");
        }

        self.files.write().insert(name.to_owned(), path.clone());
        Ok(path)
    }

    /// Registers an existing file under `name` without copying it.
    pub fn add_file(
        &self,
        name: &str,
        path: impl Into<PathBuf>,
    ) -> Result<PathBuf, FileReferenceError> {
        let path = path.into();
        std::fs::metadata(&path).map_err(|source| FileReferenceError::Io {
            name: name.to_owned(),
            path: path.clone(),
            source,
        })?;

        self.files.write().insert(name.to_owned(), path.clone());
        Ok(path)
    }
}

impl FileReferences for Manager {
    fn resolve(&self, logical_name: &str) -> Result<PathBuf, FileReferenceError> {
        self.files
            .read()
            .get(logical_name)
            .cloned()
            .ok_or_else(|| FileReferenceError::NotFound(logical_name.to_owned()))
    }
}

/// Keeps a logical name usable as a single path component.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
