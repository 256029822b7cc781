/*
 * Copyright 2020 Google LLC
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

//! Common utilities for testing.

use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use crate::{
    filemgr::{FileReferenceError, FileReferences},
    Builder,
};

/// A fixed table of file references that never touches the disk.
#[derive(Debug, Default, Clone)]
pub struct StaticFiles(pub BTreeMap<String, PathBuf>);

impl FileReferences for StaticFiles {
    fn resolve(&self, logical_name: &str) -> Result<PathBuf, FileReferenceError> {
        self.0
            .get(logical_name)
            .cloned()
            .ok_or_else(|| FileReferenceError::NotFound(logical_name.into()))
    }
}

/// A builder with no file references and no hook.
pub fn builder(grpc_address: &str, http_address: &str) -> Builder {
    Builder::new(
        grpc_address,
        http_address,
        Arc::new(StaticFiles::default()),
        None,
    )
}
