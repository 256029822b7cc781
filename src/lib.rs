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

#![deny(unused_must_use)]

pub mod admin;
pub mod builder;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod endpoint;
pub mod envoy;
pub mod filemgr;
pub mod stats;
pub mod trace;

#[doc(hidden)]
pub mod test;

/// Prefix of every name the data plane reports about itself.
pub const PRODUCT_NAME: &str = "portcullis";

pub type Result<T, E = eyre::Error> = std::result::Result<T, E>;

#[doc(inline)]
pub use self::{
    builder::{BuildError, Builder, ClusterHook},
    cli::Cli,
    config::Config,
};
