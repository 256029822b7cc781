/*
 * Copyright 2021 Google LLC
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *       http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Value types for the parts of the Envoy v3 bootstrap that this crate
//! populates. Field names and enum values serialize to the proto-JSON
//! mapping, so the output can be handed to `envoy --config-path` directly.

pub mod bootstrap;
pub mod cluster;
pub mod core;
pub mod tracer;

pub use self::{
    bootstrap::{
        Admin, Bootstrap, DynamicResources, Node, StaticResources, StatsConfig, TagSpecifier,
        Tracing, ValidationError,
    },
    cluster::{Cluster, DiscoveryType, Http2ProtocolOptions, TransportSocket},
    core::{Address, DataSource, SocketAddress},
    tracer::{HttpTracer, TracerConfig},
};
