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

use super::ProviderDefaults;
use crate::envoy::{
    tracer::{DatadogConfig, TracerConfig},
    HttpTracer,
};

/// The Datadog agent listens for traces on the local host.
pub(super) const DEFAULTS: ProviderDefaults = ProviderDefaults {
    cluster_name: "datadog-apm",
    address: "127.0.0.1:8126",
    http2: false,
};

pub(super) fn tracer(service_name: &str) -> HttpTracer {
    HttpTracer {
        name: "envoy.tracers.datadog".into(),
        typed_config: TracerConfig::Datadog(DatadogConfig {
            collector_cluster: DEFAULTS.cluster_name.into(),
            service_name: service_name.into(),
        }),
    }
}
