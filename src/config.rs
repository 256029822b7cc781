/*
 * Copyright 2020 Google LLC All Rights Reserved.
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

use std::io;

use serde::{Deserialize, Serialize};

/// The subset of the proxy's options that shape the data plane's bootstrap.
///
/// Values are taken as validated upstream; the builder only checks what it
/// needs to produce a well-formed descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The service role(s) this node runs, `all` for a monolithic deployment.
    pub services: String,
    /// `host:port` the data plane's admin interface binds to.
    pub envoy_admin_address: String,
    /// Tracing backend, one of `datadog`, `zipkin`, `jaeger`,
    /// `opentelemetry`, or empty / `none` to disable tracing.
    pub tracing_provider: String,
    /// `host:port` of the tracing backend. Empty uses the provider's default.
    pub tracing_address: String,
    /// Connect to the tracing backend over TLS, trusting the CA registered
    /// as `tracing-ca`.
    pub tracing_tls: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            services: crate::stats::ALL_SERVICES.into(),
            envoy_admin_address: crate::admin::DEFAULT_ADDRESS.into(),
            tracing_provider: String::new(),
            tracing_address: String::new(),
            tracing_tls: false,
        }
    }
}

impl Config {
    /// Reads a YAML configuration from `input`.
    pub fn from_reader<R: io::Read>(input: R) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(input)
    }

    /// The name this node reports as its identity and tracing service.
    pub fn service_name(&self) -> String {
        crate::stats::service_name(&self.services)
    }
}
