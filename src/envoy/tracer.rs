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

use serde::{Deserialize, Serialize};

use super::bootstrap::GrpcService;

/// `envoy.config.trace.v3.Tracing.Http`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HttpTracer {
    pub name: String,
    pub typed_config: TracerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum TracerConfig {
    #[serde(rename = "type.googleapis.com/envoy.config.trace.v3.DatadogConfig")]
    Datadog(DatadogConfig),
    #[serde(rename = "type.googleapis.com/envoy.config.trace.v3.ZipkinConfig")]
    Zipkin(ZipkinConfig),
    #[serde(rename = "type.googleapis.com/envoy.config.trace.v3.OpenTelemetryConfig")]
    OpenTelemetry(OpenTelemetryConfig),
}

impl TracerConfig {
    /// The cluster the tracer ships spans to.
    pub fn collector_cluster(&self) -> &str {
        match self {
            Self::Datadog(config) => &config.collector_cluster,
            Self::Zipkin(config) => &config.collector_cluster,
            Self::OpenTelemetry(config) => &config.grpc_service.envoy_grpc.cluster_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatadogConfig {
    pub collector_cluster: String,
    pub service_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipkinConfig {
    pub collector_cluster: String,
    pub collector_endpoint: String,
    pub collector_endpoint_version: CollectorEndpointVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectorEndpointVersion {
    HttpJson,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenTelemetryConfig {
    pub grpc_service: GrpcService,
    pub service_name: String,
}
