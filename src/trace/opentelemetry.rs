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
    bootstrap::GrpcService,
    tracer::{OpenTelemetryConfig, TracerConfig},
    HttpTracer,
};

/// OTLP over gRPC, so the collector cluster needs HTTP/2.
pub(super) const DEFAULTS: ProviderDefaults = ProviderDefaults {
    cluster_name: "opentelemetry-collector",
    address: "127.0.0.1:4317",
    http2: true,
};

pub(super) fn tracer(service_name: &str) -> HttpTracer {
    HttpTracer {
        name: "envoy.tracers.opentelemetry".into(),
        typed_config: TracerConfig::OpenTelemetry(OpenTelemetryConfig {
            grpc_service: GrpcService::envoy_grpc(DEFAULTS.cluster_name),
            service_name: service_name.into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn tracer() {
        assert_eq!(
            json!({
                "name": "envoy.tracers.opentelemetry",
                "typedConfig": {
                    "@type": "type.googleapis.com/envoy.config.trace.v3.OpenTelemetryConfig",
                    "grpcService": {
                        "envoyGrpc": { "clusterName": "opentelemetry-collector" }
                    },
                    "serviceName": "portcullis-proxy"
                }
            }),
            serde_json::to_value(super::tracer("portcullis-proxy")).unwrap()
        );
    }
}
