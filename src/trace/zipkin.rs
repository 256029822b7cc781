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
    tracer::{CollectorEndpointVersion, TracerConfig, ZipkinConfig},
    HttpTracer,
};

/// Path of the Zipkin v2 span collection API.
const COLLECTOR_ENDPOINT: &str = "/api/v2/spans";

pub(super) const DEFAULTS: ProviderDefaults = ProviderDefaults {
    cluster_name: "zipkin",
    address: "127.0.0.1:9411",
    http2: false,
};

/// Jaeger is reached through its Zipkin-compatible collector port.
pub(super) const JAEGER_DEFAULTS: ProviderDefaults = ProviderDefaults {
    cluster_name: "jaeger",
    ..DEFAULTS
};

/// Zipkin and Jaeger share a tracer and differ only in the cluster it posts
/// spans to.
pub(super) fn tracer(cluster_name: &str) -> HttpTracer {
    HttpTracer {
        name: "envoy.tracers.zipkin".into(),
        typed_config: TracerConfig::Zipkin(ZipkinConfig {
            collector_cluster: cluster_name.into(),
            collector_endpoint: COLLECTOR_ENDPOINT.into(),
            collector_endpoint_version: CollectorEndpointVersion::HttpJson,
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
                "name": "envoy.tracers.zipkin",
                "typedConfig": {
                    "@type": "type.googleapis.com/envoy.config.trace.v3.ZipkinConfig",
                    "collectorCluster": "jaeger",
                    "collectorEndpoint": "/api/v2/spans",
                    "collectorEndpointVersion": "HTTP_JSON"
                }
            }),
            serde_json::to_value(super::tracer(super::JAEGER_DEFAULTS.cluster_name)).unwrap()
        );
    }
}
