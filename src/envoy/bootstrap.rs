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

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{cluster::Cluster, core::Address, tracer::HttpTracer};

/// `envoy.config.bootstrap.v3.Bootstrap`, limited to the sections written at
/// startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Bootstrap {
    pub node: Node,
    pub admin: Admin,
    pub static_resources: StaticResources,
    pub dynamic_resources: DynamicResources,
    pub stats_config: StatsConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracing: Option<Tracing>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    pub id: String,
    pub cluster: String,
}

/// The administrative interface. There is always exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Admin {
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticResources {
    pub clusters: Vec<Cluster>,
}

impl StaticResources {
    pub fn get(&self, name: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|cluster| cluster.name == name)
    }

    /// Checks that cluster names are unique and that each load assignment
    /// names its own cluster. Returns the set of names on success.
    pub fn validate(&self) -> Result<BTreeSet<&str>, ValidationError> {
        let mut names = BTreeSet::new();
        for cluster in &self.clusters {
            if !names.insert(&*cluster.name) {
                return Err(ValidationError::NotUnique(cluster.name.clone()));
            }

            if cluster.load_assignment.cluster_name != cluster.name {
                return Err(ValidationError::MismatchedLoadAssignment {
                    cluster: cluster.name.clone(),
                    assigned: cluster.load_assignment.cluster_name.clone(),
                });
            }
        }

        Ok(names)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatsConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stats_tags: Vec<TagSpecifier>,
}

/// A tag with a fixed value attached to every emitted stat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TagSpecifier {
    pub tag_name: String,
    pub fixed_value: String,
}

/// Points listener and cluster discovery at the aggregated discovery service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DynamicResources {
    pub ads_config: ApiConfigSource,
    pub lds_config: ConfigSource,
    pub cds_config: ConfigSource,
}

impl DynamicResources {
    /// ADS over gRPC to `cluster_name`, with LDS and CDS delivered through it.
    pub fn ads(cluster_name: impl Into<String>) -> Self {
        let via_ads = ConfigSource {
            ads: AggregatedConfigSource {},
            resource_api_version: ApiVersion::V3,
        };

        Self {
            ads_config: ApiConfigSource {
                api_type: ApiType::Grpc,
                transport_api_version: ApiVersion::V3,
                grpc_services: vec![GrpcService::envoy_grpc(cluster_name)],
            },
            lds_config: via_ads.clone(),
            cds_config: via_ads,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApiConfigSource {
    pub api_type: ApiType,
    pub transport_api_version: ApiVersion,
    pub grpc_services: Vec<GrpcService>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiType {
    Grpc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiVersion {
    V3,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigSource {
    pub ads: AggregatedConfigSource,
    pub resource_api_version: ApiVersion,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregatedConfigSource {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GrpcService {
    pub envoy_grpc: EnvoyGrpc,
}

impl GrpcService {
    pub fn envoy_grpc(cluster_name: impl Into<String>) -> Self {
        Self {
            envoy_grpc: EnvoyGrpc {
                cluster_name: cluster_name.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnvoyGrpc {
    pub cluster_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tracing {
    pub http: HttpTracer,
}

/// Structural failure in an assembled [`Bootstrap`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("cluster name {0} is not unique")]
    NotUnique(String),
    #[error("cluster {0} is referenced but not defined")]
    DanglingClusterReference(String),
    #[error("cluster {cluster} load assignment names {assigned}")]
    MismatchedLoadAssignment { cluster: String, assigned: String },
}

impl Bootstrap {
    /// Every cluster name referenced from outside `static_resources`.
    pub fn cluster_references(&self) -> impl Iterator<Item = &str> {
        self.dynamic_resources
            .ads_config
            .grpc_services
            .iter()
            .map(|service| &*service.envoy_grpc.cluster_name)
            .chain(
                self.tracing
                    .iter()
                    .map(|tracing| tracing.http.typed_config.collector_cluster()),
            )
    }

    /// Validates the static clusters, then checks that every reference
    /// resolves to one of them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let names = self.static_resources.validate()?;

        match self.cluster_references().find(|name| !names.contains(name)) {
            Some(dangling) => Err(ValidationError::DanglingClusterReference(dangling.into())),
            None => Ok(()),
        }
    }
}
