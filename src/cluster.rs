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

//! Construction of the fixed-endpoint clusters written into the bootstrap.

use std::time::Duration;

use crate::{
    endpoint::EndpointAddress,
    envoy::{
        cluster::{ClusterLoadAssignment, Endpoint, LbEndpoint, LocalityLbEndpoints},
        Cluster, DiscoveryType, Http2ProtocolOptions,
    },
    trace::TracingProvider,
};

/// Name of the cluster the data plane uses to reach the control plane's gRPC
/// (xDS) server.
pub const CONTROL_PLANE_GRPC_CLUSTER: &str = "portcullis-control-plane-grpc";
/// Name of the cluster the data plane uses to reach the control plane's HTTP
/// server.
pub const CONTROL_PLANE_HTTP_CLUSTER: &str = "portcullis-control-plane-http";

/// Every static cluster connects over an intra-host or same-datacenter link.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// What a static cluster is for. The role alone determines its name and
/// protocol options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterRole {
    ControlPlaneGrpc,
    ControlPlaneHttp,
    Tracing(TracingProvider),
}

impl ClusterRole {
    pub fn name(self) -> &'static str {
        match self {
            Self::ControlPlaneGrpc => CONTROL_PLANE_GRPC_CLUSTER,
            Self::ControlPlaneHttp => CONTROL_PLANE_HTTP_CLUSTER,
            Self::Tracing(provider) => provider.cluster_name(),
        }
    }

    /// gRPC needs HTTP/2; everything else keeps HTTP/1.1 framing unless the
    /// tracing provider speaks gRPC.
    pub fn http2(self) -> bool {
        match self {
            Self::ControlPlaneGrpc => true,
            Self::ControlPlaneHttp => false,
            Self::Tracing(provider) => provider.requires_http2(),
        }
    }
}

/// Builds a single-endpoint cluster for `role` pointing at `address`.
///
/// IP literals (and `localhost`) produce a `STATIC` cluster. Host names
/// produce `STRICT_DNS`, as the data plane refuses names in `STATIC`
/// clusters.
pub fn build_static_cluster(role: ClusterRole, address: &EndpointAddress) -> Cluster {
    let name = role.name();
    let discovery_type = if address.is_ip() {
        DiscoveryType::Static
    } else {
        DiscoveryType::StrictDns
    };

    tracing::trace!(cluster = name, %address, ?discovery_type, "building static cluster");

    Cluster {
        name: name.into(),
        discovery_type,
        connect_timeout: CONNECT_TIMEOUT,
        http2_protocol_options: role.http2().then(Http2ProtocolOptions::default),
        load_assignment: ClusterLoadAssignment {
            cluster_name: name.into(),
            endpoints: vec![LocalityLbEndpoints {
                lb_endpoints: vec![LbEndpoint {
                    endpoint: Endpoint {
                        address: address.into(),
                    },
                }],
            }],
        },
        transport_socket: None,
    }
}
