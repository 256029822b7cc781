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

use std::{fmt, sync::Arc};

use crate::{
    admin,
    cluster::{build_static_cluster, ClusterRole, CONTROL_PLANE_GRPC_CLUSTER},
    config::Config,
    endpoint::{AddressKind, AddressParseError, EndpointAddress},
    envoy::{
        cluster::{CertificateValidationContext, CommonTlsContext, UpstreamTlsContext},
        Admin, Bootstrap, Cluster, DynamicResources, HttpTracer, Node, StaticResources,
        StatsConfig, Tracing, TransportSocket, ValidationError,
    },
    filemgr::{FileReferenceError, FileReferences},
    stats,
    trace::{self, TracingBackend, TracingError},
};

/// Logical name of the CA bundle trusted when `tracing_tls` is set.
pub const TRACING_CA: &str = "tracing-ca";

/// The `node.cluster` every data plane instance reports.
const NODE_CLUSTER: &str = "envoy";

/// Invoked on every static cluster after it is built, e.g. to inject test
/// certificates. Cluster names are validated again once every hook has run.
pub trait ClusterHook: Send + Sync {
    fn apply(&self, cluster: &mut Cluster);
}

impl<F> ClusterHook for F
where
    F: Fn(&mut Cluster) + Send + Sync,
{
    fn apply(&self, cluster: &mut Cluster) {
        (self)(cluster)
    }
}

/// Builds the bootstrap sections for the data plane.
///
/// The builder only holds its construction parameters, so a single instance
/// can be shared (e.g. behind an [`Arc`]) and its operations called
/// concurrently. Identical inputs always produce identical descriptors.
#[derive(Clone)]
pub struct Builder {
    grpc_address: String,
    http_address: String,
    files: Arc<dyn FileReferences>,
    hook: Option<Arc<dyn ClusterHook>>,
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("grpc_address", &self.grpc_address)
            .field("http_address", &self.http_address)
            .field("hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}

impl Builder {
    /// `grpc_address` and `http_address` are where the control plane itself
    /// listens; they are only parsed when a build operation needs them.
    pub fn new(
        grpc_address: impl Into<String>,
        http_address: impl Into<String>,
        files: Arc<dyn FileReferences>,
        hook: Option<Arc<dyn ClusterHook>>,
    ) -> Self {
        Self {
            grpc_address: grpc_address.into(),
            http_address: http_address.into(),
            files,
            hook,
        }
    }

    /// Builds the admin interface from `envoy_admin_address`.
    #[tracing::instrument(skip_all)]
    pub fn build_admin(&self, config: &Config) -> Result<Admin, AddressParseError> {
        admin::build_admin(&config.envoy_admin_address)
    }

    /// Builds the static clusters: the control plane's gRPC cluster, its HTTP
    /// cluster, then the tracing backend's cluster if one is configured.
    /// Nothing is returned if any of them fails, or if the hook leaves
    /// duplicate or mismatched cluster names behind.
    #[tracing::instrument(skip_all)]
    pub fn build_static_resources(&self, config: &Config) -> Result<StaticResources, BuildError> {
        self.static_resources_with_tracer(config)
            .map(|(resources, _)| resources)
    }

    /// Builds the stats tags from `services`.
    #[tracing::instrument(skip_all)]
    pub fn build_stats_config(&self, config: &Config) -> StatsConfig {
        stats::build_stats_config(&config.services)
    }

    /// Assembles and validates the complete bootstrap document.
    #[tracing::instrument(skip_all, fields(services = %config.services))]
    pub fn build_bootstrap(&self, config: &Config) -> Result<Bootstrap, BuildError> {
        let admin = self
            .build_admin(config)
            .map_err(|source| BuildError::Address {
                field: "envoy_admin_address",
                source,
            })?;
        let (static_resources, tracer) = self.static_resources_with_tracer(config)?;

        let bootstrap = Bootstrap {
            node: Node {
                id: config.service_name(),
                cluster: NODE_CLUSTER.into(),
            },
            admin,
            static_resources,
            dynamic_resources: DynamicResources::ads(CONTROL_PLANE_GRPC_CLUSTER),
            stats_config: self.build_stats_config(config),
            tracing: tracer.map(|http| Tracing { http }),
        };

        bootstrap.validate()?;
        tracing::debug!(
            clusters = bootstrap.static_resources.clusters.len(),
            tracing = bootstrap.tracing.is_some(),
            "built bootstrap"
        );

        Ok(bootstrap)
    }

    fn static_resources_with_tracer(
        &self,
        config: &Config,
    ) -> Result<(StaticResources, Option<HttpTracer>), BuildError> {
        let grpc = parse_address("grpc_address", &self.grpc_address)?;
        let http = parse_address("http_address", &self.http_address)?;

        let mut clusters = vec![
            build_static_cluster(ClusterRole::ControlPlaneGrpc, &grpc),
            build_static_cluster(ClusterRole::ControlPlaneHttp, &http),
        ];

        let backend = trace::lookup(
            &config.tracing_provider,
            &config.tracing_address,
            &config.service_name(),
        )?;

        let tracer = match backend {
            Some(TracingBackend {
                mut cluster,
                tracer,
                address,
                ..
            }) => {
                if config.tracing_tls {
                    cluster.transport_socket = Some(self.tracing_tls(&address)?);
                }
                clusters.push(cluster);
                Some(tracer)
            }
            None => None,
        };

        if let Some(hook) = &self.hook {
            for cluster in &mut clusters {
                hook.apply(cluster);
            }
        }

        let resources = StaticResources { clusters };
        resources.validate()?;

        tracing::debug!(
            clusters = resources.clusters.len(),
            "built static resources"
        );
        Ok((resources, tracer))
    }

    fn tracing_tls(&self, address: &EndpointAddress) -> Result<TransportSocket, BuildError> {
        let trusted_ca = self.files.resolve(TRACING_CA)?;

        Ok(TransportSocket::upstream_tls(UpstreamTlsContext {
            common_tls_context: CommonTlsContext {
                validation_context: Some(CertificateValidationContext {
                    trusted_ca: trusted_ca.as_path().into(),
                }),
                ..<_>::default()
            },
            sni: match address.kind() {
                AddressKind::Name(name) => Some(name),
                AddressKind::Ip(_) => None,
            },
        }))
    }
}

fn parse_address(field: &'static str, raw: &str) -> Result<EndpointAddress, BuildError> {
    raw.parse()
        .map_err(|source| BuildError::Address { field, source })
}

/// Why a bootstrap section could not be built. Any of these means the data
/// plane must not be started.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid {field} `{}`", source.input)]
    Address {
        field: &'static str,
        #[source]
        source: AddressParseError,
    },
    #[error(transparent)]
    Tracing(#[from] TracingError),
    #[error("failed to resolve a file reference")]
    FileReference(#[from] FileReferenceError),
    #[error("bootstrap failed validation")]
    Validation(#[from] ValidationError),
}

impl BuildError {
    /// The underlying address error, whichever field it came from.
    pub fn address_error(&self) -> Option<&AddressParseError> {
        match self {
            Self::Address { source, .. } => Some(source),
            Self::Tracing(TracingError::Address { source, .. }) => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::*;
    use crate::{
        envoy::{cluster::TlsCertificate, DataSource},
        filemgr::Manager,
        trace::UnknownTracingProviderError,
    };

    fn builder() -> Builder {
        crate::test::builder("localhost:1111", "localhost:2222")
    }

    fn tracing(provider: &str, address: &str) -> Config {
        Config {
            tracing_provider: provider.into(),
            tracing_address: address.into(),
            ..<_>::default()
        }
    }

    #[test]
    fn builder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Builder>();
    }

    #[test]
    fn cluster_order() {
        let resources = builder()
            .build_static_resources(&tracing("zipkin", ""))
            .unwrap();
        let names: Vec<_> = resources.clusters.iter().map(|c| &*c.name).collect();
        assert_eq!(
            vec![
                "portcullis-control-plane-grpc",
                "portcullis-control-plane-http",
                "zipkin"
            ],
            names
        );
    }

    #[test]
    fn bad_http_address() {
        let builder = crate::test::builder("localhost:1111", "localhost");
        let error = builder.build_static_resources(&Config::default()).unwrap_err();
        assert!(matches!(
            error,
            BuildError::Address {
                field: "http_address",
                ..
            }
        ));
        assert_eq!("invalid http_address `localhost`", error.to_string());
    }

    #[test]
    fn unknown_provider_wins_over_bad_address() {
        let error = builder()
            .build_static_resources(&tracing("skywalking", "not-valid:zyx"))
            .unwrap_err();
        assert!(matches!(
            error,
            BuildError::Tracing(TracingError::UnknownProvider(UnknownTracingProviderError { ref identifier }))
                if identifier == "skywalking"
        ));
        assert_eq!(None, error.address_error());
    }

    #[test]
    fn tracing_tls_uses_file_reference() {
        let dir = tempfile::tempdir().unwrap();
        let files = Arc::new(Manager::new(dir.path()));
        let ca = files.add_bytes(TRACING_CA, b"-----BEGIN CERTIFICATE-----").unwrap();
        let builder = Builder::new("127.0.0.1:1111", "127.0.0.1:2222", files, None);

        let config = Config {
            tracing_tls: true,
            ..tracing("zipkin", "zipkin.observability:9411")
        };
        let resources = builder.build_static_resources(&config).unwrap();
        let zipkin = resources.get("zipkin").unwrap();

        assert_eq!(
            Some(TransportSocket::upstream_tls(UpstreamTlsContext {
                common_tls_context: CommonTlsContext {
                    validation_context: Some(CertificateValidationContext {
                        trusted_ca: ca.as_path().into(),
                    }),
                    ..<_>::default()
                },
                sni: Some("zipkin.observability".into()),
            })),
            zipkin.transport_socket
        );
        assert_eq!(
            None,
            resources
                .get(CONTROL_PLANE_GRPC_CLUSTER)
                .unwrap()
                .transport_socket
        );
    }

    #[test]
    fn tracing_tls_without_ca_fails() {
        let config = Config {
            tracing_tls: true,
            ..tracing("datadog", "")
        };
        assert!(matches!(
            builder().build_static_resources(&config),
            Err(BuildError::FileReference(FileReferenceError::NotFound(_)))
        ));
    }

    #[test]
    fn hook_sees_every_cluster() {
        let hook = |cluster: &mut Cluster| {
            let socket = TransportSocket::upstream_tls(UpstreamTlsContext {
                common_tls_context: CommonTlsContext {
                    tls_certificates: vec![TlsCertificate {
                        certificate_chain: DataSource {
                            filename: format!("/test/{}.pem", cluster.name),
                        },
                        private_key: DataSource {
                            filename: "/test/key.pem".into(),
                        },
                    }],
                    ..<_>::default()
                },
                sni: None,
            });
            cluster.transport_socket = Some(socket);
        };
        let builder = Builder::new(
            "localhost:1111",
            "localhost:2222",
            Arc::new(Manager::new("/nonexistent")),
            Some(Arc::new(hook)),
        );

        let resources = builder
            .build_static_resources(&tracing("datadog", ""))
            .unwrap();
        assert_eq!(3, resources.clusters.len());
        assert!(resources
            .clusters
            .iter()
            .all(|cluster| cluster.transport_socket.is_some()));
    }

    #[test]
    fn bootstrap_references_resolve() {
        let bootstrap = builder()
            .build_bootstrap(&tracing("opentelemetry", ""))
            .unwrap();

        assert_eq!("portcullis", bootstrap.node.id);
        assert_eq!("envoy", bootstrap.node.cluster);
        for reference in bootstrap.cluster_references() {
            assert!(
                bootstrap.static_resources.get(reference).is_some(),
                "{reference}"
            );
        }
        assert_eq!(Ok(()), bootstrap.validate());
    }

    #[test]
    fn bootstrap_reports_admin_field() {
        let config = Config {
            envoy_admin_address: "localhost:http".into(),
            ..<_>::default()
        };
        let error = builder().build_bootstrap(&config).unwrap_err();
        assert!(matches!(
            error,
            BuildError::Address {
                field: "envoy_admin_address",
                ..
            }
        ));
        assert_eq!("localhost:http", error.address_error().unwrap().input);
    }

    #[test]
    fn hook_cannot_break_validation_silently() {
        let rename = |cluster: &mut Cluster| {
            if cluster.name == "datadog-apm" {
                cluster.name = CONTROL_PLANE_GRPC_CLUSTER.into();
            }
        };
        let builder = Builder::new(
            "localhost:1111",
            "localhost:2222",
            Arc::new(Manager::new("/nonexistent")),
            Some(Arc::new(rename)),
        );

        assert!(matches!(
            builder.build_bootstrap(&tracing("datadog", "")),
            Err(BuildError::Validation(ValidationError::NotUnique(name)))
                if name == CONTROL_PLANE_GRPC_CLUSTER
        ));
    }

    #[test]
    fn static_resources_reject_duplicate_names_from_hook() {
        let collapse = |cluster: &mut Cluster| {
            cluster.name = "same".into();
            cluster.load_assignment.cluster_name = "same".into();
        };
        let builder = Builder::new(
            "localhost:1111",
            "localhost:2222",
            Arc::new(Manager::new("/nonexistent")),
            Some(Arc::new(collapse)),
        );

        assert!(matches!(
            builder.build_static_resources(&Config::default()),
            Err(BuildError::Validation(ValidationError::NotUnique(name))) if name == "same"
        ));
    }

    #[test]
    fn static_resources_reject_mismatched_load_assignment_from_hook() {
        let rename = |cluster: &mut Cluster| {
            if cluster.name == CONTROL_PLANE_GRPC_CLUSTER {
                cluster.name = "xds".into();
            }
        };
        let builder = Builder::new(
            "localhost:1111",
            "localhost:2222",
            Arc::new(Manager::new("/nonexistent")),
            Some(Arc::new(rename)),
        );

        assert_eq!(
            ValidationError::MismatchedLoadAssignment {
                cluster: "xds".into(),
                assigned: CONTROL_PLANE_GRPC_CLUSTER.into(),
            },
            match builder.build_static_resources(&Config::default()) {
                Err(BuildError::Validation(error)) => error,
                other => panic!("unexpected result: {other:?}"),
            }
        );
    }

    #[test]
    fn concurrent_builds_are_identical() {
        let builder = Arc::new(builder());
        let config = tracing("datadog", "10.0.0.7:8126");
        let expected = builder.build_bootstrap(&config).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| builder.build_bootstrap(&config).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(expected, handle.join().unwrap());
            }
        });
    }

    #[test]
    #[traced_test]
    fn logs_selected_backend() {
        builder()
            .build_static_resources(&tracing("jaeger", ""))
            .unwrap();
        assert!(logs_contain("selected tracing backend"));
        assert!(logs_contain("built static resources"));
    }
}
