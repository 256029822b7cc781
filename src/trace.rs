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

//! Registry of the distributed tracing backends the data plane can forward
//! spans to.
//!
//! Each provider needs exactly one upstream cluster but has its own tracer
//! configuration, so selection lives here while the tracer shape lives in the
//! per-provider modules.

mod datadog;
mod opentelemetry;
mod zipkin;

use crate::{
    cluster::{build_static_cluster, ClusterRole},
    endpoint::{AddressParseError, EndpointAddress},
    envoy::{Cluster, HttpTracer},
};

/// Identifiers that explicitly select no tracing backend.
const UNSET: &[&str] = &["", "none"];

/// The tracing backends known to the registry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TracingProvider {
    Datadog,
    Zipkin,
    /// Jaeger collectors accept spans over their Zipkin-compatible endpoint.
    Jaeger,
    #[strum(to_string = "opentelemetry", serialize = "otel")]
    OpenTelemetry,
}

/// Fixed per-provider settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDefaults {
    pub cluster_name: &'static str,
    /// Used when the configuration does not override the address.
    pub address: &'static str,
    pub http2: bool,
}

impl TracingProvider {
    pub const fn defaults(self) -> ProviderDefaults {
        match self {
            Self::Datadog => datadog::DEFAULTS,
            Self::Zipkin => zipkin::DEFAULTS,
            Self::Jaeger => zipkin::JAEGER_DEFAULTS,
            Self::OpenTelemetry => opentelemetry::DEFAULTS,
        }
    }

    pub const fn cluster_name(self) -> &'static str {
        self.defaults().cluster_name
    }

    pub const fn requires_http2(self) -> bool {
        self.defaults().http2
    }

    /// Builds the `tracing.http` fragment that ships spans to this
    /// provider's cluster, tagged with `service_name`.
    pub fn tracer(self, service_name: &str) -> HttpTracer {
        match self {
            Self::Datadog => datadog::tracer(service_name),
            Self::Zipkin | Self::Jaeger => zipkin::tracer(self.cluster_name()),
            Self::OpenTelemetry => opentelemetry::tracer(service_name),
        }
    }

    /// Parses a configured provider identifier. Matching is case-insensitive
    /// and the unset sentinels (`""`, `none`) yield `None`.
    pub fn select(identifier: &str) -> Result<Option<Self>, UnknownTracingProviderError> {
        let trimmed = identifier.trim();
        if UNSET.iter().any(|unset| unset.eq_ignore_ascii_case(trimmed)) {
            return Ok(None);
        }

        trimmed
            .parse()
            .map(Some)
            .map_err(|_| UnknownTracingProviderError {
                identifier: identifier.to_owned(),
            })
    }
}

/// A selected tracing backend: its cluster and the tracer that references it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingBackend {
    pub provider: TracingProvider,
    pub address: EndpointAddress,
    pub cluster: Cluster,
    pub tracer: HttpTracer,
}

/// Resolves the configured provider into its backend, or `None` when tracing
/// is unset.
///
/// The identifier is checked before the address, so an unknown provider is
/// reported regardless of whether `address_override` is valid. An empty
/// override selects the provider's default address.
pub fn lookup(
    identifier: &str,
    address_override: &str,
    service_name: &str,
) -> Result<Option<TracingBackend>, TracingError> {
    let Some(provider) = TracingProvider::select(identifier)? else {
        return Ok(None);
    };

    let raw = if address_override.is_empty() {
        provider.defaults().address
    } else {
        address_override
    };

    let address = raw
        .parse::<EndpointAddress>()
        .map_err(|source| TracingError::Address { provider, source })?;

    tracing::debug!(%provider, %address, "selected tracing backend");

    Ok(Some(TracingBackend {
        provider,
        cluster: build_static_cluster(ClusterRole::Tracing(provider), &address),
        tracer: provider.tracer(service_name),
        address,
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tracing provider `{identifier}`")]
pub struct UnknownTracingProviderError {
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TracingError {
    #[error(transparent)]
    UnknownProvider(#[from] UnknownTracingProviderError),
    #[error("invalid {provider} tracing address `{}`", source.input)]
    Address {
        provider: TracingProvider,
        #[source]
        source: AddressParseError,
    },
}
