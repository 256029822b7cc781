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

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::envoy::core::{Address, SocketAddress};

/// The hostname that is rewritten to the IPv4 loopback address when encoded
/// into a descriptor.
const LOCALHOST: &str = "localhost";

/// A `host:port` pair as written in configuration. Unlike
/// `std::net::SocketAddr` the host may be a domain name, which is kept as an
/// opaque string and never resolved.
#[derive(Debug, PartialEq, Clone, PartialOrd, Ord, Eq, Hash)]
pub struct EndpointAddress {
    /// The host exactly as written, without the brackets of an IPv6 literal.
    pub host: String,
    /// The port of the socket address.
    pub port: u16,
}

/// Whether the host of an [`EndpointAddress`] is an IP literal or a name.
#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub enum AddressKind {
    Ip(IpAddr),
    Name(String),
}

impl EndpointAddress {
    /// Classifies the host. `localhost` is treated as the IPv4 loopback
    /// address, matching how it is encoded into descriptors.
    pub fn kind(&self) -> AddressKind {
        if self.host.eq_ignore_ascii_case(LOCALHOST) {
            return AddressKind::Ip(IpAddr::V4(Ipv4Addr::LOCALHOST));
        }

        match self.host.parse::<IpAddr>() {
            Ok(ip) => AddressKind::Ip(ip),
            Err(_) => AddressKind::Name(self.host.clone()),
        }
    }

    /// Returns `true` if the host can be used as-is in a `STATIC` cluster.
    pub fn is_ip(&self) -> bool {
        matches!(self.kind(), AddressKind::Ip(_))
    }

    /// The host as written into a descriptor's `socketAddress.address`.
    pub fn descriptor_host(&self) -> String {
        match self.kind() {
            AddressKind::Ip(ip) => ip.to_string(),
            AddressKind::Name(name) => name,
        }
    }
}

impl FromStr for EndpointAddress {
    type Err = AddressParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let error = |kind| AddressParseError {
            input: input.to_owned(),
            kind,
        };

        let (host, port) = if let Some(rest) = input.strip_prefix('[') {
            let (host, rest) = rest
                .split_once(']')
                .ok_or_else(|| error(AddressParseErrorKind::InvalidIpv6))?;
            let port = rest
                .strip_prefix(':')
                .ok_or_else(|| error(AddressParseErrorKind::MissingPort))?;
            if host.parse::<std::net::Ipv6Addr>().is_err() {
                return Err(error(AddressParseErrorKind::InvalidIpv6));
            }
            (host, port)
        } else {
            let (host, port) = input
                .rsplit_once(':')
                .ok_or_else(|| error(AddressParseErrorKind::MissingPort))?;
            // An unbracketed IPv6 literal is ambiguous.
            if host.contains(':') || host.contains(']') {
                return Err(error(AddressParseErrorKind::InvalidIpv6));
            }
            (host, port)
        };

        if host.is_empty() {
            return Err(error(AddressParseErrorKind::EmptyHost));
        }

        // Resolvers read numeric hosts such as `010.0.0.1` as IPv4 (octal
        // included), so anything numeric must be a canonical dotted quad.
        if host.bytes().all(|b| b.is_ascii_digit() || b == b'.')
            && host.parse::<Ipv4Addr>().is_err()
        {
            return Err(error(AddressParseErrorKind::InvalidIpv4));
        }

        Ok(Self {
            host: host.to_owned(),
            port: parse_port(port).map_err(error)?,
        })
    }
}

fn parse_port(port: &str) -> Result<u16, AddressParseErrorKind> {
    if port.is_empty() {
        return Err(AddressParseErrorKind::EmptyPort);
    }

    if !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AddressParseErrorKind::InvalidPort);
    }

    // All digits, so the only remaining failure is overflow.
    port.parse::<u16>()
        .map_err(|_| AddressParseErrorKind::PortOutOfRange)
}

/// A string that could not be turned into an [`EndpointAddress`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address `{input}`: {kind}")]
pub struct AddressParseError {
    /// The offending input, verbatim.
    pub input: String,
    pub kind: AddressParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseErrorKind {
    #[error("port is required")]
    MissingPort,
    #[error("hostname is required")]
    EmptyHost,
    #[error("port cannot be empty")]
    EmptyPort,
    #[error("port must be numeric")]
    InvalidPort,
    #[error("port must be between 0 and 65535")]
    PortOutOfRange,
    #[error("IPv4 addresses must be four decimal octets without leading zeros")]
    InvalidIpv4,
    #[error("IPv6 addresses must be enclosed in brackets")]
    InvalidIpv6,
}

impl From<(String, u16)> for EndpointAddress {
    fn from((host, port): (String, u16)) -> Self {
        Self { host, port }
    }
}

impl From<&EndpointAddress> for SocketAddress {
    fn from(address: &EndpointAddress) -> Self {
        Self {
            address: address.descriptor_host(),
            port_value: u32::from(address.port),
        }
    }
}

impl From<&EndpointAddress> for Address {
    fn from(address: &EndpointAddress) -> Self {
        Self {
            socket_address: address.into(),
        }
    }
}

impl fmt::Display for EndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl<'de> Deserialize<'de> for EndpointAddress {
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Accept borrowed or owned strings.
        let string = <std::borrow::Cow<'de, str>>::deserialize(de)?;
        string.parse::<Self>().map_err(serde::de::Error::custom)
    }
}

impl Serialize for EndpointAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_err(input: &str) -> AddressParseErrorKind {
        let error = input.parse::<EndpointAddress>().unwrap_err();
        assert_eq!(input, error.input);
        error.kind
    }

    #[test]
    fn endpoint_from_string() {
        let endpoint = "127.0.12.1:4567".parse::<EndpointAddress>().unwrap();
        assert_eq!("127.0.12.1", endpoint.host);
        assert_eq!(4567, endpoint.port);
        assert!(endpoint.is_ip());

        let endpoint = "[2345:0425:2ca1:0000:0000:0567:5673:24b5]:25999"
            .parse::<EndpointAddress>()
            .unwrap();
        assert_eq!("2345:0425:2ca1:0000:0000:0567:5673:24b5", endpoint.host);
        assert_eq!(25999, endpoint.port);
        assert_eq!("2345:425:2ca1::567:5673:24b5", endpoint.descriptor_host());

        let endpoint = "my.domain.com:80".parse::<EndpointAddress>().unwrap();
        assert_eq!(
            AddressKind::Name("my.domain.com".into()),
            endpoint.kind()
        );
    }

    #[test]
    fn host_round_trips_verbatim() {
        for (input, host, port) in [
            ("localhost:9901", "localhost", 9901),
            ("Collector.Internal:0", "Collector.Internal", 0),
            ("10.0.0.1:65535", "10.0.0.1", 65535),
            ("agent_1:8126", "agent_1", 8126),
            ("[::1]:443", "::1", 443),
        ] {
            let address = input.parse::<EndpointAddress>().unwrap();
            assert_eq!(host, address.host);
            assert_eq!(port, address.port);
            assert_eq!(input, address.to_string());
        }
    }

    #[test]
    fn localhost_is_encoded_as_loopback() {
        let address = "LocalHost:1111".parse::<EndpointAddress>().unwrap();
        assert_eq!("LocalHost", address.host);
        assert_eq!(
            SocketAddress {
                address: "127.0.0.1".into(),
                port_value: 1111,
            },
            SocketAddress::from(&address)
        );
    }

    #[test]
    fn malformed_addresses() {
        assert_eq!(AddressParseErrorKind::InvalidPort, parse_err("xyz1234:zyx4321"));
        assert_eq!(AddressParseErrorKind::MissingPort, parse_err("localhost"));
        assert_eq!(AddressParseErrorKind::EmptyHost, parse_err(":8080"));
        assert_eq!(AddressParseErrorKind::EmptyPort, parse_err("localhost:"));
        assert_eq!(AddressParseErrorKind::PortOutOfRange, parse_err("localhost:65536"));
        assert_eq!(
            AddressParseErrorKind::PortOutOfRange,
            parse_err("localhost:99999999999999999999")
        );
        assert_eq!(AddressParseErrorKind::InvalidPort, parse_err("localhost:-1"));
        assert_eq!(AddressParseErrorKind::InvalidIpv6, parse_err("::1:80"));
        assert_eq!(AddressParseErrorKind::InvalidIpv6, parse_err("[::1:80"));
        assert_eq!(AddressParseErrorKind::InvalidIpv6, parse_err("[nope]:80"));
        assert_eq!(AddressParseErrorKind::MissingPort, parse_err("[::1]"));
    }

    #[test]
    fn numeric_hosts_must_be_canonical_ipv4() {
        assert_eq!(AddressParseErrorKind::InvalidIpv4, parse_err("010.0.0.1:80"));
        assert_eq!(AddressParseErrorKind::InvalidIpv4, parse_err("10.0.1:80"));
        assert_eq!(AddressParseErrorKind::InvalidIpv4, parse_err("167772161:80"));
        assert_eq!(AddressParseErrorKind::InvalidIpv4, parse_err("10.0.0.256:80"));

        let address = "10.0.0.1:80".parse::<EndpointAddress>().unwrap();
        assert!(address.is_ip());
        let address = "10.0.0.1.example:80".parse::<EndpointAddress>().unwrap();
        assert_eq!(AddressKind::Name("10.0.0.1.example".into()), address.kind());
    }

    #[test]
    fn error_names_the_input() {
        let error = "xyz:zyx".parse::<EndpointAddress>().unwrap_err();
        assert_eq!("invalid address `xyz:zyx`: port must be numeric", error.to_string());
    }

    #[test]
    fn deserialize() {
        let address: EndpointAddress = serde_json::from_str(r#""localhost:2222""#).unwrap();
        assert_eq!(EndpointAddress::from(("localhost".to_owned(), 2222)), address);
        assert!(serde_json::from_str::<EndpointAddress>(r#""localhost""#).is_err());
    }
}
