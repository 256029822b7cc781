/*
 * Copyright 2021 Google LLC
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

//! Fixed tags attached to every stat the data plane emits.

use crate::envoy::{StatsConfig, TagSpecifier};

/// The service role of a node that runs every service in one process.
pub const ALL_SERVICES: &str = "all";

const SERVICE_TAG: &str = "service";

/// Builds the stats tags for a node running `services`.
///
/// Only the monolithic `all` role is tagged. Other roles, recognised or not,
/// produce no tags; validating the role is not this builder's job.
pub fn build_stats_config(services: &str) -> StatsConfig {
    let stats_tags = match services.trim() {
        ALL_SERVICES => vec![TagSpecifier {
            tag_name: SERVICE_TAG.into(),
            fixed_value: crate::PRODUCT_NAME.into(),
        }],
        // TODO: per-role tags for split deployments once the tag values for
        // each role are agreed.
        _ => Vec::new(),
    };

    StatsConfig { stats_tags }
}

/// The name a node reports itself as: the product name for `all`, otherwise
/// the product name suffixed with the role.
pub fn service_name(services: &str) -> String {
    match services.trim() {
        ALL_SERVICES | "" => crate::PRODUCT_NAME.into(),
        role => format!("{}-{role}", crate::PRODUCT_NAME),
    }
}
