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

use crate::{
    endpoint::{AddressParseError, EndpointAddress},
    envoy::Admin,
};

/// The address the data plane's admin interface binds to when none is
/// configured.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:9901";

/// Builds the admin interface bound to `address`.
pub fn build_admin(address: &str) -> Result<Admin, AddressParseError> {
    let address = address.parse::<EndpointAddress>()?;
    tracing::debug!(%address, "admin interface");

    Ok(Admin {
        address: (&address).into(),
    })
}
