/*
 * Copyright 2022 Google LLC
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

const SCHEMA_FILE: &str = "bootstrap.yaml";

/// Generates the JSON schema of the bootstrap configuration file.
#[derive(clap::Args, Clone, Debug)]
pub struct GenerateConfigSchema {
    /// The directory to write the schema to.
    #[clap(short, long, default_value = ".")]
    pub output_directory: std::path::PathBuf,
}

impl GenerateConfigSchema {
    pub fn generate_config_schema(&self) -> crate::Result<()> {
        let schema = schemars::schema_for!(crate::Config);
        let path = self.output_directory.join(SCHEMA_FILE);

        tracing::info!("Writing configuration schema to {}", path.display());

        std::fs::write(path, serde_yaml::to_string(&schema)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_schema_with_every_field() {
        let dir = tempfile::tempdir().unwrap();
        GenerateConfigSchema {
            output_directory: dir.path().into(),
        }
        .generate_config_schema()
        .unwrap();

        let schema: serde_yaml::Value =
            serde_yaml::from_str(&std::fs::read_to_string(dir.path().join(SCHEMA_FILE)).unwrap())
                .unwrap();
        let properties = schema["properties"].as_mapping().unwrap();
        for field in [
            "services",
            "envoy_admin_address",
            "tracing_provider",
            "tracing_address",
            "tracing_tls",
        ] {
            assert!(properties.contains_key(field), "{field}");
        }
    }
}
