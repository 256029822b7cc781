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

use std::{path::PathBuf, sync::Arc};

use crate::{
    builder::{Builder, TRACING_CA},
    envoy::Bootstrap,
    filemgr::Manager,
    Config,
};

/// Writes the data plane's bootstrap document.
#[derive(clap::Args, Clone, Debug)]
pub struct Render {
    /// Address of the control plane's gRPC (xDS) listener.
    #[clap(long, env = "PORTCULLIS_GRPC_ADDRESS")]
    pub grpc_address: String,
    /// Address of the control plane's HTTP listener.
    #[clap(long, env = "PORTCULLIS_HTTP_ADDRESS")]
    pub http_address: String,
    /// Directory for files the bootstrap refers to by path.
    #[clap(long, env = "PORTCULLIS_CACHE_DIR", default_value = "/tmp/portcullis")]
    pub cache_dir: PathBuf,
    /// CA bundle trusted when connecting to the tracing backend over TLS.
    #[clap(long, env = "PORTCULLIS_TRACING_CA")]
    pub tracing_ca: Option<PathBuf>,
    #[clap(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,
    /// Where to write the bootstrap, stdout if omitted.
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn encode(self, bootstrap: &Bootstrap) -> crate::Result<String> {
        Ok(match self {
            Self::Json => serde_json::to_string_pretty(bootstrap)?,
            Self::Yaml => serde_yaml::to_string(bootstrap)?,
        })
    }
}

impl Render {
    pub fn render(&self, config: &Config) -> crate::Result<()> {
        let files = Arc::new(Manager::new(&self.cache_dir));
        if let Some(path) = &self.tracing_ca {
            let bytes = std::fs::read(path)?;
            files.add_bytes(TRACING_CA, &bytes)?;
        }

        let builder = Builder::new(&*self.grpc_address, &*self.http_address, files, None);
        let bootstrap = builder.build_bootstrap(config)?;
        let encoded = self.format.encode(&bootstrap)?;

        match &self.output {
            Some(path) => {
                tracing::info!(path = %path.display(), "writing bootstrap");
                std::fs::write(path, encoded)?;
            }
            None => println!("{encoded}"),
        }

        Ok(())
    }
}
