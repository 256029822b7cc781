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

mod generate_config_schema;
mod render;

use std::path::{Path, PathBuf};

use eyre::WrapErr;

use crate::Config;

pub use self::{
    generate_config_schema::GenerateConfigSchema,
    render::{Format, Render},
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const ETC_CONFIG_PATH: &str = "/etc/portcullis/bootstrap.yaml";

/// Renders the startup configuration for the portcullis data plane.
#[derive(clap::Parser)]
#[clap(version, about)]
#[non_exhaustive]
pub struct Cli {
    /// The path to the bootstrap configuration file.
    #[clap(
        short,
        long,
        env = "PORTCULLIS_BOOTSTRAP_CONFIG",
        default_value = "bootstrap.yaml"
    )]
    pub config: PathBuf,
    /// Whether to report any logs to stderr.
    #[clap(short, long, env = "PORTCULLIS_BOOTSTRAP_QUIET")]
    pub quiet: bool,
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Clone, clap::Subcommand)]
pub enum Commands {
    Render(Render),
    GenerateConfigSchema(GenerateConfigSchema),
}

impl Cli {
    /// Runs the selected command to completion.
    #[tracing::instrument(skip_all)]
    pub fn drive(self) -> crate::Result<()> {
        let version: std::borrow::Cow<'static, str> = if cfg!(debug_assertions) {
            format!("{VERSION}+debug").into()
        } else {
            VERSION.into()
        };

        if !self.quiet {
            let env_filter = tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy();
            tracing_subscriber::fmt()
                .json()
                .with_file(true)
                .with_writer(std::io::stderr)
                .with_env_filter(env_filter)
                .init();
        }

        tracing::info!(version = &*version, "starting portcullis-bootstrap");

        match self.command {
            Commands::Render(render) => render.render(&Self::read_config(&self.config)?),
            Commands::GenerateConfigSchema(generator) => generator.generate_config_schema(),
        }
    }

    /// Reads the first configuration found at `path` or the system-wide
    /// location, or the defaults when neither exists.
    fn read_config(path: &Path) -> crate::Result<Config> {
        let system = cfg!(unix).then(|| Path::new(ETC_CONFIG_PATH));

        for candidate in std::iter::once(path).chain(system) {
            let file = match std::fs::File::open(candidate) {
                Ok(file) => file,
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = %candidate.display(), "no configuration file");
                    continue;
                }
                Err(error) => {
                    return Err(error)
                        .wrap_err_with(|| format!("failed to open {}", candidate.display()))
                }
            };

            tracing::info!(path = %candidate.display(), "reading configuration");
            return Config::from_reader(file)
                .wrap_err_with(|| format!("invalid configuration in {}", candidate.display()));
        }

        Ok(Config::default())
    }
}
