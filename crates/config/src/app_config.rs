// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::load_config::{
    find_in_parent, resolve_config_path, resolve_relative, DEFAULT_CONFIG_NAME,
};
use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

pub const ENV_PREFIX: &str = "FHE_ORACLE_";
pub const DEFAULT_ORACLE_ADDRESS: &str = "0.0.0.0:50051";
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;
pub const ORACLE_RETRY_AMOUNT: u32 = 3;

/// Where answers come from when the local store misses.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthorityMode {
    /// This process holds the FHE secret material and decrypts itself.
    #[default]
    Local,
    /// Signed require results over the HTTP store.
    Http,
    /// Remote decryption oracle over gRPC.
    Network,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct OracleConfig {
    pub authority: AuthorityMode,
    /// Only the oracle node loads the signing key and publishes results.
    pub is_oracle: bool,
    /// Base URL in http mode, `host:port` (or full URI) in network mode.
    pub oracle_address: Option<String>,
    /// Durable store location in local mode. In-memory when unset.
    pub db_path: Option<PathBuf>,
    pub oracle_private_key_path: PathBuf,
    pub oracle_public_key_path: PathBuf,
    /// Base for every relative path above.
    pub home_dir: Option<PathBuf>,
    pub rpc_timeout_secs: u64,
    pub retry_amount: u32,
    pub retry_delay_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            authority: AuthorityMode::Local,
            is_oracle: false,
            oracle_address: None,
            db_path: None,
            oracle_private_key_path: PathBuf::from("keys/oracle/private.key"),
            oracle_public_key_path: PathBuf::from("keys/oracle/public.key"),
            home_dir: None,
            rpc_timeout_secs: DEFAULT_RPC_TIMEOUT_SECS,
            retry_amount: ORACLE_RETRY_AMOUNT,
            retry_delay_ms: 0,
        }
    }
}

impl OracleConfig {
    fn resolve(&self, path: &Path) -> PathBuf {
        resolve_relative(self.home_dir.as_deref(), path)
    }

    pub fn db_file(&self) -> Option<PathBuf> {
        self.db_path.as_deref().map(|p| self.resolve(p))
    }

    pub fn private_key_file(&self) -> PathBuf {
        self.resolve(&self.oracle_private_key_path)
    }

    pub fn public_key_file(&self) -> PathBuf {
        self.resolve(&self.oracle_public_key_path)
    }

    /// The configured address, or the default gRPC listener address.
    pub fn address(&self) -> &str {
        self.oracle_address
            .as_deref()
            .unwrap_or(DEFAULT_ORACLE_ADDRESS)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.authority == AuthorityMode::Http && self.oracle_address.is_none() {
            bail!("oracle_address is required when authority is 'http'");
        }
        if self.authority == AuthorityMode::Network && self.rpc_timeout_secs == 0 {
            bail!("rpc_timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("fhe-oracle"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Loads configuration layered as defaults, then the YAML file, then
/// `FHE_ORACLE_*` environment variables.
///
/// An explicit `config_file` must exist. Without one the nearest
/// `oracle.config.yaml` at or above the working directory is used when
/// present.
pub fn load_config(config_file: Option<PathBuf>) -> Result<OracleConfig> {
    let cwd = env::current_dir()?;
    let resolved = resolve_config_path(
        find_in_parent,
        &cwd,
        &default_config_dir(),
        DEFAULT_CONFIG_NAME,
        config_file.as_deref(),
    );

    if config_file.is_some() && !resolved.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file {} not found", resolved.display()),
        )
        .into());
    }

    let config: OracleConfig = Figment::from(Serialized::defaults(OracleConfig::default()))
        .merge(Yaml::file(&resolved))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .context("Could not parse configuration")?;

    config.validate()?;
    info!(
        authority = ?config.authority,
        is_oracle = config.is_oracle,
        "Loaded oracle config from {}",
        resolved.display()
    );
    Ok(config)
}
