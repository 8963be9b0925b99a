//! Process configuration: optional TOML file, then environment overrides.
//!
//! ```toml
//! [server]
//! addr = "127.0.0.1:3000"
//! transformer_size = 768
//! hatchling_size = 256
//!
//! [llm]
//! model = "openrouter/deepseek-3.1-v"
//! timeout_secs = 60
//! ```

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use synapse_core::{DEFAULT_HATCHLING_SIZE, DEFAULT_TRANSFORMER_SIZE, NetworkSizes};
use synapse_llm::LlmConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub transformer_size: usize,
    pub hatchling_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            transformer_size: DEFAULT_TRANSFORMER_SIZE,
            hatchling_size: DEFAULT_HATCHLING_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn sizes(&self) -> NetworkSizes {
        NetworkSizes {
            transformer: self.transformer_size,
            hatchling: self.hatchling_size,
        }
    }
}

impl Config {
    /// Load once at startup. A missing `path` means defaults plus environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Self::parse(&content)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.with_env_overrides(|k| std::env::var(k).ok())
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_env_overrides<F>(mut self, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = var("SYNAPSE_ADDR").filter(|v| !v.trim().is_empty()) {
            self.server.addr = addr
                .trim()
                .parse()
                .with_context(|| format!("invalid SYNAPSE_ADDR '{addr}'"))?;
        }
        self.llm = self.llm.with_env_overrides(&var);
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.server.hatchling_size == 0 {
            bail!("server.hatchling_size must be greater than zero");
        }
        if self.llm.timeout_secs == 0 {
            bail!("llm.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}
