//! Configuration
//! 環境変数からサーバ設定を読み込む

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// 起動時にサンプル部品カタログを投入するか
    pub seed_inventory: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            seed_inventory: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let host = lookup("APP_HOST").unwrap_or(defaults.host);

        let port = match lookup("APP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .context("APP_PORT must be a valid u16")?,
            None => defaults.port,
        };

        let seed_inventory = match lookup("DEALERSHIP_SEED") {
            Some(raw) => raw
                .to_ascii_lowercase()
                .parse::<bool>()
                .context("DEALERSHIP_SEED must be true or false")?,
            None => defaults.seed_inventory,
        };

        Ok(Self {
            host,
            port,
            seed_inventory,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
