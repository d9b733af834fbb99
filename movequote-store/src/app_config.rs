use serde::Deserialize;
use std::env;

use movequote_core::DEFAULT_PRICE_PER_KM;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pricing: PricingRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 { 5 }

fn default_run_migrations() -> bool { true }

#[derive(Debug, Deserialize, Clone)]
pub struct PricingRules {
    /// Yen charged per whole kilometre travelled
    #[serde(default = "default_price_per_km")]
    pub price_per_km: i64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self { price_per_km: default_price_per_km() }
    }
}

fn default_price_per_km() -> i64 { DEFAULT_PRICE_PER_KM }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `MOVEQUOTE_DATABASE__URL=postgres://...`
            .add_source(config::Environment::with_prefix("MOVEQUOTE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
