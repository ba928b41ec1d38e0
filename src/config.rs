//! Runtime configuration
//!
//! Every flag can also come from the environment (or `.env`), which is how
//! the service is configured when deployed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::middleware::RateLimitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KvBackend {
    Memory,
    Sqlite,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "edgeboard")]
#[command(about = "Edgeboard signal API - synthetic sports betting signals over HTTP")]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: String,

    /// HTTP port
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Blob store backend
    #[arg(long, env = "KV_BACKEND", value_enum, default_value = "sqlite")]
    pub kv_backend: KvBackend,

    /// SQLite file, relative paths resolve against the crate directory
    #[arg(long, env = "DB_PATH", default_value = "edgeboard_kv.db")]
    pub db_path: String,

    /// Markets to fabricate on startup when the store is empty (0 = wait for /api/init)
    #[arg(long, env = "SEED_MARKETS", default_value = "40")]
    pub seed_markets: usize,

    /// Minimum score a market needs to become a signal
    #[arg(long, env = "SIGNAL_THRESHOLD", default_value = "45")]
    pub signal_threshold: f64,

    /// Seconds between board refreshes (0 = never)
    #[arg(long, env = "REFRESH_SECS", default_value = "30")]
    pub refresh_secs: u64,

    /// Fixed RNG seed for reproducible boards
    #[arg(long, env = "RNG_SEED")]
    pub rng_seed: Option<u64>,

    /// Requests per client per minute
    #[arg(long, env = "RATE_LIMIT_PER_MIN", default_value = "120")]
    pub rate_limit_per_min: u32,

    /// Extra requests tolerated above the per-minute limit
    #[arg(long, env = "RATE_LIMIT_BURST", default_value = "30")]
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.signal_threshold) {
            anyhow::bail!(
                "SIGNAL_THRESHOLD must be within 0..=100, got {}",
                self.signal_threshold
            );
        }
        if self.seed_markets > crate::api::MAX_INIT_MARKETS {
            anyhow::bail!(
                "SEED_MARKETS must be at most {}, got {}",
                crate::api::MAX_INIT_MARKETS,
                self.seed_markets
            );
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_secs > 0).then(|| Duration::from_secs(self.refresh_secs))
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.rate_limit_per_min,
            window: Duration::from_secs(60),
            burst: self.rate_limit_burst,
        }
    }

    pub fn resolved_db_path(&self) -> String {
        resolve_data_path(&self.db_path)
    }
}

/// Relative paths are anchored at the crate directory, not the caller's cwd
pub fn resolve_data_path(raw: &str) -> String {
    if raw == ":memory:" {
        return raw.to_string();
    }
    let p = PathBuf::from(raw.trim());
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join(p)
        .to_string_lossy()
        .to_string()
}

/// Load `.env` from the cwd chain and from the crate directory
pub fn load_env() {
    let _ = dotenv::dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        let config = Config::try_parse_from(["edgeboard"]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.kv_backend, KvBackend::Sqlite);
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(30)));
        config.validate().unwrap();
    }

    #[test]
    fn test_flags_override() {
        let config = Config::try_parse_from([
            "edgeboard",
            "--kv-backend",
            "memory",
            "--refresh-secs",
            "0",
            "--rng-seed",
            "7",
            "--signal-threshold",
            "101",
        ])
        .unwrap();
        assert_eq!(config.kv_backend, KvBackend::Memory);
        assert_eq!(config.refresh_interval(), None);
        assert_eq!(config.rng_seed, Some(7));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_data_path() {
        assert_eq!(resolve_data_path(":memory:"), ":memory:");
        assert_eq!(resolve_data_path("/tmp/kv.db"), "/tmp/kv.db");
        assert!(resolve_data_path("kv.db").ends_with("kv.db"));
        assert!(resolve_data_path("kv.db").starts_with(env!("CARGO_MANIFEST_DIR")));
    }
}
