//! Server configuration.
//!
//! Every option can be given as a command-line flag or an environment
//! variable. A `.env` file in the working directory is loaded first.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use pagewatch_token::{DownloadSecret, DEFAULT_MAX_TTL_SECS, DEFAULT_TTL_SECS};

use crate::db::DEFAULT_MAX_CONNECTIONS;

/// Pagewatch API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "pagewatch-server")]
#[command(version, about, long_about = None)]
pub struct ServerConfig {
    /// Address to bind to.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Maximum number of pooled database connections.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub db_max_connections: u32,

    /// Base signing secret. Download tokens use a key derived from it.
    /// Leaving it unset falls back to an insecure development secret.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Directory downloadable files are stored in.
    #[arg(long, env = "DOWNLOAD_ROOT", default_value = "storage/downloads")]
    pub download_root: PathBuf,

    /// Lifetime in seconds of tokens minted for listings.
    #[arg(long, env = "DOWNLOAD_TOKEN_TTL", default_value_t = DEFAULT_TTL_SECS)]
    pub token_ttl: u64,

    /// Longest lifetime in seconds any download token may have.
    #[arg(long, env = "DOWNLOAD_TOKEN_MAX_TTL", default_value_t = DEFAULT_MAX_TTL_SECS)]
    pub token_max_ttl: u64,

    /// Apply pending database migrations at startup.
    #[arg(long, env = "RUN_MIGRATIONS", default_value_t = true, action = clap::ArgAction::Set)]
    pub run_migrations: bool,
}

impl ServerConfig {
    /// Checks values clap cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("Port must be non-zero"));
        }

        if self.db_max_connections == 0 {
            return Err(anyhow!("Database pool needs at least 1 connection"));
        }

        if self.token_ttl == 0 {
            return Err(anyhow!("Download token TTL must be at least 1 second"));
        }

        if self.token_ttl > self.token_max_ttl {
            return Err(anyhow!(
                "Download token TTL {} exceeds the maximum of {} seconds",
                self.token_ttl,
                self.token_max_ttl
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Download signing secret derived from `jwt_secret`.
    pub fn download_secret(&self) -> DownloadSecret {
        DownloadSecret::from_base(self.jwt_secret.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerConfig {
        let mut argv = vec!["pagewatch-server", "--database-url", "postgres://localhost/pagewatch"];
        argv.extend_from_slice(args);
        ServerConfig::try_parse_from(argv).expect("arguments should parse")
    }

    #[test]
    fn test_defaults_validate() {
        let config = parse(&["--port", "3000", "--token-ttl", "300", "--token-max-ttl", "3600"]);
        assert!(config.validate().is_ok());
        assert_eq!(config.socket_addr().port(), 3000);
    }

    #[test]
    fn test_ttl_above_max_is_rejected() {
        let config = parse(&["--token-ttl", "7200", "--token-max-ttl", "3600"]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"));
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let config = parse(&["--token-ttl", "0", "--token-max-ttl", "3600"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_db_max_connections() {
        assert_eq!(parse(&[]).db_max_connections, DEFAULT_MAX_CONNECTIONS);

        let config = parse(&["--db-max-connections", "25"]);
        assert_eq!(config.db_max_connections, 25);
        assert!(config.validate().is_ok());

        let config = parse(&["--db-max-connections", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secret_derivation() {
        let config = parse(&["--jwt-secret", "prod-secret"]);
        let secret = config.download_secret();
        assert!(!secret.is_insecure_default());
        assert_eq!(secret.as_bytes(), b"prod-secret::download");
    }
}
