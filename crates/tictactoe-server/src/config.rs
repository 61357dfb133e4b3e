//! Server configuration read from the environment.

use anyhow::Context;
use std::net::SocketAddr;

/// Address used when `SERVER_ADDR` is unset
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address the WebSocket listener binds to
    pub addr: SocketAddr,
    /// `tracing-subscriber` env filter directive
    pub log_filter: String,
}

impl ServerConfig {
    /// Load from `SERVER_ADDR` and `RUST_LOG`
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(
            std::env::var("SERVER_ADDR").ok(),
            std::env::var("RUST_LOG").ok(),
        )
    }

    fn from_vars(addr: Option<String>, log_filter: Option<String>) -> anyhow::Result<Self> {
        let addr = addr.unwrap_or_else(|| DEFAULT_ADDR.into());
        let addr = addr
            .parse()
            .with_context(|| format!("invalid SERVER_ADDR {:?}", addr))?;

        Ok(Self {
            addr,
            log_filter: log_filter.unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
        })
    }
}
