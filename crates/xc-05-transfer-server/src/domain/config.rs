//! Transfer server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use super::errors::TransferError;

/// Listen address and public URL of the transfer server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Listen IP.
    pub ip: IpAddr,
    /// Listen port.
    pub port: u16,
    /// Address advertised to storage providers (`host:port`). Defaults to
    /// the listen address.
    pub public_addr: Option<String>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            public_addr: None,
        }
    }
}

impl TransferConfig {
    /// Socket address to bind.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// `host:port` used to build self-hosted transfer URLs.
    pub fn advertised_addr(&self) -> String {
        self.public_addr
            .clone()
            .unwrap_or_else(|| self.listen_addr().to_string())
    }

    /// URL a storage provider pulls transfer `id` from.
    pub fn transfer_url(&self, id: u64) -> String {
        format!("http://{}/?id={}", self.advertised_addr(), id)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), TransferError> {
        if let Some(addr) = &self.public_addr {
            if addr.is_empty() || addr.contains('/') {
                return Err(TransferError::Config(format!(
                    "public_addr must be host:port, got {addr:?}"
                )));
            }
        }
        Ok(())
    }
}
