use std::net::SocketAddr;

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port),
        }
    }

    /// The socket address to bind, falling back to all interfaces when `host` does not parse.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.port)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8081,
        };
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8081");
    }

    #[test]
    fn test_socket_addr_falls_back_on_hostname() {
        let config = ServerConfig {
            host: "localhost".to_string(),
            port: 3000,
        };
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
    }
}
