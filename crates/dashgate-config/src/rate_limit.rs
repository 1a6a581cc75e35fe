//! Rate limiting configuration backed by `tower_governor`.
//!
//! Limits are keyed by client IP (`X-Forwarded-For`, `X-Real-Ip`, `Forwarded`,
//! then the peer address). Two buckets exist: a general one applied to the
//! whole API and a stricter one for the login/refresh endpoints.
//!
//! Environment variables:
//!
//! - `RATE_LIMIT_GENERAL_PER_SECOND`: seconds between token replenishments (default: 2)
//! - `RATE_LIMIT_GENERAL_BURST_SIZE`: bucket size (default: 30)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: seconds between token replenishments (default: 10)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: bucket size (default: 5)

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

use crate::env_or;

pub type IpGovernorConfig =
    GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub general_per_second: u64,
    pub general_burst_size: u32,
    pub auth_per_second: u64,
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            general_per_second: 2,
            general_burst_size: 30,
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            general_per_second: env_or("RATE_LIMIT_GENERAL_PER_SECOND", defaults.general_per_second),
            general_burst_size: env_or("RATE_LIMIT_GENERAL_BURST_SIZE", defaults.general_burst_size),
            auth_per_second: env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
        }
    }

    /// Governor config for the general API bucket.
    ///
    /// # Panics
    ///
    /// Never in practice: zero values are raised to one before building.
    #[must_use]
    pub fn general_governor_config(&self) -> IpGovernorConfig {
        build(self.general_per_second, self.general_burst_size)
    }

    /// Governor config for the authentication bucket.
    #[must_use]
    pub fn auth_governor_config(&self) -> IpGovernorConfig {
        build(self.auth_per_second, self.auth_burst_size)
    }
}

fn build(per_second: u64, burst_size: u32) -> IpGovernorConfig {
    GovernorConfigBuilder::default()
        .per_second(per_second.max(1))
        .burst_size(burst_size.max(1))
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("governor config with non-zero period and burst always builds")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.general_per_second, 2);
        assert_eq!(config.general_burst_size, 30);
        assert_eq!(config.auth_per_second, 10);
        assert_eq!(config.auth_burst_size, 5);
    }

    #[test]
    fn test_zero_values_still_build() {
        let config = RateLimitConfig {
            general_per_second: 0,
            general_burst_size: 0,
            auth_per_second: 0,
            auth_burst_size: 0,
        };
        let _ = config.general_governor_config();
        let _ = config.auth_governor_config();
    }
}
