//! Server configuration.

use serde::Deserialize;

use crate::errors::AuthError;

/// Environment variable overriding [`AuthConfig::nonce_ttl_secs`].
pub const ENV_NONCE_TTL_SECS: &str = "ROOTSIG_NONCE_TTL_SECS";
/// Environment variable overriding [`AuthConfig::nonce_len`].
pub const ENV_NONCE_LEN: &str = "ROOTSIG_NONCE_LEN";

const MIN_NONCE_LEN: usize = 16;
const MAX_NONCE_TTL_SECS: u64 = 24 * 60 * 60;

/// Tunables for nonce issuance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Seconds a nonce stays valid after issuance.
    pub nonce_ttl_secs: u64,
    /// Nonce length in bytes.
    pub nonce_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            nonce_ttl_secs: 300,
            nonce_len: 64,
        }
    }
}

impl AuthConfig {
    /// Defaults overridden by `ROOTSIG_NONCE_TTL_SECS` / `ROOTSIG_NONCE_LEN` when set.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AuthError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_NONCE_TTL_SECS) {
            config.nonce_ttl_secs = raw.trim().parse().map_err(|_| {
                AuthError::InvalidConfig(format!("{ENV_NONCE_TTL_SECS}={raw} is not a number"))
            })?;
        }
        if let Some(raw) = lookup(ENV_NONCE_LEN) {
            config.nonce_len = raw.trim().parse().map_err(|_| {
                AuthError::InvalidConfig(format!("{ENV_NONCE_LEN}={raw} is not a number"))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Rejects TTLs outside one second to one day, and nonces too short to be unguessable.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.nonce_ttl_secs == 0 || self.nonce_ttl_secs > MAX_NONCE_TTL_SECS {
            return Err(AuthError::InvalidConfig(format!(
                "nonce TTL must be between 1 and {MAX_NONCE_TTL_SECS} seconds"
            )));
        }
        if self.nonce_len < MIN_NONCE_LEN {
            return Err(AuthError::InvalidConfig(format!(
                "nonce length must be at least {MIN_NONCE_LEN} bytes"
            )));
        }
        Ok(())
    }

    /// Nonce lifetime, capped at one day.
    pub fn nonce_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.nonce_ttl_secs.min(MAX_NONCE_TTL_SECS) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_are_five_minutes_and_64_bytes() {
        let config = AuthConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AuthConfig::default());
        assert_eq!(config.nonce_ttl(), chrono::Duration::minutes(5));
        assert_eq!(config.nonce_len, 64);
    }

    #[test]
    fn env_overrides() {
        let config =
            AuthConfig::from_lookup(lookup(&[(ENV_NONCE_TTL_SECS, "60"), (ENV_NONCE_LEN, "32")]))
                .unwrap();
        assert_eq!(config.nonce_ttl_secs, 60);
        assert_eq!(config.nonce_len, 32);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(AuthConfig::from_lookup(lookup(&[(ENV_NONCE_TTL_SECS, "soon")])).is_err());
        assert!(AuthConfig::from_lookup(lookup(&[(ENV_NONCE_TTL_SECS, "0")])).is_err());
        assert!(AuthConfig::from_lookup(lookup(&[(ENV_NONCE_TTL_SECS, "999999999")])).is_err());
        assert!(AuthConfig::from_lookup(lookup(&[(ENV_NONCE_LEN, "8")])).is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: AuthConfig = serde_json::from_str(r#"{"nonce_ttl_secs":30}"#).unwrap();
        assert_eq!(config.nonce_ttl_secs, 30);
        assert_eq!(config.nonce_len, 64);
    }
}
