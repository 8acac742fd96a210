use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Name of an isolated key space (`[A-Za-z0-9_]{1,64}`).
///
/// Dashes are rejected so that backends can join namespace and key with `-`
/// without ambiguity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Root key set payload.
    pub const ROOT_KEYS: &'static str = "ROOT_KEYS";
    /// Node key list payload.
    pub const NODE_KEYS: &'static str = "NODE_KEYS";
    /// Authenticator-backed key pair records.
    pub const LOCAL_USER: &'static str = "LOCAL_USER";

    /// Parses a validated namespace.
    pub fn parse(value: impl Into<String>) -> Result<Self, StoreError> {
        let s = value.into();
        if !Regex::new(r"^[A-Za-z0-9_]{1,64}$")
            .expect("invalid regex")
            .is_match(&s)
        {
            return Err(StoreError::InvalidNamespace(s));
        }
        Ok(Self(s))
    }

    /// Builds a namespace from one of the well-known constants.
    ///
    /// Panics in debug builds if `name` is not one of them.
    pub fn well_known(name: &'static str) -> Self {
        debug_assert!(
            [Self::ROOT_KEYS, Self::NODE_KEYS, Self::LOCAL_USER].contains(&name),
            "'{name}' is not a well-known namespace"
        );
        Self(name.to_string())
    }

    /// Key prefix used by backends that share one key space.
    pub fn prefix(&self) -> String {
        format!("{}-", self.0)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_dashes_and_empty() {
        assert!(Namespace::parse("NODE-KEYS").is_err());
        assert!(Namespace::parse("").is_err());
        assert_eq!(Namespace::parse("NODE_KEYS").unwrap().as_ref(), "NODE_KEYS");
    }

    #[test]
    fn well_known_names_pass_validation() {
        for name in [Namespace::ROOT_KEYS, Namespace::NODE_KEYS, Namespace::LOCAL_USER] {
            assert_eq!(Namespace::parse(name).unwrap(), Namespace::well_known(name));
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not a well-known namespace")]
    fn well_known_rejects_other_names() {
        let _ = Namespace::well_known("NODE-KEYS");
    }
}
