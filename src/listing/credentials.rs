//! HTTP Basic credentials for the storage API.

use std::env;
use std::fmt;

pub const USERNAME_VAR: &str = "ARTIFACTORY_USERNAME";
pub const PASSWORD_VAR: &str = "ARTIFACTORY_PASSWORD";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read `ARTIFACTORY_USERNAME` / `ARTIFACTORY_PASSWORD`.
    /// Returns None unless both are set and the username is non-empty.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup(USERNAME_VAR)?;
        let password = lookup(PASSWORD_VAR)?;
        if username.is_empty() {
            return None;
        }
        Some(Self { username, password })
    }
}

// Keep the password out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn both_values_present() {
        let lookup = lookup_from(&[(USERNAME_VAR, "bot"), (PASSWORD_VAR, "s3cret")]);
        let creds = Credentials::from_lookup(lookup).unwrap();
        assert_eq!(creds, Credentials::new("bot", "s3cret"));
    }

    #[test]
    fn missing_password_means_anonymous() {
        assert!(Credentials::from_lookup(lookup_from(&[(USERNAME_VAR, "bot")])).is_none());
    }

    #[test]
    fn empty_username_means_anonymous() {
        assert!(
            Credentials::from_lookup(lookup_from(&[(USERNAME_VAR, ""), (PASSWORD_VAR, "x")]))
                .is_none()
        );
    }

    #[test]
    fn debug_redacts_password() {
        let s = format!("{:?}", Credentials::new("bot", "s3cret"));
        assert!(s.contains("bot"));
        assert!(!s.contains("s3cret"));
    }
}
