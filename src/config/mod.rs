pub mod persona;

use std::collections::HashMap;

/// Source of named secrets, injected into whatever needs a provider key.
pub trait CredentialProvider: Send + Sync {
    fn get_credential(&self, name: &str) -> Option<String>;
}

/// Reads credentials from the process environment (after `.env` is loaded).
/// Blank values count as absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialProvider for EnvCredentials {
    fn get_credential(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Fixed credential set, used for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl CredentialProvider for StaticCredentials {
    fn get_credential(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_credentials_treat_blank_as_missing() {
        let creds = StaticCredentials::empty().with("A", "secret").with("B", "  ");
        assert_eq!(creds.get_credential("A").as_deref(), Some("secret"));
        assert_eq!(creds.get_credential("B"), None);
        assert_eq!(creds.get_credential("C"), None);
    }

    #[test]
    fn env_credentials_read_process_environment() {
        std::env::set_var("ALGOMENTOR_TEST_CREDENTIAL", "abc");
        assert_eq!(
            EnvCredentials.get_credential("ALGOMENTOR_TEST_CREDENTIAL").as_deref(),
            Some("abc")
        );
        assert_eq!(EnvCredentials.get_credential("ALGOMENTOR_TEST_CREDENTIAL_UNSET"), None);
    }
}
