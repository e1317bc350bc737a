use crate::pipeline::collaborator::{DEFAULT_COLLABORATOR_BASE_URL, DEFAULT_IMAGE_MODEL};

pub const BIND_ENV: &str = "OBATECH_UPSCALE_BIND";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "OBATECH_UPSCALE_MODEL";
pub const COLLABORATOR_URL_ENV: &str = "OBATECH_UPSCALE_COLLABORATOR_URL";

pub const DEFAULT_BIND: &str = "127.0.0.1:8790";

/// Process-wide configuration, read once at startup and passed explicitly
/// into server wiring. The pipeline itself never does ambient env lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind: String,
    /// The collaborator credential. Absence fails each upscale fast, before
    /// any network attempt.
    pub collaborator_api_key: Option<String>,
    pub collaborator_model: String,
    pub collaborator_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary lookup so tests never mutate the
    /// process environment. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let cleaned = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            bind: cleaned(BIND_ENV).unwrap_or_else(|| String::from(DEFAULT_BIND)),
            collaborator_api_key: cleaned(API_KEY_ENV),
            collaborator_model: cleaned(MODEL_ENV)
                .unwrap_or_else(|| String::from(DEFAULT_IMAGE_MODEL)),
            collaborator_base_url: cleaned(COLLABORATOR_URL_ENV)
                .unwrap_or_else(|| String::from(DEFAULT_COLLABORATOR_BASE_URL)),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.collaborator_api_key, None);
        assert_eq!(config.collaborator_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.collaborator_base_url, DEFAULT_COLLABORATOR_BASE_URL);
    }

    #[test]
    fn values_are_trimmed_and_blank_counts_as_unset() {
        let config = AppConfig::from_lookup(|key| match key {
            API_KEY_ENV => Some(String::from("  secret-key  ")),
            MODEL_ENV => Some(String::from("   ")),
            _ => None,
        });
        assert_eq!(config.collaborator_api_key.as_deref(), Some("secret-key"));
        assert_eq!(config.collaborator_model, DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn explicit_values_win_over_defaults() {
        let config = AppConfig::from_lookup(|key| match key {
            BIND_ENV => Some(String::from("0.0.0.0:9000")),
            COLLABORATOR_URL_ENV => Some(String::from("http://127.0.0.1:1234/v1beta/models")),
            _ => None,
        });
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(
            config.collaborator_base_url,
            "http://127.0.0.1:1234/v1beta/models"
        );
    }
}
