//! Client configuration: where the API lives and which credentials to send.

use serde::Deserialize;

use crate::error::ApiError;

pub const ENV_BASE_URL: &str = "CAMBIOREAL_BASE_URL";
pub const ENV_APP_ID: &str = "CAMBIOREAL_APP_ID";
pub const ENV_APP_SECRET: &str = "CAMBIOREAL_APP_SECRET";

/// Base URL and application credentials for one API account.
///
/// The base URL is used verbatim: actions are appended to it without any
/// slash normalization.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub app_id: String,
    pub app_secret: String,
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    /// Read `CAMBIOREAL_BASE_URL`, `CAMBIOREAL_APP_ID` and
    /// `CAMBIOREAL_APP_SECRET` from the process environment.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let get = |key: &'static str| lookup(key).ok_or(ApiError::MissingConfig(key));
        Ok(Self {
            base_url: get(ENV_BASE_URL)?,
            app_id: get(ENV_APP_ID)?,
            app_secret: get(ENV_APP_SECRET)?,
        })
    }
}

// Hand-written so the secret never ends up in logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("app_id", &self.app_id)
            .field("app_secret", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn from_lookup_reads_all_values() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://sandbox.example.com"),
            (ENV_APP_ID, "app"),
            (ENV_APP_SECRET, "secret"),
        ]))
        .unwrap();
        assert_eq!(
            config,
            ClientConfig::new("https://sandbox.example.com", "app", "secret")
        );
    }

    #[test]
    fn from_lookup_reports_first_missing_value() {
        let err = ClientConfig::from_lookup(lookup_from(&[(ENV_BASE_URL, "https://x")]))
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingConfig(ENV_APP_ID)));
    }

    #[test]
    fn deserializes_from_json() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"base_url":"https://api.example.com","app_id":"a","app_secret":"s"}"#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.app_secret, "s");
    }

    #[test]
    fn debug_hides_secret() {
        let config = ClientConfig::new("https://x", "id", "top-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-secret"));
        assert!(rendered.contains("id"));
    }
}
