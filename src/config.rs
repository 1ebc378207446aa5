//! The provider block.
//!
//! Every attribute can be left out of the block and supplied through the
//! environment instead:
//!
//! | Attribute  | Variable              |
//! |------------|-----------------------|
//! | `url`      | `MAYAN_EDMS_URL`      |
//! | `username` | `MAYAN_EDMS_USER`     |
//! | `password` | `MAYAN_EDMS_PASSWORD` |
//! | `insecure` | `MAYAN_EDMS_INSECURE` |
//!
//! `url`, `username` and `password` must end up set one way or the other.

use serde::Deserialize;
use serde_json::Value;

use crate::client::ClientConfig;
use crate::error::ProviderError;
use crate::schema::{Attribute, Diagnostic, Schema};

pub const ENV_URL: &str = "MAYAN_EDMS_URL";
pub const ENV_USER: &str = "MAYAN_EDMS_USER";
pub const ENV_PASSWORD: &str = "MAYAN_EDMS_PASSWORD";
pub const ENV_INSECURE: &str = "MAYAN_EDMS_INSECURE";

/// Schema of the provider block.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("Connection settings for a Mayan EDMS server")
        .with_attribute(
            "url",
            Attribute::optional_string().with_description(format!(
                "Base URL of the server, e.g. https://mayan.example.com. Falls back to {}",
                ENV_URL
            )),
        )
        .with_attribute(
            "username",
            Attribute::optional_string().with_description(format!("Falls back to {}", ENV_USER)),
        )
        .with_attribute(
            "password",
            Attribute::optional_string()
                .sensitive()
                .with_description(format!("Falls back to {}", ENV_PASSWORD)),
        )
        .with_attribute(
            "insecure",
            Attribute::optional_bool()
                .with_default(false)
                .with_description(format!(
                    "Skip TLS certificate verification. Falls back to {}",
                    ENV_INSECURE
                )),
        )
}

/// The provider block as written, before environment fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub insecure: Option<bool>,
}

impl ProviderConfig {
    /// Decode a provider block; `null` is an empty block.
    pub fn from_value(value: Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Fill unset attributes from the process environment.
    pub fn with_env_fallbacks(self) -> Self {
        self.with_fallbacks(|name| std::env::var(name).ok())
    }

    /// Fill unset attributes from `lookup`, keyed by variable name.
    pub fn with_fallbacks(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if is_unset(&self.url) {
            self.url = get(ENV_URL);
        }
        if is_unset(&self.username) {
            self.username = get(ENV_USER);
        }
        if is_unset(&self.password) {
            self.password = get(ENV_PASSWORD);
        }
        if self.insecure.is_none() {
            self.insecure = get(ENV_INSECURE).map(|v| parse_flag(&v));
        }
        self
    }

    /// Settings for the HTTP client, or one error diagnostic per missing
    /// value.
    pub fn resolve(self) -> Result<ClientConfig, Vec<Diagnostic>> {
        let missing = |attribute: &str, variable: &str| {
            Diagnostic::error(format!("Missing required attribute '{}'", attribute))
                .with_detail(format!("Set it in the provider block or through {}", variable))
                .with_attribute(attribute)
        };

        let mut diagnostics = Vec::new();
        if is_unset(&self.url) {
            diagnostics.push(missing("url", ENV_URL));
        }
        if is_unset(&self.username) {
            diagnostics.push(missing("username", ENV_USER));
        }
        if is_unset(&self.password) {
            diagnostics.push(missing("password", ENV_PASSWORD));
        }

        match (self.url, self.username, self.password) {
            (Some(url), Some(username), Some(password)) if diagnostics.is_empty() => {
                Ok(ClientConfig {
                    url,
                    username,
                    password,
                    insecure: self.insecure.unwrap_or(false),
                })
            }
            _ => Err(diagnostics),
        }
    }
}

fn is_unset(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_block_wins_over_environment() {
        let config = ProviderConfig::from_value(json!({
            "url": "https://mayan.example.com",
            "username": "admin",
            "password": "secret"
        }))
        .unwrap()
        .with_fallbacks(env(&[(ENV_URL, "http://other"), (ENV_INSECURE, "yes")]))
        .resolve()
        .unwrap();

        assert_eq!(config.url, "https://mayan.example.com");
        assert!(config.insecure);
    }

    #[test]
    fn test_environment_only() {
        let config = ProviderConfig::from_value(Value::Null)
            .unwrap()
            .with_fallbacks(env(&[
                (ENV_URL, "http://localhost"),
                (ENV_USER, "admin"),
                (ENV_PASSWORD, "secret"),
            ]))
            .resolve()
            .unwrap();

        assert_eq!(config.username, "admin");
        assert!(!config.insecure);
    }

    #[test]
    fn test_one_diagnostic_per_missing_value() {
        let diagnostics = ProviderConfig::from_value(json!({"username": "admin", "password": ""}))
            .unwrap()
            .with_fallbacks(env(&[]))
            .resolve()
            .unwrap_err();

        let attributes: Vec<_> = diagnostics
            .iter()
            .map(|d| d.attribute.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(attributes, vec!["url", "password"]);
    }

    #[test]
    fn test_flag_parsing() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("off"));
    }

    #[test]
    fn test_schema_marks_password_sensitive() {
        let schema = schema();
        assert!(schema.attribute("password").unwrap().flags.sensitive);
        assert!(crate::validation::is_valid(&schema, &json!({"insecure": true})));
    }
}
