//! Catalog endpoint configuration (environment driven).

use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_API_URL: &str = "APM_API_URL";
pub const ENV_PRODUCTS_PATH: &str = "APM_PRODUCTS_PATH";
pub const ENV_CATEGORIES_PATH: &str = "APM_CATEGORIES_PATH";
pub const ENV_SUPPLIERS_PATH: &str = "APM_SUPPLIERS_PATH";
pub const ENV_AUTH_TOKEN: &str = "APM_AUTH_TOKEN";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "APM_HTTP_TIMEOUT_SECS";

/// Where the catalog collections live and how to reach them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub api_url: String,
    pub products_path: String,
    pub categories_path: String,
    pub suppliers_path: String,
    pub auth_token: Option<String>,
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:4200".to_string(),
            products_path: "api/products".to_string(),
            categories_path: "api/productCategories".to_string(),
            suppliers_path: "api/suppliers".to_string(),
            auth_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl CatalogConfig {
    /// Configuration for a given base URL, default paths otherwise.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = match lookup(ENV_API_URL) {
            Some(url) if url.trim().is_empty() => {
                return Err(ConfigError::InvalidValue {
                    key: ENV_API_URL,
                    value: url,
                    reason: "must not be empty".to_string(),
                });
            }
            Some(url) => url.trim().to_string(),
            None => defaults.api_url,
        };

        let timeout = match lookup(ENV_HTTP_TIMEOUT_SECS) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                    key: ENV_HTTP_TIMEOUT_SECS,
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        Ok(Self {
            api_url,
            products_path: lookup(ENV_PRODUCTS_PATH).unwrap_or(defaults.products_path),
            categories_path: lookup(ENV_CATEGORIES_PATH).unwrap_or(defaults.categories_path),
            suppliers_path: lookup(ENV_SUPPLIERS_PATH).unwrap_or(defaults.suppliers_path),
            auth_token: lookup(ENV_AUTH_TOKEN).filter(|token| !token.trim().is_empty()),
            timeout,
        })
    }

    pub fn products_url(&self) -> String {
        self.endpoint(&self.products_path)
    }

    pub fn categories_url(&self) -> String {
        self.endpoint(&self.categories_path)
    }

    pub fn suppliers_url(&self) -> String {
        self.endpoint(&self.suppliers_path)
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_environment_yields_defaults() {
        let config = CatalogConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.products_url(), "http://localhost:4200/api/products");
    }

    #[test]
    fn overrides_are_applied_and_slashes_normalized() {
        let config = CatalogConfig::from_lookup(lookup_from(&[
            (ENV_API_URL, "http://catalog.internal:8080/"),
            (ENV_CATEGORIES_PATH, "/v2/categories"),
            (ENV_AUTH_TOKEN, "secret"),
            (ENV_HTTP_TIMEOUT_SECS, "5"),
        ]))
        .unwrap();

        assert_eq!(config.categories_url(), "http://catalog.internal:8080/v2/categories");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let err = CatalogConfig::from_lookup(lookup_from(&[(ENV_HTTP_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { key, .. } => assert_eq!(key, ENV_HTTP_TIMEOUT_SECS),
        }
    }

    #[test]
    fn blank_api_url_and_token_are_handled() {
        assert!(CatalogConfig::from_lookup(lookup_from(&[(ENV_API_URL, "  ")])).is_err());

        let config = CatalogConfig::from_lookup(lookup_from(&[(ENV_AUTH_TOKEN, "")])).unwrap();
        assert_eq!(config.auth_token, None);
    }
}
