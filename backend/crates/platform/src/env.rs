//! Environment helpers

use std::str::FromStr;

/// Runtime mode, from `APP_ENV` or else `NODE_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    pub fn from_env() -> Self {
        let raw = var("APP_ENV").or_else(|| var("NODE_ENV"));
        Self::from_value(raw.as_deref())
    }

    /// Anything other than `production` counts as development
    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "production" || v == "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    }
}

/// Non-empty, trimmed environment variable
pub fn var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parsed environment variable with a fallback for missing or malformed values
pub fn var_or<T: FromStr>(key: &str, default: T) -> T {
    match var(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring malformed environment variable");
            default
        }),
        None => default,
    }
}

/// Comma separated list, blanks dropped
pub fn var_list(key: &str) -> Vec<String> {
    var(key)
        .map(|raw| split_list(&raw))
        .unwrap_or_default()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_value() {
        assert_eq!(
            Environment::from_value(Some("production")),
            Environment::Production
        );
        assert_eq!(
            Environment::from_value(Some(" Production ")),
            Environment::Production
        );
        assert_eq!(
            Environment::from_value(Some("staging")),
            Environment::Development
        );
        assert_eq!(Environment::from_value(None), Environment::Development);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("http://a.test, ,http://b.test,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(split_list("").is_empty());
    }
}
