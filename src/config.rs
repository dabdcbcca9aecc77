//! Run configuration for the catalog builder.
//!
//! Defaults reproduce the strict build: coercion failures abort the run and
//! catalogs are written compactly. Environment variables adjust the defaults;
//! binary flags are applied on top by the callers.

use std::env;

/// What to do with a raw default that cannot be coerced to its schema type.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DefaultPolicy {
    /// Abort the run with a `TypeCoercion` error.
    #[default]
    FailFast,
    /// Keep the property but omit its default.
    DropDefault,
}

impl DefaultPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fail" | "fail-fast" => Some(DefaultPolicy::FailFast),
            "drop" | "drop-default" => Some(DefaultPolicy::DropDefault),
            _ => None,
        }
    }
}

/// Where entity fragments live inside the DSL schema document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchemaLayout {
    /// JSON pointer to the object keyed by entity name.
    pub definitions_pointer: String,
    /// Key of the model sub-schema inside one definition.
    pub model_key: String,
    /// Key of the properties sub-schema inside one definition.
    pub properties_key: String,
}

impl Default for SchemaLayout {
    fn default() -> Self {
        Self {
            definitions_pointer: "/definitions".to_string(),
            model_key: "model".to_string(),
            properties_key: "propertiesSchema".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CatalogConfig {
    pub default_policy: DefaultPolicy,
    pub layout: SchemaLayout,
    pub pretty: bool,
}

impl CatalogConfig {
    /// Defaults overlaid with `DSL_CATALOG_*` environment variables.
    ///
    /// Unrecognized policy values are ignored rather than guessed at.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(policy) = env::var("DSL_CATALOG_DEFAULT_POLICY")
            .ok()
            .and_then(|v| DefaultPolicy::parse(&v))
        {
            config.default_policy = policy;
        }
        config.pretty = env::var("DSL_CATALOG_PRETTY")
            .ok()
            .map(|v| is_truthy(&v))
            .unwrap_or(false);
        if let Ok(pointer) = env::var("DSL_CATALOG_DEFINITIONS_POINTER") {
            if pointer.is_empty() || pointer.starts_with('/') {
                config.layout.definitions_pointer = pointer;
            }
        }
        config
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_names() {
        assert_eq!(DefaultPolicy::parse("fail"), Some(DefaultPolicy::FailFast));
        assert_eq!(DefaultPolicy::parse(" Drop "), Some(DefaultPolicy::DropDefault));
        assert_eq!(DefaultPolicy::parse("ignore"), None);
    }

    #[test]
    fn defaults_are_strict_and_compact() {
        let config = CatalogConfig::default();
        assert_eq!(config.default_policy, DefaultPolicy::FailFast);
        assert!(!config.pretty);
        assert_eq!(config.layout.definitions_pointer, "/definitions");
        assert_eq!(config.layout.properties_key, "propertiesSchema");
    }

    #[test]
    fn truthiness_matches_env_conventions() {
        assert!(is_truthy("1"));
        assert!(is_truthy("yes"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("False"));
        assert!(!is_truthy("  "));
    }
}
