use serde::{Deserialize, Serialize};

pub const DEFAULT_CACHE_PREFIX: &str = "framework.bean.";

/// Config for a bean factory
/// ## Fields
/// - `cache_prefix`:
///   Prefix of the cache keys instances are stored under, so the cache backend can be shared with other consumers.
///
/// - `type_fallback`:
///   If `true`, a name without a definition is treated as a type name and instantiated directly.
///   Such instances aren't wired and are only cached when requested as singletons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache_prefix: String,
    pub type_fallback: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_prefix: DEFAULT_CACHE_PREFIX.to_owned(),
            type_fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, DEFAULT_CACHE_PREFIX};

    #[test]
    fn test_partial_config() {
        let config: Config = serde_json::from_str(r#"{"type_fallback": false}"#).unwrap();

        assert_eq!(config.cache_prefix, DEFAULT_CACHE_PREFIX);
        assert!(!config.type_fallback);
    }
}
