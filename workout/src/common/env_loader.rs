//! Environment variable loading with a shared prefix

use std::env;
use std::str::FromStr;

/// Load an environment variable with a string default
pub fn load_env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Load an environment variable with type conversion and default
///
/// Values that fail to parse fall back to `default` with a warning.
pub fn load_env_parsed<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparseable value {:?} for {}", raw, key);
            default
        }),
        Err(_) => default,
    }
}

/// Loads variables named `<PREFIX>_<SUFFIX>`
#[derive(Debug)]
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    /// Create a loader for `prefix`
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }

    /// Load a string value with default
    pub fn load_string(&self, suffix: &str, default: &str) -> String {
        load_env_string(&self.key(suffix), default)
    }

    /// Load a parsed value with default
    pub fn load_parsed<T>(&self, suffix: &str, default: T) -> T
    where
        T: FromStr,
    {
        load_env_parsed(&self.key(suffix), default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_env_parsed() {
        let key = "WORKOUT_TEST_PARSED";

        env::remove_var(key);
        assert!(load_env_parsed(key, true));

        env::set_var(key, " false ");
        assert!(!load_env_parsed(key, true));

        env::set_var(key, "nope");
        assert!(load_env_parsed(key, true));

        env::remove_var(key);
    }

    #[test]
    #[serial]
    fn test_env_loader_prefixes_keys() {
        let loader = EnvLoader::new("WORKOUT_TEST");
        let key = "WORKOUT_TEST_CLIP";

        env::remove_var(key);
        assert_eq!(loader.load_string("CLIP", "default.mp3"), "default.mp3");

        env::set_var(key, "custom.mp3");
        assert_eq!(loader.load_string("CLIP", "default.mp3"), "custom.mp3");

        env::remove_var(key);
    }
}
