//! Generator configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_MAX_REPEAT: u32 = 32;
pub const DEFAULT_INVALID_RETRY_LIMIT: u32 = 1000;

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Faker locale: "en", "fr_fr" or "pt_br"
    pub locale: String,

    /// Fixed seed for reproducible output (OS entropy when unset)
    pub seed: Option<u64>,

    /// Reseed from the clock before every draw
    pub autoseed: bool,

    /// Upper bound for unbounded regex repetitions (`*`, `+`, `{n,}`)
    pub max_repeat: u32,

    /// Attempts spent looking for a value that violates multipleOf, a
    /// pattern or an enum before giving up
    pub invalid_retry_limit: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            seed: None,
            autoseed: false,
            max_repeat: DEFAULT_MAX_REPEAT,
            invalid_retry_limit: DEFAULT_INVALID_RETRY_LIMIT,
        }
    }
}

impl GeneratorConfig {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.apistub.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."))
    }

    /// Look for the default file names inside `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let candidates = [".apistub.toml", ".apistub.json", "apistub.toml"];

        for name in candidates {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        Ok(Self::default())
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# apistub configuration

# Faker locale: en, fr_fr, pt_br
locale = "en"

# Fixed seed for reproducible fixtures (omit for OS entropy)
# seed = 42

# Reseed from the wall clock before every draw
autoseed = false

# Cap for unbounded regex repetitions
max_repeat = 32

# Attempts spent hunting for a value outside multipleOf / pattern / enum
invalid_retry_limit = 1000
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.locale, "en");
        assert_eq!(config.seed, None);
        assert_eq!(config.max_repeat, 32);
        assert_eq!(config.invalid_retry_limit, 1000);
    }

    #[test]
    fn parse_toml() {
        let toml = r#"
locale = "fr_fr"
seed = 7
max_repeat = 8
"#;
        let config: GeneratorConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.locale, "fr_fr");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_repeat, 8);
        assert!(!config.autoseed);
        assert_eq!(config.invalid_retry_limit, DEFAULT_INVALID_RETRY_LIMIT);
    }

    #[test]
    fn example_parses() {
        let config: GeneratorConfig = toml::from_str(GeneratorConfig::example()).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apistub.json");
        std::fs::write(&path, r#"{"locale": "pt_br", "autoseed": true}"#).unwrap();

        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.locale, "pt_br");
        assert!(config.autoseed);
    }

    #[test]
    fn load_from_dir_prefers_dotfile() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".apistub.toml"), "seed = 1").unwrap();
        std::fs::write(dir.path().join("apistub.toml"), "seed = 2").unwrap();

        let config = GeneratorConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.seed, Some(1));
    }

    #[test]
    fn load_from_empty_dir_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            GeneratorConfig::load(&missing),
            Err(ConfigError::Io(..))
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "seed = \"many\"").unwrap();
        assert!(matches!(GeneratorConfig::load(&bad), Err(ConfigError::Parse(_))));
    }
}
