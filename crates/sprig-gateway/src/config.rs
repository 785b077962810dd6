use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Config {
    pub coach: CoachConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CoachConfig {
    pub id: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    "anthropic/claude-sonnet-4-20250514".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GeneratorConfig {
    #[serde(default = "default_generator")]
    pub name: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            name: default_generator(),
        }
    }
}

fn default_generator() -> String {
    "anthropic".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "./data/profiles.db".to_owned()
}

impl Config {
    /// Load config from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the profile db path relative to the config file's directory.
    pub(crate) fn resolve_db_path(&self, base_dir: &Path) -> PathBuf {
        let db_path = PathBuf::from(&self.store.db_path);
        if db_path.is_absolute() {
            db_path
        } else {
            base_dir.join(db_path)
        }
    }

    /// Resolve config path: check arg, then default locations.
    pub(crate) fn find_config_path(explicit: Option<&str>) -> PathBuf {
        if let Some(p) = explicit {
            return PathBuf::from(p);
        }

        // Check current directory
        let local = PathBuf::from("sprig.toml");
        if local.exists() {
            return local;
        }

        // Check XDG config
        if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME") {
            let xdg = PathBuf::from(config_dir).join("sprig/sprig.toml");
            if xdg.exists() {
                return xdg;
            }
        }

        // Check ~/.config/sprig
        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home).join(".config/sprig/sprig.toml");
            if home_config.exists() {
                return home_config;
            }
        }

        // Default to local
        local
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = "
[coach]
id = \"sprig\"
";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.coach.id, "sprig");
        assert_eq!(config.coach.model, "anthropic/claude-sonnet-4-20250514");
        assert_eq!(config.generator.name, "anthropic");
        assert_eq!(config.store.db_path, "./data/profiles.db");
    }

    #[test]
    fn parse_full_config() {
        let toml = "
[coach]
id = \"eco\"
model = \"anthropic/claude-haiku-3-5\"

[generator]
name = \"anthropic\"

[store]
db_path = \"/var/lib/sprig/profiles.db\"
";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.coach.id, "eco");
        assert_eq!(config.coach.model, "anthropic/claude-haiku-3-5");
        assert_eq!(config.store.db_path, "/var/lib/sprig/profiles.db");
    }

    #[test]
    fn missing_coach_section_fails() {
        let result: Result<Config, _> = toml::from_str("[store]\ndb_path = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn relative_db_path_resolves_against_config_dir() {
        let config: Config = toml::from_str("[coach]\nid = \"sprig\"\n").unwrap();
        let resolved = config.resolve_db_path(Path::new("/etc/sprig"));
        assert_eq!(resolved, PathBuf::from("/etc/sprig/./data/profiles.db"));
    }

    #[test]
    fn absolute_db_path_is_kept() {
        let toml = "
[coach]
id = \"sprig\"

[store]
db_path = \"/tmp/profiles.db\"
";
        let config: Config = toml::from_str(toml).unwrap();
        let resolved = config.resolve_db_path(Path::new("/etc/sprig"));
        assert_eq!(resolved, PathBuf::from("/tmp/profiles.db"));
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = Config::find_config_path(Some("/custom/sprig.toml"));
        assert_eq!(path, PathBuf::from("/custom/sprig.toml"));
    }
}
