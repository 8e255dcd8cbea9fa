use crate::error::{Result, TranslateError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "contract-bridge.toml";
const CONFIG_DIR_NAME: &str = "contract-bridge";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub response: ResponseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Options for the request translator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Emit the deprecated `max_tokens` instead of `max_completion_tokens`.
    #[serde(default)]
    pub legacy_max_tokens: bool,
    /// Ask for a trailing usage chunk on streaming requests that set no stream options.
    #[serde(default)]
    pub include_usage_default: bool,
}

/// Options for the response translator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseConfig {
    /// Joins text parts when a message has no flat content.
    #[serde(default = "default_part_separator")]
    pub part_separator: String,
    #[serde(default)]
    pub mixed_content: MixedContentPolicy,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            part_separator: default_part_separator(),
            mixed_content: MixedContentPolicy::default(),
        }
    }
}

/// What to emit as flat content when parts mix text with other kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixedContentPolicy {
    /// Join the text parts and drop the rest.
    #[default]
    TextOnly,
    /// Emit no content at all.
    Omit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// JSONL file for translator diagnostics. Diagnostics go to tracing when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_part_separator() -> String {
    "\n".to_string()
}

impl BridgeConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TranslateError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Search standard locations for a config file, falling back to defaults.
    /// Priority: CLI arg > CWD > XDG config > home dir
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::load(path);
        }

        for candidate in config_search_paths() {
            if candidate.exists() {
                tracing::info!(path = %candidate.display(), "Loading config");
                return Self::load(&candidate);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }
}

pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // CWD
    paths.push(PathBuf::from(CONFIG_FILE_NAME));

    // XDG / platform config dir
    if cfg!(target_os = "macos") {
        if let Some(home) = home_dir() {
            paths.push(
                home.join("Library")
                    .join("Application Support")
                    .join(CONFIG_DIR_NAME)
                    .join("config.toml"),
            );
        }
    } else {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join(CONFIG_DIR_NAME).join("config.toml"));
        }
        if let Some(home) = home_dir() {
            paths.push(home.join(".config").join(CONFIG_DIR_NAME).join("config.toml"));
        }
    }

    // Home directory fallback
    if let Some(home) = home_dir() {
        paths.push(home.join(format!(".{CONFIG_FILE_NAME}")));
    }

    paths
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
[request]
legacy_max_tokens = true

[response]
part_separator = " "
mixed_content = "omit"

[logging]
file = "/tmp/bridge.jsonl"
"#
        )
        .unwrap();

        let config = BridgeConfig::load(f.path()).unwrap();
        assert!(config.request.legacy_max_tokens);
        assert!(!config.request.include_usage_default);
        assert_eq!(config.response.part_separator, " ");
        assert_eq!(config.response.mixed_content, MixedContentPolicy::Omit);
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/bridge.jsonl")));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BridgeConfig::from_toml("").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.response.part_separator, "\n");
        assert_eq!(config.response.mixed_content, MixedContentPolicy::TextOnly);
    }

    #[test]
    fn test_invalid_policy_is_config_error() {
        let err =
            BridgeConfig::from_toml("[response]\nmixed_content = \"everything\"\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let err = BridgeConfig::find_and_load(Some(Path::new("/nonexistent/bridge.toml")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_search_paths_start_in_cwd() {
        let paths = config_search_paths();
        assert_eq!(paths[0], PathBuf::from("contract-bridge.toml"));
    }
}
