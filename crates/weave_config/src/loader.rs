//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the configuration file at the project root.
pub const CONFIG_FILE: &str = "weave.toml";

/// Loads and validates a `weave.toml` configuration from a project directory.
///
/// Reads `<project_dir>/weave.toml`, parses it, and validates required fields.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `weave.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.source_roots.is_empty() {
        return Err(ConfigError::MissingField("project.source_roots".to_string()));
    }
    for root in &config.project.source_roots {
        if root.is_empty() || root.contains(['#', '?']) {
            return Err(ConfigError::ValidationError(format!(
                "source root '{root}' must be non-empty and free of '#' and '?'"
            )));
        }
    }
    let ext = &config.artifacts.extension;
    if ext.is_empty() || ext.contains('.') {
        return Err(ConfigError::ValidationError(format!(
            "artifacts.extension '{ext}' must be non-empty and contain no '.'"
        )));
    }
    if config.engine.max_notify_depth == 0 {
        return Err(ConfigError::ValidationError(
            "engine.max_notify_depth must be at least 1".to_string(),
        ));
    }
    for (name, provider) in &config.providers {
        if provider.suffix.as_deref() == Some("") {
            return Err(ConfigError::ValidationError(format!(
                "providers.{name}.suffix must not be empty"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[project]
name = "demo"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "demo");
        assert_eq!(config.project.source_roots, vec!["src"]);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "demo"
source_roots = ["src/main", "src/gen"]

[artifacts]
extension = "aj"
implicit_packages = ["java.lang", "kotlin"]

[engine]
max_notify_depth = 16

[providers.bean]
markers = ["Bean", "Data"]
suffix = "Accessors"

[providers.to_string]
enabled = false
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.source_roots.len(), 2);
        assert_eq!(config.artifacts.extension, "aj");
        assert_eq!(config.artifacts.implicit_packages, vec!["java.lang", "kotlin"]);
        assert_eq!(config.engine.max_notify_depth, 16);
        let bean = &config.providers["bean"];
        assert!(bean.enabled);
        assert_eq!(bean.markers.as_deref(), Some(&["Bean".to_string(), "Data".to_string()][..]));
        assert_eq!(bean.suffix.as_deref(), Some("Accessors"));
        assert!(!config.providers["to_string"].enabled);
    }

    #[test]
    fn default_values() {
        let toml = r#"
[project]
name = "demo"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.artifacts.extension, "aug");
        assert_eq!(config.artifacts.implicit_packages, vec!["java.lang"]);
        assert_eq!(config.engine.max_notify_depth, 64);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn missing_name_errors() {
        let toml = r#"
[project]
name = ""
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn missing_project_section_errors() {
        let err = load_config_from_str("[engine]\nmax_notify_depth = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn empty_source_roots_errors() {
        let toml = r#"
[project]
name = "demo"
source_roots = []
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn reserved_character_in_root_errors() {
        let toml = r#"
[project]
name = "demo"
source_roots = ["src#1"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_depth_errors() {
        let toml = r#"
[project]
name = "demo"

[engine]
max_notify_depth = 0
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn dotted_extension_errors() {
        let toml = r#"
[project]
name = "demo"

[artifacts]
extension = ".aug"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn empty_suffix_errors() {
        let toml = r#"
[project]
name = "demo"

[providers.bean]
suffix = ""
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let toml = "this is not valid toml {{{}}}";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[project]\nname = \"disk\"\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.project.name, "disk");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
