use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::document::SchemaType;

/// Top-level project configuration loaded from `.swagdoc.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SwagdocConfig {
    pub input: String,
    /// Written to stdout when unset.
    pub output: Option<String>,
    pub target: TargetKind,
    pub format: OutputFormat,
    pub operation_ids: OperationIdConfig,
    pub pretty: bool,
}

impl Default for SwagdocConfig {
    fn default() -> Self {
        Self {
            input: "swagger.json".to_string(),
            output: None,
            target: TargetKind::Auto,
            format: OutputFormat::Json,
            operation_ids: OperationIdConfig::default(),
            pretty: true,
        }
    }
}

/// Which document version to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Swagger2,
    Openapi3,
    /// Same version as the input.
    Auto,
}

impl TargetKind {
    pub fn resolve(&self, input: SchemaType) -> SchemaType {
        match self {
            TargetKind::Swagger2 => SchemaType::Swagger2,
            TargetKind::Openapi3 => SchemaType::OpenApi3,
            TargetKind::Auto => input,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Operation-ID generation options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OperationIdConfig {
    pub generate: bool,
}

impl Default for OperationIdConfig {
    fn default() -> Self {
        Self { generate: true }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".swagdoc.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<SwagdocConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config: SwagdocConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# swagdoc configuration
input: swagger.json
# output: openapi.json   # stdout when unset
target: auto          # swagger2 | openapi3 | auto (same as input)
format: json          # json | yaml
pretty: true

operation_ids:
  generate: true      # fill in and disambiguate operationId values
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SwagdocConfig::default();
        assert_eq!(config.input, "swagger.json");
        assert!(config.output.is_none());
        assert_eq!(config.target, TargetKind::Auto);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.operation_ids.generate);
        assert!(config.pretty);
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
input: api/swagger.json
output: api/openapi.yaml
target: openapi3
format: yaml
pretty: false
operation_ids:
  generate: false
"#;
        let config: SwagdocConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "api/swagger.json");
        assert_eq!(config.output.as_deref(), Some("api/openapi.yaml"));
        assert_eq!(config.target, TargetKind::Openapi3);
        assert_eq!(config.format, OutputFormat::Yaml);
        assert!(!config.pretty);
        assert!(!config.operation_ids.generate);
    }

    #[test]
    fn test_parse_minimal_config() {
        let yaml = "input: api.yaml\n";
        let config: SwagdocConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "api.yaml");
        // Defaults applied
        assert_eq!(config.target, TargetKind::Auto);
        assert!(config.operation_ids.generate);
    }

    #[test]
    fn test_default_content_parses() {
        let config: SwagdocConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config.target, TargetKind::Auto);
    }

    #[test]
    fn test_auto_target_keeps_input_type() {
        assert_eq!(
            TargetKind::Auto.resolve(SchemaType::OpenApi3),
            SchemaType::OpenApi3
        );
        assert_eq!(
            TargetKind::Swagger2.resolve(SchemaType::OpenApi3),
            SchemaType::Swagger2
        );
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert!(load_config(&path).unwrap().is_none());

        std::fs::write(&path, default_config_content()).unwrap();
        assert!(load_config(&path).unwrap().is_some());
    }
}
