//! Designer configuration: naming policy, code generation style and flow roots
//!
//! Loaded from TOML; every key has a default so partial files are accepted.
//!
//! ```toml
//! [naming]
//! text_mode = "default"
//! text_template = "${class_acronym}${text}"
//!
//! [generation]
//! indent = "    "
//! new_variable = "local"
//!
//! [flow]
//! roots = ["initialize"]
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// When a handle is renamed after a text property changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMode {
    /// Never derive names from text
    Never,
    /// Only rename handles that still carry their type-derived default name
    Default,
    /// Always rename
    Always,
}

/// Handle style applied to freshly created nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewVariable {
    Empty,
    Local,
    Field,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub text_mode: TextMode,
    /// Template keys: `${class_name}`, `${text}`, `${default_name}`, `${class_acronym}`
    pub text_template: String,
    pub words_limit: usize,
    pub local_prefix: String,
    pub field_prefix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            text_mode: TextMode::Default,
            text_template: "${class_acronym}${text}".to_string(),
            words_limit: 3,
            local_prefix: String::new(),
            field_prefix: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// One level of indentation
    pub indent: String,
    pub end_of_line: String,
    pub new_variable: NewVariable,
    pub field_modifier: String,
    pub accessor_prefix: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            end_of_line: "\n".to_string(),
            new_variable: NewVariable::Empty,
            field_modifier: "private".to_string(),
            accessor_prefix: "get".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Extra method names treated as execution-flow roots
    pub roots: Vec<String>,
}

/// Complete designer configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    pub naming: NamingConfig,
    pub generation: GenerationConfig,
    pub flow: FlowConfig,
}

impl DesignerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the handle style for created nodes
    pub fn with_new_variable(mut self, style: NewVariable) -> Self {
        self.generation.new_variable = style;
        self
    }

    /// Set the indentation unit
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.generation.indent = indent.into();
        self
    }

    /// Set the text naming mode
    pub fn with_text_mode(mut self, mode: TextMode) -> Self {
        self.naming.text_mode = mode;
        self
    }

    /// Set the text naming template
    pub fn with_text_template(mut self, template: impl Into<String>) -> Self {
        self.naming.text_template = template.into();
        self
    }

    /// Set prefixes for minted local and field names
    pub fn with_prefixes(mut self, local: impl Into<String>, field: impl Into<String>) -> Self {
        self.naming.local_prefix = local.into();
        self.naming.field_prefix = field.into();
        self
    }

    /// Add an execution-flow root method
    pub fn with_flow_root(mut self, method: impl Into<String>) -> Self {
        self.flow.roots.push(method.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DesignerConfig::default();
        assert_eq!(config.generation.indent, "\t");
        assert_eq!(config.generation.new_variable, NewVariable::Empty);
        assert_eq!(config.naming.words_limit, 3);
        assert_eq!(config.naming.text_template, "${class_acronym}${text}");
    }

    #[test]
    fn test_partial_toml() {
        let config = DesignerConfig::from_str(
            r#"
[generation]
new_variable = "field"

[flow]
roots = ["initialize"]
"#,
        )
        .expect("Should parse");
        assert_eq!(config.generation.new_variable, NewVariable::Field);
        assert_eq!(config.generation.end_of_line, "\n");
        assert_eq!(config.flow.roots, vec!["initialize".to_string()]);
        assert_eq!(config.naming.text_mode, TextMode::Default);
    }

    #[test]
    fn test_invalid_toml() {
        let result = DesignerConfig::from_str("[naming]\ntext_mode = \"sometimes\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_builder() {
        let config = DesignerConfig::new()
            .with_indent("    ")
            .with_prefixes("", "m_")
            .with_flow_root("createContents");
        assert_eq!(config.generation.indent, "    ");
        assert_eq!(config.naming.field_prefix, "m_");
        assert_eq!(config.flow.roots, vec!["createContents".to_string()]);
    }
}
