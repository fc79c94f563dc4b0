//! Resolved model parser
//!
//! Accepts either a bare model or a versioned document:
//!
//! ```yaml
//! version: "0.1"
//! model:
//!   data: { url: data/cars.json }
//!   kind: { type: unit, mark: point }
//! ```

use crate::error::{ParseError, Result};
use chartflow_core::ResolvedModel;
use serde_yaml::Value as YamlValue;
use std::path::Path;

const DEFAULT_VERSION: &str = "0.1";

/// A parsed model with its document version
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDocument {
    pub version: String,
    pub model: ResolvedModel,
}

/// Resolved model parser
pub struct ModelParser;

impl ModelParser {
    /// Parse a model from YAML text
    pub fn from_yaml(yaml_str: &str) -> Result<ResolvedModel> {
        Ok(Self::document_from_yaml(yaml_str)?.model)
    }

    /// Parse a model document from YAML text
    pub fn document_from_yaml(yaml_str: &str) -> Result<ModelDocument> {
        let yaml: YamlValue = serde_yaml::from_str(yaml_str)?;
        Self::document_from_value(yaml)
    }

    /// Parse a model from JSON text
    pub fn from_json(json_str: &str) -> Result<ResolvedModel> {
        let json: serde_json::Value = serde_json::from_str(json_str)?;
        let version = json
            .get("version")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let model = match json.get("model") {
            Some(inner) if version.is_some() || json.get("kind").is_none() => {
                serde_json::from_value(inner.clone())?
            }
            _ => serde_json::from_value(json)?,
        };
        Ok(model)
    }

    /// Load a model from a `.yaml`, `.yml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<ResolvedModel> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        log::debug!("Loading model from {}", path.display());
        let content = std::fs::read_to_string(path)?;

        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            other => Err(ParseError::UnsupportedFormat(if other.is_empty() {
                path.display().to_string()
            } else {
                other.to_string()
            })),
        }
    }

    fn document_from_value(yaml: YamlValue) -> Result<ModelDocument> {
        let version = yaml
            .get("version")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let is_wrapped = version.is_some() || yaml.get("kind").is_none();
        if !is_wrapped {
            let model = serde_yaml::from_value(yaml)?;
            return Ok(ModelDocument {
                version: DEFAULT_VERSION.to_string(),
                model,
            });
        }

        let inner = yaml.get("model").cloned().ok_or_else(|| ParseError::MissingField {
            field: "model".to_string(),
        })?;
        Ok(ModelDocument {
            version: version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            model: serde_yaml::from_value(inner)?,
        })
    }
}
