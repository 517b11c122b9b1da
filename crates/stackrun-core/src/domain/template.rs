//! Template model: the infrastructure document pulled out of the artifact.
//!
//! The raw body is kept verbatim and is what the provisioning service
//! receives. The parsed document is only used to reject content that is not
//! structured data before any request is made.

use serde::{Deserialize, Serialize};

/// Serialization format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateFormat {
    Json,
    Yaml,
}

impl TemplateFormat {
    /// `.yaml` / `.yml` are YAML, everything else is treated as JSON.
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            TemplateFormat::Yaml
        } else {
            TemplateFormat::Json
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateDocument {
    Json(serde_json::Value),
    Yaml(serde_yaml::Value),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub path: String,
    pub format: TemplateFormat,
    pub body: String,
    pub document: TemplateDocument,
}

impl Template {
    /// Parse `body` according to the format implied by `path`.
    ///
    /// Returns the parser's message on failure. The document root must be a
    /// mapping.
    pub fn parse(path: &str, body: String) -> Result<Self, String> {
        let format = TemplateFormat::from_path(path);
        let document = match format {
            TemplateFormat::Json => {
                let value: serde_json::Value =
                    serde_json::from_str(&body).map_err(|e| e.to_string())?;
                if !value.is_object() {
                    return Err("template root must be an object".to_string());
                }
                TemplateDocument::Json(value)
            }
            TemplateFormat::Yaml => {
                // YAML short-form intrinsics (`!Ref`, `!Sub`) deserialize as tagged values.
                let value: serde_yaml::Value =
                    serde_yaml::from_str(&body).map_err(|e| e.to_string())?;
                if !value.is_mapping() {
                    return Err("template root must be a mapping".to_string());
                }
                TemplateDocument::Yaml(value)
            }
        };

        Ok(Self {
            path: path.to_string(),
            format,
            body,
            document,
        })
    }

    /// Number of entries under the top-level `Resources` key (0 if absent).
    pub fn resource_count(&self) -> usize {
        match &self.document {
            TemplateDocument::Json(value) => value
                .get("Resources")
                .and_then(serde_json::Value::as_object)
                .map_or(0, |resources| resources.len()),
            TemplateDocument::Yaml(value) => value
                .get("Resources")
                .and_then(serde_yaml::Value::as_mapping)
                .map_or(0, |resources| resources.len()),
        }
    }
}
