//! Resource schema descriptor and configuration validation.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::diag::{Diagnostic, Diagnostics};

/// Value kind of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
}

/// One configuration field of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub required: bool,
    /// Changing the attribute forces destroy and recreate.
    pub force_new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<&'static str>>,
    pub description: &'static str,
}

impl Attribute {
    pub fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: AttributeType::String,
            required: true,
            force_new: false,
            default: None,
            allowed_values: None,
            description,
        }
    }

    pub fn optional(name: &'static str, description: &'static str) -> Self {
        Self {
            required: false,
            ..Self::required(name, description)
        }
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn default_value(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub fn one_of(mut self, values: &[&'static str]) -> Self {
        self.allowed_values = Some(values.to_vec());
        self
    }
}

/// Describes the valid configuration of one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub description: &'static str,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Names of attributes whose change requires replacement.
    pub fn force_new(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes
            .iter()
            .filter(|a| a.force_new)
            .map(|a| a.name)
    }

    /// Check a raw configuration object and fill in defaults.
    ///
    /// Every problem found is reported, not just the first.
    pub fn validate(&self, config: &Value) -> Result<Map<String, Value>, Diagnostics> {
        let Some(object) = config.as_object() else {
            return Err(Diagnostic::error("configuration must be a JSON object").into());
        };

        let mut diags = Diagnostics::new();
        let mut resolved = Map::new();

        for key in object.keys() {
            if self.attribute(key).is_none() {
                diags.push(Diagnostic::error("unsupported attribute").with_attribute(key.as_str()));
            }
        }

        for attribute in &self.attributes {
            let value = match object.get(attribute.name) {
                None | Some(Value::Null) => {
                    if let Some(default) = attribute.default {
                        resolved.insert(attribute.name.to_string(), Value::from(default));
                    } else if attribute.required {
                        diags.push(
                            Diagnostic::error("missing required attribute")
                                .with_attribute(attribute.name),
                        );
                    }
                    continue;
                }
                Some(value) => value,
            };

            let Some(text) = value.as_str() else {
                diags.push(
                    Diagnostic::error(format!("expected a string, got {}", value))
                        .with_attribute(attribute.name),
                );
                continue;
            };

            if let Some(allowed) = &attribute.allowed_values {
                if !allowed.iter().any(|a| *a == text) {
                    diags.push(
                        Diagnostic::error(format!(
                            "expected one of {}, got \"{}\"",
                            allowed.join(", "),
                            text
                        ))
                        .with_attribute(attribute.name),
                    );
                    continue;
                }
            }

            resolved.insert(attribute.name.to_string(), value.clone());
        }

        diags.into_result()?;
        Ok(resolved)
    }
}
