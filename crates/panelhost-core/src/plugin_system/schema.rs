//! Plugin configuration schema.
//!
//! Per-user plugin config is a free-form `String -> String` map. A plugin may
//! describe the keys it understands with a [`ConfigSchema`]; the schema is
//! checked at the UI edge before a config update is sent, never by the
//! provider or the backend.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Custom check applied to a raw field value.
pub type Validator = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Input kind of a config field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFieldType {
    String,
    Number,
    Boolean,
    /// One of a fixed set of options
    Select(Vec<String>),
    /// Rendered masked; otherwise a string
    Secret,
}

/// Schema of a single config key
#[derive(Clone)]
pub struct ConfigField {
    pub field_type: ConfigFieldType,
    pub label: String,
    pub required: bool,
    pub default: Option<String>,
    pub validator: Option<Validator>,
}

impl fmt::Debug for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigField")
            .field("field_type", &self.field_type)
            .field("label", &self.label)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

impl ConfigField {
    pub fn new(field_type: ConfigFieldType, label: &str) -> Self {
        Self {
            field_type,
            label: label.to_string(),
            required: false,
            default: None,
            validator: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    pub fn validator<F>(mut self, check: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(check));
        self
    }

    fn check(&self, key: &str, value: &str) -> Option<ConfigViolation> {
        let kind = match &self.field_type {
            ConfigFieldType::Number if value.trim().parse::<f64>().is_err() => Some(ViolationKind::NotANumber),
            ConfigFieldType::Boolean if !matches!(value.trim(), "true" | "false") => Some(ViolationKind::NotABoolean),
            ConfigFieldType::Select(options) if !options.iter().any(|o| o == value) => {
                Some(ViolationKind::NotAnOption(options.clone()))
            }
            _ => None,
        };
        let kind = kind.or_else(|| {
            self.validator
                .as_ref()
                .and_then(|check| check(value).err())
                .map(ViolationKind::Rejected)
        });
        kind.map(|kind| ConfigViolation { key: key.to_string(), kind })
    }
}

/// Why a config value was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViolationKind {
    #[error("value is required")]
    Missing,
    #[error("value must be a number")]
    NotANumber,
    #[error("value must be 'true' or 'false'")]
    NotABoolean,
    #[error("value must be one of {0:?}")]
    NotAnOption(Vec<String>),
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("config key '{key}': {kind}")]
pub struct ConfigViolation {
    pub key: String,
    pub kind: ViolationKind,
}

/// Ordered mapping from config key to field schema
#[derive(Debug, Clone, Default)]
pub struct ConfigSchema {
    fields: Vec<(String, ConfigField)>,
}

impl ConfigSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field, keeping first-declared position.
    pub fn field(mut self, key: &str, field: ConfigField) -> Self {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = field,
            None => self.fields.push((key.to_string(), field)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigField> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigField)> {
        self.fields.iter().map(|(k, f)| (k.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Default values for every field that declares one.
    pub fn defaults(&self) -> HashMap<String, String> {
        self.fields
            .iter()
            .filter_map(|(k, f)| f.default.clone().map(|d| (k.clone(), d)))
            .collect()
    }

    /// Check `values` against the schema. Keys the schema does not know are allowed.
    pub fn validate(&self, values: &HashMap<String, String>) -> Result<(), Vec<ConfigViolation>> {
        let mut violations = Vec::new();
        for (key, field) in &self.fields {
            match values.get(key) {
                Some(value) if !value.trim().is_empty() => {
                    if let Some(violation) = field.check(key, value) {
                        violations.push(violation);
                    }
                }
                _ if field.required && field.default.is_none() => violations.push(ConfigViolation {
                    key: key.clone(),
                    kind: ViolationKind::Missing,
                }),
                _ => {}
            }
        }
        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }
}
