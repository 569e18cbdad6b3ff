//! Settings store: the nested key/value configuration source consumed
//! by the compiler.
//!
//! A [`SettingsStore`] maps section names to [`ConfigSection`]s, and a
//! section maps keys to [`ConfigValue`]s. The store performs no I/O of
//! its own; [`SettingsStore::from_json`] accepts an already-parsed
//! `serde_json::Value` tree so callers own file handling.

use crate::errors::{BlueprintValidationError, SectionNotFoundError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A configuration value: a string, a list of strings, or a scalar.
///
/// List-likeness is decided purely by container shape, never by content
/// inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// A boolean scalar.
    Bool(bool),
    /// An integer scalar.
    Int(i64),
    /// A floating-point scalar.
    Float(f64),
    /// A single string.
    Str(String),
    /// An ordered list of strings.
    List(Vec<String>),
}

impl ConfigValue {
    /// Returns the value as a string slice if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Coerces the value to a list of strings.
    ///
    /// A list is cloned, any other value becomes a single-element list
    /// of its display form.
    #[must_use]
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Returns true when the value is a list.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for ConfigValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for ConfigValue {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(ToString::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ConfigValue {
    fn from(items: [&str; N]) -> Self {
        Self::List(items.iter().map(ToString::to_string).collect())
    }
}

/// One named configuration section: an ordered mapping from key to
/// value.
///
/// Insertion order is preserved so that parsing and graph output stay
/// reproducible across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSection {
    entries: Vec<(String, ConfigValue)>,
}

impl ConfigSection {
    /// Creates an empty section.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces an entry, builder-style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Adds or replaces an entry in place.
    ///
    /// Replacing keeps the key's original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Looks up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the section has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An in-memory settings store addressable by section name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsStore {
    sections: BTreeMap<String, ConfigSection>,
}

impl SettingsStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sections: BTreeMap::new(),
        }
    }

    /// Adds or replaces a section, builder-style.
    #[must_use]
    pub fn with_section(mut self, name: impl Into<String>, section: ConfigSection) -> Self {
        self.sections.insert(name.into(), section);
        self
    }

    /// Looks up a section by name.
    ///
    /// Absence is meaningful: the assembler treats a component name
    /// without a section of its own as a leaf.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&ConfigSection> {
        self.sections.get(name)
    }

    /// Looks up a section that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`SectionNotFoundError`] when the section is absent.
    pub fn require_section(&self, name: &str) -> Result<&ConfigSection, SectionNotFoundError> {
        self.sections
            .get(name)
            .ok_or_else(|| SectionNotFoundError::new(name))
    }

    /// Returns the names of all sections.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Builds a store from a parsed JSON tree.
    ///
    /// The top level must be an object of objects; strings, arrays of
    /// strings, booleans, and numbers are accepted as values.
    ///
    /// # Errors
    ///
    /// Returns a [`BlueprintValidationError`] when the tree does not
    /// have that shape.
    pub fn from_json(root: &serde_json::Value) -> Result<Self, BlueprintValidationError> {
        let top = root.as_object().ok_or_else(|| {
            BlueprintValidationError::new("settings root must be a JSON object of sections")
        })?;

        let mut store = Self::new();
        for (name, raw_section) in top {
            let object = raw_section.as_object().ok_or_else(|| {
                BlueprintValidationError::new(format!("section '{name}' must be a JSON object"))
                    .with_items(vec![name.clone()])
            })?;

            let mut section = ConfigSection::new();
            for (key, raw_value) in object {
                section.set(key.clone(), json_value(name, key, raw_value)?);
            }
            store.sections.insert(name.clone(), section);
        }
        Ok(store)
    }
}

fn json_value(
    section: &str,
    key: &str,
    raw: &serde_json::Value,
) -> Result<ConfigValue, BlueprintValidationError> {
    match raw {
        serde_json::Value::Bool(b) => Ok(ConfigValue::Bool(*b)),
        serde_json::Value::String(s) => Ok(ConfigValue::Str(s.clone())),
        serde_json::Value::Number(n) => n.as_i64().map_or_else(
            || {
                n.as_f64().map(ConfigValue::Float).ok_or_else(|| {
                    BlueprintValidationError::new(format!(
                        "key '{key}' in section '{section}' has an unrepresentable number"
                    ))
                })
            },
            |i| Ok(ConfigValue::Int(i)),
        ),
        serde_json::Value::Array(items) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                let s = item.as_str().ok_or_else(|| {
                    BlueprintValidationError::new(format!(
                        "key '{key}' in section '{section}' must be a list of strings"
                    ))
                })?;
                list.push(s.to_string());
            }
            Ok(ConfigValue::List(list))
        }
        _ => Err(BlueprintValidationError::new(format!(
            "key '{key}' in section '{section}' has an unsupported value type"
        ))),
    }
}
