//! Section parsing: one raw configuration section plus a suffix
//! vocabulary in, one [`Blueprint`] out.
//!
//! Keys follow the `{prefix}_{suffix}` convention, split on the last
//! underscore: the suffix selects the semantic role (design, component
//! category, constructor parameter) and the prefix selects the owning
//! item. Bare keys and keys prefixed with the section's own name become
//! attributes.

use crate::blueprint::{Blueprint, SuffixVocabulary};
use crate::errors::{AmbiguousKeyError, AssemblyError};
use crate::settings::ConfigSection;
use tracing::warn;

/// Splits a key on its last underscore into `(prefix, suffix)`.
///
/// A key without an underscore yields itself for both halves.
#[must_use]
pub fn split_key(key: &str) -> (&str, &str) {
    key.rsplit_once('_').unwrap_or((key, key))
}

/// Parses raw configuration sections into blueprints using a fixed
/// suffix vocabulary.
#[derive(Debug, Clone)]
pub struct SectionParser<'a> {
    vocabulary: &'a SuffixVocabulary,
}

impl<'a> SectionParser<'a> {
    /// Creates a parser over the given vocabulary.
    #[must_use]
    pub const fn new(vocabulary: &'a SuffixVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Parses one section into a blueprint.
    ///
    /// `declared_params` holds the constructor parameter names of the
    /// section's already-resolved component; pass an empty slice when
    /// the component could not be resolved yet, in which case would-be
    /// parameters fall through to attributes.
    ///
    /// Classification order on conflicts: category beats parameter,
    /// parameter beats attribute. An underscore key whose suffix matches
    /// no role and whose prefix is not the section name is recorded as a
    /// whole-key attribute, or rejected as ambiguous in strict mode.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty section name, or for an ambiguous
    /// key when the vocabulary is strict.
    pub fn parse(
        &self,
        section_name: &str,
        section: &ConfigSection,
        declared_params: &[String],
    ) -> Result<Blueprint, AssemblyError> {
        let mut blueprint = Blueprint::new(section_name)?;

        let own_design_key = format!("{section_name}_design");
        let design = section
            .get(&own_design_key)
            .or_else(|| section.get("design"))
            .and_then(|v| v.as_str().map(ToString::to_string))
            .or_else(|| self.vocabulary.default_design().map(ToString::to_string));
        blueprint.designs.insert(section_name.to_string(), design);

        for (key, value) in section.iter() {
            if key == own_design_key || key == "design" {
                continue;
            }

            let (prefix, suffix) = split_key(key);

            // Nested items resolve their design keys when their own
            // sections are parsed.
            if suffix == "design" {
                continue;
            }

            if let Some(category) = self.vocabulary.category_for(suffix) {
                let items = value.to_list();
                for item in &items {
                    blueprint
                        .designs
                        .entry(item.clone())
                        .or_insert_with(|| Some(category.design.clone()));
                }
                blueprint.components.insert(prefix.to_string(), items);
                if category.alternative {
                    blueprint.alternatives.insert(prefix.to_string());
                    blueprint.parallel = true;
                }
            } else if declared_params.iter().any(|p| p == suffix) {
                blueprint.parameters.insert(suffix.to_string(), value.clone());
            } else if prefix == section_name || prefix == suffix {
                // Own-prefix keys and bare keys are attributes of the
                // top-level component.
                blueprint.attributes.insert(suffix.to_string(), value.clone());
            } else if self.vocabulary.is_strict() {
                return Err(AmbiguousKeyError::new(section_name, key).into());
            } else {
                warn!(section = section_name, key, "unclassified key kept as whole-key attribute");
                blueprint.attributes.insert(key.to_string(), value.clone());
            }
        }

        Ok(blueprint)
    }
}
