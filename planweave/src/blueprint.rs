//! Blueprints and the category-suffix vocabulary.
//!
//! A [`Blueprint`] is the intermediate record produced by parsing one
//! configuration section: component lists, per-item design labels,
//! constructor parameters, and free attributes. The
//! [`SuffixVocabulary`] tells the parser which key suffixes denote
//! component categories; it is supplied as data so callers define their
//! own component kinds.

use crate::errors::BlueprintValidationError;
use crate::settings::ConfigValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One recognized component-category suffix.
///
/// The design label defaults to the suffix with its trailing plural
/// marker trimmed (`"steps"` becomes `"step"`); categories flagged as
/// alternative mark the section for parallel compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySuffix {
    /// The key suffix, e.g. `"steps"`.
    pub suffix: String,
    /// The design label assigned to items of this category.
    pub design: String,
    /// Whether items of this category are mutually exclusive
    /// alternatives rather than sequential steps.
    pub alternative: bool,
}

impl CategorySuffix {
    /// Creates a category suffix with the default design label.
    #[must_use]
    pub fn new(suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        let design = suffix.strip_suffix('s').unwrap_or(&suffix).to_string();
        Self {
            suffix,
            design,
            alternative: false,
        }
    }

    /// Overrides the design label.
    #[must_use]
    pub fn with_design(mut self, design: impl Into<String>) -> Self {
        self.design = design.into();
        self
    }

    /// Flags the category as an alternative-selection category.
    #[must_use]
    pub const fn alternative(mut self) -> Self {
        self.alternative = true;
        self
    }
}

/// The fixed suffix vocabulary handed to the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixVocabulary {
    categories: Vec<CategorySuffix>,
    default_design: Option<String>,
    strict: bool,
}

impl SuffixVocabulary {
    /// Creates an empty vocabulary.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            categories: Vec::new(),
            default_design: None,
            strict: false,
        }
    }

    /// Adds a category suffix.
    #[must_use]
    pub fn category(mut self, category: CategorySuffix) -> Self {
        self.categories.push(category);
        self
    }

    /// Sets the process-wide default design label, used when a section
    /// declares none of its own.
    #[must_use]
    pub fn with_default_design(mut self, design: impl Into<String>) -> Self {
        self.default_design = Some(design.into());
        self
    }

    /// Makes unclassifiable keys an error instead of a whole-key
    /// attribute.
    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Looks up a category by suffix.
    #[must_use]
    pub fn category_for(&self, suffix: &str) -> Option<&CategorySuffix> {
        self.categories.iter().find(|c| c.suffix == suffix)
    }

    /// Returns the default design label, if configured.
    #[must_use]
    pub fn default_design(&self) -> Option<&str> {
        self.default_design.as_deref()
    }

    /// Returns whether unclassifiable keys are rejected.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }
}

/// Parsed intermediate representation of one configuration section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    /// The section name being compiled.
    pub name: String,
    /// True when any component category was flagged alternative.
    pub parallel: bool,
    /// Category key to ordered child item names; list order is
    /// iteration and precedence order.
    pub components: BTreeMap<String, Vec<String>>,
    /// Owners whose component list holds mutually exclusive
    /// alternatives rather than sequential steps.
    pub alternatives: BTreeSet<String>,
    /// Item name to design label; `None` means the default design.
    pub designs: BTreeMap<String, Option<String>>,
    /// Constructor parameters for the top-level component.
    pub parameters: BTreeMap<String, ConfigValue>,
    /// Free attributes injected post-construction.
    pub attributes: BTreeMap<String, ConfigValue>,
}

impl Blueprint {
    /// Creates an empty blueprint for a section.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or whitespace-only.
    pub fn new(name: impl Into<String>) -> Result<Self, BlueprintValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BlueprintValidationError::new(
                "Section name cannot be empty or whitespace-only",
            ));
        }
        Ok(Self {
            name,
            ..Self::default()
        })
    }

    /// Returns the design label of an item, `None` when the item uses
    /// the default design or is unknown.
    #[must_use]
    pub fn design_of(&self, item: &str) -> Option<&str> {
        self.designs.get(item).and_then(Option::as_deref)
    }

    /// Returns this section's own design label.
    #[must_use]
    pub fn design(&self) -> Option<&str> {
        self.design_of(&self.name)
    }

    /// Returns the ordered children of an item, empty for leaves.
    #[must_use]
    pub fn children_of(&self, item: &str) -> &[String] {
        self.components.get(item).map_or(&[], Vec::as_slice)
    }

    /// Returns true when the item has a child list of its own.
    #[must_use]
    pub fn is_container(&self, item: &str) -> bool {
        self.components.contains_key(item)
    }

    /// Returns true when the item's child list is a set of mutually
    /// exclusive alternatives.
    #[must_use]
    pub fn is_alternative_list(&self, item: &str) -> bool {
        self.alternatives.contains(item)
    }

    /// Iterates every child name appearing in any component list, in
    /// list order, without duplicates.
    #[must_use]
    pub fn referenced_items(&self) -> Vec<&str> {
        let mut seen = std::collections::BTreeSet::new();
        let mut items = Vec::new();
        for children in self.components.values() {
            for child in children {
                if seen.insert(child.as_str()) {
                    items.push(child.as_str());
                }
            }
        }
        items
    }

    /// Merges another blueprint's component lists and design labels
    /// into this one.
    ///
    /// Used when a child item turns out to have a configuration section
    /// of its own: the nested structure joins the resolved picture
    /// while existing entries are kept.
    pub fn absorb(&mut self, nested: &Self) {
        for (owner, children) in &nested.components {
            self.components
                .entry(owner.clone())
                .or_insert_with(|| children.clone());
        }
        for (item, design) in &nested.designs {
            self.designs
                .entry(item.clone())
                .or_insert_with(|| design.clone());
        }
        self.alternatives
            .extend(nested.alternatives.iter().cloned());
        self.parallel = self.parallel || nested.parallel;
    }
}
