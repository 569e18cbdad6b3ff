//! Workflow assembly: the facade tying the parser, organizer, graph
//! compiler, and instantiator together for one configuration section.
//!
//! Assembly is a pure, synchronous batch transformation. The settings
//! store and registry are read-only for its duration, so independent
//! sections may be assembled concurrently against the same pair.

use crate::blueprint::{Blueprint, SuffixVocabulary};
use crate::compiler::{CompileOptions, GraphCompiler};
use crate::errors::AssemblyError;
use crate::graph::Graph;
use crate::organizer::organize;
use crate::parser::SectionParser;
use crate::registry::{instantiate, Component, ComponentRegistry, ParameterMap};
use crate::settings::{ConfigSection, SettingsStore};
use std::collections::BTreeMap;
use tracing::debug;

/// The assembled artifact for one section: the resolved blueprint, the
/// ordering graph, and the constructed components.
///
/// Every node name in `graph` is a key of `components`, so an external
/// executor can walk the graph and look up each instance.
#[derive(Debug)]
pub struct Workflow {
    /// The section name this workflow was assembled from.
    pub name: String,
    /// The resolved blueprint, nested sections absorbed.
    pub blueprint: Blueprint,
    /// The execution-ordering graph.
    pub graph: Graph,
    /// Constructed components keyed by name.
    pub components: BTreeMap<String, Box<dyn Component>>,
}

/// Assembles workflows from configuration sections.
#[derive(Debug)]
pub struct WorkflowAssembler<'a> {
    settings: &'a SettingsStore,
    registry: &'a ComponentRegistry,
    vocabulary: SuffixVocabulary,
    options: CompileOptions,
}

impl<'a> WorkflowAssembler<'a> {
    /// Creates an assembler over a settings store and a registry.
    ///
    /// The vocabulary starts empty; callers add their category suffixes
    /// with [`Self::with_vocabulary`].
    #[must_use]
    pub const fn new(settings: &'a SettingsStore, registry: &'a ComponentRegistry) -> Self {
        Self {
            settings,
            registry,
            vocabulary: SuffixVocabulary::new(),
            options: CompileOptions::new(),
        }
    }

    /// Sets the suffix vocabulary.
    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: SuffixVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Sets the compile options.
    #[must_use]
    pub const fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Assembles the named section into a [`Workflow`].
    ///
    /// # Errors
    ///
    /// Returns the first failure encountered: a missing section, an
    /// ambiguous key (strict mode), a cyclic component reference, a
    /// parallel expansion over the path ceiling, or an unresolvable
    /// component. No partial workflow is ever returned.
    pub fn assemble(&self, section_name: &str) -> Result<Workflow, AssemblyError> {
        let section = self.settings.require_section(section_name)?;
        let parser = SectionParser::new(&self.vocabulary);

        let declared = self.declared_params(section_name, section);
        let mut blueprint = parser.parse(section_name, section, &declared)?;
        debug!(section = section_name, parallel = blueprint.parallel, "parsed section");

        let nested = self.resolve_nested(&mut blueprint, &parser)?;
        let structure = organize(section_name, &blueprint)?;
        debug!(section = section_name, items = structure.len(), "organized components");

        let graph = GraphCompiler::with_options(self.options).compile(&blueprint, &structure)?;
        debug!(
            section = section_name,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "compiled graph"
        );

        let mut components = instantiate(&blueprint, &nested, self.registry)?;

        // The parallel terminal node is not a component list entry;
        // cover any graph node still missing an instance so the
        // artifact invariant holds.
        for node in graph.nodes() {
            if !components.contains_key(node) {
                let factory = self
                    .registry
                    .resolve_component(node, blueprint.design_of(node))?;
                components.insert(node.clone(), factory.construct(node, &ParameterMap::new()));
            }
        }

        Ok(Workflow {
            name: section_name.to_string(),
            blueprint,
            graph,
            components,
        })
    }

    /// Recursively parses the sections of referenced children, merging
    /// their component lists and design labels into the resolved
    /// blueprint. Children without sections stay leaves.
    fn resolve_nested(
        &self,
        blueprint: &mut Blueprint,
        parser: &SectionParser<'_>,
    ) -> Result<BTreeMap<String, Blueprint>, AssemblyError> {
        let mut nested = BTreeMap::new();
        let mut pending: Vec<String> = blueprint
            .referenced_items()
            .into_iter()
            .map(ToString::to_string)
            .collect();

        while let Some(child) = pending.pop() {
            if child == blueprint.name || nested.contains_key(&child) {
                continue;
            }
            let Some(section) = self.settings.section(&child) else {
                continue;
            };

            let declared = self.declared_params(&child, section);
            let sub = parser.parse(&child, section, &declared)?;
            debug!(section = %child, "resolved nested section");

            pending.extend(sub.referenced_items().into_iter().map(ToString::to_string));

            // The child's own design declaration is more specific than
            // whatever its category membership assigned.
            if let Some(design) = sub.design() {
                blueprint
                    .designs
                    .insert(child.clone(), Some(design.to_string()));
            }
            blueprint.absorb(&sub);
            nested.insert(child, sub);
        }

        Ok(nested)
    }

    /// Looks up the declared constructor parameter names for a section
    /// by resolving its component ahead of parsing.
    ///
    /// When the (name, design) pair is not yet registered, parameter
    /// matching is skipped entirely and would-be parameters fall
    /// through to attributes.
    fn declared_params(&self, section_name: &str, section: &ConfigSection) -> Vec<String> {
        let design = section
            .get(&format!("{section_name}_design"))
            .or_else(|| section.get("design"))
            .and_then(|v| v.as_str())
            .or_else(|| self.vocabulary.default_design());

        let mut candidates = vec![section_name];
        if let Some(design) = design {
            candidates.push(design);
        }
        self.registry
            .resolve(&candidates)
            .map(|factory| factory.parameters())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::CategorySuffix;
    use crate::registry::GenericFactory;
    use crate::settings::ConfigValue;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn vocabulary() -> SuffixVocabulary {
        SuffixVocabulary::new()
            .category(CategorySuffix::new("steps"))
            .category(CategorySuffix::new("techniques").alternative())
    }

    fn registry_with(keys: &[&str]) -> ComponentRegistry {
        let registry = ComponentRegistry::new();
        for key in keys {
            registry.register(*key, Arc::new(GenericFactory::new()));
        }
        registry
    }

    #[test]
    fn test_assemble_serial_section() {
        let settings = SettingsStore::new().with_section(
            "data",
            ConfigSection::new()
                .with("data_steps", vec!["clean", "impute"])
                .with("data_design", "chained"),
        );
        let registry = registry_with(&["chained", "step"]);

        let workflow = WorkflowAssembler::new(&settings, &registry)
            .with_vocabulary(vocabulary())
            .assemble("data")
            .unwrap();

        assert_eq!(workflow.name, "data");
        assert!(workflow.graph.contains_edge("clean", "impute"));
        assert_eq!(workflow.graph.edge_count(), 1);
        assert!(workflow.components.contains_key("data"));
        assert!(workflow.components.contains_key("clean"));
        assert!(workflow.components.contains_key("impute"));
    }

    #[test]
    fn test_assemble_missing_section() {
        let settings = SettingsStore::new();
        let registry = registry_with(&[]);

        let err = WorkflowAssembler::new(&settings, &registry)
            .assemble("data")
            .unwrap_err();
        assert!(matches!(err, AssemblyError::SectionNotFound(_)));
    }

    #[test]
    fn test_every_graph_node_has_an_instance() {
        let settings = SettingsStore::new().with_section(
            "model",
            ConfigSection::new()
                .with("model_techniques", vec!["svm", "tree"])
                .with("model_design", "compare"),
        );
        let registry = registry_with(&["compare", "technique"]);

        let workflow = WorkflowAssembler::new(&settings, &registry)
            .with_vocabulary(vocabulary())
            .assemble("model")
            .unwrap();

        for node in workflow.graph.nodes() {
            assert!(
                workflow.components.contains_key(node),
                "graph node '{node}' has no instance"
            );
        }
        assert!(workflow.components.contains_key("compare"));
    }

    #[test]
    fn test_nested_section_design_overrides_category_label() {
        let settings = SettingsStore::new()
            .with_section(
                "project",
                ConfigSection::new().with("project_steps", vec!["data"]),
            )
            .with_section(
                "data",
                ConfigSection::new()
                    .with("data_steps", vec!["clean"])
                    .with("data_design", "scrubber"),
            );
        let registry = registry_with(&["project", "scrubber", "step"]);

        let workflow = WorkflowAssembler::new(&settings, &registry)
            .with_vocabulary(vocabulary())
            .assemble("project")
            .unwrap();

        assert_eq!(workflow.blueprint.design_of("data"), Some("scrubber"));
        assert!(workflow.graph.contains_edge("data", "clean"));
    }

    #[test]
    fn test_declared_params_gate_on_resolution() {
        let settings = SettingsStore::new().with_section(
            "data",
            ConfigSection::new()
                .with("data_steps", vec!["clean"])
                .with("data_threshold", 5_i64),
        );

        let registry = registry_with(&["step"]);
        registry.register(
            "data",
            Arc::new(GenericFactory::new().with_parameters(["threshold"])),
        );

        let workflow = WorkflowAssembler::new(&settings, &registry)
            .with_vocabulary(vocabulary())
            .assemble("data")
            .unwrap();
        assert_eq!(
            workflow.blueprint.parameters.get("threshold"),
            Some(&ConfigValue::Int(5))
        );
    }
}
