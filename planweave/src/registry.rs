//! Component registry and instantiation.
//!
//! The registry maps string keys to component factories and resolves a
//! prioritized candidate list to the first matching factory. It is
//! passed into the compiler explicitly; there is no process-global
//! catalog. Lookup is safe under concurrent compilations.

use crate::blueprint::Blueprint;
use crate::errors::UnknownComponentError;
use crate::settings::ConfigValue;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::sync::Arc;

/// Constructor parameters keyed by declared parameter name.
pub type ParameterMap = BTreeMap<String, ConfigValue>;

/// A constructed workflow component.
///
/// Execution semantics live outside this crate; a component only needs
/// a name and a place for injected attributes.
pub trait Component: Debug + Send + Sync {
    /// Returns the component's name.
    fn name(&self) -> &str;

    /// Applies one post-construction attribute assignment.
    ///
    /// Components ignore attributes they have no field for.
    fn apply_attribute(&mut self, _key: &str, _value: &ConfigValue) {}
}

/// Factory for one family of components.
pub trait ComponentFactory: Send + Sync {
    /// The constructor parameter names this factory understands.
    ///
    /// The parser uses these to tell parameters apart from attributes.
    fn parameters(&self) -> Vec<String> {
        Vec::new()
    }

    /// Constructs a component with the given name and parameters.
    fn construct(&self, name: &str, parameters: &ParameterMap) -> Box<dyn Component>;
}

/// A registry of component factories with prioritized lookup.
#[derive(Default)]
pub struct ComponentRegistry {
    factories: RwLock<HashMap<String, Arc<dyn ComponentFactory>>>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under a key, replacing any previous one.
    pub fn register(&self, key: impl Into<String>, factory: Arc<dyn ComponentFactory>) {
        self.factories.write().insert(key.into(), factory);
    }

    /// Resolves the first candidate key with a registered factory.
    #[must_use]
    pub fn resolve(&self, candidates: &[&str]) -> Option<Arc<dyn ComponentFactory>> {
        let factories = self.factories.read();
        candidates
            .iter()
            .find_map(|key| factories.get(*key).cloned())
    }

    /// Resolves a component by name with its design label as fallback.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownComponentError`] naming the exact pair when no
    /// candidate matches.
    pub fn resolve_component(
        &self,
        name: &str,
        design: Option<&str>,
    ) -> Result<Arc<dyn ComponentFactory>, UnknownComponentError> {
        let mut candidates = vec![name];
        if let Some(design) = design {
            candidates.push(design);
        }
        self.resolve(&candidates)
            .ok_or_else(|| UnknownComponentError::new(name, design.map(ToString::to_string)))
    }

    /// Returns true when a key has a registered factory.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.factories.read().contains_key(key)
    }

    /// Lists registered keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.factories.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

/// A general-purpose component that records its parameters and
/// attributes.
///
/// Useful as a default for callers whose execution layer reads
/// configuration off the instance rather than specializing types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericComponent {
    name: String,
    parameters: ParameterMap,
    attributes: BTreeMap<String, ConfigValue>,
}

impl GenericComponent {
    /// Creates a component with the given name and parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, parameters: ParameterMap) -> Self {
        Self {
            name: name.into(),
            parameters,
            attributes: BTreeMap::new(),
        }
    }

    /// Returns a constructor parameter by name.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&ConfigValue> {
        self.parameters.get(key)
    }

    /// Returns an injected attribute by name.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&ConfigValue> {
        self.attributes.get(key)
    }
}

impl Component for GenericComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply_attribute(&mut self, key: &str, value: &ConfigValue) {
        self.attributes.insert(key.to_string(), value.clone());
    }
}

/// Factory producing [`GenericComponent`]s.
#[derive(Debug, Clone, Default)]
pub struct GenericFactory {
    declared: Vec<String>,
}

impl GenericFactory {
    /// Creates a factory with no declared parameters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            declared: Vec::new(),
        }
    }

    /// Declares the constructor parameter names.
    #[must_use]
    pub fn with_parameters(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.declared = names.into_iter().map(Into::into).collect();
        self
    }
}

impl ComponentFactory for GenericFactory {
    fn parameters(&self) -> Vec<String> {
        self.declared.clone()
    }

    fn construct(&self, name: &str, parameters: &ParameterMap) -> Box<dyn Component> {
        Box::new(GenericComponent::new(name, parameters.clone()))
    }
}

/// Instantiates every component a resolved blueprint references.
///
/// The top-level component is constructed with the blueprint's
/// parameters; children with sections of their own are constructed from
/// their nested blueprints; leaves are constructed bare and receive the
/// blueprint's attributes one by one. Attributes are also applied to
/// the top-level instance.
///
/// # Errors
///
/// Returns [`UnknownComponentError`] on the first name/design pair the
/// registry cannot resolve; nothing partial is returned.
pub fn instantiate(
    blueprint: &Blueprint,
    nested: &BTreeMap<String, Blueprint>,
    registry: &ComponentRegistry,
) -> Result<BTreeMap<String, Box<dyn Component>>, UnknownComponentError> {
    let mut instances = BTreeMap::new();

    let factory = registry.resolve_component(&blueprint.name, blueprint.design())?;
    let mut top = factory.construct(&blueprint.name, &blueprint.parameters);
    for (key, value) in &blueprint.attributes {
        top.apply_attribute(key, value);
    }
    instances.insert(blueprint.name.clone(), top);

    for child in blueprint.referenced_items() {
        if instances.contains_key(child) {
            continue;
        }

        let instance = if let Some(sub) = nested.get(child) {
            let design = sub.design().or_else(|| blueprint.design_of(child));
            let factory = registry.resolve_component(child, design)?;
            let mut instance = factory.construct(child, &sub.parameters);
            for (key, value) in &sub.attributes {
                instance.apply_attribute(key, value);
            }
            instance
        } else {
            let factory = registry.resolve_component(child, blueprint.design_of(child))?;
            let mut instance = factory.construct(child, &ParameterMap::new());
            for (key, value) in &blueprint.attributes {
                instance.apply_attribute(key, value);
            }
            instance
        };
        instances.insert(child.to_string(), instance);
    }

    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry_with(keys: &[&str]) -> ComponentRegistry {
        let registry = ComponentRegistry::new();
        for key in keys {
            registry.register(*key, Arc::new(GenericFactory::new()));
        }
        registry
    }

    #[test]
    fn test_resolve_prefers_earlier_candidates() {
        let registry = ComponentRegistry::new();
        registry.register(
            "svm",
            Arc::new(GenericFactory::new().with_parameters(["kernel"])),
        );
        registry.register("technique", Arc::new(GenericFactory::new()));

        let factory = registry.resolve(&["svm", "technique"]).unwrap();
        assert_eq!(factory.parameters(), vec!["kernel"]);
    }

    #[test]
    fn test_resolve_component_falls_back_to_design() {
        let registry = registry_with(&["step"]);
        assert!(registry.resolve_component("clean", Some("step")).is_ok());

        let err = registry
            .resolve_component("clean", Some("widget"))
            .err()
            .unwrap();
        assert_eq!(err.name, "clean");
        assert_eq!(err.design.as_deref(), Some("widget"));
    }

    #[test]
    fn test_contains_and_keys_reflect_registration() {
        let registry = registry_with(&["step", "technique"]);

        assert!(registry.contains("step"));
        assert!(registry.contains("technique"));
        assert!(!registry.contains("widget"));
        assert_eq!(registry.keys(), vec!["step", "technique"]);
    }

    #[test]
    fn test_generic_component_records_everything() {
        let mut parameters = ParameterMap::new();
        parameters.insert("threshold".to_string(), ConfigValue::Int(3));

        let mut component = GenericComponent::new("clean", parameters);
        component.apply_attribute("verbose", &ConfigValue::Bool(true));

        assert_eq!(component.name(), "clean");
        assert_eq!(component.parameter("threshold"), Some(&ConfigValue::Int(3)));
        assert_eq!(component.attribute("verbose"), Some(&ConfigValue::Bool(true)));
    }

    #[test]
    fn test_instantiate_top_level_and_leaves() {
        let mut blueprint = Blueprint::new("data").unwrap();
        blueprint.components.insert(
            "data".to_string(),
            vec!["clean".to_string(), "impute".to_string()],
        );
        blueprint
            .designs
            .insert("data".to_string(), Some("chained".to_string()));
        blueprint
            .designs
            .insert("clean".to_string(), Some("step".to_string()));
        blueprint
            .designs
            .insert("impute".to_string(), Some("step".to_string()));
        blueprint
            .attributes
            .insert("verbose".to_string(), ConfigValue::Bool(true));

        let registry = registry_with(&["data", "step"]);
        let instances = instantiate(&blueprint, &BTreeMap::new(), &registry).unwrap();

        assert_eq!(instances.len(), 3);
        assert!(instances.contains_key("data"));
        assert!(instances.contains_key("clean"));
        assert!(instances.contains_key("impute"));
    }

    #[test]
    fn test_instantiate_unknown_component_names_the_pair() {
        let mut blueprint = Blueprint::new("model").unwrap();
        blueprint
            .designs
            .insert("model".to_string(), Some("compare".to_string()));

        let registry = registry_with(&[]);
        let err = instantiate(&blueprint, &BTreeMap::new(), &registry).unwrap_err();
        assert_eq!(err.name, "model");
        assert_eq!(err.design.as_deref(), Some("compare"));
    }

    #[test]
    fn test_instantiate_nested_child_uses_own_parameters() {
        let mut parent = Blueprint::new("project").unwrap();
        parent
            .components
            .insert("project".to_string(), vec!["data".to_string()]);
        parent
            .designs
            .insert("project".to_string(), Some("chained".to_string()));
        parent.designs.insert("data".to_string(), None);

        let mut sub = Blueprint::new("data").unwrap();
        sub.designs
            .insert("data".to_string(), Some("chained".to_string()));
        sub.parameters
            .insert("threshold".to_string(), ConfigValue::Int(7));

        let mut nested = BTreeMap::new();
        nested.insert("data".to_string(), sub);

        let registry = ComponentRegistry::new();
        registry.register("project", Arc::new(GenericFactory::new()));
        registry.register(
            "data",
            Arc::new(GenericFactory::new().with_parameters(["threshold"])),
        );

        let instances = instantiate(&parent, &nested, &registry).unwrap();
        let data = instances.get("data").unwrap();
        assert_eq!(data.name(), "data");
    }
}
