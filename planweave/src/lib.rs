//! # Planweave
//!
//! A configuration-driven workflow compiler. Planweave reads a nested
//! key/value configuration section describing named components and
//! their relationships, and compiles it into a set of instantiated
//! component objects plus a directed graph expressing execution order.
//!
//! Two composition modes exist:
//!
//! - **Chained**: a strict linear sequence of components
//! - **Comparative**: the Cartesian product of alternative branches,
//!   each product line becoming one linear path, all paths merged into
//!   one graph
//!
//! Components themselves are never executed here; the produced
//! [`assembler::Workflow`] pairs the graph with the instances so an
//! external executor can walk it.
//!
//! ## Quick Start
//!
//! ```rust
//! use planweave::prelude::*;
//! use std::sync::Arc;
//!
//! let settings = SettingsStore::new().with_section(
//!     "data",
//!     ConfigSection::new()
//!         .with("data_steps", vec!["clean", "impute"])
//!         .with("data_design", "chained"),
//! );
//!
//! let registry = ComponentRegistry::new();
//! registry.register("chained", Arc::new(GenericFactory::new()));
//! registry.register("step", Arc::new(GenericFactory::new()));
//!
//! let vocabulary = SuffixVocabulary::new()
//!     .category(CategorySuffix::new("steps"))
//!     .category(CategorySuffix::new("techniques").alternative());
//!
//! let workflow = WorkflowAssembler::new(&settings, &registry)
//!     .with_vocabulary(vocabulary)
//!     .assemble("data")?;
//!
//! assert!(workflow.graph.contains_edge("clean", "impute"));
//! # Ok::<(), planweave::errors::AssemblyError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod assembler;
pub mod blueprint;
pub mod compiler;
pub mod errors;
pub mod graph;
pub mod organizer;
pub mod parser;
pub mod registry;
pub mod settings;


/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::assembler::{Workflow, WorkflowAssembler};
    pub use crate::blueprint::{Blueprint, CategorySuffix, SuffixVocabulary};
    pub use crate::compiler::{CompileOptions, GraphCompiler};
    pub use crate::errors::{
        AmbiguousKeyError, AssemblyError, BlueprintValidationError, CyclicReferenceError,
        PathLimitError, SectionNotFoundError, UnknownComponentError,
    };
    pub use crate::graph::Graph;
    pub use crate::organizer::{flatten, organize, OrganizedNode};
    pub use crate::parser::{split_key, SectionParser};
    pub use crate::registry::{
        Component, ComponentFactory, ComponentRegistry, GenericComponent, GenericFactory,
        ParameterMap,
    };
    pub use crate::settings::{ConfigSection, ConfigValue, SettingsStore};
}
