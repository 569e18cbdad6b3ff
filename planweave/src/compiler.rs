//! Graph compilation: turning an organized structure into a [`Graph`].
//!
//! Two algorithms exist. The serial algorithm flattens the structure to
//! one leaf sequence and chains it. The parallel algorithm treats each
//! nested group as a set of mutually exclusive alternatives, enumerates
//! the Cartesian product across all such branch-sets, compiles every
//! combination as its own chain, and merges the chains into one graph.
//!
//! Parallel expansion is the one combinatorial-explosion risk in the
//! crate: N branch-sets of sizes k1..kN produce k1 * .. * kN paths. The
//! configured [`CompileOptions::max_paths`] ceiling is checked before
//! any enumeration happens.

use crate::blueprint::Blueprint;
use crate::errors::PathLimitError;
use crate::graph::Graph;
use crate::organizer::{flatten, OrganizedNode};
use tracing::debug;

/// Tunables for graph compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Maximum number of paths a parallel compilation may enumerate.
    pub max_paths: usize,
}

impl CompileOptions {
    /// The default path ceiling.
    pub const DEFAULT_MAX_PATHS: usize = 4096;

    /// Creates options with the default ceiling.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_paths: Self::DEFAULT_MAX_PATHS,
        }
    }

    /// Sets the path ceiling.
    #[must_use]
    pub const fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = max_paths;
        self
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// One positional element of a parallel compilation.
#[derive(Debug, Clone)]
enum Slot {
    /// A step shared by every path.
    Fixed(String),
    /// A branch-set: alternative leaf sequences, exactly one of which
    /// joins each path.
    Choice(Vec<Vec<String>>),
}

/// Compiles organized structures into graphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphCompiler {
    options: CompileOptions,
}

impl GraphCompiler {
    /// Creates a compiler with default options.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            options: CompileOptions::new(),
        }
    }

    /// Creates a compiler with the given options.
    #[must_use]
    pub const fn with_options(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Compiles a structure using the algorithm the blueprint selects.
    ///
    /// # Errors
    ///
    /// Returns [`PathLimitError`] when parallel expansion would exceed
    /// the configured ceiling.
    pub fn compile(
        &self,
        blueprint: &Blueprint,
        structure: &[OrganizedNode],
    ) -> Result<Graph, PathLimitError> {
        if blueprint.parallel {
            self.compile_parallel(structure, blueprint.design())
        } else {
            Ok(Self::compile_serial(structure))
        }
    }

    /// Serial algorithm: depth-first flatten, then one linear chain.
    #[must_use]
    pub fn compile_serial(structure: &[OrganizedNode]) -> Graph {
        Graph::from_path(&flatten(structure))
    }

    /// Parallel algorithm: Cartesian product across branch-sets, fixed
    /// steps interleaved in positional order, the section's design
    /// label appended as terminal node, all per-combination chains
    /// merged.
    ///
    /// # Errors
    ///
    /// Returns [`PathLimitError`] before enumerating when the product
    /// of branch-set sizes exceeds the ceiling.
    pub fn compile_parallel(
        &self,
        structure: &[OrganizedNode],
        terminal: Option<&str>,
    ) -> Result<Graph, PathLimitError> {
        let slots = partition(structure);

        let choices: Vec<&Vec<Vec<String>>> = slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Choice(alternatives) => Some(alternatives),
                Slot::Fixed(_) => None,
            })
            .collect();

        let mut total: usize = 1;
        for alternatives in &choices {
            total = total
                .checked_mul(alternatives.len().max(1))
                .ok_or(PathLimitError::new(usize::MAX, self.options.max_paths))?;
        }
        if total > self.options.max_paths {
            return Err(PathLimitError::new(total, self.options.max_paths));
        }
        debug!(paths = total, "enumerating parallel paths");

        let mut graph = Graph::new();
        let mut selection = vec![0_usize; choices.len()];
        loop {
            let path = build_path(&slots, &selection, terminal);
            graph.merge(&Graph::from_path(&path));

            if !advance(&mut selection, &choices) {
                break;
            }
        }
        Ok(graph)
    }
}

/// Partitions the top level into fixed steps and branch-sets.
///
/// Inside a branch-set, an item immediately followed by its own group
/// counts as one alternative (the container and its flattened
/// children); every other element is an alternative of its own.
fn partition(structure: &[OrganizedNode]) -> Vec<Slot> {
    let mut slots = Vec::new();
    for node in structure {
        match node {
            OrganizedNode::Item(name) => slots.push(Slot::Fixed(name.clone())),
            OrganizedNode::Group(children) => slots.push(Slot::Choice(alternatives(children))),
        }
    }
    slots
}

fn alternatives(children: &[OrganizedNode]) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < children.len() {
        match &children[i] {
            OrganizedNode::Item(name) => {
                let mut alternative = vec![name.clone()];
                if let Some(OrganizedNode::Group(nested)) = children.get(i + 1) {
                    alternative.extend(flatten(nested));
                    i += 1;
                }
                out.push(alternative);
            }
            OrganizedNode::Group(nested) => out.push(flatten(nested)),
        }
        i += 1;
    }
    out
}

fn build_path(slots: &[Slot], selection: &[usize], terminal: Option<&str>) -> Vec<String> {
    let mut path = Vec::new();
    let mut choice_index = 0;
    for slot in slots {
        match slot {
            Slot::Fixed(name) => path.push(name.clone()),
            Slot::Choice(alts) => {
                if let Some(alt) = alts.get(selection[choice_index]) {
                    path.extend(alt.iter().cloned());
                }
                choice_index += 1;
            }
        }
    }
    if let Some(terminal) = terminal {
        path.push(terminal.to_string());
    }
    path
}

/// Advances the selection odometer; returns false when exhausted.
fn advance(selection: &mut [usize], choices: &[&Vec<Vec<String>>]) -> bool {
    for (digit, alternatives) in selection.iter_mut().zip(choices.iter()).rev() {
        *digit += 1;
        if *digit < alternatives.len().max(1) {
            return true;
        }
        *digit = 0;
    }
    false
}
