//! Component organization: turning a blueprint's flat component lists
//! into a nested ordering structure that mirrors containment.

use crate::blueprint::Blueprint;
use crate::errors::CyclicReferenceError;
use std::collections::HashSet;

/// One element of an organized structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizedNode {
    /// A single item name.
    Item(String),
    /// A sub-branch's own organization, placed immediately after the
    /// owning item.
    Group(Vec<OrganizedNode>),
}

impl OrganizedNode {
    /// Convenience constructor for an item node.
    #[must_use]
    pub fn item(name: impl Into<String>) -> Self {
        Self::Item(name.into())
    }

    /// Appends the leaf names of this node, depth-first, to `out`.
    pub fn flatten_into(&self, out: &mut Vec<String>) {
        match self {
            Self::Item(name) => out.push(name.clone()),
            Self::Group(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
        }
    }
}

/// Flattens an organized structure to its leaf sequence, depth-first,
/// preserving order and discarding the tree shape.
#[must_use]
pub fn flatten(structure: &[OrganizedNode]) -> Vec<String> {
    let mut out = Vec::new();
    for node in structure {
        node.flatten_into(&mut out);
    }
    out
}

/// Recursively organizes the children of `root` according to the
/// blueprint's component lists.
///
/// Each child contributes its name; containers additionally contribute
/// a [`OrganizedNode::Group`] with their own organization immediately
/// after the name. Leaves contribute only their name.
///
/// When the root's own child list is a set of alternatives, the whole
/// expansion is wrapped in a single [`OrganizedNode::Group`] so that
/// parallel compilation sees it as one branch-set.
///
/// # Errors
///
/// Returns [`CyclicReferenceError`] when an item directly or
/// transitively lists itself as a child; the error carries the
/// containment path ending at the repeated name.
pub fn organize(root: &str, blueprint: &Blueprint) -> Result<Vec<OrganizedNode>, CyclicReferenceError> {
    let mut active = HashSet::new();
    let mut path = Vec::new();
    let structure = organize_inner(root, blueprint, &mut active, &mut path)?;
    if blueprint.is_alternative_list(root) && !structure.is_empty() {
        Ok(vec![OrganizedNode::Group(structure)])
    } else {
        Ok(structure)
    }
}

fn organize_inner(
    root: &str,
    blueprint: &Blueprint,
    active: &mut HashSet<String>,
    path: &mut Vec<String>,
) -> Result<Vec<OrganizedNode>, CyclicReferenceError> {
    active.insert(root.to_string());
    path.push(root.to_string());

    let mut structure = Vec::new();
    for child in blueprint.children_of(root) {
        if active.contains(child) {
            let start = path.iter().position(|n| n == child).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].to_vec();
            cycle.push(child.clone());
            return Err(CyclicReferenceError::new(cycle));
        }

        structure.push(OrganizedNode::item(child));
        if blueprint.is_container(child) {
            let nested = organize_inner(child, blueprint, active, path)?;
            structure.push(OrganizedNode::Group(nested));
        }
    }

    path.pop();
    active.remove(root);
    Ok(structure)
}
