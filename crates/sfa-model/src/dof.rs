//! Degree-of-freedom identifiers and ordered index maps.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Stable identifier of a degree of freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DofId {
    /// Node ID
    pub node: i32,
    /// Component on the node (0 = X, 1 = Y, 2 = Z, 3+ for rotations)
    pub dof: usize,
}

impl DofId {
    /// Create a new DOF identifier
    pub fn new(node: i32, dof: usize) -> Self {
        Self { node, dof }
    }
}

impl fmt::Display for DofId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.dof)
    }
}

/// Ordered mapping from [`DofId`] to a zero-based index into the global system.
///
/// Iteration follows insertion order, which is the order partitions are
/// built in. Indices are not required to be contiguous: the free and
/// restrained maps each hold a subset of the global numbering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DofMap {
    entries: Vec<(DofId, usize)>,
    lookup: HashMap<DofId, usize>,
}

impl DofMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mapping. Fails if `id` is already present.
    pub fn insert(&mut self, id: DofId, index: usize) -> Result<()> {
        if self.lookup.contains_key(&id) {
            return Err(ModelError::DuplicateDof(id));
        }
        self.lookup.insert(id, index);
        self.entries.push((id, index));
        Ok(())
    }

    pub fn get(&self, id: &DofId) -> Option<usize> {
        self.lookup.get(id).copied()
    }

    pub fn contains(&self, id: &DofId) -> bool {
        self.lookup.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(id, index)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (DofId, usize)> + '_ {
        self.entries.iter().copied()
    }

    /// Global indices in insertion order
    pub fn indices(&self) -> Vec<usize> {
        self.entries.iter().map(|&(_, index)| index).collect()
    }
}

impl<'a> IntoIterator for &'a DofMap {
    type Item = (DofId, usize);
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, (DofId, usize)>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().copied()
    }
}
