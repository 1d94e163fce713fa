//! `TopologyRecord`: one atomic structural edit.
//!
//! Records are immutable once built. For additions `indices` holds the
//! indices of the new elements, which always extend the element array at
//! its tail. For removals `indices` holds the elements being removed,
//! expressed against the array as it was *before* the record is applied.

use std::ops::Range;

use itertools::Itertools;

use crate::topo_error::TopoError;
use crate::topology::element::{ChangeKind, ElementFamily};

/// How the elements after a removed one are renumbered.
///
/// This is a property of the topology: every array indexed by its elements
/// must renumber the same way, so the strategy travels with each removal
/// record.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RemovalStrategy {
    /// Erase and shift later elements down, preserving their order.
    #[default]
    Compact,
    /// Move the last element into each hole (indices processed highest first).
    SwapWithLast,
}

/// Interpolation metadata for added elements.
///
/// Entry `i` describes the `i`-th new element: the indices of the elements it
/// was derived from and one weight per ancestor.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ancestry {
    ancestors: Vec<Vec<usize>>,
    weights: Vec<Vec<f64>>,
}

impl Ancestry {
    /// Build ancestry data, checking that every element has as many weights
    /// as ancestors.
    pub fn new(ancestors: Vec<Vec<usize>>, weights: Vec<Vec<f64>>) -> Result<Self, TopoError> {
        if ancestors.len() != weights.len() {
            return Err(TopoError::AncestryMismatch {
                expected: ancestors.len(),
                found: weights.len(),
            });
        }
        for (element, (a, w)) in ancestors.iter().zip(&weights).enumerate() {
            if a.len() != w.len() {
                return Err(TopoError::WeightCountMismatch {
                    element,
                    ancestors: a.len(),
                    weights: w.len(),
                });
            }
        }
        Ok(Ancestry { ancestors, weights })
    }

    /// Number of described elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.ancestors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty()
    }

    /// `(ancestors, weights)` of the `i`-th new element.
    pub fn get(&self, i: usize) -> Option<(&[usize], &[f64])> {
        let a = self.ancestors.get(i)?;
        let w = self.weights.get(i)?;
        Some((a.as_slice(), w.as_slice()))
    }

    /// Iterate `(ancestors, weights)` per new element.
    pub fn iter(&self) -> impl Iterator<Item = (&[usize], &[f64])> {
        self.ancestors
            .iter()
            .zip(&self.weights)
            .map(|(a, w)| (a.as_slice(), w.as_slice()))
    }
}

/// One structural edit of a topology.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TopologyRecord {
    change: ChangeKind,
    indices: Vec<usize>,
    ancestry: Option<Ancestry>,
    #[serde(default)]
    renumbering: RemovalStrategy,
}

impl TopologyRecord {
    /// Elements `range` of `family` were appended.
    pub fn added(family: ElementFamily, range: Range<usize>) -> Self {
        TopologyRecord {
            change: ChangeKind::new(family, true),
            indices: range.collect(),
            ancestry: None,
            renumbering: RemovalStrategy::Compact,
        }
    }

    /// Elements `range` of `family` were appended, each derived from
    /// weighted ancestors.
    ///
    /// # Errors
    /// `AncestryMismatch` if `ancestry` does not describe exactly
    /// `range.len()` elements.
    pub fn added_with_ancestry(
        family: ElementFamily,
        range: Range<usize>,
        ancestry: Ancestry,
    ) -> Result<Self, TopoError> {
        if ancestry.len() != range.len() {
            return Err(TopoError::AncestryMismatch {
                expected: range.len(),
                found: ancestry.len(),
            });
        }
        let mut rec = Self::added(family, range);
        rec.ancestry = Some(ancestry);
        Ok(rec)
    }

    /// Elements at `indices` of `family` were removed.
    pub fn removed(family: ElementFamily, indices: impl Into<Vec<usize>>) -> Self {
        TopologyRecord {
            change: ChangeKind::new(family, false),
            indices: indices.into(),
            ancestry: None,
            renumbering: RemovalStrategy::Compact,
        }
    }

    /// Same record, renumbering surviving elements with `strategy`.
    /// Only meaningful for removals.
    pub fn with_renumbering(mut self, strategy: RemovalStrategy) -> Self {
        self.renumbering = strategy;
        self
    }

    /// Shorthand for `added(ElementFamily::Points, range)`.
    #[inline]
    pub fn points_added(range: Range<usize>) -> Self {
        Self::added(ElementFamily::Points, range)
    }

    /// Shorthand for `removed(ElementFamily::Points, indices)`.
    #[inline]
    pub fn points_removed(indices: impl Into<Vec<usize>>) -> Self {
        Self::removed(ElementFamily::Points, indices)
    }

    #[inline]
    pub fn change(&self) -> ChangeKind {
        self.change
    }

    #[inline]
    pub fn family(&self) -> ElementFamily {
        self.change.family()
    }

    #[inline]
    pub fn is_addition(&self) -> bool {
        self.change.is_addition()
    }

    /// Affected element indices, in record order.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of elements this record adds or removes.
    #[inline]
    pub fn count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn ancestry(&self) -> Option<&Ancestry> {
        self.ancestry.as_ref()
    }

    /// How surviving elements are renumbered after this removal.
    #[inline]
    pub fn renumbering(&self) -> RemovalStrategy {
        self.renumbering
    }
}

/// Check a removal list against `len` elements: every index in bounds and
/// listed once.
pub(crate) fn check_removal(
    change: ChangeKind,
    indices: &[usize],
    len: usize,
) -> Result<(), TopoError> {
    if let Some(&index) = indices.iter().find(|&&i| i >= len) {
        return Err(TopoError::IndexOutOfBounds { change, index, len });
    }
    if let Some(index) = indices.iter().duplicates().next() {
        return Err(TopoError::DuplicateIndex {
            change,
            index: *index,
        });
    }
    Ok(())
}

/// Check that every ancestor referenced by `ancestry` exists among the `len`
/// elements present before the addition.
pub(crate) fn check_ancestry(
    change: ChangeKind,
    ancestry: &Ancestry,
    len: usize,
) -> Result<(), TopoError> {
    match ancestry.iter().flat_map(|(a, _)| a).find(|&&i| i >= len) {
        Some(&index) => Err(TopoError::IndexOutOfBounds { change, index, len }),
        None => Ok(()),
    }
}
