//! `MeshTopology`: a dynamic topology container that tracks element counts,
//! validates edits and fans the resulting records out to engines.
//!
//! Only counts are stored; connectivity lives with whatever owns the actual
//! mesh. Each edit is validated against the current counts before anything
//! changes, so a rejected edit neither alters the counts nor reaches any
//! engine.

use std::cell::Cell;
use std::ops::Range;
use std::rc::Rc;

use crate::debug_invariants::DebugInvariants;
use crate::topo_error::TopoError;
use crate::topology::element::{ChangeKind, ElementFamily, ElementKind};
use crate::topology::record::{
    Ancestry, RemovalStrategy, TopologyRecord, check_ancestry, check_removal,
};
use crate::topology::registry::EngineRegistry;
use crate::topology::source::TopologySource;

/// Dynamic topology tracking element counts per supported kind.
///
/// Points are always supported; other kinds are opted into with
/// [`with_kind`](Self::with_kind).
#[derive(Debug)]
pub struct MeshTopology {
    name: String,
    counts: [Option<Cell<usize>>; 6],
    renumbering: RemovalStrategy,
    registry: EngineRegistry,
}

impl MeshTopology {
    /// A topology with `nb_points` points and no other element kinds.
    pub fn new(name: impl Into<String>, nb_points: usize) -> Self {
        let mut counts: [Option<Cell<usize>>; 6] = Default::default();
        counts[ElementKind::Point.index()] = Some(Cell::new(nb_points));
        MeshTopology {
            name: name.into(),
            counts,
            renumbering: RemovalStrategy::Compact,
            registry: EngineRegistry::new(),
        }
    }

    /// Maintain elements of `kind`, starting with `count` of them.
    ///
    /// Records carry the family, not the kind, so one kind per family is
    /// maintained: this replaces any other kind of the same family (a
    /// triangle topology given quads becomes a quad topology).
    pub fn with_kind(mut self, kind: ElementKind, count: usize) -> Self {
        for other in ElementKind::ALL {
            if other != kind && other.family() == kind.family() {
                self.counts[other.index()] = None;
            }
        }
        self.counts[kind.index()] = Some(Cell::new(count));
        self
    }

    /// Renumber surviving elements with `strategy` after each removal.
    /// Every array following this topology renumbers the same way.
    pub fn with_renumbering(mut self, strategy: RemovalStrategy) -> Self {
        self.renumbering = strategy;
        self
    }

    #[inline]
    pub fn renumbering(&self) -> RemovalStrategy {
        self.renumbering
    }

    /// Wrap in an `Rc` for sharing with engines.
    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    fn counter(&self, kind: ElementKind) -> Result<&Cell<usize>, TopoError> {
        self.counts[kind.index()]
            .as_ref()
            .ok_or(TopoError::UnsupportedElementKind(kind))
    }

    fn tail_range(kind: ElementKind, start: usize, count: usize) -> Result<Range<usize>, TopoError> {
        let end = start.checked_add(count).ok_or(TopoError::CountOverflow {
            kind,
            count,
            len: start,
        })?;
        Ok(start..end)
    }

    /// Append `count` points. Returns the new point indices.
    pub fn add_points(&self, count: usize) -> Result<Range<usize>, TopoError> {
        self.add_elements(ElementKind::Point, count)
    }

    /// Append one point per ancestry entry, each derived from weighted
    /// existing points.
    pub fn add_points_with_ancestry(&self, ancestry: Ancestry) -> Result<Range<usize>, TopoError> {
        self.add_elements_with_ancestry(ElementKind::Point, ancestry)
    }

    /// Remove the points at `indices` (relative to the current numbering).
    pub fn remove_points(&self, indices: &[usize]) -> Result<(), TopoError> {
        self.remove_elements(ElementKind::Point, indices)
    }

    /// Append `count` elements of `kind`. Returns their indices.
    pub fn add_elements(&self, kind: ElementKind, count: usize) -> Result<Range<usize>, TopoError> {
        let counter = self.counter(kind)?;
        let range = Self::tail_range(kind, counter.get(), count)?;
        counter.set(range.end);
        self.publish(TopologyRecord::added(kind.family(), range.clone()));
        Ok(range)
    }

    /// Append one element of `kind` per ancestry entry.
    ///
    /// # Errors
    /// `IndexOutOfBounds` if an ancestor does not exist yet.
    pub fn add_elements_with_ancestry(
        &self,
        kind: ElementKind,
        ancestry: Ancestry,
    ) -> Result<Range<usize>, TopoError> {
        let counter = self.counter(kind)?;
        let start = counter.get();
        check_ancestry(ChangeKind::new(kind.family(), true), &ancestry, start)?;
        let range = Self::tail_range(kind, start, ancestry.len())?;
        let record = TopologyRecord::added_with_ancestry(kind.family(), range.clone(), ancestry)?;
        counter.set(range.end);
        self.publish(record);
        Ok(range)
    }

    /// Remove elements of `kind` at `indices`.
    ///
    /// # Errors
    /// `IndexOutOfBounds` or `DuplicateIndex`; the topology is unchanged.
    pub fn remove_elements(&self, kind: ElementKind, indices: &[usize]) -> Result<(), TopoError> {
        let counter = self.counter(kind)?;
        let len = counter.get();
        check_removal(ChangeKind::new(kind.family(), false), indices, len)?;
        counter.set(len - indices.len());
        self.publish(
            TopologyRecord::removed(kind.family(), indices.to_vec())
                .with_renumbering(self.renumbering),
        );
        Ok(())
    }

    fn publish(&self, record: TopologyRecord) {
        let reached = self.registry.broadcast(&record);
        if reached == 0 && record.family() != ElementFamily::Points {
            log::debug!(
                "{}: {:?} reached no engine",
                self.name,
                record.change()
            );
        }
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
    }
}

impl TopologySource for MeshTopology {
    fn name(&self) -> &str {
        &self.name
    }

    fn nb_points(&self) -> usize {
        self.counts[ElementKind::Point.index()]
            .as_ref()
            .map_or(0, Cell::get)
    }

    fn element_count(&self, kind: ElementKind) -> Option<usize> {
        self.counts[kind.index()].as_ref().map(Cell::get)
    }

    fn registry(&self) -> &EngineRegistry {
        &self.registry
    }
}

impl DebugInvariants for MeshTopology {
    fn validate_invariants(&self) -> Result<(), TopoError> {
        if self.counts[ElementKind::Point.index()].is_none() {
            return Err(TopoError::UnsupportedElementKind(ElementKind::Point));
        }
        self.registry.validate_invariants()
    }
}
