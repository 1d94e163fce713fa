//! `TopologyHandler`: applies a batch of topology edits to derived data.

use crate::topo_error::TopoError;
use crate::topology::element::ElementKind;
use crate::topology::record::TopologyRecord;

/// Consumer of topology edits for one kind of per-element data.
///
/// Implementations must process `records` strictly in order. Removal indices
/// are relative to the data as it was before that record; additions extend
/// the data at its tail. When a point handler sees point records, its data
/// must end up with exactly `nb_points` entries.
///
/// A batch is all-or-nothing: on `Err` the handler's data must be exactly as
/// it was before the call.
pub trait TopologyHandler {
    /// Kind of element the handled data is indexed by.
    fn element_kind(&self) -> ElementKind;

    /// Apply `records` given the topology's current point count.
    fn apply_topology_changes(
        &mut self,
        records: &[TopologyRecord],
        nb_points: usize,
    ) -> Result<(), TopoError>;
}

impl<H: TopologyHandler + ?Sized> TopologyHandler for Box<H> {
    #[inline]
    fn element_kind(&self) -> ElementKind {
        (**self).element_kind()
    }

    #[inline]
    fn apply_topology_changes(
        &mut self,
        records: &[TopologyRecord],
        nb_points: usize,
    ) -> Result<(), TopoError> {
        (**self).apply_topology_changes(records, nb_points)
    }
}
