//! `TopologySource`: the collaborator an engine reads point counts from and
//! registers with.
//!
//! Support for element kinds is discovered through capability accessors that
//! return `None` for unsupported kinds, rather than by inspecting the
//! concrete container type.

use std::rc::Rc;

use crate::topology::element::{ElementKind, FamilySet};
use crate::topology::registry::{EngineLink, EngineRegistry, Registration};

/// A topology that emits edit records and fans them out to engines.
pub trait TopologySource {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Current number of points.
    fn nb_points(&self) -> usize;

    /// Current number of elements of `kind`, or `None` if this topology does
    /// not maintain that kind.
    fn element_count(&self, kind: ElementKind) -> Option<usize>;

    /// The registry edits are fanned out through.
    fn registry(&self) -> &EngineRegistry;

    /// Whether elements of `kind` are maintained.
    fn supports(&self, kind: ElementKind) -> bool {
        self.element_count(kind).is_some()
    }

    fn nb_edges(&self) -> Option<usize> {
        self.element_count(ElementKind::Edge)
    }

    fn nb_triangles(&self) -> Option<usize> {
        self.element_count(ElementKind::Triangle)
    }

    fn nb_quads(&self) -> Option<usize> {
        self.element_count(ElementKind::Quad)
    }

    fn nb_tetrahedra(&self) -> Option<usize> {
        self.element_count(ElementKind::Tetrahedron)
    }

    fn nb_hexahedra(&self) -> Option<usize> {
        self.element_count(ElementKind::Hexahedron)
    }

    /// Register an engine's link for `families`. Idempotent per link.
    fn register_engine(&self, link: &Rc<EngineLink>, families: FamilySet) -> Registration {
        self.registry().register(link, families)
    }
}

/// Shared handle to a topology source.
pub type SharedTopology = Rc<dyn TopologySource>;
