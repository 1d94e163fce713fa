//! Element kinds, record families and change kinds.
//!
//! A topology is made of points, edges, faces and volumes. Derived data is
//! kept per *element kind* (triangle, quad, …), while edit records are tagged
//! with the coarser *family* (faces, volumes, …) plus an add/remove action.

use std::fmt;

/// Concrete element kinds for which per-element data can be maintained.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum ElementKind {
    Point,
    Edge,
    Triangle,
    Quad,
    Tetrahedron,
    Hexahedron,
}

impl ElementKind {
    /// All kinds, lowest dimension first.
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Point,
        ElementKind::Edge,
        ElementKind::Triangle,
        ElementKind::Quad,
        ElementKind::Tetrahedron,
        ElementKind::Hexahedron,
    ];

    /// The record family edits of this kind are reported under.
    #[inline]
    pub const fn family(self) -> ElementFamily {
        match self {
            ElementKind::Point => ElementFamily::Points,
            ElementKind::Edge => ElementFamily::Edges,
            ElementKind::Triangle | ElementKind::Quad => ElementFamily::Faces,
            ElementKind::Tetrahedron | ElementKind::Hexahedron => ElementFamily::Volumes,
        }
    }

    /// Dense index in `0..6`, following [`ElementKind::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Topological dimension (0 for points, 3 for volumes).
    #[inline]
    pub const fn dimension(self) -> u8 {
        self.family() as u8
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ElementKind::Point => "point",
            ElementKind::Edge => "edge",
            ElementKind::Triangle => "triangle",
            ElementKind::Quad => "quad",
            ElementKind::Tetrahedron => "tetrahedron",
            ElementKind::Hexahedron => "hexahedron",
        };
        f.write_str(s)
    }
}

/// Record families; the discriminant is the topological dimension.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(u8)]
pub enum ElementFamily {
    Points = 0,
    Edges = 1,
    Faces = 2,
    Volumes = 3,
}

impl ElementFamily {
    #[inline]
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// The eight atomic structural edits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ChangeKind {
    PointsAdded,
    PointsRemoved,
    EdgesAdded,
    EdgesRemoved,
    FacesAdded,
    FacesRemoved,
    VolumesAdded,
    VolumesRemoved,
}

impl ChangeKind {
    /// Build the change kind for `family` and an add (`true`) or remove action.
    pub const fn new(family: ElementFamily, added: bool) -> Self {
        match (family, added) {
            (ElementFamily::Points, true) => ChangeKind::PointsAdded,
            (ElementFamily::Points, false) => ChangeKind::PointsRemoved,
            (ElementFamily::Edges, true) => ChangeKind::EdgesAdded,
            (ElementFamily::Edges, false) => ChangeKind::EdgesRemoved,
            (ElementFamily::Faces, true) => ChangeKind::FacesAdded,
            (ElementFamily::Faces, false) => ChangeKind::FacesRemoved,
            (ElementFamily::Volumes, true) => ChangeKind::VolumesAdded,
            (ElementFamily::Volumes, false) => ChangeKind::VolumesRemoved,
        }
    }

    /// Family this edit belongs to.
    pub const fn family(self) -> ElementFamily {
        match self {
            ChangeKind::PointsAdded | ChangeKind::PointsRemoved => ElementFamily::Points,
            ChangeKind::EdgesAdded | ChangeKind::EdgesRemoved => ElementFamily::Edges,
            ChangeKind::FacesAdded | ChangeKind::FacesRemoved => ElementFamily::Faces,
            ChangeKind::VolumesAdded | ChangeKind::VolumesRemoved => ElementFamily::Volumes,
        }
    }

    /// `true` for the `*Added` kinds.
    pub const fn is_addition(self) -> bool {
        matches!(
            self,
            ChangeKind::PointsAdded
                | ChangeKind::EdgesAdded
                | ChangeKind::FacesAdded
                | ChangeKind::VolumesAdded
        )
    }
}

/// Small set of record families an engine listens to.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct FamilySet(u8);

impl FamilySet {
    /// The empty set.
    pub const EMPTY: FamilySet = FamilySet(0);

    /// Set containing only `family`.
    pub const fn only(family: ElementFamily) -> Self {
        FamilySet(family.bit())
    }

    /// Add `family`; returns `false` if it was already present.
    pub fn insert(&mut self, family: ElementFamily) -> bool {
        let had = self.contains(family);
        self.0 |= family.bit();
        !had
    }

    /// Families present in either set.
    #[inline]
    pub const fn union(self, other: FamilySet) -> Self {
        FamilySet(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, family: ElementFamily) -> bool {
        self.0 & family.bit() != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for FamilySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let families = [
            ElementFamily::Points,
            ElementFamily::Edges,
            ElementFamily::Faces,
            ElementFamily::Volumes,
        ];
        f.debug_set()
            .entries(families.into_iter().filter(|fam| self.contains(*fam)))
            .finish()
    }
}
