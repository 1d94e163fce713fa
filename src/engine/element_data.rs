//! `ElementDataHandler`: keeps a `Vec<V>` indexed parallel to the elements
//! of one kind.
//!
//! A batch is applied in two passes. The first pass replays the batch on the
//! array *length* only and checks every index against it; nothing is touched
//! until the whole batch is known to be consistent. The second pass performs
//! the edits. This gives all-or-nothing batches without cloning the data.

use std::fmt;

use itertools::Itertools;

use crate::engine::handler::TopologyHandler;
use crate::engine::value::ElementValue;
use crate::topo_error::TopoError;
use crate::topology::element::{ElementFamily, ElementKind};
use crate::topology::record::{RemovalStrategy, TopologyRecord, check_ancestry, check_removal};

type CreateHook<V> = Box<dyn FnMut(usize, &mut V, Option<(&[usize], &[f64])>)>;
type DestroyHook<V> = Box<dyn FnMut(usize, &V)>;

/// Per-element data for one element kind.
pub struct ElementDataHandler<V> {
    kind: ElementKind,
    values: Vec<V>,
    on_create: Option<CreateHook<V>>,
    on_destroy: Option<DestroyHook<V>>,
}

impl<V: ElementValue> ElementDataHandler<V> {
    /// Handler for `kind` owning `values` (one entry per existing element).
    pub fn new(kind: ElementKind, values: Vec<V>) -> Self {
        ElementDataHandler {
            kind,
            values,
            on_create: None,
            on_destroy: None,
        }
    }

    /// Point data with `nb_points` default entries.
    pub fn for_points(nb_points: usize) -> Self {
        Self::new(ElementKind::Point, vec![V::default(); nb_points])
    }

    /// Called for every created element with its index, its freshly built
    /// value and its `(ancestors, weights)` if the record carried ancestry.
    pub fn on_create(
        mut self,
        hook: impl FnMut(usize, &mut V, Option<(&[usize], &[f64])>) + 'static,
    ) -> Self {
        self.on_create = Some(Box::new(hook));
        self
    }

    /// Called for every removed element, before it is erased, with its index
    /// in the numbering the removal record refers to.
    pub fn on_destroy(mut self, hook: impl FnMut(usize, &V) + 'static) -> Self {
        self.on_destroy = Some(Box::new(hook));
        self
    }

    #[inline]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Mutable access to the entries. The length is owned by the topology
    /// and cannot be changed through this slice.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [V] {
        &mut self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn family(&self) -> ElementFamily {
        self.kind.family()
    }

    /// Replay `records` on the length only. Returns the final length.
    fn check_batch(&self, records: &[TopologyRecord], nb_points: usize) -> Result<usize, TopoError> {
        let mut len = self.values.len();
        let mut saw_points = false;
        for rec in records.iter().filter(|r| r.family() == self.family()) {
            saw_points |= rec.family() == ElementFamily::Points;
            if rec.is_addition() {
                for (k, &found) in rec.indices().iter().enumerate() {
                    let expected = len + k;
                    if found != expected {
                        return Err(TopoError::NonTailAddition {
                            change: rec.change(),
                            expected,
                            found,
                        });
                    }
                }
                if let Some(anc) = rec.ancestry() {
                    if anc.len() != rec.count() {
                        return Err(TopoError::AncestryMismatch {
                            expected: rec.count(),
                            found: anc.len(),
                        });
                    }
                    check_ancestry(rec.change(), anc, len)?;
                }
                len += rec.count();
            } else {
                check_removal(rec.change(), rec.indices(), len)?;
                len -= rec.count();
            }
        }
        if self.kind == ElementKind::Point && saw_points && len != nb_points {
            return Err(TopoError::PointCountMismatch {
                expected: nb_points,
                found: len,
            });
        }
        Ok(len)
    }

    fn add(&mut self, rec: &TopologyRecord) {
        self.values.reserve(rec.count());
        for (k, &index) in rec.indices().iter().enumerate() {
            let parents = rec.ancestry().and_then(|a| a.get(k));
            let mut value = parents
                .and_then(|(ancestors, weights)| {
                    let terms: Vec<(&V, f64)> = ancestors
                        .iter()
                        .zip(weights)
                        .filter_map(|(&a, &w)| self.values.get(a).map(|v| (v, w)))
                        .collect();
                    V::interpolate(&terms)
                })
                .unwrap_or_default();
            if let Some(hook) = self.on_create.as_mut() {
                hook(index, &mut value, parents);
            }
            self.values.push(value);
        }
    }

    fn remove(&mut self, rec: &TopologyRecord) {
        if let Some(hook) = self.on_destroy.as_mut() {
            for &i in rec.indices() {
                if let Some(v) = self.values.get(i) {
                    hook(i, v);
                }
            }
        }
        match rec.renumbering() {
            RemovalStrategy::Compact => {
                let mut doomed = vec![false; self.values.len()];
                for &i in rec.indices() {
                    if let Some(slot) = doomed.get_mut(i) {
                        *slot = true;
                    }
                }
                let mut it = doomed.into_iter();
                self.values.retain(|_| !it.next().unwrap_or(false));
            }
            RemovalStrategy::SwapWithLast => {
                for i in rec.indices().iter().copied().sorted_unstable_by(|a, b| b.cmp(a)) {
                    if i < self.values.len() {
                        self.values.swap_remove(i);
                    }
                }
            }
        }
    }
}

impl<V: ElementValue> TopologyHandler for ElementDataHandler<V> {
    fn element_kind(&self) -> ElementKind {
        self.kind
    }

    fn apply_topology_changes(
        &mut self,
        records: &[TopologyRecord],
        nb_points: usize,
    ) -> Result<(), TopoError> {
        let before = self.values.len();
        let expected = self.check_batch(records, nb_points)?;
        let family = self.family();
        for rec in records.iter().filter(|r| r.family() == family) {
            if rec.is_addition() {
                self.add(rec);
            } else {
                self.remove(rec);
            }
        }
        debug_assert_eq!(self.values.len(), expected);
        log::debug!(
            "{} data: {} record(s), {} -> {} entries",
            self.kind,
            records.len(),
            before,
            self.values.len()
        );
        Ok(())
    }
}

impl<V: fmt::Debug> fmt::Debug for ElementDataHandler<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementDataHandler")
            .field("kind", &self.kind)
            .field("values", &self.values)
            .field("on_create", &self.on_create.is_some())
            .field("on_destroy", &self.on_destroy.is_some())
            .finish()
    }
}
