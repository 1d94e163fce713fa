//! Engine registry: explicit fan-out table owned by a topology.
//!
//! A topology keeps one [`EngineRegistry`] listing every engine interested
//! in its edits. Each entry refers to the engine's [`EngineLink`], the small
//! shared endpoint holding the engine's change log and dirty flag. The
//! registry holds links weakly, so it never keeps an engine alive; engines
//! remove themselves on drop and dead entries are pruned on fan-out.
//!
//! # Invariants
//! - `order` and `entries` hold exactly the same keys, each once.
//! - A key is the address of a link allocation that is still reachable
//!   through the stored `Weak`, so it cannot be reused while listed.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use hashbrown::HashMap;

use crate::debug_invariants::DebugInvariants;
use crate::topo_error::TopoError;
use crate::topology::change_log::{ChangeLog, SharedChangeLog};
use crate::topology::element::{ElementFamily, FamilySet};
use crate::topology::record::TopologyRecord;

/// Shared fan-out endpoint of one engine.
#[derive(Debug)]
pub struct EngineLink {
    name: String,
    log: SharedChangeLog,
    dirty: Cell<bool>,
}

impl EngineLink {
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(EngineLink {
            name: name.into(),
            log: ChangeLog::shared(),
            dirty: Cell::new(false),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The change log fed through this link.
    #[inline]
    pub fn log(&self) -> &SharedChangeLog {
        &self.log
    }

    /// Append `record` to the log and flag the engine dirty.
    pub fn deliver(&self, record: TopologyRecord) {
        self.log.borrow_mut().append(record);
        self.dirty.set(true);
    }

    #[inline]
    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    #[inline]
    pub fn mark_clean(&self) {
        self.dirty.set(false);
    }

    /// Dirty if explicitly flagged or holding unconsumed records.
    pub fn is_dirty(&self) -> bool {
        self.dirty.get() || !self.log.borrow().is_empty()
    }

    fn key(&self) -> usize {
        self as *const EngineLink as usize
    }
}

/// Outcome of [`EngineRegistry::register`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Registration {
    Added,
    AlreadyRegistered,
}

#[derive(Debug)]
struct Entry {
    link: Weak<EngineLink>,
    families: FamilySet,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<usize, Entry>,
    order: Vec<usize>,
}

/// Fan-out table of the engines registered with one topology.
#[derive(Debug, Default)]
pub struct EngineRegistry {
    inner: RefCell<Inner>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `link`, listening to `families`.
    ///
    /// Registering a link twice never duplicates its entry; the family sets
    /// are merged instead.
    pub fn register(&self, link: &Rc<EngineLink>, families: FamilySet) -> Registration {
        let key = link.key();
        let outcome = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            match inner.entries.get_mut(&key) {
                Some(entry) => {
                    entry.families = entry.families.union(families);
                    Registration::AlreadyRegistered
                }
                None => {
                    inner.entries.insert(
                        key,
                        Entry {
                            link: Rc::downgrade(link),
                            families,
                        },
                    );
                    inner.order.push(key);
                    Registration::Added
                }
            }
        };
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        outcome
    }

    /// Add `family` to the families `link` listens to.
    ///
    /// Returns `false` if the link is not registered or already listened to
    /// that family.
    pub fn link_family(&self, link: &EngineLink, family: ElementFamily) -> bool {
        let mut inner = self.inner.borrow_mut();
        inner
            .entries
            .get_mut(&link.key())
            .is_some_and(|e| e.families.insert(family))
    }

    /// Families `link` listens to, if registered.
    pub fn families(&self, link: &EngineLink) -> Option<FamilySet> {
        self.inner
            .borrow()
            .entries
            .get(&link.key())
            .map(|e| e.families)
    }

    /// Remove `link`. Returns `true` if it was registered.
    ///
    /// Safe to call while the registry is borrowed elsewhere: in that case
    /// the entry is left to be pruned by the next fan-out.
    pub fn deregister(&self, link: &EngineLink) -> bool {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            return false;
        };
        let key = link.key();
        if inner.entries.remove(&key).is_some() {
            inner.order.retain(|k| *k != key);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn contains(&self, link: &EngineLink) -> bool {
        self.inner.borrow().entries.contains_key(&link.key())
    }

    /// Number of live registered engines.
    pub fn len(&self) -> usize {
        self.inner
            .borrow()
            .entries
            .values()
            .filter(|e| e.link.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `record` to every live engine listening to its family, in
    /// registration order. Returns the number of engines reached.
    pub fn broadcast(&self, record: &TopologyRecord) -> usize {
        self.prune();
        let targets: Vec<Rc<EngineLink>> = {
            let inner = self.inner.borrow();
            inner
                .order
                .iter()
                .filter_map(|k| inner.entries.get(k))
                .filter(|e| e.families.contains(record.family()))
                .filter_map(|e| e.link.upgrade())
                .collect()
        };
        for link in &targets {
            link.deliver(record.clone());
        }
        log::trace!(
            "fan-out {:?} ({} indices) to {} engine(s)",
            record.change(),
            record.count(),
            targets.len()
        );
        targets.len()
    }

    /// Drop entries whose engine is gone. Returns the number removed.
    pub fn prune(&self) -> usize {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            return 0;
        };
        let dead: Vec<usize> = inner
            .entries
            .iter()
            .filter(|(_, e)| e.link.strong_count() == 0)
            .map(|(k, _)| *k)
            .collect();
        for k in &dead {
            inner.entries.remove(k);
        }
        if !dead.is_empty() {
            inner.order.retain(|k| !dead.contains(k));
        }
        dead.len()
    }

    /// Names of the live registered engines, in registration order.
    pub fn engine_names(&self) -> Vec<String> {
        let inner = self.inner.borrow();
        inner
            .order
            .iter()
            .filter_map(|k| inner.entries.get(k)?.link.upgrade())
            .map(|l| l.name().to_owned())
            .collect()
    }
}

impl DebugInvariants for EngineRegistry {
    fn validate_invariants(&self) -> Result<(), TopoError> {
        let inner = self.inner.borrow();
        let mut seen = hashbrown::HashSet::with_capacity(inner.order.len());
        for k in &inner.order {
            if !seen.insert(*k) || !inner.entries.contains_key(k) {
                return Err(TopoError::RegistryCorrupted {
                    entries: inner.entries.len(),
                    order: inner.order.len(),
                });
            }
        }
        if seen.len() != inner.entries.len() {
            return Err(TopoError::RegistryCorrupted {
                entries: inner.entries.len(),
                order: inner.order.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> FamilySet {
        FamilySet::only(ElementFamily::Points)
    }

    #[test]
    fn double_registration_keeps_one_entry() {
        let reg = EngineRegistry::new();
        let link = EngineLink::new("a");
        assert_eq!(reg.register(&link, points()), Registration::Added);
        assert_eq!(reg.register(&link, points()), Registration::AlreadyRegistered);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.broadcast(&TopologyRecord::points_added(0..1)), 1);
        assert_eq!(link.log().borrow().len(), 1);
    }

    #[test]
    fn broadcast_filters_by_family() {
        let reg = EngineRegistry::new();
        let pts = EngineLink::new("pts");
        let edges = EngineLink::new("edges");
        reg.register(&pts, points());
        reg.register(&edges, points());
        assert!(reg.link_family(&edges, ElementFamily::Edges));
        assert!(!reg.link_family(&edges, ElementFamily::Edges));

        let n = reg.broadcast(&TopologyRecord::added(ElementFamily::Edges, 0..2));
        assert_eq!(n, 1);
        assert!(!pts.is_dirty());
        assert!(edges.is_dirty());
    }

    #[test]
    fn dropped_links_are_pruned() {
        let reg = EngineRegistry::new();
        let keep = EngineLink::new("keep");
        reg.register(&keep, points());
        {
            let gone = EngineLink::new("gone");
            reg.register(&gone, points());
            assert_eq!(reg.len(), 2);
        }
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.prune(), 1);
        assert_eq!(reg.engine_names(), vec!["keep".to_string()]);
        assert!(reg.validate_invariants().is_ok());
    }

    #[test]
    fn deregister_removes_entry() {
        let reg = EngineRegistry::new();
        let link = EngineLink::new("a");
        reg.register(&link, points());
        assert!(reg.deregister(&link));
        assert!(!reg.deregister(&link));
        assert!(reg.is_empty());
        assert_eq!(reg.broadcast(&TopologyRecord::points_added(0..1)), 0);
    }
}
