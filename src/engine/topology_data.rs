//! `TopologyData<V>`: a per-element array that follows a topology.
//!
//! Reading through [`values`](TopologyData::values) refreshes first, so the
//! data is always consistent with the topology's latest edits.
//! [`peek`](TopologyData::peek) reads without refreshing.

use crate::diagnostics::SharedSink;
use crate::engine::element_data::ElementDataHandler;
use crate::engine::options::EngineOptions;
use crate::engine::topology_engine::{Refresh, TopologyEngine};
use crate::engine::value::ElementValue;
use crate::topo_error::TopoError;
use crate::topology::cache::InvalidateCache;
use crate::topology::element::ElementKind;
use crate::topology::source::SharedTopology;

/// Named per-element data owning its propagation engine.
#[derive(Debug)]
pub struct TopologyData<V: ElementValue> {
    name: String,
    engine: TopologyEngine<ElementDataHandler<V>>,
}

impl<V: ElementValue> TopologyData<V> {
    /// Data called `name`, with one entry of `values` per existing element
    /// of `kind`.
    pub fn new(name: impl Into<String>, kind: ElementKind, values: Vec<V>) -> Self {
        let name = name.into();
        let handler = ElementDataHandler::new(kind, values);
        TopologyData {
            engine: TopologyEngine::new(name.clone(), Some(handler)),
            name,
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.engine = self.engine.with_options(options);
        self
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.engine = self.engine.with_sink(sink);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare this data dependent on `topology` and initialize the engine.
    ///
    /// Returns `false` (after a warning) when `topology` is `None`; the data
    /// then keeps its current values until a topology is bound.
    pub fn depend_on(&mut self, topology: Option<SharedTopology>) -> bool {
        let bound = self.engine.bind_topology_source(topology);
        self.engine.init();
        bound
    }

    /// Bring the data up to date with the topology.
    pub fn update(&mut self) -> Result<Refresh, TopoError> {
        self.engine.refresh()
    }

    /// Up-to-date values.
    ///
    /// # Errors
    /// A consistency error from the pending batch; the values are then
    /// unchanged and the batch stays pending.
    pub fn values(&mut self) -> Result<&[V], TopoError> {
        self.engine.refresh()?;
        Ok(self.peek())
    }

    /// Current values without applying pending edits.
    pub fn peek(&self) -> &[V] {
        self.engine
            .handler()
            .map(ElementDataHandler::values)
            .unwrap_or_default()
    }

    /// Mutable access to the values as they currently are.
    pub fn values_mut(&mut self) -> &mut [V] {
        match self.engine.handler_mut() {
            Some(h) => h.values_mut(),
            None => &mut [],
        }
    }

    #[inline]
    pub fn engine(&self) -> &TopologyEngine<ElementDataHandler<V>> {
        &self.engine
    }

    #[inline]
    pub fn engine_mut(&mut self) -> &mut TopologyEngine<ElementDataHandler<V>> {
        &mut self.engine
    }
}

impl<V: ElementValue> InvalidateCache for TopologyData<V> {
    fn invalidate_cache(&mut self) {
        self.engine.invalidate_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::mesh::MeshTopology;
    use crate::topology::source::TopologySource;

    #[test]
    fn values_follow_point_edits() {
        let topo = MeshTopology::new("mesh", 3).shared();
        let mut data = TopologyData::new("mass", ElementKind::Point, vec![1.0_f64, 2.0, 3.0]);
        assert!(data.depend_on(Some(topo.clone())));
        assert_eq!(data.engine().name(), "TopologyEngine_mass");

        topo.remove_points(&[0]).unwrap();
        topo.add_points(2).unwrap();
        assert_eq!(data.peek(), &[1.0, 2.0, 3.0]);
        assert_eq!(data.values().unwrap(), &[2.0, 3.0, 0.0, 0.0]);
        assert_eq!(data.values().unwrap().len(), topo.nb_points());
    }

    #[test]
    fn edge_data_ignores_point_edits() {
        let topo = MeshTopology::new("mesh", 3)
            .with_kind(ElementKind::Edge, 2)
            .shared();
        let mut data = TopologyData::new("length", ElementKind::Edge, vec![0.5_f32, 1.5]);
        data.depend_on(Some(topo.clone()));
        assert!(data.engine().is_linked(ElementKind::Edge));

        topo.add_points(4).unwrap();
        topo.remove_elements(ElementKind::Edge, &[0]).unwrap();
        assert_eq!(data.values().unwrap(), &[1.5]);
    }

    #[test]
    fn unbound_data_keeps_values() {
        let mut data = TopologyData::new("flags", ElementKind::Point, vec![true, false]);
        assert!(!data.depend_on(None));
        data.values_mut()[1] = true;
        assert_eq!(data.values().unwrap(), &[true, true]);
    }
}
