use std::cell::RefCell;
use std::rc::Rc;

use topo_propagate::prelude::*;

/// Handler that remembers every batch it is given.
struct Spy {
    batches: Rc<RefCell<Vec<(Vec<ChangeKind>, usize)>>>,
}

impl TopologyHandler for Spy {
    fn element_kind(&self) -> ElementKind {
        ElementKind::Point
    }

    fn apply_topology_changes(
        &mut self,
        records: &[TopologyRecord],
        nb_points: usize,
    ) -> Result<(), TopoError> {
        let kinds = records.iter().map(TopologyRecord::change).collect();
        self.batches.borrow_mut().push((kinds, nb_points));
        Ok(())
    }
}

fn point_data(topo: &Rc<MeshTopology>, n: usize) -> TopologyData<f64> {
    let values = (0..n).map(|i| i as f64).collect();
    let mut data = TopologyData::new("position", ElementKind::Point, values);
    assert!(data.depend_on(Some(topo.clone())));
    data
}

#[test]
fn scenario_a_points_added() {
    let topo = MeshTopology::new("mesh", 5).shared();
    let mut data = point_data(&topo, 5);
    let batches = Rc::new(RefCell::new(Vec::new()));
    let mut spy = TopologyEngine::new(
        "spy",
        Some(Spy {
            batches: batches.clone(),
        }),
    );
    spy.bind_topology_source(Some(topo.clone()));
    spy.init();

    topo.add_points(3).unwrap();
    assert_eq!(topo.nb_points(), 8);
    assert_eq!(spy.refresh(), Ok(Refresh::Applied { records: 1 }));
    assert_eq!(*batches.borrow(), vec![(vec![ChangeKind::PointsAdded], 8)]);

    let values = data.values().unwrap();
    assert_eq!(values, &[0.0, 1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0]);
}

#[test]
fn scenario_b_points_removed() {
    let topo = MeshTopology::new("mesh", 5).shared();
    let mut data = point_data(&topo, 5);
    topo.remove_points(&[1, 4]).unwrap();
    assert_eq!(data.values().unwrap(), &[0.0, 2.0, 3.0]);
}

#[test]
fn arrays_on_one_topology_renumber_alike() {
    for strategy in [RemovalStrategy::Compact, RemovalStrategy::SwapWithLast] {
        let topo = MeshTopology::new("mesh", 4).with_renumbering(strategy).shared();
        let mut ids = TopologyData::new("ids", ElementKind::Point, vec![0u32, 1, 2, 3]);
        ids.depend_on(Some(topo.clone()));
        let mut weights = TopologyData::new("w", ElementKind::Point, vec![0.0_f64, 1.0, 2.0, 3.0]);
        weights.depend_on(Some(topo.clone()));

        topo.remove_points(&[1]).unwrap();
        topo.remove_points(&[1]).unwrap();

        let ids: Vec<f64> = ids.values().unwrap().iter().map(|&i| f64::from(i)).collect();
        assert_eq!(ids, weights.values().unwrap());
        let expected: &[f64] = match strategy {
            RemovalStrategy::Compact => &[0.0, 3.0],
            RemovalStrategy::SwapWithLast => &[0.0, 2.0],
        };
        assert_eq!(ids, expected);
    }
}

#[test]
fn scenario_c_no_source_warns_once() {
    let sink = Rc::new(RecordingSink::new());
    let batches = Rc::new(RefCell::new(Vec::new()));
    let mut engine = TopologyEngine::new(
        "data",
        Some(Spy {
            batches: batches.clone(),
        }),
    )
    .with_sink(sink.clone());
    engine.init();
    engine.mark_dirty();

    assert_eq!(
        engine.refresh(),
        Ok(Refresh::Skipped(SkipReason::MissingTopology))
    );
    assert!(batches.borrow().is_empty());
    assert_eq!(sink.entries().len(), 1);
    assert_eq!(sink.count(Severity::Warning), 1);
}

#[test]
fn scenario_d_out_of_bounds_leaves_data_untouched() {
    let topo = MeshTopology::new("mesh", 5).shared();
    let mut data = point_data(&topo, 5);
    data.engine()
        .link()
        .deliver(TopologyRecord::points_removed(vec![7]));

    let err = data.values().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Consistency);
    assert_eq!(
        err,
        TopoError::IndexOutOfBounds {
            change: ChangeKind::PointsRemoved,
            index: 7,
            len: 5
        }
    );
    assert_eq!(data.peek(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
    assert_eq!(data.engine().state(), EngineState::Dirty);

    assert_eq!(data.engine_mut().discard_pending(), 1);
    assert_eq!(data.values().unwrap().len(), 5);
}

#[test]
fn handler_sees_exactly_pending_records_once() {
    let topo = MeshTopology::new("mesh", 2).shared();
    let batches = Rc::new(RefCell::new(Vec::new()));
    let mut engine = TopologyEngine::new(
        "data",
        Some(Spy {
            batches: batches.clone(),
        }),
    );
    engine.bind_topology_source(Some(topo.clone()));
    engine.init();

    assert_eq!(engine.refresh(), Ok(Refresh::Clean));
    topo.add_points(1).unwrap();
    topo.remove_points(&[0]).unwrap();
    topo.add_points(2).unwrap();
    assert_eq!(engine.refresh(), Ok(Refresh::Applied { records: 3 }));
    assert_eq!(engine.refresh(), Ok(Refresh::Clean));

    let seen = batches.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0],
        (
            vec![
                ChangeKind::PointsAdded,
                ChangeKind::PointsRemoved,
                ChangeKind::PointsAdded
            ],
            4
        )
    );
}

#[test]
fn records_after_rejected_batch_apply_in_order() {
    let topo = MeshTopology::new("mesh", 3).shared();
    let mut data = point_data(&topo, 3);
    data.engine()
        .link()
        .deliver(TopologyRecord::points_removed(vec![0, 0]));
    assert!(matches!(
        data.values(),
        Err(TopoError::DuplicateIndex { index: 0, .. })
    ));

    topo.add_points(1).unwrap();
    let pending: Vec<_> = data
        .engine()
        .change_log()
        .borrow()
        .iter()
        .map(TopologyRecord::change)
        .collect();
    assert_eq!(
        pending,
        vec![ChangeKind::PointsRemoved, ChangeKind::PointsAdded]
    );
}

#[test]
fn interpolated_points_and_face_data() {
    let topo = MeshTopology::new("mesh", 2)
        .with_kind(ElementKind::Quad, 1)
        .shared();
    let mut coords = TopologyData::new("x", ElementKind::Point, vec![[0.0_f64, 0.0], [2.0, 4.0]]);
    coords.depend_on(Some(topo.clone()));
    let mut area = TopologyData::new("area", ElementKind::Quad, vec![1.0_f64]);
    area.depend_on(Some(topo.clone()));

    let mid = Ancestry::new(vec![vec![0, 1]], vec![vec![0.5, 0.5]]).unwrap();
    topo.add_points_with_ancestry(mid).unwrap();
    topo.add_elements(ElementKind::Quad, 1).unwrap();

    assert_eq!(coords.values().unwrap()[2], [1.0, 2.0]);
    assert_eq!(area.values().unwrap(), &[1.0, 0.0]);
    assert_eq!(area.engine().change_log().borrow().len(), 0);
}

#[test]
fn dropping_data_deregisters_engine() {
    let topo = MeshTopology::new("mesh", 4).shared();
    let a = point_data(&topo, 4);
    let b = point_data(&topo, 4);
    assert_eq!(topo.registry().len(), 2);
    drop(a);
    assert_eq!(topo.registry().len(), 1);
    topo.add_points(1).unwrap();
    drop(b);
    assert!(topo.registry().is_empty());
}
