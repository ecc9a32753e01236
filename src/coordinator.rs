use std::sync::Arc;

use log::{debug, warn};

use crate::data::{dimension_names, DataPoint, PcpRecord, QualitySample, VariablePoint};
use crate::dataflow::FetchSlot;
use crate::layout::pcp::PcpLayout;
use crate::layout::reorder::AxisDrag;
use crate::scale::OrdinalColors;
use crate::service::{self, DataService, ServiceError};
use crate::store::SelectionStore;
use crate::themes;

type Fetched<T> = FetchSlot<Result<Vec<T>, ServiceError>>;

/// What a view has to show right now. A failed or empty fetch degrades that
/// one view to `NoData`; the other views never see it.
#[derive(Debug)]
pub enum ViewData<'a, T> {
    Loading,
    NoData(String),
    Ready(&'a [T]),
}

impl<'a, T> ViewData<'a, T> {
    pub fn ready(&self) -> Option<&'a [T]> {
        match self {
            ViewData::Ready(rows) => Some(rows),
            _ => None,
        }
    }
}

fn view_data<T: Send + 'static>(slot: &Fetched<T>) -> ViewData<'_, T> {
    match slot.value() {
        None => ViewData::Loading,
        Some(Err(error)) => ViewData::NoData(error.to_string()),
        Some(Ok(rows)) => ViewData::Ready(rows),
    }
}

/// Subscribes to the selection store, issues refetches, and rebuilds the
/// derived state every dependent view consumes. Rendering reads the outputs
/// (scales, layouts, colors) and feeds nothing back.
///
/// Every update is a full teardown and rebuild of the affected view's
/// derived state; there is no incremental diffing to get wrong.
pub struct ViewCoordinator {
    service: Arc<dyn DataService>,
    points: Fetched<DataPoint>,
    variables: Fetched<VariablePoint>,
    quality: Fetched<QualitySample>,
    pcp: Fetched<PcpRecord>,

    /// Cluster count the most recent point/PCP fetches were issued with.
    fetched_clusters: Option<u32>,
    seen_store_generation: Option<usize>,

    /// Scatter/legend color assignment, rebuilt from each fresh
    /// point-embedding response. Independent of the PCP's cyclic palette.
    point_colors: OrdinalColors,

    pcp_layout: Option<PcpLayout>,
    /// Dimension set + data generation the current layout was built from.
    pcp_built_from: (Vec<String>, usize),
    pub axis_drag: AxisDrag,
}

impl ViewCoordinator {
    pub fn new(service: Arc<dyn DataService>) -> Self {
        Self {
            service,
            points: FetchSlot::new(),
            variables: FetchSlot::new(),
            quality: FetchSlot::new(),
            pcp: FetchSlot::new(),
            fetched_clusters: None,
            seen_store_generation: None,
            point_colors: OrdinalColors::new(&themes::CLUSTER_PALETTE),
            pcp_layout: None,
            pcp_built_from: (Vec::new(), 0),
            axis_drag: AxisDrag::new(),
        }
    }

    /// Issue the initial fetch for every view, with the service's default
    /// cluster count.
    pub fn bootstrap(&mut self) {
        let service = Arc::clone(&self.service);
        self.variables
            .spawn(move || service::mds_variables(service.as_ref()));
        let service = Arc::clone(&self.service);
        self.quality
            .spawn(move || service::kmeans_mse(service.as_ref()));
        self.refetch_clustered(None);
    }

    fn refetch_clustered(&mut self, clusters: Option<u32>) {
        debug!("fetching point embeddings and PCP records for clusters={clusters:?}");
        self.fetched_clusters = clusters;
        let service = Arc::clone(&self.service);
        self.points
            .spawn(move || service::mds_points(service.as_ref(), clusters));
        let service = Arc::clone(&self.service);
        self.pcp
            .spawn(move || service::pcp_data(service.as_ref(), clusters));
    }

    /// One cooperative step: apply arrived responses, react to store
    /// changes, refetch where the active cluster count moved on. Called once
    /// per UI pass, before any view draws. Returns true when anything
    /// changed and the frame should repaint.
    pub fn sync(&mut self, store: &mut SelectionStore) -> bool {
        let mut changed = false;

        if self.variables.poll() {
            changed = true;
            if let Some(Ok(variables)) = self.variables.value() {
                store.set_known_variables(
                    variables.iter().map(|point| point.variable.clone()),
                );
            } else if let Some(Err(error)) = self.variables.value() {
                warn!("variable embedding degraded: {error}");
            }
        }

        if self.points.poll() {
            changed = true;
            self.rebuild_point_colors();
        }

        changed |= self.quality.poll();
        if self.pcp.poll() {
            changed = true;
            if let Some(Err(error)) = self.pcp.value() {
                warn!("PCP records degraded: {error}");
            }
        }

        if self.seen_store_generation != Some(store.generation()) {
            self.seen_store_generation = Some(store.generation());
            changed = true;
            if store.cluster_count() != self.fetched_clusters {
                self.refetch_clustered(store.cluster_count());
            }
        }

        changed || self.is_fetching()
    }

    pub fn is_fetching(&self) -> bool {
        self.points.is_running()
            || self.variables.is_running()
            || self.quality.is_running()
            || self.pcp.is_running()
    }

    /// Color domain rebuild after a point-embedding response: the distinct
    /// cluster ids present in the new data, in data order. Not assumed to be
    /// a contiguous `[0, k)`.
    fn rebuild_point_colors(&mut self) {
        self.point_colors.reset();
        if let Some(Ok(points)) = self.points.value() {
            for point in points {
                self.point_colors.color(point.cluster);
            }
        }
    }

    pub fn point_view(&self) -> ViewData<'_, DataPoint> {
        view_data(&self.points)
    }

    pub fn variable_view(&self) -> ViewData<'_, VariablePoint> {
        view_data(&self.variables)
    }

    pub fn quality_view(&self) -> ViewData<'_, QualitySample> {
        view_data(&self.quality)
    }

    pub fn pcp_view(&self) -> ViewData<'_, PcpRecord> {
        view_data(&self.pcp)
    }

    /// The scatter/legend color scale, as built from the latest
    /// point-embedding response.
    pub fn point_colors(&self) -> &OrdinalColors {
        &self.point_colors
    }

    /// The dimensions the PCP should display. More than one selected
    /// variable projects the records down to exactly those variables; one or
    /// zero selected falls back to every dimension. The boundary at exactly
    /// one is a hard threshold, not an off-by-one.
    pub fn effective_dimensions(&self, store: &SelectionStore) -> Vec<String> {
        let selection = store.selection();
        if selection.len() > 1 {
            selection.to_vec()
        } else {
            match self.pcp.value() {
                Some(Ok(records)) => dimension_names(records),
                _ => Vec::new(),
            }
        }
    }

    /// The PCP layout for the current records, dimension set, and plot
    /// size. Rebuilt from scratch (order reset to the natural/selection
    /// order) whenever the dimension set or the underlying data changes;
    /// resized in place otherwise, preserving any drag-reordering.
    pub fn pcp_layout(
        &mut self,
        store: &SelectionStore,
        width: f32,
        height: f32,
    ) -> Option<&mut PcpLayout> {
        let records = match self.pcp.value() {
            Some(Ok(records)) => records,
            _ => {
                self.pcp_layout = None;
                return None;
            }
        };
        let dimensions = {
            let selection = store.selection();
            if selection.len() > 1 {
                selection.to_vec()
            } else {
                dimension_names(records)
            }
        };
        if dimensions.is_empty() {
            self.pcp_layout = None;
            return None;
        }

        let built_from = (dimensions.clone(), self.pcp.generation());
        let rebuild = self.pcp_built_from != built_from || self.pcp_layout.is_none();
        if rebuild {
            self.pcp_layout = Some(PcpLayout::compute(records, dimensions, width, height));
            self.pcp_built_from = built_from;
            self.axis_drag = AxisDrag::new();
        } else if let Some(layout) = self.pcp_layout.as_mut() {
            if layout.width() != width || layout.height() != height {
                layout.resize(records, width, height);
            }
        }
        self.pcp_layout.as_mut()
    }

    /// Everything the PCP widget needs for one pass: the layout, the drag
    /// controller that mutates its order, and the records to stroke.
    pub fn pcp_parts(
        &mut self,
        store: &SelectionStore,
        width: f32,
        height: f32,
    ) -> Option<(&mut PcpLayout, &mut AxisDrag, &[PcpRecord])> {
        self.pcp_layout(store, width, height)?;
        let records = match self.pcp.value() {
            Some(Ok(records)) => records.as_slice(),
            _ => return None,
        };
        let layout = self.pcp_layout.as_mut()?;
        Some((layout, &mut self.axis_drag, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Duration;

    use crate::service::Endpoint;

    /// Counts every fetch and serves canned bodies, or an error for paths
    /// marked broken.
    struct RecordingService {
        calls: Mutex<Vec<Endpoint>>,
        broken: Option<&'static str>,
    }

    impl RecordingService {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                broken: None,
            }
        }

        fn broken_at(path: &'static str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                broken: Some(path),
            }
        }

        fn calls(&self) -> Vec<Endpoint> {
            self.calls.lock().clone()
        }
    }

    impl DataService for RecordingService {
        fn fetch(&self, endpoint: &Endpoint) -> Result<String, ServiceError> {
            self.calls.lock().push(*endpoint);
            let path = endpoint.path();
            if let Some(broken) = self.broken {
                if path.starts_with(broken) {
                    return Err(ServiceError::Status(500));
                }
            }
            Ok(match endpoint {
                Endpoint::MdsPoints { .. } => {
                    r#"[{"x": 0.0, "y": 1.0, "cluster": 0},
                        {"x": 1.0, "y": 0.0, "cluster": 1}]"#
                }
                Endpoint::MdsVariables => {
                    r#"[{"variable": "age", "x": 0.1, "y": 0.2},
                        {"variable": "income", "x": 0.5, "y": 0.6},
                        {"variable": "rate", "x": 0.9, "y": 0.1}]"#
                }
                Endpoint::KmeansMse => {
                    r#"[{"clusters": 2, "mse": 10.0},
                        {"clusters": 3, "mse": 6.0},
                        {"clusters": 4, "mse": 4.0}]"#
                }
                Endpoint::PcpData { .. } => {
                    r#"[{"age": 30, "income": 50, "rate": 3.5, "cluster": 0},
                        {"age": 60, "income": 20, "rate": 7.0, "cluster": 1}]"#
                }
            }
            .to_owned())
        }
    }

    fn settle(coordinator: &mut ViewCoordinator, store: &mut SelectionStore) {
        for _ in 0..200 {
            coordinator.sync(store);
            if !coordinator.is_fetching() {
                return;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        panic!("fetches never settled");
    }

    fn ready_coordinator() -> (Arc<RecordingService>, ViewCoordinator, SelectionStore) {
        let service = Arc::new(RecordingService::new());
        let mut coordinator = ViewCoordinator::new(Arc::clone(&service) as Arc<dyn DataService>);
        let mut store = SelectionStore::new();
        coordinator.bootstrap();
        settle(&mut coordinator, &mut store);
        (service, coordinator, store)
    }

    #[test]
    fn one_selected_variable_behaves_like_none() {
        let (_, coordinator, mut store) = ready_coordinator();
        assert_eq!(
            coordinator.effective_dimensions(&store),
            vec!["age", "income", "rate"]
        );
        store.toggle_variable("age");
        assert_eq!(
            coordinator.effective_dimensions(&store),
            vec!["age", "income", "rate"]
        );
    }

    #[test]
    fn two_selected_variables_project_the_dimension_set() {
        let (_, coordinator, mut store) = ready_coordinator();
        store.toggle_variable("age");
        store.toggle_variable("income");
        assert_eq!(
            coordinator.effective_dimensions(&store),
            vec!["age", "income"]
        );
        // Cluster survives projection on the records themselves.
        let records = coordinator.pcp_view().ready().unwrap();
        assert_eq!(records[1].cluster, 1);
    }

    #[test]
    fn quality_pick_refetches_points_and_pcp_exactly_once() {
        let (service, mut coordinator, mut store) = ready_coordinator();
        let before = service.calls();
        store.set_cluster_count(Some(3));
        coordinator.sync(&mut store);
        settle(&mut coordinator, &mut store);
        let after = service.calls();
        let new_calls = &after[before.len()..];
        assert_eq!(
            new_calls
                .iter()
                .filter(|call| **call == Endpoint::MdsPoints { clusters: Some(3) })
                .count(),
            1
        );
        assert_eq!(
            new_calls
                .iter()
                .filter(|call| **call == Endpoint::PcpData { clusters: Some(3) })
                .count(),
            1
        );
        assert_eq!(new_calls.len(), 2);
    }

    #[test]
    fn point_color_domain_follows_the_latest_response() {
        let (_, coordinator, _) = ready_coordinator();
        assert_eq!(coordinator.point_colors().domain(), &[0, 1]);
    }

    #[test]
    fn one_views_failure_leaves_the_others_standing() {
        let service = Arc::new(RecordingService::broken_at("/data/mds-points"));
        let mut coordinator = ViewCoordinator::new(Arc::clone(&service) as Arc<dyn DataService>);
        let mut store = SelectionStore::new();
        coordinator.bootstrap();
        settle(&mut coordinator, &mut store);

        assert!(matches!(coordinator.point_view(), ViewData::NoData(_)));
        assert!(coordinator.variable_view().ready().is_some());
        assert!(coordinator.quality_view().ready().is_some());
        assert!(coordinator.pcp_view().ready().is_some());
    }

    #[test]
    fn pcp_layout_resets_order_when_the_dimension_set_changes() {
        let (_, mut coordinator, mut store) = ready_coordinator();
        {
            let layout = coordinator.pcp_layout(&store, 300.0, 100.0).unwrap();
            assert_eq!(layout.dimensions(), &["age", "income", "rate"]);
            // Simulate a committed drag.
            layout.set_order(
                ["rate", "age", "income"]
                    .iter()
                    .map(|name| name.to_string())
                    .collect(),
            );
        }
        // Same inputs: the reordering survives.
        let layout = coordinator.pcp_layout(&store, 300.0, 100.0).unwrap();
        assert_eq!(layout.dimensions(), &["rate", "age", "income"]);

        // Selection change: order resets to the selection order.
        store.toggle_variable("income");
        store.toggle_variable("age");
        let layout = coordinator.pcp_layout(&store, 300.0, 100.0).unwrap();
        assert_eq!(layout.dimensions(), &["income", "age"]);
    }

    #[test]
    fn selection_changes_do_not_refetch() {
        let (service, mut coordinator, mut store) = ready_coordinator();
        let before = service.calls().len();
        store.toggle_variable("age");
        coordinator.sync(&mut store);
        store.toggle_variable("income");
        coordinator.sync(&mut store);
        assert_eq!(service.calls().len(), before);
    }
}
