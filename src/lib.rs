pub mod coordinator;
pub mod data;
pub mod dataflow;
pub mod layout;
pub mod scale;
pub mod service;
pub mod store;
pub mod themes;
pub mod widgets;

use std::sync::Arc;

use eframe::egui::{self, vec2};

pub use crate::coordinator::{ViewCoordinator, ViewData};
pub use crate::service::{DataService, Endpoint, FixtureService, ServiceError};
pub use crate::store::SelectionStore;
use crate::widgets::{ClusterLegend, ParallelCoords, PointScatter, QualityBars, VariableScatter};

const CONTENT_WIDTH: f32 = 1160.0;

/// The linked-views application: the selection store, the coordinator, and
/// one vertical stack of views. Widgets report clicks through plain message
/// values; the store is mutated here, after drawing, so every handler runs
/// to completion before anything observes the change.
pub struct Explorer {
    store: SelectionStore,
    coordinator: ViewCoordinator,
}

impl Explorer {
    pub fn new(service: Arc<dyn DataService>) -> Self {
        let mut coordinator = ViewCoordinator::new(service);
        coordinator.bootstrap();
        Self {
            store: SelectionStore::new(),
            coordinator,
        }
    }

    pub fn run(self, name: &str) -> eframe::Result {
        let mut native_options = eframe::NativeOptions::default();
        native_options.persist_window = true;

        eframe::run_native(
            name,
            native_options,
            Box::new(|cc| {
                let ctx = cc.egui_ctx.clone();
                ctrlc::set_handler(move || ctx.send_viewport_cmd(egui::ViewportCommand::Close))
                    .expect("failed to set exit signal handler");
                Ok(Box::new(self))
            }),
        )
    }
}

impl eframe::App for Explorer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply arrived responses and react to last pass's store mutations
        // before anything draws.
        if self.coordinator.sync(&mut self.store) {
            ctx.request_repaint();
        }

        let mut picked: Option<u32> = None;
        let mut toggled: Option<String> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink(false)
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.set_max_width(CONTENT_WIDTH);

                        ui.heading("Clustering quality");
                        match self.coordinator.quality_view() {
                            ViewData::Loading => loading_row(ui),
                            ViewData::NoData(reason) => no_data_row(ui, &reason),
                            ViewData::Ready(samples) => {
                                ui.add(
                                    QualityBars::new(samples, &mut picked)
                                        .active(self.store.cluster_count()),
                                );
                            }
                        }
                        ui.separator();

                        ui.heading("Observations");
                        match self.coordinator.point_view() {
                            ViewData::Loading => loading_row(ui),
                            ViewData::NoData(reason) => no_data_row(ui, &reason),
                            ViewData::Ready(points) => {
                                ui.horizontal_top(|ui| {
                                    let legend_w = 120.0;
                                    let plot_w =
                                        (ui.available_width() - legend_w).max(128.0);
                                    ui.add(
                                        PointScatter::new(
                                            points,
                                            self.coordinator.point_colors(),
                                        )
                                        .desired_width(plot_w),
                                    );
                                    ui.add(ClusterLegend::new(
                                        self.coordinator.point_colors(),
                                    ));
                                });
                            }
                        }
                        ui.separator();

                        ui.heading("Variables");
                        match self.coordinator.variable_view() {
                            ViewData::Loading => loading_row(ui),
                            ViewData::NoData(reason) => no_data_row(ui, &reason),
                            ViewData::Ready(variables) => {
                                ui.add(VariableScatter::new(
                                    variables,
                                    self.store.selection(),
                                    &mut toggled,
                                ));
                            }
                        }
                        ui.separator();

                        ui.heading("Parallel coordinates");
                        match self.coordinator.pcp_view() {
                            ViewData::Loading => loading_row(ui),
                            ViewData::NoData(reason) => no_data_row(ui, &reason),
                            ViewData::Ready(_) => {}
                        }
                        let outer = vec2(ui.available_width().max(128.0), 400.0);
                        let (plot_w, plot_h) = widgets::pcp::inner_size(outer);
                        if let Some((layout, drag, records)) =
                            self.coordinator.pcp_parts(&self.store, plot_w, plot_h)
                        {
                            ui.add(ParallelCoords::new(layout, drag, records));
                        }
                    });
                });
        });

        // Route the widgets' messages into the store; the coordinator picks
        // the change up on the next pass.
        if let Some(clusters) = picked {
            self.store.set_cluster_count(Some(clusters));
            ctx.request_repaint();
        }
        if let Some(variable) = toggled {
            self.store.toggle_variable(&variable);
            ctx.request_repaint();
        }
    }
}

fn loading_row(ui: &mut egui::Ui) {
    ui.add(egui::widgets::Spinner::new());
}

fn no_data_row(ui: &mut egui::Ui, reason: &str) {
    ui.weak(format!("no data ({reason})"));
}
