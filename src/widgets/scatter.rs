use egui::{pos2, vec2, Align2, Painter, Pos2, Rect, Response, Sense, Stroke, TextStyle, Ui, Widget};

use crate::data::{DataPoint, VariablePoint};
use crate::layout::labels::{relax, LabelAnchor};
use crate::scale::{LinearScale, OrdinalColors};
use crate::themes::{cluster_stroke, ScatterStyle, Styled};

const Y_AXIS_W: f32 = 40.0;
const TICK_LEN: f32 = 4.0;
const TICK_PAD: f32 = 2.0;

/// Scatter of observations in the 2-D embedding, colored by cluster through
/// the ordinal scale the legend shares.
#[must_use = "You should put this widget in a ui with `ui.add(widget);`"]
pub struct PointScatter<'a> {
    points: &'a [DataPoint],
    colors: &'a OrdinalColors,
    desired_width: Option<f32>,
    plot_height: f32,
    style: Option<ScatterStyle>,
}

impl<'a> PointScatter<'a> {
    pub fn new(points: &'a [DataPoint], colors: &'a OrdinalColors) -> Self {
        Self {
            points,
            colors,
            desired_width: None,
            plot_height: 260.0,
            style: None,
        }
    }

    pub fn desired_width(mut self, desired_width: f32) -> Self {
        self.desired_width = Some(desired_width);
        self
    }

    pub fn plot_height(mut self, plot_height: f32) -> Self {
        self.plot_height = plot_height.max(32.0);
        self
    }
}

impl Styled for PointScatter<'_> {
    type Style = ScatterStyle;

    fn styled(mut self, style: Self::Style) -> Self {
        self.style = Some(style);
        self
    }
}

impl Widget for PointScatter<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let PointScatter {
            points,
            colors,
            desired_width,
            plot_height,
            style,
        } = self;

        let sstyle = style.unwrap_or_else(|| ScatterStyle::from(ui.style().as_ref()));
        let frame = ScatterFrame::allocate(ui, desired_width, plot_height);
        let Some(scales) = frame.scales(
            ui,
            &sstyle,
            points.iter().map(|point| point.x),
            points.iter().map(|point| point.y),
        ) else {
            return frame.response;
        };

        let painter = ui.painter().with_clip_rect(frame.outer_rect);
        for point in points {
            let center = scales.project(point.x, point.y);
            let color = colors
                .lookup(point.cluster)
                .unwrap_or_else(|| cluster_stroke(point.cluster));
            painter.circle_filled(center, sstyle.point_radius, color);
        }

        frame.response
    }
}

/// Scatter of the original variables in the embedding. Clicking a point
/// writes its name into `toggled`; labels are relaxed away from each other
/// with radii taken from the rendered text width; with two or more
/// selections a path traces the selection in insertion order.
#[must_use = "You should put this widget in a ui with `ui.add(widget);`"]
pub struct VariableScatter<'a> {
    variables: &'a [VariablePoint],
    selection: &'a [String],
    toggled: &'a mut Option<String>,
    desired_width: Option<f32>,
    plot_height: f32,
    style: Option<ScatterStyle>,
}

impl<'a> VariableScatter<'a> {
    pub fn new(
        variables: &'a [VariablePoint],
        selection: &'a [String],
        toggled: &'a mut Option<String>,
    ) -> Self {
        Self {
            variables,
            selection,
            toggled,
            desired_width: None,
            plot_height: 260.0,
            style: None,
        }
    }

    pub fn desired_width(mut self, desired_width: f32) -> Self {
        self.desired_width = Some(desired_width);
        self
    }

    pub fn plot_height(mut self, plot_height: f32) -> Self {
        self.plot_height = plot_height.max(32.0);
        self
    }
}

impl Styled for VariableScatter<'_> {
    type Style = ScatterStyle;

    fn styled(mut self, style: Self::Style) -> Self {
        self.style = Some(style);
        self
    }
}

impl Widget for VariableScatter<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let VariableScatter {
            variables,
            selection,
            toggled,
            desired_width,
            plot_height,
            style,
        } = self;

        let sstyle = style.unwrap_or_else(|| ScatterStyle::from(ui.style().as_ref()));
        let frame = ScatterFrame::allocate(ui, desired_width, plot_height);
        let Some(scales) = frame.scales(
            ui,
            &sstyle,
            variables.iter().map(|point| point.x),
            variables.iter().map(|point| point.y),
        ) else {
            return frame.response;
        };

        let painter = ui.painter().with_clip_rect(frame.outer_rect);
        let font_id = TextStyle::Small.resolve(ui.style());

        for point in variables {
            let center = scales.project(point.x, point.y);
            let hit = Rect::from_center_size(center, vec2(12.0, 12.0));
            let id = frame.response.id.with(("variable_point", &point.variable));
            let resp = ui.interact(hit, id, Sense::click());
            if resp.clicked() {
                *toggled = Some(point.variable.clone());
            }

            let selected = selection.iter().any(|name| name == &point.variable);
            let color = if selected {
                sstyle.accent
            } else if resp.hovered() {
                sstyle.accent.gamma_multiply(0.6)
            } else {
                sstyle.mark
            };
            painter.circle_filled(center, sstyle.variable_radius, color);
        }

        // Selection path: through the selected variables in insertion order,
        // with an arrowhead on the final segment.
        if selection.len() > 1 {
            let path: Vec<Pos2> = selection
                .iter()
                .filter_map(|name| {
                    variables
                        .iter()
                        .find(|point| &point.variable == name)
                        .map(|point| scales.project(point.x, point.y))
                })
                .collect();
            if path.len() > 1 {
                let stroke = Stroke::new(2.0, sstyle.accent);
                painter.add(egui::Shape::line(path.clone(), stroke));
                let tip = path[path.len() - 1];
                let from = path[path.len() - 2];
                draw_arrowhead(&painter, from, tip, sstyle.accent);
            }
        }

        // Labels, nudged apart by the relaxation solver. Repulsion radii come
        // from the rendered text width of each label.
        let anchors: Vec<LabelAnchor> = variables
            .iter()
            .map(|point| {
                let at = scales.project(point.x, point.y);
                LabelAnchor {
                    text: point.variable.clone(),
                    x: at.x,
                    y: at.y,
                }
            })
            .collect();
        let placed = ui.fonts_mut(|fonts| {
            let fonts = std::cell::RefCell::new(fonts);
            let metrics = |text: &str| {
                let width = fonts
                    .borrow_mut()
                    .layout_no_wrap(text.to_owned(), font_id.clone(), sstyle.ink)
                    .size()
                    .x;
                (width * 0.5).max(4.0)
            };
            relax(&anchors, &metrics)
        });
        for (point, (x, y)) in variables.iter().zip(placed) {
            painter.text(
                pos2(x + sstyle.variable_radius + 2.0, y),
                Align2::LEFT_CENTER,
                &point.variable,
                font_id.clone(),
                sstyle.ink,
            );
        }

        frame.response
    }
}

fn draw_arrowhead(painter: &Painter, from: Pos2, tip: Pos2, color: egui::Color32) {
    let dir = tip - from;
    let len = dir.length();
    if len <= f32::EPSILON {
        return;
    }
    let dir = dir / len;
    let normal = vec2(-dir.y, dir.x);
    let size = 8.0;
    let base = tip - dir * size;
    painter.add(egui::Shape::convex_polygon(
        vec![tip, base + normal * (size * 0.5), base - normal * (size * 0.5)],
        color,
        Stroke::NONE,
    ));
}

/// Shared frame logic for both scatter modes: allocation, axes, and the
/// projection from data space to the plot area.
struct ScatterFrame {
    outer_rect: Rect,
    plot_area: Rect,
    response: Response,
    label_row_h: f32,
}

struct ScatterScales {
    x: LinearScale,
    y: LinearScale,
}

impl ScatterScales {
    fn project(&self, x: f64, y: f64) -> Pos2 {
        pos2(self.x.scale(x), self.y.scale(y))
    }
}

impl ScatterFrame {
    fn allocate(ui: &mut Ui, desired_width: Option<f32>, plot_height: f32) -> Self {
        let desired_width = desired_width.unwrap_or_else(|| ui.available_width().max(128.0));
        let font_id = TextStyle::Small.resolve(ui.style());
        let text_height = ui.fonts_mut(|fonts| fonts.row_height(&font_id));
        let label_row_h = TICK_LEN + TICK_PAD + text_height;
        let total_h = plot_height + label_row_h;
        let (outer_rect, response) =
            ui.allocate_exact_size(vec2(desired_width, total_h), Sense::hover());
        let plot_rect = Rect::from_min_max(
            pos2(
                (outer_rect.left() + Y_AXIS_W).min(outer_rect.right()),
                outer_rect.top(),
            ),
            pos2(outer_rect.right(), outer_rect.bottom() - label_row_h),
        );
        Self {
            outer_rect,
            plot_area: plot_rect.shrink(6.0),
            response,
            label_row_h,
        }
    }

    /// Build niced scales from the data extents and draw the frame, grid,
    /// and tick labels. `None` when there is nothing to plot or the frame is
    /// off screen.
    fn scales(
        &self,
        ui: &Ui,
        style: &ScatterStyle,
        xs: impl IntoIterator<Item = f64>,
        ys: impl IntoIterator<Item = f64>,
    ) -> Option<ScatterScales> {
        if !ui.is_rect_visible(self.outer_rect) || !self.plot_area.is_positive() {
            return None;
        }
        let x = LinearScale::from_extent(xs, (self.plot_area.left(), self.plot_area.right()))?
            .nice(6);
        let y = LinearScale::from_extent(ys, (self.plot_area.bottom(), self.plot_area.top()))?
            .nice(6);

        let font_id = TextStyle::Small.resolve(ui.style());
        let painter = ui.painter().with_clip_rect(self.outer_rect);
        let plot_rect = Rect::from_min_max(
            pos2(self.outer_rect.left() + Y_AXIS_W, self.outer_rect.top()),
            pos2(
                self.outer_rect.right(),
                self.outer_rect.bottom() - self.label_row_h,
            ),
        );
        painter.rect_stroke(
            plot_rect,
            0.0,
            Stroke::new(1.0, style.outline),
            egui::StrokeKind::Inside,
        );

        for tick in y.ticks(5) {
            let tick_y = y.scale(tick);
            painter.line_segment(
                [
                    pos2(self.plot_area.left(), tick_y),
                    pos2(self.plot_area.right(), tick_y),
                ],
                Stroke::new(1.0, style.grid),
            );
            painter.text(
                pos2(plot_rect.left() - 4.0, tick_y),
                Align2::RIGHT_CENTER,
                format_tick(tick),
                font_id.clone(),
                style.ink,
            );
        }
        for tick in x.ticks(6) {
            let tick_x = x.scale(tick);
            painter.line_segment(
                [
                    pos2(tick_x, plot_rect.bottom()),
                    pos2(tick_x, plot_rect.bottom() + TICK_LEN),
                ],
                Stroke::new(1.0, style.outline),
            );
            painter.text(
                pos2(tick_x, plot_rect.bottom() + TICK_LEN + TICK_PAD),
                Align2::CENTER_TOP,
                format_tick(tick),
                font_id.clone(),
                style.ink,
            );
        }

        Some(ScatterScales { x, y })
    }
}

fn format_tick(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e6 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
