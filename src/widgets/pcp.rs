use egui::{pos2, vec2, Align2, Pos2, Rect, Response, Sense, Stroke, TextStyle, Ui, Vec2, Widget};

use crate::data::PcpRecord;
use crate::layout::pcp::{title_side, PcpLayout, TitleSide};
use crate::layout::reorder::AxisDrag;
use crate::themes::{cluster_stroke, PcpStyle, Styled};

/// Horizontal room for value tick labels on the outer axes.
pub const H_MARGIN: f32 = 36.0;
/// Vertical room for the alternating axis titles, above and below.
pub const V_MARGIN: f32 = 26.0;

/// The inner plot size a layout should be computed with, given the outer
/// space the widget will be handed.
pub fn inner_size(outer: Vec2) -> (f32, f32) {
    (
        (outer.x - 2.0 * H_MARGIN).max(1.0),
        (outer.y - 2.0 * V_MARGIN).max(1.0),
    )
}

/// Parallel-coordinates plot: one vertical axis per dimension on its slot,
/// one polyline per record, colored through the cyclic cluster palette.
/// Dragging an axis reorders dimensions live through the reorder controller
/// and snaps on release; axis titles alternate above/below by rank.
#[must_use = "You should put this widget in a ui with `ui.add(widget);`"]
pub struct ParallelCoords<'a> {
    layout: &'a mut PcpLayout,
    drag: &'a mut AxisDrag,
    records: &'a [PcpRecord],
    style: Option<PcpStyle>,
}

impl<'a> ParallelCoords<'a> {
    pub fn new(
        layout: &'a mut PcpLayout,
        drag: &'a mut AxisDrag,
        records: &'a [PcpRecord],
    ) -> Self {
        Self {
            layout,
            drag,
            records,
            style: None,
        }
    }
}

impl Styled for ParallelCoords<'_> {
    type Style = PcpStyle;

    fn styled(mut self, style: Self::Style) -> Self {
        self.style = Some(style);
        self
    }
}

impl Widget for ParallelCoords<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let ParallelCoords {
            layout,
            drag,
            records,
            style,
        } = self;

        let pstyle = style.unwrap_or_else(|| PcpStyle::from(ui.style().as_ref()));
        let outer = vec2(
            layout.width() + 2.0 * H_MARGIN,
            layout.height() + 2.0 * V_MARGIN,
        );
        let (outer_rect, response) = ui.allocate_exact_size(outer, Sense::hover());
        if !ui.is_rect_visible(outer_rect) {
            return response;
        }
        let origin = outer_rect.left_top() + vec2(H_MARGIN, V_MARGIN);

        // Axis drag handling comes first so this frame already draws the
        // reordered state the pointer produced.
        let dimensions: Vec<String> = layout.dimensions().to_vec();
        for dimension in &dimensions {
            let Some(rank) = layout.rank_of(dimension) else {
                continue;
            };
            let x = origin.x + drag.effective_x(layout, rank, dimension);
            let handle = Rect::from_center_size(
                pos2(x, origin.y + layout.height() * 0.5),
                vec2(12.0, layout.height()),
            );
            let id = response.id.with(("pcp_axis", dimension));
            let resp = ui.interact(handle, id, Sense::drag());
            if resp.drag_started() {
                drag.start(layout, dimension);
            }
            if resp.dragged() && drag.dragging() == Some(dimension.as_str()) {
                if let Some(pointer) = resp.interact_pointer_pos() {
                    drag.motion(layout, pointer.x - origin.x);
                }
            }
            if resp.drag_stopped() && drag.dragging() == Some(dimension.as_str()) {
                drag.release();
            }
        }

        let painter = ui.painter().with_clip_rect(outer_rect);
        let font_id = TextStyle::Small.resolve(ui.style());

        let line_stroke_width = pstyle.line_width;
        for record in records {
            let path: Vec<Pos2> = layout
                .path_with_x(record, |rank, dimension| {
                    drag.effective_x(layout, rank, dimension)
                })
                .into_iter()
                .map(|(x, y)| pos2(origin.x + x, origin.y + y))
                .collect();
            if path.len() < 2 {
                continue;
            }
            let color = cluster_stroke(record.cluster).gamma_multiply(pstyle.line_opacity);
            painter.add(egui::Shape::line(
                path,
                Stroke::new(line_stroke_width, color),
            ));
        }

        for (rank, dimension) in layout.dimensions().iter().enumerate() {
            let x = origin.x + drag.effective_x(layout, rank, dimension);
            let is_dragged = drag.dragging() == Some(dimension.as_str());
            let axis_color = if is_dragged {
                pstyle.accent
            } else {
                pstyle.ink
            };
            painter.line_segment(
                [pos2(x, origin.y), pos2(x, origin.y + layout.height())],
                Stroke::new(pstyle.axis_width, axis_color),
            );

            if let Some(scale) = layout.value_scale(dimension) {
                for tick in scale.ticks(4) {
                    let y = origin.y + scale.scale(tick);
                    painter.line_segment(
                        [pos2(x - 3.0, y), pos2(x, y)],
                        Stroke::new(1.0, pstyle.outline),
                    );
                    painter.text(
                        pos2(x - 5.0, y),
                        Align2::RIGHT_CENTER,
                        format_tick(tick),
                        font_id.clone(),
                        pstyle.outline,
                    );
                }
            }

            // Titles alternate by positional index, so a drag that shifts a
            // dimension's rank flips its side.
            let (title_y, align) = match title_side(rank) {
                TitleSide::Above => (origin.y - 8.0, Align2::CENTER_BOTTOM),
                TitleSide::Below => (origin.y + layout.height() + 8.0, Align2::CENTER_TOP),
            };
            painter.text(pos2(x, title_y), align, dimension, font_id.clone(), pstyle.ink);
        }

        response
    }
}

fn format_tick(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e6 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
