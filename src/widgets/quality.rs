use egui::{pos2, vec2, Align2, Rect, Response, Sense, Stroke, TextStyle, Ui, Widget};

use crate::data::QualitySample;
use crate::scale::LinearScale;
use crate::themes::{blend, QualityStyle, Styled};

/// Bar chart of clustering quality (MSE) per candidate cluster count.
/// Clicking a bar writes that count into `picked`; the caller routes it to
/// the selection store. The service makes no ordering promise, so bars are
/// sorted by cluster count for display.
#[must_use = "You should put this widget in a ui with `ui.add(widget);`"]
pub struct QualityBars<'a> {
    samples: &'a [QualitySample],
    active: Option<u32>,
    picked: &'a mut Option<u32>,
    desired_width: Option<f32>,
    plot_height: f32,
    style: Option<QualityStyle>,
}

impl<'a> QualityBars<'a> {
    pub fn new(samples: &'a [QualitySample], picked: &'a mut Option<u32>) -> Self {
        Self {
            samples,
            active: None,
            picked,
            desired_width: None,
            plot_height: 120.0,
            style: None,
        }
    }

    /// Highlight the currently active cluster count.
    pub fn active(mut self, active: Option<u32>) -> Self {
        self.active = active;
        self
    }

    pub fn desired_width(mut self, desired_width: f32) -> Self {
        self.desired_width = Some(desired_width);
        self
    }

    pub fn plot_height(mut self, plot_height: f32) -> Self {
        self.plot_height = plot_height.max(16.0);
        self
    }
}

impl Styled for QualityBars<'_> {
    type Style = QualityStyle;

    fn styled(mut self, style: Self::Style) -> Self {
        self.style = Some(style);
        self
    }
}

impl Widget for QualityBars<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let QualityBars {
            samples,
            active,
            picked,
            desired_width,
            plot_height,
            style,
        } = self;

        let qstyle = style.unwrap_or_else(|| QualityStyle::from(ui.style().as_ref()));
        let desired_width = desired_width.unwrap_or_else(|| ui.available_width().max(128.0));
        let font_id = TextStyle::Small.resolve(ui.style());
        let tick_len = 4.0;
        let tick_pad = 2.0;
        let text_height = ui.fonts_mut(|fonts| fonts.row_height(&font_id));
        let label_row_h = tick_len + tick_pad + text_height;

        let total_h = plot_height + label_row_h;
        let (outer_rect, response) =
            ui.allocate_exact_size(vec2(desired_width, total_h), Sense::hover());
        if !ui.is_rect_visible(outer_rect) {
            return response;
        }

        let mut ordered: Vec<QualitySample> = samples.to_vec();
        ordered.sort_by_key(|sample| sample.clusters);

        let stroke = Stroke::new(1.0, qstyle.outline);
        let y_axis_w = 34.0;

        let plot_rect = Rect::from_min_max(
            pos2(
                (outer_rect.left() + y_axis_w).min(outer_rect.right()),
                outer_rect.top(),
            ),
            pos2(outer_rect.right(), outer_rect.bottom() - label_row_h),
        );
        let plot_area = plot_rect.shrink(4.0);

        let painter = ui.painter().with_clip_rect(outer_rect);
        painter.rect_stroke(plot_rect, 0.0, stroke, egui::StrokeKind::Inside);

        let max_mse = ordered.iter().map(|sample| sample.mse).fold(0.0, f64::max);
        let scale =
            LinearScale::new((0.0, max_mse), (plot_area.bottom(), plot_area.top())).nice(4);

        for tick in scale.ticks(4) {
            let y = scale.scale(tick);
            painter.line_segment(
                [pos2(plot_area.left(), y), pos2(plot_area.right(), y)],
                Stroke::new(1.0, qstyle.grid),
            );
            painter.text(
                pos2(plot_rect.left() - 4.0, y),
                Align2::RIGHT_CENTER,
                format_tick(tick),
                font_id.clone(),
                qstyle.ink,
            );
        }

        let bar_count = ordered.len();
        if bar_count == 0 || !plot_area.is_positive() {
            return response;
        }

        let gap = 2.0;
        let bar_w = ((plot_area.width() - gap * (bar_count.saturating_sub(1) as f32))
            / bar_count as f32)
            .max(1.0);

        for (i, sample) in ordered.iter().enumerate() {
            let top = scale.scale(sample.mse).min(plot_area.bottom() - 1.0);
            let x0 = plot_area.left() + i as f32 * (bar_w + gap);
            let x1 = (x0 + bar_w).min(plot_area.right());
            let bar_rect = Rect::from_min_max(pos2(x0, top), pos2(x1, plot_area.bottom()));

            let id = response.id.with(("quality_bar", sample.clusters));
            let resp = ui.interact(bar_rect, id, Sense::click());
            if resp.clicked() {
                *picked = Some(sample.clusters);
            }

            let is_active = active == Some(sample.clusters);
            let fill = if is_active {
                blend(qstyle.fill, qstyle.accent, 0.5)
            } else {
                qstyle.fill
            };
            let stroke_color = if resp.hovered() || is_active {
                qstyle.accent
            } else {
                qstyle.outline
            };
            painter.rect_filled(bar_rect, 0.0, fill);
            painter.rect_stroke(
                bar_rect,
                0.0,
                Stroke::new(1.0, stroke_color),
                egui::StrokeKind::Inside,
            );

            let _ = resp.on_hover_text(format!(
                "{} clusters, MSE {:.2}",
                sample.clusters, sample.mse
            ));

            let tick_top = plot_rect.bottom();
            let x_center = x0 + bar_w * 0.5;
            painter.line_segment(
                [pos2(x_center, tick_top), pos2(x_center, tick_top + tick_len)],
                Stroke::new(1.0, qstyle.outline),
            );
            painter.text(
                pos2(x_center, tick_top + tick_len + tick_pad),
                Align2::CENTER_TOP,
                sample.clusters.to_string(),
                font_id.clone(),
                qstyle.ink,
            );
        }

        response
    }
}

fn format_tick(value: f64) -> String {
    if value == value.trunc() {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
