use egui::{pos2, vec2, Align2, Rect, Response, Sense, TextStyle, Ui, Widget};

use crate::scale::OrdinalColors;
use crate::themes::{LegendStyle, Styled};

/// One row per entry of the scatter color scale's current domain, in the
/// order the domain grew.
#[must_use = "You should put this widget in a ui with `ui.add(widget);`"]
pub struct ClusterLegend<'a> {
    colors: &'a OrdinalColors,
    style: Option<LegendStyle>,
}

impl<'a> ClusterLegend<'a> {
    pub fn new(colors: &'a OrdinalColors) -> Self {
        Self {
            colors,
            style: None,
        }
    }
}

impl Styled for ClusterLegend<'_> {
    type Style = LegendStyle;

    fn styled(mut self, style: Self::Style) -> Self {
        self.style = Some(style);
        self
    }
}

impl Widget for ClusterLegend<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let ClusterLegend { colors, style } = self;
        let lstyle = style.unwrap_or_else(|| LegendStyle::from(ui.style().as_ref()));
        let font_id = TextStyle::Small.resolve(ui.style());
        let row_h = ui
            .fonts_mut(|fonts| fonts.row_height(&font_id))
            .max(lstyle.swatch_size)
            + 4.0;

        let rows = colors.domain().len();
        let width = 110.0f32;
        let (outer_rect, response) =
            ui.allocate_exact_size(vec2(width, row_h * rows.max(1) as f32), Sense::hover());
        if !ui.is_rect_visible(outer_rect) || rows == 0 {
            return response;
        }

        let painter = ui.painter().with_clip_rect(outer_rect);
        for (row, cluster) in colors.domain().to_vec().into_iter().enumerate() {
            let top = outer_rect.top() + row as f32 * row_h;
            let swatch = Rect::from_min_size(
                pos2(outer_rect.left(), top + (row_h - lstyle.swatch_size) * 0.5),
                vec2(lstyle.swatch_size, lstyle.swatch_size),
            );
            if let Some(color) = colors.lookup(cluster) {
                painter.rect_filled(swatch, 0.0, color);
            }
            painter.text(
                pos2(swatch.right() + 6.0, top + row_h * 0.5),
                Align2::LEFT_CENTER,
                format!("Cluster {cluster}"),
                font_id.clone(),
                lstyle.ink,
            );
        }

        response
    }
}
