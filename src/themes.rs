use egui::{Color32, Style};

mod style;
pub use style::Styled;

/// The fixed, deterministic cluster palette. Ten entries, cycled.
///
/// The PCP strokes records straight through `cluster_stroke` (plain modular
/// indexing), while the scatter and legend go through an ordinal scale with
/// a first-seen domain. The two assignments agree while cluster ids stay
/// below the palette length and are allowed to disagree past it; see
/// `scale::OrdinalColors`.
pub const CLUSTER_PALETTE: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
];

/// PCP stroke assignment: `palette[cluster mod len]`.
pub fn cluster_stroke(cluster: i64) -> Color32 {
    CLUSTER_PALETTE[cluster.rem_euclid(CLUSTER_PALETTE.len() as i64) as usize]
}

// Color utilities: simple sRGB linear interpolation for quick palette derivation
pub fn blend(a: Color32, b: Color32, t: f32) -> Color32 {
    let r = (a.r() as f32 * (1.0 - t) + b.r() as f32 * t).round() as u8;
    let g = (a.g() as f32 * (1.0 - t) + b.g() as f32 * t).round() as u8;
    let bch = (a.b() as f32 * (1.0 - t) + b.b() as f32 * t).round() as u8;
    Color32::from_rgb(r, g, bch)
}

/// Semantic style for the embedding scatter views.
#[derive(Clone, Debug)]
pub struct ScatterStyle {
    pub ink: Color32,
    pub outline: Color32,
    pub grid: Color32,
    pub accent: Color32,
    pub mark: Color32,
    pub point_radius: f32,
    pub variable_radius: f32,
}

impl From<&Style> for ScatterStyle {
    fn from(style: &Style) -> Self {
        let visuals = &style.visuals;
        Self {
            ink: visuals.text_color(),
            outline: visuals.widgets.noninteractive.bg_stroke.color,
            grid: blend(
                visuals.widgets.noninteractive.bg_stroke.color,
                visuals.panel_fill,
                0.6,
            ),
            accent: visuals.selection.stroke.color,
            mark: visuals.text_color(),
            point_radius: 2.5,
            variable_radius: 4.0,
        }
    }
}

/// Semantic style for the parallel-coordinates view.
#[derive(Clone, Debug)]
pub struct PcpStyle {
    pub ink: Color32,
    pub outline: Color32,
    pub accent: Color32,
    pub axis_width: f32,
    pub line_width: f32,
    pub line_opacity: f32,
}

impl From<&Style> for PcpStyle {
    fn from(style: &Style) -> Self {
        let visuals = &style.visuals;
        Self {
            ink: visuals.text_color(),
            outline: visuals.widgets.noninteractive.bg_stroke.color,
            accent: visuals.selection.stroke.color,
            axis_width: 2.0,
            line_width: 1.0,
            line_opacity: 0.5,
        }
    }
}

/// Semantic style for the clustering-quality bar chart.
#[derive(Clone, Debug)]
pub struct QualityStyle {
    pub ink: Color32,
    pub outline: Color32,
    pub grid: Color32,
    pub accent: Color32,
    pub fill: Color32,
}

impl From<&Style> for QualityStyle {
    fn from(style: &Style) -> Self {
        let visuals = &style.visuals;
        Self {
            ink: visuals.text_color(),
            outline: visuals.widgets.noninteractive.bg_stroke.color,
            grid: blend(
                visuals.widgets.noninteractive.bg_stroke.color,
                visuals.panel_fill,
                0.6,
            ),
            accent: visuals.selection.stroke.color,
            fill: blend(visuals.text_color(), visuals.panel_fill, 0.75),
        }
    }
}

/// Semantic style for the cluster legend.
#[derive(Clone, Debug)]
pub struct LegendStyle {
    pub ink: Color32,
    pub swatch_size: f32,
}

impl From<&Style> for LegendStyle {
    fn from(style: &Style) -> Self {
        Self {
            ink: style.visuals.text_color(),
            swatch_size: 12.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_stroke_cycles_past_the_palette() {
        assert_eq!(cluster_stroke(0), CLUSTER_PALETTE[0]);
        assert_eq!(cluster_stroke(9), CLUSTER_PALETTE[9]);
        assert_eq!(cluster_stroke(10), CLUSTER_PALETTE[0]);
        assert_eq!(cluster_stroke(23), CLUSTER_PALETTE[3]);
    }

    #[test]
    fn blend_endpoints_are_exact() {
        let a = Color32::from_rgb(10, 20, 30);
        let b = Color32::from_rgb(200, 100, 0);
        assert_eq!(blend(a, b, 0.0), a);
        assert_eq!(blend(a, b, 1.0), b);
    }
}
