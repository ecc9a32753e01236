/// Per-widget style override API. Widgets derive their style from the
/// global `egui::Style` unless one is supplied explicitly.
pub trait Styled {
    type Style: Clone;
    fn styled(self, style: Self::Style) -> Self;
}
