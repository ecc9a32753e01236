use std::collections::BTreeMap;

use crate::data::PcpRecord;
use crate::scale::LinearScale;

/// Which side of the plot a dimension's axis title sits on. Alternation is
/// by positional index in the current order, so a drag that shifts a
/// dimension's index flips its title side even if the dimension itself never
/// moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TitleSide {
    Above,
    Below,
}

pub fn title_side(rank: usize) -> TitleSide {
    if rank % 2 == 0 {
        TitleSide::Above
    } else {
        TitleSide::Below
    }
}

/// Fixed horizontal slot positions for `count` axes across `width`: slot `i`
/// at `i * width / (count - 1)`. One dimension degenerates to a single
/// centered slot rather than dividing by zero.
pub fn slots(count: usize, width: f32) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![width * 0.5],
        _ => (0..count)
            .map(|i| i as f32 * width / (count - 1) as f32)
            .collect(),
    }
}

/// The parallel-coordinates layout: the dimension order, the fixed slots the
/// order maps onto, and a value scale per dimension. The committed state
/// always has the dimension at rank `i` sitting on slot `i`; only an active
/// drag floats one dimension off its slot.
#[derive(Clone, Debug)]
pub struct PcpLayout {
    dimensions: Vec<String>,
    slots: Vec<f32>,
    scales: BTreeMap<String, LinearScale>,
    width: f32,
    height: f32,
}

impl PcpLayout {
    /// Build a layout for `dimensions` over `records`. Each dimension's
    /// scale maps its value extent onto `[height, 0]` (larger values plot
    /// higher). Dimensions with no finite value in any record get no scale
    /// and contribute no vertices.
    pub fn compute(
        records: &[PcpRecord],
        dimensions: Vec<String>,
        width: f32,
        height: f32,
    ) -> Self {
        let scales = dimensions
            .iter()
            .filter_map(|dimension| {
                LinearScale::from_extent(
                    records
                        .iter()
                        .filter_map(|record| record.value(dimension)),
                    (height, 0.0),
                )
                .map(|scale| (dimension.clone(), scale))
            })
            .collect();
        let slots = slots(dimensions.len(), width);
        Self {
            dimensions,
            slots,
            scales,
            width,
            height,
        }
    }

    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    pub fn slots(&self) -> &[f32] {
        &self.slots
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn value_scale(&self, dimension: &str) -> Option<&LinearScale> {
        self.scales.get(dimension)
    }

    pub fn rank_of(&self, dimension: &str) -> Option<usize> {
        self.dimensions.iter().position(|name| name == dimension)
    }

    /// The committed x position of the dimension at `rank`.
    pub fn slot_x(&self, rank: usize) -> f32 {
        self.slots[rank]
    }

    /// Replace the dimension order. Slots are untouched: the new order is a
    /// permutation over the same fixed positions.
    pub fn set_order(&mut self, order: Vec<String>) {
        debug_assert_eq!(order.len(), self.dimensions.len());
        self.dimensions = order;
    }

    /// Resize the plot. Slot positions and scale ranges follow the new
    /// extents; the dimension order is preserved.
    pub fn resize(&mut self, records: &[PcpRecord], width: f32, height: f32) {
        *self = Self::compute(
            records,
            std::mem::take(&mut self.dimensions),
            width,
            height,
        );
    }

    /// Polyline vertices for one record, one per dimension in order, with
    /// the x of rank `i` supplied by `x_at`. A dimension absent on this
    /// record (or without a scale) is skipped outright: the polyline gets
    /// shorter, it never interpolates through the hole or invents a zero.
    pub fn path_with_x(
        &self,
        record: &PcpRecord,
        mut x_at: impl FnMut(usize, &str) -> f32,
    ) -> Vec<(f32, f32)> {
        self.dimensions
            .iter()
            .enumerate()
            .filter_map(|(rank, dimension)| {
                let value = record.value(dimension)?;
                let scale = self.scales.get(dimension)?;
                Some((x_at(rank, dimension), scale.scale(value)))
            })
            .collect()
    }

    /// Polyline vertices with every dimension on its committed slot.
    pub fn path_for(&self, record: &PcpRecord) -> Vec<(f32, f32)> {
        self.path_with_x(record, |rank, _| self.slots[rank])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cluster: i64, pairs: &[(&str, f64)]) -> PcpRecord {
        PcpRecord {
            cluster,
            values: pairs
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        }
    }

    fn dims(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn slots_are_evenly_spaced() {
        assert_eq!(slots(3, 100.0), vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn single_dimension_gets_a_centered_slot() {
        assert_eq!(slots(1, 100.0), vec![50.0]);
        assert!(slots(0, 100.0).is_empty());
    }

    #[test]
    fn slots_are_idempotent_and_order_free() {
        // Only the dimension count matters; permuting the order never moves
        // the fixed positions.
        let records = vec![
            record(0, &[("a", 0.0), ("b", 1.0), ("c", 2.0)]),
            record(1, &[("a", 3.0), ("b", 4.0), ("c", 5.0)]),
        ];
        let forward = PcpLayout::compute(&records, dims(&["a", "b", "c"]), 200.0, 100.0);
        let backward = PcpLayout::compute(&records, dims(&["c", "b", "a"]), 200.0, 100.0);
        assert_eq!(forward.slots(), backward.slots());
        assert_eq!(forward.slots(), slots(3, 200.0).as_slice());
    }

    #[test]
    fn value_scales_invert_the_vertical_axis() {
        let records = vec![record(0, &[("a", 0.0)]), record(1, &[("a", 10.0)])];
        let layout = PcpLayout::compute(&records, dims(&["a"]), 100.0, 80.0);
        let scale = layout.value_scale("a").unwrap();
        assert_eq!(scale.scale(0.0), 80.0);
        assert_eq!(scale.scale(10.0), 0.0);
    }

    #[test]
    fn missing_dimension_shortens_the_path() {
        let records = vec![
            record(0, &[("a", 0.0), ("b", 0.0), ("c", 0.0)]),
            record(0, &[("a", 1.0), ("c", 1.0)]),
            record(0, &[("a", 2.0), ("b", 2.0), ("c", 2.0)]),
        ];
        let layout = PcpLayout::compute(&records, dims(&["a", "b", "c"]), 200.0, 100.0);
        let complete = layout.path_for(&records[0]);
        let holed = layout.path_for(&records[1]);
        assert_eq!(complete.len(), 3);
        assert_eq!(holed.len(), 2);
        // The surviving vertices sit on their own slots; nothing was
        // interpolated into the gap.
        assert_eq!(holed[0].0, layout.slot_x(0));
        assert_eq!(holed[1].0, layout.slot_x(2));
    }

    #[test]
    fn title_sides_alternate_by_rank() {
        assert_eq!(title_side(0), TitleSide::Above);
        assert_eq!(title_side(1), TitleSide::Below);
        assert_eq!(title_side(2), TitleSide::Above);
    }
}
