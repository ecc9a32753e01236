use std::cmp::Ordering;

use log::debug;

use crate::layout::pcp::PcpLayout;

/// Index of the slot nearest to `x` by absolute distance. Ties go to the
/// first slot in ascending slot order: the comparison is strict, so an
/// equidistant later slot never displaces an earlier one.
pub fn nearest_slot(slots: &[f32], x: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, slot) in slots.iter().enumerate() {
        let distance = (slot - x).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

#[derive(Clone, Debug)]
struct ActiveDrag {
    dimension: String,
    /// The committed slot the drag started from.
    anchor: f32,
    /// The slot position the dimension currently snaps to.
    provisional: f32,
}

/// The axis drag-reorder state machine: `Idle -> Dragging -> Idle`. All
/// mutations of the dimension order go through the layout it is handed;
/// slots themselves are never recomputed here, only their contents permuted.
///
/// Pointer capture already serializes drags at the input layer, but a second
/// `start` before `release` is still rejected as an illegal transition.
#[derive(Clone, Debug, Default)]
pub struct AxisDrag {
    active: Option<ActiveDrag>,
}

impl AxisDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dragging(&self) -> Option<&str> {
        self.active.as_ref().map(|drag| drag.dimension.as_str())
    }

    /// Begin dragging `dimension`, anchored at its committed slot. Returns
    /// false (and changes nothing) if a drag is already active or the
    /// dimension is not in the layout.
    pub fn start(&mut self, layout: &PcpLayout, dimension: &str) -> bool {
        if self.active.is_some() {
            debug!("rejecting drag start on {dimension:?}: a drag is already active");
            return false;
        }
        let Some(rank) = layout.rank_of(dimension) else {
            return false;
        };
        let anchor = layout.slot_x(rank);
        self.active = Some(ActiveDrag {
            dimension: dimension.to_owned(),
            anchor,
            provisional: anchor,
        });
        true
    }

    /// Track the pointer: snap the dragged dimension to the nearest slot and
    /// re-derive the dimension order by sorting every dimension on its
    /// current effective slot (provisional for the dragged one, committed
    /// for the rest). Returns true when the order changed, which obliges the
    /// caller to recompute paths and axis positions, but never slots.
    pub fn motion(&mut self, layout: &mut PcpLayout, pointer_x: f32) -> bool {
        let Some(drag) = self.active.as_mut() else {
            return false;
        };
        let Some(snap) = nearest_slot(layout.slots(), pointer_x) else {
            return false;
        };
        drag.provisional = layout.slots()[snap];

        // Snapping puts the dragged dimension exactly on another's slot, so
        // the sort needs a tie rule: the dragged dimension takes the slot it
        // snapped to, and the occupant shifts toward the vacated side. A
        // drag arriving from the left sorts after the tied occupant, one
        // arriving from the right sorts before it.
        let drag_bias = if drag.anchor < drag.provisional { 1 } else { -1 };
        let mut ranked: Vec<(f32, i8, String)> = layout
            .dimensions()
            .iter()
            .enumerate()
            .map(|(rank, dimension)| {
                if *dimension == drag.dimension {
                    (drag.provisional, drag_bias, dimension.clone())
                } else {
                    (layout.slot_x(rank), 0, dimension.clone())
                }
            })
            .collect();
        ranked.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });
        let order: Vec<String> = ranked
            .into_iter()
            .map(|(_, _, dimension)| dimension)
            .collect();

        if order == layout.dimensions() {
            return false;
        }
        layout.set_order(order);
        true
    }

    /// The x to draw the dimension at `rank` this frame: the provisional
    /// position for the dimension under drag, the committed slot otherwise.
    pub fn effective_x(&self, layout: &PcpLayout, rank: usize, dimension: &str) -> f32 {
        match &self.active {
            Some(drag) if drag.dimension == dimension => drag.provisional,
            _ => layout.slot_x(rank),
        }
    }

    /// Commit the provisional slot and return to idle. The committed order
    /// is already in the layout, so the dimension simply lands on the slot
    /// of its final rank; axis titles re-alternate off that rank.
    pub fn release(&mut self) -> Option<String> {
        let drag = self.active.take()?;
        debug!(
            "committed drag of {:?} from slot x {} to {}",
            drag.dimension, drag.anchor, drag.provisional
        );
        Some(drag.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PcpRecord;
    use crate::layout::pcp::{title_side, TitleSide};

    fn record(pairs: &[(&str, f64)]) -> PcpRecord {
        PcpRecord {
            cluster: 0,
            values: pairs
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        }
    }

    fn layout(names: &[&str]) -> PcpLayout {
        let pairs: Vec<(&str, f64)> = names.iter().map(|name| (*name, 1.0)).collect();
        let records = vec![record(&pairs)];
        PcpLayout::compute(
            &records,
            names.iter().map(|name| name.to_string()).collect(),
            300.0,
            100.0,
        )
    }

    #[test]
    fn nearest_slot_breaks_ties_toward_the_first() {
        let slots = [0.0, 100.0];
        assert_eq!(nearest_slot(&slots, 50.0), Some(0));
        assert_eq!(nearest_slot(&slots, 51.0), Some(1));
        assert_eq!(nearest_slot(&[], 50.0), None);
    }

    #[test]
    fn dragging_past_a_neighbor_swaps_the_order() {
        let mut layout = layout(&["age", "income"]);
        let mut drag = AxisDrag::new();
        assert!(drag.start(&layout, "income"));
        // "income" starts at rank 1; pull it over "age"'s slot.
        assert!(drag.motion(&mut layout, 10.0));
        assert_eq!(layout.dimensions(), &["income", "age"]);
        drag.release();
        // Its title flips from the odd side to the even side with the rank.
        assert_eq!(title_side(layout.rank_of("income").unwrap()), TitleSide::Above);
        assert_eq!(title_side(layout.rank_of("age").unwrap()), TitleSide::Below);
    }

    #[test]
    fn pointer_nearest_slot_i_lands_the_dimension_at_rank_i() {
        let mut layout = layout(&["a", "b", "c", "d"]);
        let mut drag = AxisDrag::new();
        assert!(drag.start(&layout, "a"));
        // Slot 2 of four slots over width 300 sits at x = 200.
        assert!(drag.motion(&mut layout, 195.0));
        drag.release();
        assert_eq!(layout.rank_of("a"), Some(2));
        assert_eq!(layout.dimensions(), &["b", "c", "a", "d"]);
    }

    #[test]
    fn second_start_is_rejected_while_dragging() {
        let mut layout = layout(&["a", "b"]);
        let mut drag = AxisDrag::new();
        assert!(drag.start(&layout, "a"));
        assert!(!drag.start(&layout, "b"));
        assert_eq!(drag.dragging(), Some("a"));
    }

    #[test]
    fn motion_without_order_change_reports_false() {
        let mut layout = layout(&["a", "b"]);
        let mut drag = AxisDrag::new();
        drag.start(&layout, "a");
        // Still nearest its own slot.
        assert!(!drag.motion(&mut layout, 20.0));
        assert_eq!(layout.dimensions(), &["a", "b"]);
    }

    #[test]
    fn effective_x_floats_only_the_dragged_dimension() {
        let mut layout = layout(&["a", "b", "c"]);
        let mut drag = AxisDrag::new();
        drag.start(&layout, "c");
        drag.motion(&mut layout, 0.0);
        let rank = layout.rank_of("c").unwrap();
        assert_eq!(drag.effective_x(&layout, rank, "c"), 0.0);
        let rank_b = layout.rank_of("b").unwrap();
        assert_eq!(drag.effective_x(&layout, rank_b, "b"), layout.slot_x(rank_b));
    }
}
