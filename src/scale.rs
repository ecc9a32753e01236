use egui::Color32;

/// A linear mapping from a value domain onto a pixel range. The range may be
/// inverted (and is, for every vertical axis in this crate).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    /// Build a scale from the extent of `values`. Returns `None` when the
    /// iterator yields no finite value, since min/max over an empty set is
    /// undefined.
    pub fn from_extent(values: impl IntoIterator<Item = f64>, range: (f32, f32)) -> Option<Self> {
        let mut extent: Option<(f64, f64)> = None;
        for value in values {
            if !value.is_finite() {
                continue;
            }
            extent = Some(match extent {
                None => (value, value),
                Some((lo, hi)) => (lo.min(value), hi.max(value)),
            });
        }
        extent.map(|domain| Self::new(domain, range))
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    /// Widen the domain outward to tick-friendly bounds.
    pub fn nice(mut self, count: usize) -> Self {
        let (lo, hi) = self.domain;
        if lo == hi {
            return self;
        }
        let step = tick_step(lo, hi, count);
        if step > 0.0 {
            self.domain = ((lo / step).floor() * step, (hi / step).ceil() * step);
        }
        self
    }

    pub fn scale(&self, value: f64) -> f32 {
        let (lo, hi) = self.domain;
        let (r0, r1) = self.range;
        if hi == lo {
            // Degenerate domain: park everything mid-range.
            return r0 + (r1 - r0) * 0.5;
        }
        let t = ((value - lo) / (hi - lo)) as f32;
        r0 + (r1 - r0) * t
    }

    /// Tick values inside the domain, at most roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = self.domain;
        if lo == hi {
            return vec![lo];
        }
        let step = tick_step(lo, hi, count);
        if step <= 0.0 {
            return vec![lo, hi];
        }
        let start = (lo / step).ceil();
        let stop = (hi / step).floor();
        let mut ticks = Vec::new();
        let mut i = start;
        while i <= stop {
            ticks.push(i * step);
            i += 1.0;
        }
        ticks
    }
}

fn tick_step(lo: f64, hi: f64, count: usize) -> f64 {
    let span = (hi - lo).abs();
    let step = span / count.max(1) as f64;
    let power = step.log10().floor();
    let magnitude = 10f64.powf(power);
    let error = step / magnitude;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * magnitude
}

/// Ordinal color assignment with a first-seen domain: the first distinct key
/// gets the first palette entry, and so on, wrapping past the palette length.
///
/// This is the scatter/legend color model. The PCP strokes its lines through
/// a plain `cluster mod palette` lookup instead, so the two views can
/// disagree for cluster ids at or past the palette length. Both models are
/// intentional and kept separate.
#[derive(Clone, Debug)]
pub struct OrdinalColors {
    palette: &'static [Color32],
    domain: Vec<i64>,
}

impl OrdinalColors {
    pub fn new(palette: &'static [Color32]) -> Self {
        Self {
            palette,
            domain: Vec::new(),
        }
    }

    /// Color for `key`, growing the domain if the key is new.
    pub fn color(&mut self, key: i64) -> Color32 {
        let index = match self.domain.iter().position(|seen| *seen == key) {
            Some(index) => index,
            None => {
                self.domain.push(key);
                self.domain.len() - 1
            }
        };
        self.palette[index % self.palette.len()]
    }

    /// Color for a key already in the domain.
    pub fn lookup(&self, key: i64) -> Option<Color32> {
        self.domain
            .iter()
            .position(|seen| *seen == key)
            .map(|index| self.palette[index % self.palette.len()])
    }

    pub fn domain(&self) -> &[i64] {
        &self.domain
    }

    pub fn reset(&mut self) {
        self.domain.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO: [Color32; 2] = [Color32::RED, Color32::BLUE];

    #[test]
    fn scale_maps_domain_onto_inverted_range() {
        let scale = LinearScale::new((0.0, 10.0), (100.0, 0.0));
        assert_eq!(scale.scale(0.0), 100.0);
        assert_eq!(scale.scale(10.0), 0.0);
        assert_eq!(scale.scale(5.0), 50.0);
    }

    #[test]
    fn from_extent_rejects_empty_input() {
        assert!(LinearScale::from_extent(std::iter::empty(), (0.0, 1.0)).is_none());
        assert!(LinearScale::from_extent(vec![f64::NAN], (0.0, 1.0)).is_none());
    }

    #[test]
    fn nice_widens_outward() {
        let scale = LinearScale::new((0.13, 9.87), (0.0, 1.0)).nice(10);
        let (lo, hi) = scale.domain();
        assert!(lo <= 0.13 && hi >= 9.87);
        assert_eq!(lo, 0.0);
        assert_eq!(hi, 10.0);
    }

    #[test]
    fn degenerate_domain_parks_mid_range() {
        let scale = LinearScale::new((3.0, 3.0), (0.0, 100.0));
        assert_eq!(scale.scale(3.0), 50.0);
        assert_eq!(scale.scale(99.0), 50.0);
    }

    #[test]
    fn ticks_land_on_step_multiples() {
        let scale = LinearScale::new((0.0, 10.0), (0.0, 1.0));
        let ticks = scale.ticks(5);
        assert_eq!(ticks, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn ordinal_domain_grows_in_first_seen_order() {
        let mut colors = OrdinalColors::new(&TWO);
        assert_eq!(colors.color(7), Color32::RED);
        assert_eq!(colors.color(2), Color32::BLUE);
        assert_eq!(colors.color(7), Color32::RED);
        assert_eq!(colors.domain(), &[7, 2]);
    }

    #[test]
    fn ordinal_wraps_past_palette_length() {
        let mut colors = OrdinalColors::new(&TWO);
        colors.color(0);
        colors.color(1);
        assert_eq!(colors.color(2), Color32::RED);
    }
}
