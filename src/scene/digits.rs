//! Seven-segment layout of the countdown into the fixed digit-instance region.
//!
//! Every bar is one cube instance, scaled to a flat slab, plus a box collider with the
//! same extents. Both live in pools of [`POOL_CAPACITY`] slots that are overwritten in
//! place on every tick.

use cgmath::Vector3;

use crate::data_structures::collider::{BoxCollider, ColliderPool, POOL_CAPACITY};
use crate::data_structures::instance::{Instance, InstanceRaw};

/// Depth of the plane the digits stand on.
pub const DIGIT_PLANE_Z: f32 = -200.0;
pub const BAR_HALF_LENGTH: f32 = 10.0;
pub const BAR_HALF_THICKNESS: f32 = 1.0;
/// Horizontal distance between neighbouring digit centres.
pub const DIGIT_SPACING: f32 = 40.0;

/// Max decimal digits of an `u64`.
const MAX_DIGITS: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    Top,
    Middle,
    Bottom,
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

impl Segment {
    /// Emission order of the bars of one digit.
    pub const ALL: [Segment; 7] = [
        Segment::Top,
        Segment::Middle,
        Segment::Bottom,
        Segment::UpperLeft,
        Segment::UpperRight,
        Segment::LowerLeft,
        Segment::LowerRight,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Centre of the bar relative to the digit centre.
    pub fn offset(self) -> (f32, f32) {
        let edge = 2.0 * BAR_HALF_LENGTH + 2.0 * BAR_HALF_THICKNESS;
        let side = BAR_HALF_LENGTH + BAR_HALF_THICKNESS;
        match self {
            Segment::Top => (0.0, edge),
            Segment::Middle => (0.0, 0.0),
            Segment::Bottom => (0.0, -edge),
            Segment::UpperLeft => (-side, side),
            Segment::UpperRight => (side, side),
            Segment::LowerLeft => (-side, -side),
            Segment::LowerRight => (side, -side),
        }
    }

    pub fn half_extents(self) -> Vector3<f32> {
        match self {
            Segment::Top | Segment::Middle | Segment::Bottom => {
                Vector3::new(BAR_HALF_LENGTH, BAR_HALF_THICKNESS, BAR_HALF_THICKNESS)
            }
            _ => Vector3::new(BAR_HALF_THICKNESS, BAR_HALF_LENGTH, BAR_HALF_THICKNESS),
        }
    }
}

const fn mask(segments: &[Segment]) -> u8 {
    let mut bits = 0;
    let mut i = 0;
    while i < segments.len() {
        bits |= segments[i].bit();
        i += 1;
    }
    bits
}

use Segment::*;

/// Lit segments per decimal digit.
pub const DIGIT_SEGMENTS: [u8; 10] = [
    mask(&[Top, Bottom, UpperLeft, UpperRight, LowerLeft, LowerRight]),
    mask(&[UpperRight, LowerRight]),
    mask(&[Top, Middle, Bottom, UpperRight, LowerLeft]),
    mask(&[Top, Middle, Bottom, UpperRight, LowerRight]),
    mask(&[Middle, UpperLeft, UpperRight, LowerRight]),
    mask(&[Top, Middle, Bottom, UpperLeft, LowerRight]),
    mask(&[Top, Middle, Bottom, UpperLeft, LowerLeft, LowerRight]),
    mask(&[Top, UpperRight, LowerRight]),
    mask(&[Top, Middle, Bottom, UpperLeft, UpperRight, LowerLeft, LowerRight]),
    mask(&[Top, Middle, Bottom, UpperLeft, UpperRight, LowerRight]),
];

/// Shown once the countdown ran out: the outline of a zero.
pub const EXPIRED_GLYPH: u8 = DIGIT_SEGMENTS[0];

pub fn segments(bits: u8) -> impl Iterator<Item = Segment> {
    Segment::ALL
        .into_iter()
        .filter(move |segment| bits & segment.bit() != 0)
}

pub fn bar_count(digit: u8) -> usize {
    DIGIT_SEGMENTS[usize::from(digit % 10)].count_ones() as usize
}

/// Decimal digits of `value`, least significant first. Zero has one digit.
fn decimal_digits(mut value: u64, out: &mut [u8; MAX_DIGITS]) -> usize {
    let mut len = 0;
    loop {
        out[len] = (value % 10) as u8;
        len += 1;
        value /= 10;
        if value == 0 {
            return len;
        }
    }
}

#[derive(Debug)]
pub struct DigitLayout {
    instances: Box<[InstanceRaw]>,
    live: usize,
    colliders: ColliderPool,
}

impl DigitLayout {
    pub fn new() -> Self {
        Self {
            instances: vec![InstanceRaw::default(); POOL_CAPACITY].into_boxed_slice(),
            live: 0,
            colliders: ColliderPool::new(),
        }
    }

    /// Transforms of the bars laid out by the last call, in emission order.
    pub fn instances(&self) -> &[InstanceRaw] {
        &self.instances[..self.live]
    }

    pub fn colliders(&self) -> &ColliderPool {
        &self.colliders
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Lays out `remaining_ms` digit by digit, least significant digit rightmost and the
    /// whole group centred on `x = 0`.
    pub fn lay_out_remaining(&mut self, remaining_ms: u64) {
        self.clear();
        let mut digits = [0u8; MAX_DIGITS];
        let len = decimal_digits(remaining_ms, &mut digits);
        let space_offset = (len - 1) as f32 / 2.0;

        for (i, &digit) in digits[..len].iter().enumerate() {
            let x = (space_offset - i as f32) * DIGIT_SPACING;
            self.push_digit(DIGIT_SEGMENTS[usize::from(digit)], x);
        }
    }

    pub fn lay_out_expired(&mut self) {
        self.clear();
        self.push_digit(EXPIRED_GLYPH, 0.0);
    }

    fn clear(&mut self) {
        self.live = 0;
        self.colliders.clear();
    }

    fn push_digit(&mut self, bits: u8, x: f32) {
        for segment in segments(bits) {
            let Some(slot) = self.instances.get_mut(self.live) else {
                log::warn!("digit layout exceeds {POOL_CAPACITY} bars, dropping the rest");
                return;
            };
            let (dx, dy) = segment.offset();
            let center = Vector3::new(x + dx, dy, DIGIT_PLANE_Z);
            let half = segment.half_extents();

            *slot = Instance::new(center, half).to_raw();
            self.colliders
                .push(BoxCollider::with_half_extents(center, half));
            self.live += 1;
        }
    }
}

impl Default for DigitLayout {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Segment::*;
    use super::*;

    fn centers(layout: &DigitLayout) -> Vec<(f32, f32)> {
        layout
            .instances()
            .iter()
            .map(|raw| {
                let t = raw.translation();
                (t.x, t.y)
            })
            .collect()
    }

    #[test]
    fn segment_counts_match_the_digit_table() {
        let counts: Vec<_> = (0..10).map(bar_count).collect();
        assert_eq!(counts, [6, 2, 5, 5, 4, 5, 6, 3, 7, 6]);
        assert_eq!(segments(EXPIRED_GLYPH).count(), 6);
        assert!(segments(EXPIRED_GLYPH).all(|s| s != Middle));
    }

    #[test]
    fn bars_follow_canonical_order() {
        let emitted: Vec<_> = segments(DIGIT_SEGMENTS[4]).collect();
        assert_eq!(emitted, [Middle, UpperLeft, UpperRight, LowerRight]);
    }

    #[test]
    fn one_two_three_needs_twelve_bars() {
        let mut layout = DigitLayout::new();
        layout.lay_out_remaining(123);
        assert_eq!(layout.len(), 12);
        assert_eq!(layout.colliders().len(), 12);
    }

    #[test]
    fn least_significant_digit_sits_rightmost() {
        let mut layout = DigitLayout::new();
        // "1" on the left, "7" on the right
        layout.lay_out_remaining(17);
        let centers = centers(&layout);
        assert_eq!(centers.len(), 5);
        // the 7 comes first and is centred at +20
        assert_eq!(centers[0], (20.0, 22.0));
        assert_eq!(centers[1], (31.0, 11.0));
        assert_eq!(centers[3], (-9.0, 11.0));
        assert_eq!(centers[4], (-9.0, -11.0));
    }

    #[test]
    fn zero_remaining_is_a_single_zero_digit() {
        let mut layout = DigitLayout::new();
        layout.lay_out_remaining(0);
        assert_eq!(layout.len(), 6);
        assert!(centers(&layout).iter().all(|&(x, _)| x.abs() <= 11.0));
    }

    #[test]
    fn expired_glyph_replaces_previous_layout() {
        let mut layout = DigitLayout::new();
        layout.lay_out_remaining(88_888_888);
        layout.lay_out_expired();
        assert_eq!(layout.len(), 6);
        assert_eq!(
            centers(&layout),
            [
                (0.0, 22.0),
                (0.0, -22.0),
                (-11.0, 11.0),
                (11.0, 11.0),
                (-11.0, -11.0),
                (11.0, -11.0)
            ]
        );
    }

    #[test]
    fn colliders_match_bar_extents() {
        let mut layout = DigitLayout::new();
        layout.lay_out_remaining(1);
        let upper_right = layout.colliders().live()[0];
        assert_eq!(
            upper_right,
            BoxCollider::new(10.0, 12.0, 1.0, 21.0, -201.0, -199.0)
        );
        assert_eq!(layout.instances()[0].model[1][1], BAR_HALF_LENGTH);
    }

    #[test]
    fn widest_values_stay_within_capacity() {
        let mut layout = DigitLayout::new();
        layout.lay_out_remaining(u64::from(u32::MAX));
        assert!(layout.len() <= POOL_CAPACITY);
        layout.lay_out_remaining(u64::MAX);
        assert!(layout.len() <= POOL_CAPACITY);
        assert_eq!(layout.len(), layout.colliders().len());
    }
}
