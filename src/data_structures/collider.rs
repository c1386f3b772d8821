//! Axis-aligned box colliders and minimum-translation resolution.
//!
//! [`BoxCollider::overlaps`] reports, next to the hit itself, which edges of the other
//! box fell strictly inside this one. [`BoxCollider::resolve`] consumes that report to
//! compute a single-axis push for the other box. Boxes that only share a face do not
//! overlap.

use cgmath::Vector3;

/// Maximum number of live colliders (and digit instances) per tick.
pub const POOL_CAPACITY: usize = 512;

/// Six bounds with `a* <= b*` on every axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxCollider {
    pub ax: f32,
    pub bx: f32,
    pub ay: f32,
    pub by: f32,
    pub az: f32,
    pub bz: f32,
}

/// Which edges of the other box lie strictly inside this box on one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisContainment {
    pub low: bool,
    pub high: bool,
}

/// Result of [`BoxCollider::overlaps`]. The containment flags are only meaningful for
/// the pair they were computed for and only when `hit` is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overlap {
    pub hit: bool,
    pub x: AxisContainment,
    pub y: AxisContainment,
    pub z: AxisContainment,
}

impl BoxCollider {
    pub fn new(ax: f32, bx: f32, ay: f32, by: f32, az: f32, bz: f32) -> Self {
        debug_assert!(ax <= bx && ay <= by && az <= bz);
        Self {
            ax,
            bx,
            ay,
            by,
            az,
            bz,
        }
    }

    /// A cube of half-extent `radius` around `center`.
    pub fn around(center: Vector3<f32>, radius: f32) -> Self {
        Self::with_half_extents(center, Vector3::new(radius, radius, radius))
    }

    pub fn with_half_extents(center: Vector3<f32>, half: Vector3<f32>) -> Self {
        Self::new(
            center.x - half.x,
            center.x + half.x,
            center.y - half.y,
            center.y + half.y,
            center.z - half.z,
            center.z + half.z,
        )
    }

    pub fn center(&self) -> Vector3<f32> {
        Vector3::new(
            (self.ax + self.bx) / 2.0,
            (self.ay + self.by) / 2.0,
            (self.az + self.bz) / 2.0,
        )
    }

    pub fn translate(&mut self, by: Vector3<f32>) {
        self.ax += by.x;
        self.bx += by.x;
        self.ay += by.y;
        self.by += by.y;
        self.az += by.z;
        self.bz += by.z;
    }

    /// AABB test against `other`, rejecting per axis in x, y, z order.
    pub fn overlaps(&self, other: &BoxCollider) -> Overlap {
        let mut overlap = Overlap::default();

        let Some(x) = axis_overlap(self.ax, self.bx, other.ax, other.bx) else {
            return overlap;
        };
        let Some(y) = axis_overlap(self.ay, self.by, other.ay, other.by) else {
            return overlap;
        };
        let Some(z) = axis_overlap(self.az, self.bz, other.az, other.bz) else {
            return overlap;
        };

        overlap.hit = true;
        overlap.x = x;
        overlap.y = y;
        overlap.z = z;
        overlap
    }

    /// The smallest single-axis translation that moves `other` out of `self`, given the
    /// report `overlaps(self, other)` produced for this same pair.
    ///
    /// Ties go to the later axis: y wins over x, z wins over y.
    pub fn resolve(&self, other: &BoxCollider, overlap: &Overlap) -> Vector3<f32> {
        let dx = separation(overlap.x, self.ax, self.bx, other.ax, other.bx);
        let dy = separation(overlap.y, self.ay, self.by, other.ay, other.by);
        let dz = separation(overlap.z, self.az, self.bz, other.az, other.bz);

        if dx.abs() < dy.abs() {
            if dx.abs() < dz.abs() {
                Vector3::new(dx, 0.0, 0.0)
            } else {
                Vector3::new(0.0, 0.0, dz)
            }
        } else if dy.abs() < dz.abs() {
            Vector3::new(0.0, dy, 0.0)
        } else {
            Vector3::new(0.0, 0.0, dz)
        }
    }
}

/// `None` when the spans `[a, b]` and `[other_a, other_b]` are separated or only touch.
fn axis_overlap(a: f32, b: f32, other_a: f32, other_b: f32) -> Option<AxisContainment> {
    let containment = AxisContainment {
        low: a < other_a && other_a < b,
        high: a < other_b && other_b < b,
    };
    let nested = other_a <= a && b <= other_b;
    (containment.low || containment.high || nested).then_some(containment)
}

fn separation(containment: AxisContainment, a: f32, b: f32, other_a: f32, other_b: f32) -> f32 {
    match containment {
        AxisContainment {
            low: true,
            high: false,
        } => b - other_a,
        AxisContainment {
            low: false,
            high: true,
        } => a - other_b,
        _ => {
            // fully nested either way: leave through whichever face is closer
            let down = other_b - a;
            let up = b - other_a;
            if down < up { -down } else { up }
        }
    }
}

/// Fixed-capacity collider storage reused every tick.
///
/// Slots are allocated once; [`ColliderPool::clear`] only resets the live count and
/// [`ColliderPool::push`] overwrites the next slot in place.
#[derive(Debug)]
pub struct ColliderPool {
    slots: Box<[BoxCollider]>,
    live: usize,
}

impl ColliderPool {
    pub fn new() -> Self {
        Self {
            slots: vec![BoxCollider::default(); POOL_CAPACITY].into_boxed_slice(),
            live: 0,
        }
    }

    pub fn clear(&mut self) {
        self.live = 0;
    }

    /// Returns `false` and drops the collider if the pool is full.
    pub fn push(&mut self, collider: BoxCollider) -> bool {
        match self.slots.get_mut(self.live) {
            Some(slot) => {
                *slot = collider;
                self.live += 1;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn live(&self) -> &[BoxCollider] {
        &self.slots[..self.live]
    }

    pub fn first_push(&self, other: &BoxCollider) -> Option<Vector3<f32>> {
        first_push(self.live(), other)
    }
}

/// Push for `other` out of the first collider in `colliders` it overlaps. Later
/// colliders are not examined, even if `other` still overlaps them after the push.
pub fn first_push(colliders: &[BoxCollider], other: &BoxCollider) -> Option<Vector3<f32>> {
    colliders.iter().find_map(|collider| {
        let overlap = collider.overlaps(other);
        overlap.hit.then(|| collider.resolve(other, &overlap))
    })
}

impl Default for ColliderPool {
    fn default() -> Self {
        Self::new()
    }
}
