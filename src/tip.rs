use crate::Point;
use clamped::Clamp;
use std::f32::consts::PI;

/// Inner-side offsets never reach further than this many radii from the center.
const MITER_LIMIT: f32 = 2.0;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TipType {
    Round,
    Square,
    Butt,
}

/// Screen-space tip radii. `radius` is the half-width across the stroke,
/// `minor_radius` how far caps reach along the direction of travel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TipSize {
    pub radius: f32,
    pub minor_radius: f32,
}

impl TipSize {
    pub fn new(radius: f32, minor_radius: f32) -> TipSize {
        TipSize {
            radius,
            minor_radius,
        }
    }

    pub fn circle(radius: f32) -> TipSize {
        Self::new(radius, radius)
    }
}

impl From<f32> for TipSize {
    fn from(radius: f32) -> Self {
        TipSize::circle(radius)
    }
}

/// Vertices for the two sides of the outline at one center. Both sides always
/// hold the same number of points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossSection {
    pub forward: Vec<Point>,
    pub backward: Vec<Point>,
}

impl CrossSection {
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TipModel {
    Round,
    /// Flat ends pushed `extension * minor_radius` past the center.
    Flat { extension: f32 },
}

impl TipModel {
    pub fn for_type(tip_type: TipType) -> TipModel {
        match tip_type {
            TipType::Round => TipModel::Round,
            TipType::Square => TipModel::Flat { extension: 1.0 },
            TipType::Butt => TipModel::Flat { extension: 0.0 },
        }
    }

    pub fn tip_type(&self) -> TipType {
        match self {
            TipModel::Round => TipType::Round,
            TipModel::Flat { extension } if *extension > 0.0 => TipType::Square,
            TipModel::Flat { .. } => TipType::Butt,
        }
    }

    /// Straight cross-section through `center` along `normal`.
    pub fn cross_section(&self, center: Point, size: TipSize, normal: Point) -> CrossSection {
        CrossSection {
            forward: vec![center + normal * size.radius],
            backward: vec![center - normal * size.radius],
        }
    }

    /// Cross-section at a center where the travel direction turns from
    /// `prev_normal` to `normal`. Assumes the straight cross-section along
    /// `prev_normal` was already emitted; ends on the one along `normal`.
    pub fn turn(
        &self,
        center: Point,
        size: TipSize,
        prev_normal: Point,
        normal: Point,
        turn_verts: u32,
    ) -> CrossSection {
        let r = size.radius;
        let cross = Point::cross(prev_normal, normal);
        let outer_sign = if cross >= 0.0 { 1.0 } else { -1.0 };
        let o0 = prev_normal * outer_sign;
        let o1 = normal * outer_sign;

        let a0 = o0.y.atan2(o0.x);
        let mut delta = o1.y.atan2(o1.x) - a0;
        if delta > PI {
            delta -= 2.0 * PI;
        } else if delta < -PI {
            delta += 2.0 * PI;
        }
        if delta.abs() < 1e-6 {
            return CrossSection::default();
        }

        let outer: Vec<Point> = match self {
            TipModel::Round => {
                let max_steps = turn_verts.max(1) as f32;
                let steps = ((delta.abs() / PI) * max_steps).ceil().clamped(1.0, max_steps) as usize;
                (1..=steps)
                    .map(|i| {
                        let a = a0 + delta * (i as f32) / (steps as f32);
                        center + Point::new(a.cos(), a.sin()) * r
                    })
                    .collect()
            }
            TipModel::Flat { .. } => vec![center + o1 * r],
        };

        let inner = center - miter(o0, o1) * r;
        let inner_side = vec![inner; outer.len()];
        if outer_sign > 0.0 {
            CrossSection {
                forward: outer,
                backward: inner_side,
            }
        } else {
            CrossSection {
                forward: inner_side,
                backward: outer,
            }
        }
    }

    /// Cap behind `center`, running from the backward side to the forward side.
    pub fn start_cap(&self, center: Point, size: TipSize, tangent: Point, turn_verts: u32) -> Vec<Point> {
        let n = tangent.perp();
        self.cap(center, size, -n, -tangent, turn_verts)
    }

    /// Cap ahead of `center`, running from the forward side to the backward side.
    pub fn end_cap(&self, center: Point, size: TipSize, tangent: Point, turn_verts: u32) -> Vec<Point> {
        let n = tangent.perp();
        self.cap(center, size, n, tangent, turn_verts)
    }

    fn cap(&self, center: Point, size: TipSize, from: Point, out: Point, turn_verts: u32) -> Vec<Point> {
        match self {
            TipModel::Round => {
                let ncap = turn_verts.max(2) as usize;
                (0..=ncap)
                    .map(|i| {
                        let a = (i as f32) / (ncap as f32) * PI;
                        center + from * (a.cos() * size.radius) + out * (a.sin() * size.minor_radius)
                    })
                    .collect()
            }
            TipModel::Flat { extension } => {
                let side = from * size.radius;
                let d = out * (size.minor_radius * extension);
                if d.length() > 0.0 {
                    vec![center + side, center + side + d, center - side + d, center - side]
                } else {
                    vec![center + side, center - side]
                }
            }
        }
    }
}

/// Miter direction between two unit normals, scaled so that offsetting by it
/// meets both offset lines, clamped to `MITER_LIMIT`.
fn miter(n0: Point, n1: Point) -> Point {
    let mut dm = (n0 + n1) * 0.5;
    let dmr2 = dm.dot(dm);
    if dmr2 > 0.000001 {
        dm = dm * (1.0 / dmr2);
    }
    if dm.length() > MITER_LIMIT {
        dm = dm.normalized() * MITER_LIMIT;
    }
    dm
}
