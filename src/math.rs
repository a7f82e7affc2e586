use std::ops::{Add, Mul, Neg, Sub};

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }

    pub fn equals(self, pt: Point, tol: f32) -> bool {
        let dx = pt.x - self.x;
        let dy = pt.y - self.y;
        dx * dx + dy * dy < tol * tol
    }

    /// Squared distance from `self` to the segment `p`-`q`.
    pub fn dist_pt_seg(self, p: Point, q: Point) -> f32 {
        let pqx = q.x - p.x;
        let pqy = q.y - p.y;
        let dx = self.x - p.x;
        let dy = self.y - p.y;
        let d = pqx * pqx + pqy * pqy;
        let mut t = pqx * dx + pqy * dy;
        if d > 0.0 {
            t /= d;
        }
        if t < 0.0 {
            t = 0.0
        } else if t > 1.0 {
            t = 1.0
        };
        let dx = p.x + t * pqx - self.x;
        let dy = p.y + t * pqy - self.y;
        dx * dx + dy * dy
    }

    pub fn normalize(&mut self) -> f32 {
        let d = self.length();
        if d > 1e-6 {
            let id = 1.0 / d;
            self.x *= id;
            self.y *= id;
        }
        d
    }

    pub fn normalized(mut self) -> Point {
        self.normalize();
        self
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, pt: Point) -> f32 {
        (pt - self).length()
    }

    pub fn dot(self, pt: Point) -> f32 {
        self.x * pt.x + self.y * pt.y
    }

    pub fn cross(pt1: Point, pt2: Point) -> f32 {
        pt1.x * pt2.y - pt1.y * pt2.x
    }

    /// Left-hand normal of a direction, `(dy, -dx)`.
    pub fn perp(self) -> Point {
        Point::new(self.y, -self.x)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Signed area of the triangle `a`, `b`, `c`. Positive when the points wind
/// counter-clockwise in a y-up frame.
pub fn signed_area(a: Point, b: Point, c: Point) -> f32 {
    0.5 * Point::cross(b - a, c - a)
}

/// Axis-aligned envelope of a point set.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn new(min: Point, max: Point) -> Bounds {
        Bounds { min, max }
    }

    pub fn from_point(pt: Point) -> Bounds {
        Bounds { min: pt, max: pt }
    }

    /// Envelope of `points`, or `None` when there are none.
    pub fn envelope<I: IntoIterator<Item = Point>>(points: I) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for pt in points {
            bounds = Some(match bounds {
                Some(b) => b.include_point(pt),
                None => Bounds::from_point(pt),
            });
        }
        bounds
    }

    pub fn include_point(self, pt: Point) -> Bounds {
        Bounds {
            min: Point::new(self.min.x.min(pt.x), self.min.y.min(pt.y)),
            max: Point::new(self.max.x.max(pt.x), self.max.y.max(pt.y)),
        }
    }

    pub fn join(self, other: Bounds) -> Bounds {
        self.include_point(other.min).include_point(other.max)
    }

    /// Merges `other` into the accumulated `acc`, assigning when `acc` is empty.
    pub fn join_opt(acc: Option<Bounds>, other: Option<Bounds>) -> Option<Bounds> {
        match (acc, other) {
            (Some(a), Some(b)) => Some(a.join(b)),
            (a, None) => a,
            (None, b) => b,
        }
    }

    pub fn contains(&self, other: &Bounds) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }

    pub fn contains_point(&self, pt: Point) -> bool {
        pt.x >= self.min.x && pt.x <= self.max.x && pt.y >= self.min.y && pt.y <= self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn left_top(&self) -> Point {
        self.min
    }

    pub fn right_top(&self) -> Point {
        Point::new(self.max.x, self.min.y)
    }

    pub fn left_bottom(&self) -> Point {
        Point::new(self.min.x, self.max.y)
    }

    pub fn right_bottom(&self) -> Point {
        self.max
    }

    /// Envelope of the four transformed corners.
    pub fn transform(&self, xform: &Transform) -> Bounds {
        let corners = [
            self.left_top(),
            self.right_top(),
            self.left_bottom(),
            self.right_bottom(),
        ];
        let first = xform.transform_point(corners[0]);
        corners[1..]
            .iter()
            .fold(Bounds::from_point(first), |b, pt| {
                b.include_point(xform.transform_point(*pt))
            })
    }
}

/// 2x3 affine transform. `a * b` applies `a` first, then `b`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform(pub [f32; 6]);

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

impl Transform {
    pub fn identity() -> Transform {
        Transform([1.0, 0.0, 0.0, 1.0, 0.0, 0.0])
    }

    pub fn translate(tx: f32, ty: f32) -> Transform {
        Transform([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    pub fn scale(sx: f32, sy: f32) -> Transform {
        Transform([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    pub fn rotate(a: f32) -> Transform {
        let cs = a.cos();
        let sn = a.sin();
        Transform([cs, sn, -sn, cs, 0.0, 0.0])
    }

    /// `None` when the transform is singular.
    pub fn inverse(self) -> Option<Transform> {
        let t = &self.0;
        let det = t[0] * t[3] - t[2] * t[1];
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let invdet = 1.0 / det;
        let mut inv = [0f32; 6];
        inv[0] = t[3] * invdet;
        inv[2] = -t[2] * invdet;
        inv[4] = (t[2] * t[5] - t[3] * t[4]) * invdet;
        inv[1] = -t[1] * invdet;
        inv[3] = t[0] * invdet;
        inv[5] = (t[1] * t[4] - t[0] * t[5]) * invdet;
        Some(Transform(inv))
    }

    pub fn transform_point(&self, pt: Point) -> Point {
        let t = &self.0;
        Point::new(
            pt.x * t[0] + pt.y * t[2] + t[4],
            pt.x * t[1] + pt.y * t[3] + t[5],
        )
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(mut self, rhs: Self) -> Self::Output {
        let t = &mut self.0;
        let s = &rhs.0;
        let t0 = t[0] * s[0] + t[1] * s[2];
        let t2 = t[2] * s[0] + t[3] * s[2];
        let t4 = t[4] * s[0] + t[5] * s[2] + s[4];
        t[1] = t[0] * s[1] + t[1] * s[3];
        t[3] = t[2] * s[1] + t[3] * s[3];
        t[5] = t[4] * s[1] + t[5] * s[3] + s[5];
        t[0] = t0;
        t[2] = t2;
        t[4] = t4;
        self
    }
}
