//! Basic building blocks: points, segments, intersections and the
//! boundary-overlap test used for collision detection.

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Ordered pair of points, used for rays and road borders.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    fn points(&self) -> [Point; 2] {
        [self.start, self.end]
    }
}

/// Crossing point of two segments. `offset` is the fractional distance
/// from the first segment's start to its end, always in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Intersection {
    pub x: f64,
    pub y: f64,
    pub offset: f64,
}

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Intersection of segments AB and CD in determinant form. A zero
/// denominator means the segments are parallel or degenerate and yields
/// `None`, as does a crossing outside either segment.
pub fn intersect(a: Point, b: Point, c: Point, d: Point) -> Option<Intersection> {
    let t_top = (d.x - c.x) * (a.y - c.y) - (d.y - c.y) * (a.x - c.x);
    let u_top = (c.y - a.y) * (a.x - b.x) - (c.x - a.x) * (a.y - b.y);
    let bottom = (d.y - c.y) * (b.x - a.x) - (d.x - c.x) * (b.y - a.y);

    if bottom == 0.0 {
        return None;
    }

    let t = t_top / bottom;
    let u = u_top / bottom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Intersection {
            x: lerp(a.x, b.x, t),
            y: lerp(a.y, b.y, t),
            offset: t,
        })
    } else {
        None
    }
}

/// True iff any edge of `p1` crosses any edge of `p2`, edges taken over
/// consecutive points with wraparound. This is a boundary test, not
/// containment: a polygon fully enclosing another reports `false`. A
/// two-point slice degenerates to a single segment, which is how road
/// borders are tested.
pub fn hulls_overlap(p1: &[Point], p2: &[Point]) -> bool {
    for i in 0..p1.len() {
        for j in 0..p2.len() {
            if intersect(
                p1[i],
                p1[(i + 1) % p1.len()],
                p2[j],
                p2[(j + 1) % p2.len()],
            )
            .is_some()
            {
                return true;
            }
        }
    }
    false
}

/// A vehicle's four-corner footprint for the current tick, in fixed
/// rotational order: front-left, front-right, rear-right, rear-left.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Hull {
    corners: [Point; 4],
}

impl Hull {
    pub const fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    pub fn overlaps(&self, other: &Hull) -> bool {
        hulls_overlap(&self.corners, &other.corners)
    }

    pub fn crosses(&self, segment: &Segment) -> bool {
        hulls_overlap(&self.corners, &segment.points())
    }

    /// Consecutive corner pairs with wraparound.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        (0..self.corners.len()).map(move |i| {
            (
                self.corners[i],
                self.corners[(i + 1) % self.corners.len()],
            )
        })
    }
}
