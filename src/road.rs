//! Straight multi-lane road with two side borders.

use crate::geometry::{lerp, Point, Segment};

// Stand-in for an infinitely long road.
const REACH: f64 = 1_000_000.0;

#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub struct Road {
    left: f64,
    right: f64,
    lane_count: usize,
    borders: [Segment; 2],
}

impl Road {
    pub fn new(center_x: f64, width: f64, lane_count: usize) -> Self {
        let left = center_x - width / 2.0;
        let right = center_x + width / 2.0;
        Self {
            left,
            right,
            lane_count,
            borders: [
                Segment::new(Point::new(left, -REACH), Point::new(left, REACH)),
                Segment::new(Point::new(right, -REACH), Point::new(right, REACH)),
            ],
        }
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    pub fn borders(&self) -> &[Segment] {
        &self.borders
    }

    /// Center x of the given lane, counted from the left. Out-of-range
    /// lanes clamp to the rightmost one.
    pub fn lane_center(&self, lane: usize) -> f64 {
        let lane_width = (self.right - self.left) / self.lane_count as f64;
        self.left + lane_width / 2.0 + lane_width * lane.min(self.lane_count - 1) as f64
    }

    /// X coordinate of the divider between lanes `index - 1` and
    /// `index`, for a renderer to draw lane lines.
    pub fn divider(&self, index: usize) -> f64 {
        lerp(self.left, self.right, index as f64 / self.lane_count as f64)
    }
}
