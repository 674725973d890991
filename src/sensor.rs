//! Distance sensing via a fan of fixed-length rays.

use crate::geometry::{intersect, lerp, Hull, Intersection, Point, Segment};

/// Ray fan layout. The spread is the total fan angle, centered on the
/// vehicle heading.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct SensorConfig {
    pub ray_count: usize,
    pub ray_length: f64,
    pub ray_spread: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            ray_count: 5,
            ray_length: 150.0,
            ray_spread: std::f64::consts::FRAC_PI_2,
        }
    }
}

/// Casts rays from a vehicle's pose and records the nearest hit per ray
/// against road borders and peer hulls. The sensor never mutates the
/// vehicle; the pose is passed in on every update.
#[derive(Clone, Debug, PartialEq)]
pub struct Sensor {
    config: SensorConfig,
    rays: Vec<Segment>,
    readings: Vec<Option<Intersection>>,
}

impl Sensor {
    pub fn new(config: SensorConfig) -> Self {
        Self {
            config,
            rays: Vec::new(),
            readings: Vec::new(),
        }
    }

    pub fn ray_count(&self) -> usize {
        self.config.ray_count
    }

    pub fn rays(&self) -> &[Segment] {
        &self.rays
    }

    /// Nearest hit per ray, parallel to [`Sensor::rays`]; `None` where
    /// no obstacle lies within the ray length.
    pub fn readings(&self) -> &[Option<Intersection>] {
        &self.readings
    }

    /// Reading per ray normalized for the decision network: no hit maps
    /// to 0, a hit to `1 - offset`, so closer obstacles read nearer 1.
    pub fn normalized_readings(&self) -> Vec<f64> {
        self.readings
            .iter()
            .map(|reading| reading.map_or(0.0, |hit| 1.0 - hit.offset))
            .collect()
    }

    pub fn update(
        &mut self,
        position: Point,
        heading: f64,
        road_borders: &[Segment],
        peers: &[Hull],
    ) {
        self.cast_rays(position, heading);
        self.readings = self
            .rays
            .iter()
            .map(|ray| Self::reading(ray, road_borders, peers))
            .collect();
    }

    fn cast_rays(&mut self, position: Point, heading: f64) {
        self.rays.clear();
        for index in 0..self.config.ray_count {
            let t = if self.config.ray_count == 1 {
                0.5
            } else {
                index as f64 / (self.config.ray_count - 1) as f64
            };
            let ray_angle = lerp(self.config.ray_spread / 2.0, -self.config.ray_spread / 2.0, t);

            // Same forward convention as vehicle motion: heading 0 points
            // toward -y.
            let angle = heading + ray_angle;
            let end = Point::new(
                position.x - angle.sin() * self.config.ray_length,
                position.y - angle.cos() * self.config.ray_length,
            );
            self.rays.push(Segment::new(position, end));
        }
    }

    fn reading(
        ray: &Segment,
        road_borders: &[Segment],
        peers: &[Hull],
    ) -> Option<Intersection> {
        let mut nearest: Option<Intersection> = None;
        let mut consider = |hit: Intersection| {
            if nearest.is_none_or(|n| hit.offset < n.offset) {
                nearest = Some(hit);
            }
        };

        for border in road_borders {
            if let Some(hit) = intersect(ray.start, ray.end, border.start, border.end) {
                consider(hit);
            }
        }
        for hull in peers {
            for (a, b) in hull.edges() {
                if let Some(hit) = intersect(ray.start, ray.end, a, b) {
                    consider(hit);
                }
            }
        }

        nearest
    }
}
