//! Vehicle kinematics: control signals, motion integration, hull
//! reconstruction and the collision (damage) test.

use std::f64::consts::PI;

use crate::geometry::{Hull, Point, Segment};
use crate::network::{Network, NetworkError};
use crate::sensor::Sensor;

/// Speed snaps back to this constant when `max_speed` is exceeded, not
/// to `max_speed` itself. Deliberate quirk, kept for behavioral
/// fidelity.
const OVERSPEED_SNAP: f64 = 3.0;

/// Number of control bits the decision network must emit.
pub const CONTROL_OUTPUTS: usize = 4;

/// Four independent control signals consumed by the next tick's motion
/// step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub forward: bool,
    pub left: bool,
    pub right: bool,
    pub reverse: bool,
}

impl Controls {
    pub const fn forward_only() -> Self {
        Self {
            forward: true,
            left: false,
            right: false,
            reverse: false,
        }
    }
}

/// Who steers the vehicle, fixed at construction. Each arm carries
/// exactly the state it needs.
#[derive(Clone, Debug, PartialEq)]
pub enum Guidance {
    /// Controls are supplied externally via [`Vehicle::set_controls`].
    Player,
    /// Controls are overwritten every tick from the network's output.
    SelfDriving(Network),
    /// Constant forward signal, typically used for traffic.
    Cruise,
}

/// Physical parameters of a vehicle. All magnitudes are per tick.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct VehicleConfig {
    pub width: f64,
    pub height: f64,
    pub acceleration: f64,
    pub max_speed: f64,
    pub friction: f64,
    pub steer_step: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 50.0,
            acceleration: 0.9,
            max_speed: 5.0,
            friction: 0.03,
            steer_step: 0.02,
        }
    }
}

/// A vehicle on the road. Two logical states: active, and damaged once
/// its hull crosses a road border or a peer hull. Damage is terminal
/// for the episode; motion integration and damage re-evaluation stop,
/// while sensing and inference keep running so downstream consumers
/// still see consistent readings.
#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    position: Point,
    heading: f64,
    speed: f64,
    hull: Hull,
    damaged: bool,
    controls: Controls,
    sensor: Option<Sensor>,
    guidance: Guidance,
    config: VehicleConfig,
}

impl Vehicle {
    pub fn new(position: Point, config: VehicleConfig, guidance: Guidance) -> Self {
        let controls = match guidance {
            Guidance::Cruise => Controls::forward_only(),
            _ => Controls::default(),
        };
        let mut vehicle = Self {
            position,
            heading: 0.0,
            speed: 0.0,
            hull: Hull::new([Point::default(); 4]),
            damaged: false,
            controls,
            sensor: None,
            guidance,
            config,
        };
        vehicle.hull = vehicle.rebuild_hull();
        vehicle
    }

    pub fn with_sensor(mut self, sensor: Sensor) -> Self {
        self.sensor = Some(sensor);
        self
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn hull(&self) -> Hull {
        self.hull
    }

    pub fn is_damaged(&self) -> bool {
        self.damaged
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn sensor(&self) -> Option<&Sensor> {
        self.sensor.as_ref()
    }

    pub fn network(&self) -> Option<&Network> {
        match &self.guidance {
            Guidance::SelfDriving(network) => Some(network),
            _ => None,
        }
    }

    pub fn network_mut(&mut self) -> Option<&mut Network> {
        match &mut self.guidance {
            Guidance::SelfDriving(network) => Some(network),
            _ => None,
        }
    }

    /// External control input. Only player-guided vehicles accept it;
    /// the other modes own their control signals.
    pub fn set_controls(&mut self, controls: Controls) {
        if matches!(self.guidance, Guidance::Player) {
            self.controls = controls;
        }
    }

    /// One simulation tick. `peer_hulls` must not include this
    /// vehicle's own hull.
    ///
    /// While active: integrate motion, rebuild the hull, check damage.
    /// Always: re-cast the sensor rays (if any) and, for self-driving
    /// vehicles, write the network's four thresholded outputs back into
    /// the control signals for the next tick.
    pub fn update(
        &mut self,
        road_borders: &[Segment],
        peer_hulls: &[Hull],
    ) -> Result<(), NetworkError> {
        if !self.damaged {
            self.integrate();
            self.hull = self.rebuild_hull();
            self.damaged = self.check_damage(road_borders, peer_hulls);
        }

        if let Some(sensor) = &mut self.sensor {
            sensor.update(self.position, self.heading, road_borders, peer_hulls);
            let offsets = sensor.normalized_readings();
            if let Guidance::SelfDriving(network) = &mut self.guidance {
                let outputs = network.feed_forward(&offsets)?;
                if outputs.len() != CONTROL_OUTPUTS {
                    return Err(NetworkError::OutputSize {
                        level: network.levels().len() - 1,
                        expected: CONTROL_OUTPUTS,
                        got: outputs.len(),
                    });
                }
                self.controls = Controls {
                    forward: outputs[0] > 0.5,
                    left: outputs[1] > 0.5,
                    right: outputs[2] > 0.5,
                    reverse: outputs[3] > 0.5,
                };
            }
        }

        Ok(())
    }

    fn integrate(&mut self) {
        if self.controls.forward {
            self.speed += self.config.acceleration;
        }
        if self.controls.reverse {
            self.speed -= self.config.acceleration;
        }

        if self.speed != 0.0 {
            // Steering sign flips while reversing so backing up feels
            // natural.
            let flip = if self.speed > 0.0 { 1.0 } else { -1.0 };
            if self.controls.left {
                self.heading += flip * self.config.steer_step;
            }
            if self.controls.right {
                self.heading -= flip * self.config.steer_step;
            }
        }

        if self.speed > self.config.max_speed {
            self.speed = OVERSPEED_SNAP;
        }
        if self.speed < -self.config.max_speed / 4.0 {
            self.speed = -self.config.max_speed / 4.0;
        }

        if self.speed > 0.0 {
            self.speed -= self.config.friction;
        } else if self.speed < 0.0 {
            self.speed += self.config.friction;
        }
        if self.speed.abs() < self.config.friction {
            self.speed = 0.0;
        }

        // Heading 0 travels toward -y.
        self.position.x -= self.heading.sin() * self.speed;
        self.position.y -= self.heading.cos() * self.speed;
    }

    fn rebuild_hull(&self) -> Hull {
        let rad = self.config.width.hypot(self.config.height) / 2.0;
        let alpha = self.config.width.atan2(self.config.height);
        let corner = |angle: f64| {
            Point::new(
                self.position.x - angle.sin() * rad,
                self.position.y - angle.cos() * rad,
            )
        };
        Hull::new([
            corner(self.heading - alpha),
            corner(self.heading + alpha),
            corner(PI + self.heading - alpha),
            corner(PI + self.heading + alpha),
        ])
    }

    fn check_damage(&self, road_borders: &[Segment], peer_hulls: &[Hull]) -> bool {
        road_borders.iter().any(|border| self.hull.crosses(border))
            || peer_hulls.iter().any(|peer| self.hull.overlaps(peer))
    }
}
