//! Simulation core for autonomous vehicles on a multi-lane road.
//!
//! Each vehicle senses its surroundings through a fan of distance rays,
//! feeds the normalized readings into a small feedforward decision
//! network, and reacts with discrete steering and throttle signals that
//! drive a kinematic motion model. A mutation operator perturbs network
//! parameters so a population can improve across trial episodes.
//!
//! The crate is the pure state-transition kernel: it never schedules
//! frames, draws anything or touches storage. Rendering, input wiring,
//! persistence and generation bookkeeping are external collaborators
//! working against the read-only snapshots (hulls, rays and readings,
//! level parameters) and the serializable network records exposed here.

mod geometry;
mod network;
mod road;
mod sensor;
mod simulation;
mod vehicle;

pub use geometry::{hulls_overlap, intersect, lerp, Hull, Intersection, Point, Segment};
pub use network::{Level, LevelRecord, Network, NetworkError, NetworkRecord};
pub use road::Road;
pub use sensor::{Sensor, SensorConfig};
pub use simulation::Simulation;
pub use vehicle::{Controls, Guidance, Vehicle, VehicleConfig, CONTROL_OUTPUTS};
