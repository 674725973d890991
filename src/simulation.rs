//! One-tick stepping of every vehicle on a road.
//!
//! Traffic (fixed-control vehicles) is updated first, ignoring peers,
//! exactly like the reference update order; the drivers then update
//! against the freshly rebuilt traffic hulls. That preserves the
//! invariant that all hulls are current before any sensor reads them.

use crate::geometry::Hull;
use crate::network::NetworkError;
use crate::road::Road;
use crate::vehicle::Vehicle;

#[derive(Clone, Debug, PartialEq)]
pub struct Simulation {
    road: Road,
    traffic: Vec<Vehicle>,
    drivers: Vec<Vehicle>,
}

impl Simulation {
    pub fn new(road: Road) -> Self {
        Self {
            road,
            traffic: Vec::new(),
            drivers: Vec::new(),
        }
    }

    pub fn road(&self) -> &Road {
        &self.road
    }

    pub fn traffic(&self) -> &[Vehicle] {
        &self.traffic
    }

    pub fn drivers(&self) -> &[Vehicle] {
        &self.drivers
    }

    pub fn drivers_mut(&mut self) -> &mut [Vehicle] {
        &mut self.drivers
    }

    pub fn spawn_traffic(&mut self, vehicle: Vehicle) {
        self.traffic.push(vehicle);
    }

    pub fn spawn_driver(&mut self, vehicle: Vehicle) {
        self.drivers.push(vehicle);
    }

    /// Advances the whole simulation by one tick.
    pub fn tick(&mut self) -> Result<(), NetworkError> {
        for vehicle in &mut self.traffic {
            vehicle.update(self.road.borders(), &[])?;
        }

        let traffic_hulls: Vec<Hull> = self.traffic.iter().map(Vehicle::hull).collect();
        for vehicle in &mut self.drivers {
            vehicle.update(self.road.borders(), &traffic_hulls)?;
        }

        Ok(())
    }
}
