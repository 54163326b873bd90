//! Aggregate traffic statistics, recomputed from scratch every tick.

use crate::vehicle::VehicleKind;
use crate::VehicleSet;
use itertools::Itertools;

/// A snapshot of the aggregate state of the traffic.
///
/// Everything except `generated` is recomputed from the active vehicle
/// set each tick. Clone a snapshot before handing it to a concurrently
/// running reporter; the live value belongs to the tick driver.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrafficStats {
    /// Active cars.
    pub cars: usize,
    /// Active minibuses.
    pub minibuses: usize,
    /// Active motorcycles.
    pub motorcycles: usize,
    /// Active taxis.
    pub taxis: usize,
    /// The number of active vehicles.
    pub active: usize,
    /// The total number of vehicles spawned since the last restart.
    pub generated: usize,
    /// The mean speed of the active vehicles.
    pub mean_speed: f64,
    /// The share of vehicles under half their own max speed, in `[0, 100]`.
    pub congestion: f64,
}

impl TrafficStats {
    /// Recomputes every derived field from the active vehicle set.
    /// Only the monotonic `generated` counter carries over.
    pub(crate) fn recompute(&mut self, vehicles: &VehicleSet) {
        let counts = vehicles.values().map(|v| v.kind()).counts();
        self.cars = counts.get(&VehicleKind::Car).copied().unwrap_or(0);
        self.minibuses = counts.get(&VehicleKind::Minibus).copied().unwrap_or(0);
        self.motorcycles = counts.get(&VehicleKind::Motorcycle).copied().unwrap_or(0);
        self.taxis = counts.get(&VehicleKind::Taxi).copied().unwrap_or(0);
        self.active = vehicles.len();

        if vehicles.is_empty() {
            self.mean_speed = 0.0;
            self.congestion = 0.0;
            return;
        }

        let total_speed: f64 = vehicles.values().map(|v| v.vel()).sum();
        self.mean_speed = total_speed / vehicles.len() as f64;

        let slow = vehicles
            .values()
            .filter(|v| v.vel() < 0.5 * v.max_vel())
            .count();
        self.congestion = f64::min(100.0, 100.0 * slow as f64 / vehicles.len() as f64);
    }

    /// The number of active vehicles per kind, summed.
    pub fn total_by_kind(&self) -> usize {
        self.cars + self.minibuses + self.motorcycles + self.taxis
    }

    /// The percentage of active vehicles of the given kind.
    pub fn percent_of_kind(&self, kind: VehicleKind) -> f64 {
        let total = self.total_by_kind();
        if total == 0 {
            return 0.0;
        }
        let count = match kind {
            VehicleKind::Car => self.cars,
            VehicleKind::Minibus => self.minibuses,
            VehicleKind::Motorcycle => self.motorcycles,
            VehicleKind::Taxi => self.taxis,
        };
        100.0 * count as f64 / total as f64
    }

    /// Clears everything, including the `generated` counter.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
