//! Discrete event notifications emitted by the simulation.
//!
//! Events carry typed payloads and are queued during a tick, then flushed
//! to every registered [EventSink] once the tick completes. Sinks receive
//! events synchronously and must not block.

use crate::math::Point2d;
use crate::util::Interval;
use crate::{LightId, LightState, VehicleId, VehicleKind};

/// A discrete event in the life of a vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VehicleEvent {
    /// The vehicle entered the simulation.
    Created,
    /// The vehicle's speed dropped below 0.5.
    Stopped,
    /// The vehicle sped up significantly.
    Accelerating,
    /// The vehicle slowed down significantly.
    Braking,
    /// The vehicle moved onto the next segment of its route.
    LaneChange,
    /// The vehicle finished its route and left the simulation.
    RouteComplete {
        /// The vehicle's lifetime in simulated seconds.
        lifetime: f64,
        /// The total distance the vehicle traveled.
        distance: f64,
    },
    /// A minibus pulled over to pick up passengers.
    PassengerStop {
        /// The duration of the stop in simulated seconds.
        duration: f64,
    },
}

/// A zone of the map, used for congestion analysis.
///
/// Zones overlap: a vehicle in the far north-east is counted in both the
/// north and east reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Zone {
    Centre,
    North,
    South,
    East,
    West,
}

impl Zone {
    /// All the zones, in reporting order.
    pub const ALL: [Zone; 5] = [Zone::Centre, Zone::North, Zone::South, Zone::East, Zone::West];

    /// The rectangle covered by the zone, as x and y intervals,
    /// for a map with the given logical bounds.
    pub fn rect(self, width: f64, height: f64) -> (Interval, Interval) {
        match self {
            Zone::Centre => (
                Interval::new(0.25 * width, 0.5 * width),
                Interval::new(0.3 * height, 0.7 * height),
            ),
            Zone::North => (Interval::new(0.0, width), Interval::new(0.0, 0.3 * height)),
            Zone::South => (Interval::new(0.0, width), Interval::new(0.7 * height, height)),
            Zone::East => (Interval::new(0.5 * width, width), Interval::new(0.0, height)),
            Zone::West => (Interval::new(0.0, 0.25 * width), Interval::new(0.0, height)),
        }
    }

    /// Whether the given position lies within the zone.
    pub fn contains(self, position: Point2d, width: f64, height: f64) -> bool {
        let (x, y) = self.rect(width, height);
        x.contains(position.x) && y.contains(position.y)
    }
}

/// An event notification emitted by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Something happened to a vehicle.
    Vehicle {
        id: VehicleId,
        kind: VehicleKind,
        event: VehicleEvent,
        position: Point2d,
    },
    /// A traffic light changed phase.
    LightChanged {
        id: LightId,
        position: Point2d,
        state: LightState,
        /// Whether the change was forced rather than cyclic.
        forced: bool,
    },
    /// A zone's congestion crossed a reporting threshold.
    Congestion {
        zone: Zone,
        /// The share of vehicles in the zone under half their max speed.
        percent: f64,
        /// True when congestion became critical, false when it cleared.
        critical: bool,
    },
}

/// An external listener for simulation events, such as a narrator,
/// a logger or a UI. Implementations must not block the tick.
pub trait EventSink {
    /// Receives a single event.
    fn notify(&mut self, event: &Event);
}

impl<F: FnMut(&Event)> EventSink for F {
    fn notify(&mut self, event: &Event) {
        self(event)
    }
}
