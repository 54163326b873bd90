pub use cgmath;
pub use config::{ConfigError, SimulationConfig};
pub use event::{Event, EventSink, VehicleEvent, Zone};
pub use light::{LightCategory, LightState, TrafficLight};
pub use map::{Intersection, Map, MapError, Orientation, Segment, SegmentCategory};
pub use simulation::Simulation;
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use spawner::TrafficPattern;
pub use stats::TrafficStats;
pub use util::Interval;
pub use vehicle::{BehaviorProfile, Vehicle, VehicleKind};

mod config;
mod event;
mod light;
mod map;
pub mod math;
mod simulation;
mod spawner;
mod stats;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Segment].
    pub struct SegmentId;
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
    /// Unique ID of a [TrafficLight].
    pub struct LightId;
}

type SegmentSet = SlotMap<SegmentId, Segment>;
type VehicleSet = SlotMap<VehicleId, Vehicle>;
type LightSet = SlotMap<LightId, TrafficLight>;
