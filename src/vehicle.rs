//! Simulated vehicle agents.
//!
//! Each tick a vehicle perceives the traffic lights and the other vehicles,
//! decides a target speed, moves smoothly toward it, and progresses along
//! its route of street segments. A vehicle only writes its own state; the
//! rest of the world reaches it as read-only snapshots.

pub use self::profile::{BehaviorProfile, VehicleKind};
use crate::event::{Event, VehicleEvent};
use crate::map::{Map, Segment};
use crate::math::{self, Point2d};
use crate::{LightSet, SegmentId, VehicleId};
use rand::Rng;
use smallvec::SmallVec;
use std::f64::consts::{FRAC_PI_3, FRAC_PI_4};

mod profile;

/// The distance under which a vehicle considers a traffic light.
const LIGHT_DETECT_DIST: f64 = 80.0;

/// The half-angle of the cone in which a light counts as "ahead".
const LIGHT_CONE: f64 = FRAC_PI_3;

/// The half-angle of the cone in which another vehicle counts as "ahead".
const FOLLOW_CONE: f64 = FRAC_PI_4;

/// Below this gap the follower matches half the leader's speed.
const FOLLOW_NEAR_DIST: f64 = 40.0;

/// Below this gap the follower matches 80% of the leader's speed.
const FOLLOW_FAR_DIST: f64 = 60.0;

/// Base acceleration per tick, scaled by the aggressiveness trait.
const BASE_ACCEL: f64 = 0.08;

/// Fixed deceleration per tick.
const BRAKE_DECEL: f64 = 0.15;

/// Speeds below this count as stopped when classifying events.
const STOPPED_SPEED: f64 = 0.5;

/// Speed deltas above this count as a significant change.
const SIGNIFICANT_DELTA: f64 = 1.0;

/// Only every Nth significant speed change is reported.
const SPEED_EVENT_EVERY: usize = 5;

/// Minimum simulated seconds between lane-change notifications.
const LANE_EVENT_GAP_SEC: f64 = 5.0;

/// Per-tick chance that a minibus begins a passenger stop.
const PASSENGER_STOP_CHANCE: f64 = 0.001;

/// A read-only snapshot of another vehicle, rebuilt each tick.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Neighbor {
    pub id: VehicleId,
    pub position: Point2d,
    pub vel: f64,
}

/// A simulated vehicle.
pub struct Vehicle {
    /// The vehicle's ID.
    id: VehicleId,
    /// The kind of the vehicle.
    kind: VehicleKind,
    /// The body color, drawn from the kind's palette.
    color: [u8; 3],
    /// The behavior profile, drawn once at creation.
    profile: BehaviorProfile,
    /// The maximum speed, from kind, street category and a random factor.
    max_vel: f64,
    /// The current position in world space.
    position: Point2d,
    /// The current heading in radians.
    heading: f64,
    /// The current speed.
    vel: f64,
    /// The speed the vehicle is steering toward.
    target_vel: f64,
    /// The route, including the segment the vehicle starts on.
    route: SmallVec<[SegmentId; 8]>,
    /// The index of the segment currently being traveled.
    cursor: usize,
    /// Remaining ticks of an in-progress passenger stop.
    stop_ticks: u32,
    /// The total distance traveled.
    distance: f64,
    /// The number of significant speed changes so far.
    speed_changes: usize,
    /// The simulated time the vehicle was created at.
    created_at: f64,
    /// The simulated time of the last lane-change notification.
    last_lane_event: f64,
}

impl Vehicle {
    /// Creates a new vehicle on the given segment.
    pub(crate) fn new(
        id: VehicleId,
        kind: VehicleKind,
        position: Point2d,
        segment: &Segment,
        route: SmallVec<[SegmentId; 8]>,
        now: f64,
    ) -> Self {
        let mut rng = rand::thread_rng();
        let palette = kind.palette();
        let color = palette[rng.gen_range(0..palette.len())];
        let max_vel =
            kind.base_speed() * segment.category.speed_factor() * rng.gen_range(0.8..1.2);
        Self {
            id,
            kind,
            color,
            profile: BehaviorProfile::sample(kind, &mut rng),
            max_vel,
            position,
            heading: segment.bearing(),
            vel: 0.0,
            target_vel: 0.0,
            route,
            cursor: 0,
            stop_ticks: 0,
            distance: 0.0,
            speed_changes: 0,
            created_at: now,
            last_lane_event: now,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The kind of the vehicle.
    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    /// The body color of the vehicle.
    pub fn color(&self) -> [u8; 3] {
        self.color
    }

    /// The behavior profile of the vehicle.
    pub fn profile(&self) -> &BehaviorProfile {
        &self.profile
    }

    /// The physical size of the vehicle as (length, width).
    pub fn size(&self) -> (f64, f64) {
        self.kind.size()
    }

    /// The current position of the vehicle in world space.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// The current heading of the vehicle in radians.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// The current speed of the vehicle.
    pub fn vel(&self) -> f64 {
        self.vel
    }

    /// The speed the vehicle is currently steering toward.
    pub fn target_vel(&self) -> f64 {
        self.target_vel
    }

    /// The maximum speed of the vehicle.
    pub fn max_vel(&self) -> f64 {
        self.max_vel
    }

    /// The total distance the vehicle has traveled.
    pub fn distance_traveled(&self) -> f64 {
        self.distance
    }

    /// Whether the vehicle is currently stopped.
    pub fn has_stopped(&self) -> bool {
        self.vel < STOPPED_SPEED
    }

    /// Whether the vehicle is pulled over for passengers.
    pub fn in_passenger_stop(&self) -> bool {
        self.stop_ticks > 0
    }

    /// The segment the vehicle is currently traveling, if any.
    pub fn segment_id(&self) -> Option<SegmentId> {
        self.route.get(self.cursor).copied()
    }

    /// The number of segments on the route and the cursor into it.
    pub fn route_progress(&self) -> (usize, usize) {
        (self.cursor, self.route.len())
    }

    /// Updates the vehicle for one tick.
    /// Returns `false` when the route is exhausted and the vehicle
    /// should be removed.
    ///
    /// # Parameters
    /// * `now` - The current simulated time in seconds
    /// * `tick_rate` - The number of ticks per simulated second
    /// * `neighbors` - A snapshot of every active vehicle, including this one
    /// * `lights` - The traffic lights
    /// * `map` - The street map
    /// * `events` - The queue notifications are pushed onto
    pub(crate) fn update(
        &mut self,
        now: f64,
        tick_rate: f64,
        neighbors: &[Neighbor],
        lights: &LightSet,
        map: &Map,
        events: &mut Vec<Event>,
    ) -> bool {
        if self.cursor >= self.route.len() {
            self.emit_complete(now, events);
            return false;
        }

        if self.progress_on_segment(map) >= 1.0 {
            self.cursor += 1;
            if self.cursor >= self.route.len() {
                self.emit_complete(now, events);
                return false;
            }
            self.heading = map.segment(self.route[self.cursor]).bearing();
            if now - self.last_lane_event > LANE_EVENT_GAP_SEC {
                self.emit(events, VehicleEvent::LaneChange);
                self.last_lane_event = now;
            }
        }

        let prev_vel = self.vel;
        self.target_vel = self.decide_target_vel(neighbors, lights);
        self.apply_kind_behavior(tick_rate, events);
        self.integrate_vel();

        if (self.vel - prev_vel).abs() > SIGNIFICANT_DELTA {
            self.speed_changes += 1;
            if self.speed_changes % SPEED_EVENT_EVERY == 0 {
                self.emit(events, self.classify_speed_event(prev_vel));
            }
        }

        self.advance_position();
        true
    }

    /// How far along the current segment the vehicle is, in `[0, 1]`.
    /// Measured as distance from the segment's start, so a degenerate
    /// segment is always complete.
    fn progress_on_segment(&self, map: &Map) -> f64 {
        let segment = map.segment(self.route[self.cursor]);
        let total = segment.length();
        if total <= 0.0 {
            return 1.0;
        }
        f64::min(math::distance(segment.start, self.position) / total, 1.0)
    }

    /// Decides the speed to steer toward, from lights and the vehicle ahead.
    fn decide_target_vel(&self, neighbors: &[Neighbor], lights: &LightSet) -> f64 {
        let mut target = self.max_vel;

        // Any qualifying non-green light forces a stop
        for (_, light) in lights {
            if self.must_stop_for(light.position(), light.permits_passage()) {
                target = 0.0;
                break;
            }
        }

        if let Some((ahead, gap)) = self.vehicle_ahead(neighbors) {
            if gap < FOLLOW_NEAR_DIST {
                target = f64::min(target, 0.5 * ahead.vel);
            } else if gap < FOLLOW_FAR_DIST {
                target = f64::min(target, 0.8 * ahead.vel);
            }
        }

        target
    }

    /// Whether a light at the given position requires this vehicle to stop.
    fn must_stop_for(&self, light_pos: Point2d, permits_passage: bool) -> bool {
        if permits_passage {
            return false;
        }
        if math::distance(self.position, light_pos) > LIGHT_DETECT_DIST {
            return false;
        }
        let to_light = math::bearing(self.position, light_pos);
        math::angle_difference(self.heading, to_light) < LIGHT_CONE
    }

    /// Finds the nearest other vehicle ahead, and the gap to it.
    fn vehicle_ahead<'a>(&self, neighbors: &'a [Neighbor]) -> Option<(&'a Neighbor, f64)> {
        let mut nearest: Option<(&Neighbor, f64)> = None;
        for other in neighbors {
            if other.id == self.id {
                continue;
            }
            let to_other = math::bearing(self.position, other.position);
            if math::angle_difference(self.heading, to_other) >= FOLLOW_CONE {
                continue;
            }
            let gap = math::distance(self.position, other.position);
            if nearest.map_or(true, |(_, best)| gap < best) {
                nearest = Some((other, gap));
            }
        }
        nearest
    }

    /// Applies kind-specific behavior, currently minibus passenger stops.
    fn apply_kind_behavior(&mut self, tick_rate: f64, events: &mut Vec<Event>) {
        let mut rng = rand::thread_rng();
        if self.profile.passenger_stops
            && self.stop_ticks == 0
            && rng.gen_bool(PASSENGER_STOP_CHANCE)
        {
            let duration = rng.gen_range(1.0..3.0);
            self.stop_ticks = (duration * tick_rate) as u32;
            self.emit(events, VehicleEvent::PassengerStop { duration });
        }

        if self.stop_ticks > 0 {
            self.stop_ticks -= 1;
            self.target_vel = 0.0;
        }
    }

    /// Moves the current speed smoothly toward the target: trait-scaled
    /// acceleration, fixed quicker braking.
    fn integrate_vel(&mut self) {
        if self.vel < self.target_vel {
            let accel = BASE_ACCEL * self.profile.aggressiveness;
            self.vel = f64::min(self.vel + accel, self.target_vel);
        } else {
            self.vel = f64::max(self.vel - BRAKE_DECEL, f64::max(0.0, self.target_vel));
        }
    }

    /// Classifies a reported speed change.
    fn classify_speed_event(&self, prev_vel: f64) -> VehicleEvent {
        if self.vel < STOPPED_SPEED {
            VehicleEvent::Stopped
        } else if self.vel < prev_vel {
            VehicleEvent::Braking
        } else {
            VehicleEvent::Accelerating
        }
    }

    /// Advances the position along the heading, with a small jitter
    /// scaled by impatience. The jitter is the source of lane wander.
    fn advance_position(&mut self) {
        let mut rng = rand::thread_rng();
        let jitter = rng.gen_range(-0.1..0.1) * (1.0 - self.profile.patience);
        let prev = self.position;
        self.position = math::offset(self.position, self.heading + jitter, self.vel);
        self.distance += math::distance(prev, self.position);
    }

    /// Queues a notification for this vehicle.
    fn emit(&self, events: &mut Vec<Event>, event: VehicleEvent) {
        events.push(Event::Vehicle {
            id: self.id,
            kind: self.kind,
            event,
            position: self.position,
        });
    }

    /// Queues the route-completion notification.
    fn emit_complete(&self, now: f64, events: &mut Vec<Event>) {
        self.emit(
            events,
            VehicleEvent::RouteComplete {
                lifetime: now - self.created_at,
                distance: self.distance,
            },
        );
    }
}

#[cfg(test)]
impl Vehicle {
    /// Pins the current and maximum speed, for statistics tests.
    pub(crate) fn force_kinematics(&mut self, vel: f64, max_vel: f64) {
        self.vel = vel;
        self.max_vel = max_vel;
    }
}
