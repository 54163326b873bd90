//! The simulation clock and tick driver.
//!
//! One `step` call advances simulated time, the traffic lights, every
//! vehicle and the aggregate statistics, then flushes the events queued
//! along the way to the registered sinks. All mutable state is owned by
//! the driver; vehicles see the rest of the world as read-only snapshots.

use crate::config::{validate_hour, ConfigError, SimulationConfig};
use crate::event::{Event, EventSink, VehicleEvent, Zone};
use crate::light::{LightState, TrafficLight};
use crate::map::Map;
use crate::spawner::Spawner;
use crate::stats::TrafficStats;
use crate::vehicle::{Neighbor, Vehicle};
use crate::{LightId, VehicleId, LightSet, VehicleSet};
use log::{debug, info, warn};
use rand::Rng;
use std::collections::HashSet;

/// The chance per tick of attempting one spawn.
const SPAWN_ROLL: f64 = 0.4;

/// The amount the simulated hour advances per tick.
const HOUR_PER_TICK: f64 = 0.001;

/// The interval between periodic traffic reports, in simulated s.
const REPORT_INTERVAL_SEC: f64 = 15.0;

/// Zone congestion above this raises a critical alert.
const CONGESTION_CRITICAL: f64 = 80.0;

/// Zone congestion below this clears a raised alert.
const CONGESTION_CLEARED: f64 = 60.0;

/// A traffic simulation over a fixed street map.
pub struct Simulation {
    /// The validated configuration.
    config: SimulationConfig,
    /// The street map.
    map: Map,
    /// The traffic lights, one per map intersection.
    lights: LightSet,
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// The arrival process.
    spawner: Spawner,
    /// The aggregate statistics, recomputed each tick.
    stats: TrafficStats,
    /// The registered event sinks.
    sinks: Vec<Box<dyn EventSink>>,
    /// Events queued during the current tick.
    queued: Vec<Event>,
    /// The simulated time in s.
    time: f64,
    /// The simulated hour, in `[0, 24)`.
    hour: f64,
    /// The current frame of simulation.
    frame: usize,
    /// Whether stepping is suspended.
    paused: bool,
    /// Whether queued events reach the sinks.
    events_enabled: bool,
    /// The high-water mark of simultaneous vehicles.
    peak_vehicles: usize,
    /// The zones currently in a critical congestion state.
    congested_zones: HashSet<Zone>,
    /// The simulated time of the last periodic report.
    last_report: f64,
}

impl Simulation {
    /// Creates a new simulation from a validated configuration and map,
    /// installing one traffic light per map intersection.
    pub fn new(config: SimulationConfig, map: Map) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut lights = LightSet::default();
        for intersection in map.intersections() {
            lights.insert(TrafficLight::new(
                intersection.position,
                intersection.category,
                0.0,
            ));
        }

        info!(
            "simulation ready: {} segments, {} lights, capacity {}, starting at {:02}:00",
            map.num_segments(),
            lights.len(),
            config.max_vehicles,
            config.initial_hour as u32
        );

        Ok(Self {
            hour: config.initial_hour,
            config,
            map,
            lights,
            vehicles: VehicleSet::default(),
            spawner: Spawner::new(),
            stats: TrafficStats::default(),
            sinks: vec![],
            queued: vec![],
            time: 0.0,
            frame: 0,
            paused: false,
            events_enabled: config.events_enabled,
            peak_vehicles: 0,
            congested_zones: HashSet::new(),
            last_report: 0.0,
        })
    }

    /// Advances the simulation by one tick. Does nothing while paused.
    pub fn step(&mut self) {
        if self.paused {
            return;
        }

        self.advance_clock();
        if rand::thread_rng().gen_bool(SPAWN_ROLL) {
            self.try_spawn();
        }
        self.update_lights();
        self.update_vehicles();
        self.stats.recompute(&self.vehicles);
        self.peak_vehicles = usize::max(self.peak_vehicles, self.vehicles.len());
        self.analyze_congestion();
        self.periodic_report();
        self.flush_events();
    }

    /// Pauses the simulation; `step` becomes a no-op.
    pub fn pause(&mut self) {
        self.paused = true;
        info!("simulation paused");
    }

    /// Resumes a paused simulation.
    pub fn resume(&mut self) {
        self.paused = false;
        info!("simulation resumed");
    }

    /// Whether the simulation is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Attempts to spawn one vehicle immediately, subject to the usual
    /// admission policy. Returns the new vehicle's ID on success.
    pub fn spawn_now(&mut self) -> Option<VehicleId> {
        self.try_spawn()
    }

    /// Sets the simulated hour, shifting the active traffic pattern.
    pub fn set_hour(&mut self, hour: f64) -> Result<(), ConfigError> {
        validate_hour(hour)?;
        self.hour = hour;
        info!("simulated hour set to {hour:.1}");
        Ok(())
    }

    /// Enables or disables delivery of events to the sinks.
    pub fn set_events_enabled(&mut self, enabled: bool) {
        self.events_enabled = enabled;
    }

    /// Whether events are being delivered to the sinks.
    pub fn events_enabled(&self) -> bool {
        self.events_enabled
    }

    /// Registers an event sink.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Restarts the simulation: clears the vehicles and every counter,
    /// and resets the clock to the configured initial hour. The map and
    /// the lights, with their frozen cycle durations, are kept.
    pub fn restart(&mut self) {
        self.vehicles.clear();
        self.stats.reset();
        self.spawner.reset();
        self.hour = self.config.initial_hour;
        self.congested_zones.clear();
        self.queued.clear();
        info!("simulation restarted");
    }

    /// Forces a traffic light into the given state, for external control.
    pub fn force_light(&mut self, id: LightId, state: LightState, duration: Option<f64>) {
        let light = &mut self.lights[id];
        light.force_state(state, duration, self.time);
        self.queued.push(Event::LightChanged {
            id,
            position: light.position(),
            state,
            forced: true,
        });
    }

    /// Gets a snapshot of the aggregate statistics. Hand clones to any
    /// concurrently running reporter, never references into the driver.
    pub fn stats(&self) -> TrafficStats {
        self.stats.clone()
    }

    /// The street map.
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// The configuration the simulation was built with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The current simulated time in s.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The current simulated hour.
    pub fn hour(&self) -> f64 {
        self.hour
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// The high-water mark of simultaneous active vehicles.
    pub fn peak_vehicles(&self) -> usize {
        self.peak_vehicles
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Returns an iterator over all the traffic lights in the simulation.
    pub fn iter_lights(&self) -> impl Iterator<Item = (LightId, &TrafficLight)> {
        self.lights.iter()
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    /// Advances the simulated clock and hour, wrapping the hour at 24.
    fn advance_clock(&mut self) {
        self.time += 1.0 / self.config.tick_rate;
        self.hour += HOUR_PER_TICK;
        if self.hour >= 24.0 {
            self.hour = 0.0;
        }
        self.frame += 1;
    }

    /// Runs one admission check and spawns a vehicle when admitted.
    fn try_spawn(&mut self) -> Option<VehicleId> {
        let plan = self.spawner.try_spawn(
            self.time,
            self.hour,
            &self.map,
            self.vehicles.len(),
            self.config.max_vehicles,
        )?;

        let segment = self.map.segment(plan.segment);
        let now = self.time;
        let id = self.vehicles.insert_with_key(|id| {
            Vehicle::new(id, plan.kind, plan.position, segment, plan.route, now)
        });
        self.stats.generated += 1;
        self.peak_vehicles = usize::max(self.peak_vehicles, self.vehicles.len());

        let vehicle = &self.vehicles[id];
        self.queued.push(Event::Vehicle {
            id,
            kind: vehicle.kind(),
            event: VehicleEvent::Created,
            position: vehicle.position(),
        });
        debug!(
            "spawned {:?} at ({:.0}, {:.0}), route of {} segments",
            vehicle.kind(),
            vehicle.position().x,
            vehicle.position().y,
            vehicle.route_progress().1
        );
        Some(id)
    }

    /// Steps every traffic light, queueing one event per actual change.
    fn update_lights(&mut self) {
        for (id, light) in &mut self.lights {
            if let Some(state) = light.step(self.time) {
                self.queued.push(Event::LightChanged {
                    id,
                    position: light.position(),
                    state,
                    forced: false,
                });
            }
        }
    }

    /// Updates every vehicle against a snapshot of the others,
    /// removing those that completed their route.
    fn update_vehicles(&mut self) {
        let neighbors: Vec<Neighbor> = self
            .vehicles
            .iter()
            .map(|(id, v)| Neighbor {
                id,
                position: v.position(),
                vel: v.vel(),
            })
            .collect();

        let mut completed = vec![];
        for (id, vehicle) in &mut self.vehicles {
            let alive = vehicle.update(
                self.time,
                self.config.tick_rate,
                &neighbors,
                &self.lights,
                &self.map,
                &mut self.queued,
            );
            if !alive {
                completed.push(id);
            }
        }

        for id in completed {
            self.vehicles.remove(id);
        }
    }

    /// Analyzes per-zone congestion with hysteresis: a zone raises one
    /// critical event above [CONGESTION_CRITICAL] percent and clears it
    /// once it falls below [CONGESTION_CLEARED].
    fn analyze_congestion(&mut self) {
        let (width, height) = (self.config.width, self.config.height);
        for zone in Zone::ALL {
            let in_zone: Vec<&Vehicle> = self
                .vehicles
                .values()
                .filter(|v| zone.contains(v.position(), width, height))
                .collect();
            if in_zone.is_empty() {
                continue;
            }
            let slow = in_zone
                .iter()
                .filter(|v| v.vel() < 0.5 * v.max_vel())
                .count();
            let percent = 100.0 * slow as f64 / in_zone.len() as f64;

            if percent > CONGESTION_CRITICAL && self.congested_zones.insert(zone) {
                warn!("critical congestion in {zone:?} ({percent:.1}%)");
                self.queued.push(Event::Congestion {
                    zone,
                    percent,
                    critical: true,
                });
            } else if percent < CONGESTION_CLEARED && self.congested_zones.remove(&zone) {
                info!("congestion in {zone:?} cleared ({percent:.1}%)");
                self.queued.push(Event::Congestion {
                    zone,
                    percent,
                    critical: false,
                });
            }
        }
    }

    /// Logs a compact traffic report every [REPORT_INTERVAL_SEC].
    fn periodic_report(&mut self) {
        if self.time - self.last_report < REPORT_INTERVAL_SEC {
            return;
        }
        self.last_report = self.time;
        info!(
            "traffic report {:02}:{:02} - {} vehicles, mean speed {:.1}, congestion {:.1}%",
            self.hour as u32,
            (self.hour.fract() * 60.0) as u32,
            self.stats.active,
            self.stats.mean_speed,
            self.stats.congestion
        );
    }

    /// Delivers the events queued during this tick to every sink.
    /// While the sink surface is disabled, queued events are dropped.
    fn flush_events(&mut self) {
        if !self.events_enabled {
            self.queued.clear();
            return;
        }
        for event in self.queued.drain(..) {
            for sink in &mut self.sinks {
                sink.notify(&event);
            }
        }
    }
}
