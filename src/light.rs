//! Per-intersection traffic light state machines.
//!
//! Each light draws its green and red durations once at construction and
//! repeats the same cycle for its whole lifetime. The cycle runs
//! green -> yellow -> red -> green. All times are simulated seconds
//! supplied by the tick driver; a light never reads a wall clock.

use crate::math::Point2d;
use crate::util::Interval;
use rand::Rng;

/// The duration of the yellow phase for every light, in s.
const YELLOW_SEC: f64 = 3.0;

/// The range of the initial phase deadline, in s.
const INITIAL_PHASE: Interval = Interval::new(5.0, 12.0);

/// Remaining time under which a phase change counts as imminent, in s.
const IMMINENT_SEC: f64 = 1.0;

/// The state of a traffic light.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LightState {
    Red,
    Yellow,
    Green,
}

/// The category of a traffic light, which selects its cycle durations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LightCategory {
    /// Lights on main avenues, with longer cycles.
    Primary,
    /// Ordinary lights with shorter cycles.
    Normal,
}

impl LightCategory {
    /// The ranges the green and red durations are drawn from, in s.
    fn duration_ranges(self) -> (Interval, Interval) {
        match self {
            Self::Primary => (Interval::new(8.0, 15.0), Interval::new(6.0, 12.0)),
            Self::Normal => (Interval::new(5.0, 10.0), Interval::new(4.0, 8.0)),
        }
    }
}

/// A traffic light at an intersection.
pub struct TrafficLight {
    /// The position of the light.
    position: Point2d,
    /// The category of the light.
    category: LightCategory,
    /// The current state.
    state: LightState,
    /// The simulated time at which the next phase begins.
    deadline: f64,
    /// The frozen duration of the green phase, in s.
    green_sec: f64,
    /// The frozen duration of the red phase, in s.
    red_sec: f64,
    /// The number of phase changes since construction.
    changes: usize,
}

impl TrafficLight {
    /// Creates a new light at the given position, drawing its phase
    /// durations once. `now` is the current simulated time.
    pub fn new(position: Point2d, category: LightCategory, now: f64) -> Self {
        let mut rng = rand::thread_rng();
        let (green, red) = category.duration_ranges();
        Self {
            position,
            category,
            state: LightState::Green,
            deadline: now + rng.gen_range(INITIAL_PHASE.min..INITIAL_PHASE.max),
            green_sec: rng.gen_range(green.min..green.max),
            red_sec: rng.gen_range(red.min..red.max),
            changes: 0,
        }
    }

    /// The position of the light.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// The category of the light.
    pub fn category(&self) -> LightCategory {
        self.category
    }

    /// The current state of the light.
    pub fn state(&self) -> LightState {
        self.state
    }

    /// The number of phase changes since construction.
    pub fn changes(&self) -> usize {
        self.changes
    }

    /// Whether the light currently permits vehicles to pass.
    pub fn permits_passage(&self) -> bool {
        self.state == LightState::Green
    }

    /// The time remaining in the current phase, in s.
    pub fn time_remaining(&self, now: f64) -> f64 {
        f64::max(self.deadline - now, 0.0)
    }

    /// The percentage of the current phase remaining, in `[0, 100]`.
    pub fn percent_remaining(&self, now: f64) -> f64 {
        100.0 * self.time_remaining(now) / self.phase_duration(self.state)
    }

    /// Whether the light is about to change phase.
    pub fn is_imminent_change(&self, now: f64) -> bool {
        self.time_remaining(now) < IMMINENT_SEC
    }

    /// Advances the light. Returns the new state exactly once
    /// per actual phase change, so callers can narrate it.
    pub fn step(&mut self, now: f64) -> Option<LightState> {
        if now < self.deadline {
            return None;
        }
        let next = match self.state {
            LightState::Green => LightState::Yellow,
            LightState::Yellow => LightState::Red,
            LightState::Red => LightState::Green,
        };
        self.state = next;
        self.deadline = now + self.phase_duration(next);
        self.changes += 1;
        Some(next)
    }

    /// Forces the light into the given state, for external or test control.
    /// The phase lasts `duration` seconds, or the state's frozen duration
    /// when `None`.
    pub fn force_state(&mut self, state: LightState, duration: Option<f64>, now: f64) {
        self.state = state;
        self.deadline = now + duration.unwrap_or_else(|| self.phase_duration(state));
        self.changes += 1;
    }

    /// The frozen duration of the given phase, in s.
    fn phase_duration(&self, state: LightState) -> f64 {
        match state {
            LightState::Green => self.green_sec,
            LightState::Yellow => YELLOW_SEC,
            LightState::Red => self.red_sec,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn light(category: LightCategory) -> TrafficLight {
        TrafficLight::new(Point2d::new(0.0, 0.0), category, 0.0)
    }

    #[test]
    fn durations_fall_within_category_ranges() {
        for _ in 0..50 {
            let primary = light(LightCategory::Primary);
            assert!(primary.green_sec >= 8.0 && primary.green_sec <= 15.0);
            assert!(primary.red_sec >= 6.0 && primary.red_sec <= 12.0);
            assert_eq!(primary.phase_duration(LightState::Yellow), 3.0);

            let normal = light(LightCategory::Normal);
            assert!(normal.green_sec >= 5.0 && normal.green_sec <= 10.0);
            assert!(normal.red_sec >= 4.0 && normal.red_sec <= 8.0);
            assert_eq!(normal.phase_duration(LightState::Yellow), 3.0);
        }
    }

    #[test]
    fn durations_are_frozen_across_cycles() {
        let mut light = light(LightCategory::Normal);
        let (green, red) = (light.green_sec, light.red_sec);
        for _ in 0..20 {
            let now = light.deadline;
            light.step(now);
        }
        assert_eq!(light.green_sec, green);
        assert_eq!(light.red_sec, red);
    }

    #[test]
    fn cycle_order_is_green_yellow_red() {
        let mut light = light(LightCategory::Primary);
        assert_eq!(light.state(), LightState::Green);
        assert_eq!(light.step(light.deadline), Some(LightState::Yellow));
        assert_eq!(light.step(light.deadline), Some(LightState::Red));
        assert_eq!(light.step(light.deadline), Some(LightState::Green));
    }

    #[test]
    fn step_is_a_noop_before_the_deadline() {
        let mut light = light(LightCategory::Normal);
        let before = light.deadline - 0.5;
        assert_eq!(light.step(before), None);
        assert_eq!(light.state(), LightState::Green);
        assert_eq!(light.changes(), 0);
    }

    #[test]
    fn permits_passage_only_when_green() {
        let mut light = light(LightCategory::Normal);
        assert!(light.permits_passage());
        light.force_state(LightState::Yellow, None, 0.0);
        assert!(!light.permits_passage());
        light.force_state(LightState::Red, None, 0.0);
        assert!(!light.permits_passage());
        light.force_state(LightState::Green, None, 0.0);
        assert!(light.permits_passage());
    }

    #[test]
    fn force_state_resets_the_deadline() {
        let mut light = light(LightCategory::Primary);
        light.force_state(LightState::Red, Some(7.0), 100.0);
        assert_eq!(light.state(), LightState::Red);
        assert_approx_eq!(light.time_remaining(100.0), 7.0);
        assert_approx_eq!(light.time_remaining(103.0), 4.0);

        // Without an explicit duration, the frozen duration applies
        light.force_state(LightState::Yellow, None, 200.0);
        assert_approx_eq!(light.time_remaining(200.0), 3.0);
        assert_approx_eq!(light.percent_remaining(200.0), 100.0);
        assert_approx_eq!(light.percent_remaining(201.5), 50.0);
    }

    #[test]
    fn imminent_change_near_the_deadline() {
        let mut light = light(LightCategory::Normal);
        light.force_state(LightState::Green, Some(5.0), 0.0);
        assert!(!light.is_imminent_change(0.0));
        assert!(light.is_imminent_change(4.5));
        assert!(light.is_imminent_change(10.0));
    }
}
