//! Per-kind vehicle data: base speeds, sizes, palettes and the ranges
//! behavior profiles are drawn from.

use crate::util::Interval;
use rand::Rng;

/// The kind of a vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleKind {
    Car,
    Minibus,
    Motorcycle,
    Taxi,
}

impl VehicleKind {
    /// All the vehicle kinds.
    pub const ALL: [VehicleKind; 4] = [
        VehicleKind::Car,
        VehicleKind::Minibus,
        VehicleKind::Motorcycle,
        VehicleKind::Taxi,
    ];

    /// The base speed of the kind, before street and random adjustments.
    pub fn base_speed(self) -> f64 {
        match self {
            Self::Car => 2.5,
            Self::Minibus => 1.8,
            Self::Motorcycle => 3.2,
            Self::Taxi => 2.0,
        }
    }

    /// The physical size of the kind as (length, width) in world units.
    pub fn size(self) -> (f64, f64) {
        match self {
            Self::Car => (22.0, 14.0),
            Self::Minibus => (35.0, 18.0),
            Self::Motorcycle => (14.0, 10.0),
            Self::Taxi => (22.0, 14.0),
        }
    }

    /// The body colors vehicles of this kind are painted with.
    pub fn palette(self) -> &'static [[u8; 3]] {
        match self {
            Self::Car => &[
                [180, 30, 30],
                [30, 80, 180],
                [240, 240, 240],
                [40, 40, 40],
            ],
            Self::Minibus => &[[255, 200, 0], [0, 120, 200]],
            Self::Motorcycle => &[[200, 50, 50], [60, 60, 60]],
            Self::Taxi => &[[255, 255, 0]],
        }
    }
}

/// The behavior profile of a single vehicle, drawn once at creation.
#[derive(Clone, Copy, Debug)]
pub struct BehaviorProfile {
    /// How steadily the vehicle holds its line, in `[0, 1]`.
    /// Low patience produces more lane wander.
    pub patience: f64,
    /// Scales how hard the vehicle accelerates, in `[0, 1]`.
    pub aggressiveness: f64,
    /// The driver's reaction time in s.
    pub reaction_sec: f64,
    /// Whether the vehicle pulls over for passengers (minibuses).
    pub passenger_stops: bool,
    /// Whether the vehicle weaves through traffic (motorcycles).
    pub weaves: bool,
    /// Whether the vehicle cruises for fares (taxis).
    pub seeks_passengers: bool,
}

impl BehaviorProfile {
    /// Draws a behavior profile for the given kind.
    pub fn sample(kind: VehicleKind, rng: &mut impl Rng) -> Self {
        let (patience, aggressiveness, reaction) = match kind {
            VehicleKind::Car => (
                Interval::new(0.7, 1.0),
                Interval::new(0.3, 0.7),
                Interval::new(0.5, 1.0),
            ),
            VehicleKind::Minibus => (
                Interval::new(0.4, 0.8),
                Interval::new(0.6, 0.9),
                Interval::new(0.8, 1.5),
            ),
            VehicleKind::Motorcycle => (
                Interval::new(0.2, 0.5),
                Interval::new(0.8, 1.0),
                Interval::new(0.2, 0.5),
            ),
            VehicleKind::Taxi => (
                Interval::new(0.5, 0.8),
                Interval::new(0.4, 0.8),
                Interval::new(0.6, 1.0),
            ),
        };
        Self {
            patience: rng.gen_range(patience.min..patience.max),
            aggressiveness: rng.gen_range(aggressiveness.min..aggressiveness.max),
            reaction_sec: rng.gen_range(reaction.min..reaction.max),
            passenger_stops: kind == VehicleKind::Minibus,
            weaves: kind == VehicleKind::Motorcycle,
            seeks_passengers: kind == VehicleKind::Taxi,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn profiles_stay_within_kind_ranges() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let p = BehaviorProfile::sample(VehicleKind::Motorcycle, &mut rng);
            assert!(p.patience >= 0.2 && p.patience <= 0.5);
            assert!(p.aggressiveness >= 0.8 && p.aggressiveness <= 1.0);
            assert!(p.reaction_sec >= 0.2 && p.reaction_sec <= 0.5);
            assert!(p.weaves);
            assert!(!p.passenger_stops);
        }
    }

    #[test]
    fn kind_flags_are_exclusive() {
        let mut rng = rand::thread_rng();
        let car = BehaviorProfile::sample(VehicleKind::Car, &mut rng);
        assert!(!car.passenger_stops && !car.weaves && !car.seeks_passengers);
        let minibus = BehaviorProfile::sample(VehicleKind::Minibus, &mut rng);
        assert!(minibus.passenger_stops);
        let taxi = BehaviorProfile::sample(VehicleKind::Taxi, &mut rng);
        assert!(taxi.seeks_passengers);
    }

    #[test]
    fn every_kind_has_a_palette() {
        for kind in VehicleKind::ALL {
            assert!(!kind.palette().is_empty());
            assert!(kind.base_speed() > 0.0);
            let (len, wid) = kind.size();
            assert!(len > 0.0 && wid > 0.0);
        }
    }
}
