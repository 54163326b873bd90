use std::time::{Duration, Instant};

use traffic_microsim::math::Point2d;
use traffic_microsim::{
    Event, EventSink, Intersection, LightCategory, Map, Orientation, Segment, SegmentCategory,
    Simulation, SimulationConfig, VehicleEvent,
};

/// Prints a human-readable line per simulation event.
struct ConsoleNarrator;

impl EventSink for ConsoleNarrator {
    fn notify(&mut self, event: &Event) {
        match event {
            Event::Vehicle {
                kind,
                event,
                position,
                ..
            } => {
                let what = match event {
                    VehicleEvent::Created => "enters the streets".to_string(),
                    VehicleEvent::Stopped => "comes to a halt".to_string(),
                    VehicleEvent::Accelerating => "picks up speed".to_string(),
                    VehicleEvent::Braking => "brakes".to_string(),
                    VehicleEvent::LaneChange => "turns onto another street".to_string(),
                    VehicleEvent::RouteComplete { lifetime, distance } => {
                        format!("finishes its route after {lifetime:.1}s and {distance:.0} units")
                    }
                    VehicleEvent::PassengerStop { duration } => {
                        format!("pulls over for passengers ({duration:.1}s)")
                    }
                };
                println!("{kind:?} {what} at ({:.0}, {:.0})", position.x, position.y);
            }
            Event::LightChanged {
                position, state, ..
            } => {
                println!(
                    "light at ({:.0}, {:.0}) turns {state:?}",
                    position.x, position.y
                );
            }
            Event::Congestion {
                zone,
                percent,
                critical,
            } => {
                if *critical {
                    println!("congestion alert: {zone:?} is at {percent:.1}%");
                } else {
                    println!("congestion in {zone:?} cleared ({percent:.1}%)");
                }
            }
        }
    }
}

/// A small hand-authored map: two avenues, a cross street and a
/// cobblestone lane, with lights on the main crossings.
fn demo_map() -> Map {
    let segment = |start: (f64, f64),
                   end: (f64, f64),
                   width: f64,
                   category: SegmentCategory,
                   orientation: Orientation,
                   speed: f64| Segment {
        start: Point2d::new(start.0, start.1),
        end: Point2d::new(end.0, end.1),
        width,
        category,
        orientation,
        speed_limit: speed,
    };

    use Orientation::{Horizontal, Vertical};
    use SegmentCategory::{Cobblestone, Primary, Secondary};

    let segments = vec![
        segment((0.0, 400.0), (1600.0, 400.0), 45.0, Primary, Horizontal, 3.0),
        segment((1600.0, 425.0), (0.0, 425.0), 45.0, Primary, Horizontal, 3.0),
        segment((800.0, 0.0), (800.0, 1000.0), 40.0, Primary, Vertical, 2.8),
        segment((825.0, 1000.0), (825.0, 0.0), 40.0, Primary, Vertical, 2.8),
        segment((0.0, 700.0), (1600.0, 700.0), 28.0, Secondary, Horizontal, 2.0),
        segment((400.0, 0.0), (400.0, 1000.0), 25.0, Secondary, Vertical, 1.8),
        segment((200.0, 320.0), (900.0, 340.0), 22.0, Cobblestone, Horizontal, 1.5),
    ];

    let intersections = vec![
        Intersection {
            position: Point2d::new(800.0, 400.0),
            category: LightCategory::Primary,
        },
        Intersection {
            position: Point2d::new(400.0, 400.0),
            category: LightCategory::Primary,
        },
        Intersection {
            position: Point2d::new(800.0, 700.0),
            category: LightCategory::Normal,
        },
        Intersection {
            position: Point2d::new(400.0, 700.0),
            category: LightCategory::Normal,
        },
    ];

    Map::new(segments, intersections).expect("demo map is valid")
}

fn main() {
    env_logger::init();

    let config = SimulationConfig::default();
    let mut sim = Simulation::new(config, demo_map()).expect("default config is valid");
    sim.add_sink(Box::new(ConsoleNarrator));

    let tick = Duration::from_secs_f64(1.0 / config.tick_rate);
    let started = Instant::now();

    // One simulated minute at the configured rate
    for _ in 0..(60.0 * config.tick_rate) as usize {
        let frame_start = Instant::now();
        sim.step();
        if let Some(remaining) = tick.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    let stats = sim.stats();
    println!(
        "ran {} frames in {:.1}s: {} vehicles generated, peak {}, final congestion {:.1}%",
        sim.frame(),
        started.elapsed().as_secs_f64(),
        stats.generated,
        sim.peak_vehicles(),
        stats.congestion
    );
}
