//! A vehicle approaching a forced red light brakes to a stop before it.

use traffic_microsim::math::Point2d;
use traffic_microsim::{
    Intersection, LightCategory, LightState, Map, Orientation, Segment, SegmentCategory,
    Simulation, SimulationConfig,
};

fn avenue_with_lights() -> Map {
    Map::new(
        vec![Segment {
            start: Point2d::new(0.0, 500.0),
            end: Point2d::new(1600.0, 500.0),
            width: 40.0,
            category: SegmentCategory::Primary,
            orientation: Orientation::Horizontal,
            speed_limit: 3.0,
        }],
        vec![
            Intersection {
                position: Point2d::new(600.0, 500.0),
                category: LightCategory::Primary,
            },
            Intersection {
                position: Point2d::new(1200.0, 500.0),
                category: LightCategory::Normal,
            },
        ],
    )
    .unwrap()
}

#[test]
fn forced_red_brings_the_vehicle_to_a_stop() {
    let config = SimulationConfig {
        max_vehicles: 1,
        ..Default::default()
    };
    let mut sim = Simulation::new(config, avenue_with_lights()).unwrap();

    // Hold both lights green so the approach is unconstrained
    let light_ids: Vec<_> = sim.iter_lights().map(|(id, _)| id).collect();
    for id in &light_ids {
        sim.force_light(*id, LightState::Green, Some(10_000.0));
    }
    let near_light = sim
        .iter_lights()
        .find(|(_, light)| light.position().x == 600.0)
        .map(|(id, _)| id)
        .unwrap();

    let id = sim.spawn_now().expect("empty simulation admits a spawn");

    // Drive up to 50 units short of the near light
    let mut approached = false;
    for _ in 0..3000 {
        sim.step();
        let vehicle = sim.get_vehicle(id).expect("route is far from finished");
        if vehicle.position().x >= 550.0 && vehicle.vel() > 1.0 {
            approached = true;
            break;
        }
    }
    assert!(approached);

    let vel_before = sim.get_vehicle(id).unwrap().vel();
    sim.force_light(near_light, LightState::Red, Some(100.0));
    sim.step();
    let vel_after = sim.get_vehicle(id).unwrap().vel();
    assert!(vel_after < vel_before);

    // One simulated second later the vehicle is held short of the light
    for _ in 0..60 {
        sim.step();
    }
    let vehicle = sim.get_vehicle(id).unwrap();
    assert!(vehicle.vel() < 0.5);
    assert!(vehicle.position().x < 600.0);
}
