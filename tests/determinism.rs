use shipsim::{
    build_grid, springs, DestroyOptions, GameParameters, HullGridConfig, MaterialDatabase,
    NoOpStepObserver, Ship, ShipCapacity, ShipEvent, Vec2f, WaveConfig,
};
use std::rc::Rc;

const MATERIALS: &str = r##"{
    "structural_materials": [
        { "name": "Iron", "strength": 0.3, "mass": 400.0, "stiffness": 0.8, "render_color": "#7a7a80", "sound_type": "Metal" },
        { "name": "Oak", "strength": 0.2, "mass": 300.0, "render_color": "#8b5a2b", "sound_type": "Wood" }
    ]
}"##;

fn rough_sea() -> GameParameters {
    GameParameters::new().with_waves(WaveConfig {
        amplitude: 0.8,
        wavelength: 12.0,
        speed: 2.0,
    })
}

fn build_ship() -> Ship {
    let materials = Rc::new(MaterialDatabase::from_json_str("determinism", MATERIALS).unwrap());
    let grid = HullGridConfig { cols: 8, rows: 4, spacing: 1.0, material: 1 };
    let capacity = ShipCapacity {
        points: grid.point_count(),
        springs: grid.spring_count(),
        triangles: grid.triangle_count(),
    };
    let mut ship = Ship::new(7, capacity, materials, &rough_sea());
    build_grid(&mut ship, Vec2f::new(-4.0, -1.5), &grid).unwrap();
    ship.finalize();
    ship
}

fn run(steps: usize) -> (Vec<Vec2f>, Vec<f32>, Vec<ShipEvent>) {
    let parameters = rough_sea();
    let mut ship = build_ship();
    ship.destroy_spring(3, DestroyOptions::FIRE_BREAK_EVENT, 0.0).unwrap();
    ship.attach_bomb(20).unwrap();

    let mut events = Vec::new();
    for step in 0..steps {
        ship.update(step as f32 / 60.0, &parameters, &mut NoOpStepObserver);
        events.extend(ship.drain_events());
    }

    let positions = ship.points().live_indices().map(|p| ship.points().position(p)).collect();
    let water = ship.points().live_indices().map(|p| ship.points().water(p)).collect();
    (positions, water, events)
}

#[test]
fn replay_is_bit_identical() {
    let results: Vec<_> = (0..3).map(|_| run(90)).collect();

    for r in &results[1..] {
        assert_eq!(results[0].0.len(), r.0.len());
        for (a, b) in results[0].0.iter().zip(r.0.iter()) {
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
        }
        for (a, b) in results[0].1.iter().zip(r.1.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        assert_eq!(results[0].2, r.2);
    }
}

#[test]
fn coefficients_depend_only_on_inputs() {
    let parameters = rough_sea();
    let first = springs::calculate_stiffness_coefficient(400.0, 300.0, 0.9, &parameters);
    for _ in 0..10 {
        let again = springs::calculate_stiffness_coefficient(400.0, 300.0, 0.9, &parameters);
        assert_eq!(first.to_bits(), again.to_bits());
    }

    let a = build_ship();
    let b = build_ship();
    for spring in a.springs().live_indices() {
        assert_eq!(a.springs().coefficients(spring), b.springs().coefficients(spring));
    }
}
