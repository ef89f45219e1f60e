use shipsim::{
    build_grid, Characteristics, DestroyOptions, GameParameters, HullGridConfig, MaterialDatabase,
    MaterialId, MaterialSound, NoOpStepObserver, Ship, ShipCapacity, StructuralMaterial, Vec2f,
    WaveConfig,
};
use std::rc::Rc;

fn material(name: &str, mass: f32, is_hull: bool) -> StructuralMaterial {
    StructuralMaterial {
        name: name.to_string(),
        strength: 1.0,
        mass,
        stiffness: 1.0,
        render_color: [0.5, 0.5, 0.5, 1.0],
        is_hull,
        sound: MaterialSound::Metal,
    }
}

const DECK: MaterialId = 0;
const PLATE: MaterialId = 1;
const CORK: MaterialId = 2;
const LEAD: MaterialId = 3;

fn materials() -> Rc<MaterialDatabase> {
    let mut db = MaterialDatabase::new();
    db.add_structural(material("Deck", 1.0, false)).unwrap();
    db.add_structural(material("Plate", 1.0, true)).unwrap();
    db.add_structural(material("Cork", 500.0, false)).unwrap();
    db.add_structural(material("Lead", 2000.0, false)).unwrap();
    Rc::new(db)
}

fn pinned_pair(
    material: MaterialId,
    characteristics: Characteristics,
    y: f32,
    parameters: &GameParameters,
) -> Ship {
    let capacity = ShipCapacity { points: 2, springs: 1, triangles: 0 };
    let mut ship = Ship::new(0, capacity, materials(), parameters);
    let a = ship.add_point(Vec2f::new(0.0, y), material, None).unwrap();
    let b = ship.add_point(Vec2f::new(1.0, y), material, None).unwrap();
    ship.add_spring(a, b, characteristics).unwrap();
    ship.finalize();
    ship.points_mut().pin(a);
    ship.points_mut().pin(b);
    ship
}

#[test]
fn water_relaxes_across_permeable_spring() {
    let parameters = GameParameters::new();
    let mut ship = pinned_pair(DECK, Characteristics::empty(), 5.0, &parameters);
    ship.points_mut().set_water(0, 1.0);

    ship.update(0.0, &parameters, &mut NoOpStepObserver);

    assert_eq!(ship.springs().water_permeability(0), 1.0);
    assert_eq!(ship.points().water(0), 0.5);
    assert_eq!(ship.points().water(1), 0.5);
}

/// A hub point joined to four pinned rim points, all above the sea.
fn pinned_star(hub_water: f32, rim_water: f32, parameters: &GameParameters) -> Ship {
    let capacity = ShipCapacity { points: 5, springs: 4, triangles: 0 };
    let mut ship = Ship::new(0, capacity, materials(), parameters);
    let hub = ship.add_point(Vec2f::new(0.0, 5.0), DECK, None).unwrap();
    for offset in [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)] {
        let rim = ship.add_point(Vec2f::new(offset.0, 5.0 + offset.1), DECK, None).unwrap();
        ship.add_spring(hub, rim, Characteristics::empty()).unwrap();
    }
    ship.finalize();
    for point in 0..5 {
        ship.points_mut().pin(point);
        ship.points_mut().set_water(point, if point == hub { hub_water } else { rim_water });
    }
    ship
}

fn total_water(ship: &Ship) -> f32 {
    ship.points().live_indices().map(|p| ship.points().water(p)).sum()
}

/// Lowest and highest water among `point` and its spring neighbours.
fn neighbourhood_range(ship: &Ship, point: u32) -> (f32, f32) {
    let own = ship.points().water(point);
    ship.points()
        .connected_springs(point)
        .iter()
        .map(|&s| ship.points().water(ship.springs().other_endpoint_index(s, point)))
        .fold((own, own), |(lo, hi), w| (lo.min(w), hi.max(w)))
}

#[test]
fn dry_hub_fills_without_passing_its_rim() {
    let parameters = GameParameters::new();
    let mut ship = pinned_star(0.2, 0.6, &parameters);
    let before = total_water(&ship);

    ship.update(0.0, &parameters, &mut NoOpStepObserver);

    let hub = ship.points().water(0);
    assert!((hub - 0.4).abs() < 1e-5, "hub at {}", hub);
    for rim in 1..5 {
        let water = ship.points().water(rim);
        assert!((water - 0.55).abs() < 1e-5, "rim {} at {}", rim, water);
        assert!(hub <= water);
    }
    assert!((total_water(&ship) - before).abs() < 1e-5);
}

#[test]
fn flooded_hub_shares_without_creating_water() {
    let parameters = GameParameters::new();
    let mut ship = pinned_star(1.0, 0.0, &parameters);

    ship.update(0.0, &parameters, &mut NoOpStepObserver);
    assert!((ship.points().water(0) - 0.5).abs() < 1e-5);
    assert!((total_water(&ship) - 1.0).abs() < 1e-5);

    for step in 1..300 {
        ship.update(step as f32 / 60.0, &parameters, &mut NoOpStepObserver);
        assert!((total_water(&ship) - 1.0).abs() < 1e-4, "total drifted at step {}", step);
    }
    for point in 0..5 {
        assert!((ship.points().water(point) - 0.2).abs() < 1e-3);
    }
}

#[test]
fn grid_relaxation_stays_within_neighbours() {
    let parameters = GameParameters::new();
    let config = HullGridConfig { cols: 4, rows: 3, spacing: 1.0, material: DECK };
    let capacity = ShipCapacity {
        points: config.point_count(),
        springs: config.spring_count(),
        triangles: config.triangle_count(),
    };
    let mut ship = Ship::new(0, capacity, materials(), &parameters);
    build_grid(&mut ship, Vec2f::new(0.0, 10.0), &config).unwrap();
    ship.finalize();
    for point in 0..config.point_count() {
        ship.points_mut().pin(point);
        ship.points_mut().set_water(point, ((point * 7) % 5) as f32 / 4.0);
    }

    for step in 0..20 {
        let total = total_water(&ship);
        let ranges: Vec<(f32, f32)> = ship.points().live_indices().map(|p| neighbourhood_range(&ship, p)).collect();

        ship.update(step as f32 / 60.0, &parameters, &mut NoOpStepObserver);

        for (point, (lo, hi)) in ship.points().live_indices().zip(ranges) {
            let water = ship.points().water(point);
            assert!(
                water >= lo - 1e-5 && water <= hi + 1e-5,
                "point {} went to {} outside [{}, {}] at step {}",
                point,
                water,
                lo,
                hi,
                step
            );
        }
        assert!((total_water(&ship) - total).abs() < 1e-4);
    }
}

#[test]
fn hull_spring_blocks_water() {
    let parameters = GameParameters::new();
    let mut ship = pinned_pair(PLATE, Characteristics::HULL, 5.0, &parameters);
    ship.points_mut().set_water(0, 1.0);

    for step in 0..10 {
        ship.update(step as f32 / 60.0, &parameters, &mut NoOpStepObserver);
    }

    assert_eq!(ship.springs().water_permeability(0), 0.0);
    assert_eq!(ship.points().water(0), 1.0);
    assert_eq!(ship.points().water(1), 0.0);
}

#[test]
fn water_amounts_stay_within_saturation() {
    let parameters = GameParameters::new().with_water_intake_rate(100.0);
    let mut ship = pinned_pair(DECK, Characteristics::empty(), -20.0, &parameters);
    ship.destroy_spring(0, DestroyOptions::empty(), 0.0).unwrap();

    for step in 0..30 {
        ship.update(step as f32 / 60.0, &parameters, &mut NoOpStepObserver);
        for point in ship.points().live_indices() {
            let water = ship.points().water(point);
            assert!((0.0..=1.0).contains(&water), "water {} at step {}", water, step);
        }
    }
    assert_eq!(ship.points().water(0), 1.0);
}

#[test]
fn breached_points_take_in_water_by_depth() {
    let parameters = GameParameters::new();
    let mut ship = pinned_pair(DECK, Characteristics::empty(), -2.0, &parameters);

    ship.update(0.0, &parameters, &mut NoOpStepObserver);
    assert_eq!(ship.points().water(0), 0.0, "intact points stay dry");

    ship.destroy_spring(0, DestroyOptions::FIRE_BREAK_EVENT, 1.0 / 60.0).unwrap();
    assert!(ship.points().is_leaking(0));
    ship.update(1.0 / 60.0, &parameters, &mut NoOpStepObserver);

    let expected = parameters.water_intake_rate * 2.0 / 60.0;
    assert!((ship.points().water(0) - expected).abs() < 1e-6);
    assert!((ship.points().water(1) - expected).abs() < 1e-6);
}

#[test]
fn hull_points_never_leak() {
    let parameters = GameParameters::new();
    let mut ship = pinned_pair(PLATE, Characteristics::HULL, -2.0, &parameters);
    ship.destroy_spring(0, DestroyOptions::empty(), 0.0).unwrap();
    ship.update(0.0, &parameters, &mut NoOpStepObserver);

    assert!(!ship.points().is_leaking(0));
    assert_eq!(ship.points().water(0), 0.0);
}

fn single_point(material: MaterialId, y: f32, parameters: &GameParameters) -> Ship {
    let capacity = ShipCapacity { points: 1, springs: 0, triangles: 0 };
    let mut ship = Ship::new(0, capacity, materials(), parameters);
    ship.add_point(Vec2f::new(0.0, y), material, None).unwrap();
    ship.finalize();
    ship
}

#[test]
fn light_point_floats_at_surface() {
    let parameters = GameParameters::new();
    let mut ship = single_point(CORK, -1.0, &parameters);

    for step in 0..600 {
        ship.update(step as f32 / 60.0, &parameters, &mut NoOpStepObserver);
    }

    let y = ship.points().position(0).y;
    assert!(y.abs() < 0.2, "cork settled at y = {}", y);
}

#[test]
fn heavy_point_sinks_to_floor() {
    let parameters = GameParameters::new().with_sea_depth(10.0);
    let mut ship = single_point(LEAD, -1.0, &parameters);

    for step in 0..120 {
        ship.update(step as f32 / 60.0, &parameters, &mut NoOpStepObserver);
    }
    let y = ship.points().position(0).y;
    assert!(y < -2.0, "lead still at y = {}", y);

    for step in 120..1200 {
        ship.update(step as f32 / 60.0, &parameters, &mut NoOpStepObserver);
    }
    let y = ship.points().position(0).y;
    assert!((y + 10.0).abs() < 1e-4, "lead should rest on the floor, at y = {}", y);
}

#[test]
fn flooded_point_loses_buoyancy() {
    let parameters = GameParameters::new();
    let mut dry = single_point(CORK, -1.0, &parameters);
    let mut flooded = single_point(CORK, -1.0, &parameters);
    flooded.points_mut().set_water(0, 1.0);

    for step in 0..30 {
        dry.update(step as f32 / 60.0, &parameters, &mut NoOpStepObserver);
        flooded.update(step as f32 / 60.0, &parameters, &mut NoOpStepObserver);
    }

    assert!(dry.points().position(0).y > -1.0);
    assert!(flooded.points().position(0).y < -1.0);
}

#[test]
fn wave_crest_lifts_buoyant_point() {
    let flat = GameParameters::new();
    let wavy = GameParameters::new().with_waves(WaveConfig {
        amplitude: 1.0,
        wavelength: 40.0,
        speed: 0.0,
    });

    // x = 10 is a crest: the surface sits 1 above sea level there.
    let mut on_flat = single_point(CORK, 0.5, &flat);
    let mut on_crest = single_point(CORK, 0.5, &wavy);
    on_flat.points_mut().set_position(0, Vec2f::new(10.0, 0.5));
    on_crest.points_mut().set_position(0, Vec2f::new(10.0, 0.5));

    for step in 0..10 {
        on_flat.update(step as f32 / 60.0, &flat, &mut NoOpStepObserver);
        on_crest.update(step as f32 / 60.0, &wavy, &mut NoOpStepObserver);
    }

    assert!(on_flat.points().position(0).y < 0.5);
    assert!(on_crest.points().position(0).y > 0.5);
}
