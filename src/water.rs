//! Ocean surface, buoyancy and drag, and the flood model.
//!
//! Flooding has two parts. Leaking points below the surface take in sea
//! water in proportion to their depth. Water then relaxes along springs: each
//! live spring moves a share of the water difference between its endpoints,
//! scaled by its permeability. Hull springs have zero permeability, so hull
//! plating keeps water out until it breaks.
//!
//! A point splits its exchange across all of its springs, so every new amount
//! is a weighted average of the point and its neighbours. Relaxation then
//! conserves the total and never pushes a point past its neighbours.

use crate::buffer::Buffer;
use crate::config::{GameParameters, WATER_SATURATION};
use crate::float::Float;
use crate::points::Points;
use crate::springs::Springs;
use crate::vec::{Vec, Vec2f};

/// Height of the ocean surface at `x`.
pub fn water_height_at(x: f32, current_time: f32, parameters: &GameParameters) -> f32 {
    match &parameters.waves {
        Some(waves) if waves.wavelength > 0.0 => {
            let k = 2.0 * f32::pi() / waves.wavelength;
            parameters.sea_level + waves.amplitude * (k * (x - waves.speed * current_time)).sin()
        }
        _ => parameters.sea_level,
    }
}

/// Depth of `position` below the surface; negative above it.
pub fn depth_at(position: Vec2f, current_time: f32, parameters: &GameParameters) -> f32 {
    water_height_at(position.x, current_time, parameters) - position.y
}

pub fn is_underwater(position: Vec2f, current_time: f32, parameters: &GameParameters) -> bool {
    depth_at(position, current_time, parameters) > 0.0
}

/// Height of the ocean floor.
pub fn ocean_floor_height(parameters: &GameParameters) -> f32 {
    parameters.sea_level - parameters.sea_depth
}

/// Quadratic drag on a point moving at `velocity` through still water.
///
/// The magnitude is `coefficient * |v|^2`, capped at the force that would
/// stop the point within one sub-iteration, so drag never reverses motion.
pub fn quadratic_drag(velocity: Vec2f, mass: f32, coefficient: f32, dt: f32) -> Vec2f {
    let speed = velocity.length();
    if speed.is_near_zero(1e-6) {
        return Vec2f::zero();
    }
    let magnitude = (coefficient * speed * speed).min(mass * speed / dt);
    -velocity.normalize_with_length(speed).scale(magnitude)
}

/// Accumulate buoyancy and drag on every submerged live point.
pub fn apply_buoyancy_and_drag(
    points: &mut Points,
    parameters: &GameParameters,
    current_time: f32,
    dt: f32,
) {
    let buoyancy = parameters.water_buoyancy_force * parameters.buoyancy_adjustment;
    for point in points.container_indices() {
        if points.is_deleted(point) {
            continue;
        }
        let position = points.position(point);
        if !is_underwater(position, current_time, parameters) {
            continue;
        }

        // Water held inside displaces no sea water.
        let lift = buoyancy * (WATER_SATURATION - points.water(point));
        let drag = quadratic_drag(
            points.velocity(point),
            points.mass(point),
            parameters.water_drag_coefficient,
            dt,
        );
        points.add_force(point, Vec2f::new(0.0, lift) + drag);
    }
}

/// Let leaking, submerged, non-hull points take in sea water. Returns the
/// total amount taken in.
pub fn update_water_inflow(
    points: &mut Points,
    parameters: &GameParameters,
    current_time: f32,
    dt: f32,
) -> f32 {
    let mut total = 0.0;
    for point in points.container_indices() {
        if points.is_deleted(point) || points.is_hull(point) || !points.is_leaking(point) {
            continue;
        }
        let depth = depth_at(points.position(point), current_time, parameters);
        if depth <= 0.0 {
            continue;
        }
        let before = points.water(point);
        points.set_water(point, before + parameters.water_intake_rate * depth * dt);
        total += points.water(point) - before;
    }
    total
}

/// Relax water amounts along every live, permeable spring.
///
/// The flow along a spring is the water difference times permeability times
/// the diffusion rate, divided by the larger endpoint degree. With the rate
/// at most 0.5 a point gives or takes at most half its difference to each
/// neighbour in total.
///
/// `deltas` is a per-point scratch buffer; all transfers are computed from
/// the amounts at the start of the call and applied together.
pub fn update_water_propagation(
    points: &mut Points,
    springs: &Springs,
    parameters: &GameParameters,
    deltas: &mut Buffer<f32>,
) {
    deltas.fill(0.0);

    for spring in springs.live_indices() {
        let permeability = springs.water_permeability(spring);
        if permeability <= 0.0 {
            continue;
        }
        let endpoints = springs.endpoints(spring);
        let degree = points
            .connected_springs(endpoints.point_a)
            .len()
            .max(points.connected_springs(endpoints.point_b).len())
            .max(1);
        let water_a = points.water(endpoints.point_a);
        let water_b = points.water(endpoints.point_b);
        let flow = (water_b - water_a) * permeability * parameters.water_diffusion_rate
            / degree as f32;
        deltas[endpoints.point_a] += flow;
        deltas[endpoints.point_b] -= flow;
    }

    for point in points.container_indices() {
        if points.is_deleted(point) {
            continue;
        }
        let delta = deltas[point];
        if delta != 0.0 {
            let water = points.water(point);
            points.set_water(point, water + delta);
        }
    }
}
