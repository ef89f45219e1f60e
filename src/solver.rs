//! Mechanical dynamics: force accumulation and explicit integration.
//!
//! One step runs `num_mechanical_dynamics_iterations` sub-iterations. Each
//! sub-iteration zeroes the force accumulators, accumulates gravity, spring
//! forces and water forces, and only then integrates, so integration never
//! reads a partially accumulated force.

use crate::buffer::Buffer;
use crate::config::GameParameters;
use crate::observer::StepObserver;
use crate::points::Points;
use crate::springs::{Endpoints, Springs};
use crate::vec::{Vec, Vec2f};
use crate::water;

/// Run every mechanical sub-iteration of one step.
pub fn update_mechanical_dynamics<O: StepObserver>(
    points: &mut Points,
    springs: &Springs,
    parameters: &GameParameters,
    current_time: f32,
    observer: &mut O,
) {
    let iterations = parameters.num_mechanical_dynamics_iterations.max(1);
    let dt = parameters.mechanical_dt();

    let mut integration_factors = points.allocate_work_buffer_float();
    let mut spring_forces = springs.allocate_work_buffer_vec2f();

    // Masses do not change within a step.
    compute_integration_factors(points, dt, &mut integration_factors);

    for iteration in 0..iterations {
        let sub_time = current_time + dt * iteration as f32;

        points.reset_forces();
        apply_gravity(points, parameters);
        apply_spring_forces(points, springs, &mut spring_forces);
        water::apply_buoyancy_and_drag(points, parameters, sub_time, dt);

        integrate(points, dt, parameters.global_damping, &integration_factors);
        handle_ocean_floor(points, parameters);

        observer.on_integrate(iteration);
    }
}

/// `dt^2 / mass` per point.
pub fn compute_integration_factors(points: &Points, dt: f32, factors: &mut Buffer<f32>) {
    let dt_squared = dt * dt;
    for point in points.container_indices() {
        factors[point] = if points.is_deleted(point) {
            0.0
        } else {
            dt_squared / points.mass(point)
        };
    }
}

/// Weight of each point, including the water it holds.
pub fn apply_gravity(points: &mut Points, parameters: &GameParameters) {
    for point in points.container_indices() {
        if points.is_deleted(point) {
            continue;
        }
        let total_mass = points.mass(point) + points.water(point) * parameters.water_mass;
        points.add_force(point, parameters.gravity.scale(total_mass));
    }
}

/// Hookean force plus damping along the spring axis, applied equal and
/// opposite to both endpoints.
///
/// Forces are first computed per spring into `spring_forces`, then
/// scattered to the points.
pub fn apply_spring_forces(points: &mut Points, springs: &Springs, spring_forces: &mut Buffer<Vec2f>) {
    for spring in springs.live_indices() {
        let Endpoints { point_a, point_b } = springs.endpoints(spring);

        let displacement = points.position(point_b) - points.position(point_a);
        let length = displacement.length();
        let direction = displacement.normalize_with_length(length);

        let spring_force = (length - springs.rest_length(spring)) * springs.stiffness_coefficient(spring);

        let relative_velocity = points.velocity(point_b) - points.velocity(point_a);
        let damping_force = relative_velocity.dot(direction) * springs.damping_coefficient(spring);

        spring_forces[spring] = direction.scale(spring_force + damping_force);
    }

    for spring in springs.live_indices() {
        let Endpoints { point_a, point_b } = springs.endpoints(spring);
        let force = spring_forces[spring];
        points.add_force(point_a, force);
        points.add_force(point_b, -force);
    }
}

/// Semi-explicit Euler step over all live, unpinned points.
pub fn integrate(points: &mut Points, dt: f32, global_damping: f32, integration_factors: &Buffer<f32>) {
    let velocity_factor = global_damping / dt;
    for point in points.container_indices() {
        if points.is_deleted(point) || points.is_pinned(point) {
            continue;
        }
        let delta = points.velocity(point).scale(dt) + points.force(point).scale(integration_factors[point]);
        points.set_position(point, points.position(point) + delta);
        points.set_velocity(point, delta.scale(velocity_factor));
    }
}

/// Keep points above the ocean floor.
pub fn handle_ocean_floor(points: &mut Points, parameters: &GameParameters) {
    let floor = water::ocean_floor_height(parameters);
    for point in points.container_indices() {
        if points.is_deleted(point) {
            continue;
        }
        let position = points.position(point);
        if position.y < floor {
            points.set_position(point, Vec2f::new(position.x, floor));
            let velocity = points.velocity(point);
            if velocity.y < 0.0 {
                points.set_velocity(point, Vec2f::new(velocity.x, 0.0));
            }
        }
    }
}
