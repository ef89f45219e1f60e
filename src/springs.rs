//! Springs: axial spring-dampers between pairs of points.
//!
//! The integrator is explicit, so a spring is only stable below a stiffness
//! and damping limit set by the endpoint masses and the sub-iteration time
//! step. Each spring caches coefficients that sit at a fixed fraction of that
//! limit; they are recomputed on topology, mass or parameter changes, never
//! in the per-step loop.

use crate::buffer::{Buffer, BufferAllocator, PooledBuffer};
use crate::config::{GameParameters, SIMULATION_STEP_TIME_DURATION};
use crate::element::{
    ConnectedComponentId, ElementContainer, ElementCount, ElementIndex, NONE_ELEMENT_INDEX,
};
use crate::error::{ElementKind, PhysicsError};
use crate::events::{EventQueue, ShipEvent};
use crate::flags::{Characteristics, DestroyOptions};
use crate::float::Float;
use crate::material::{MaterialDatabase, MaterialId};
use crate::points::Points;
use crate::vec::{Vec, Vec2f};
use crate::water;
use alloc::vec::Vec as AllocVec;

/// Shortest rest length a spring may have.
pub const MIN_REST_LENGTH: f32 = 1e-4;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Endpoints {
    pub point_a: ElementIndex,
    pub point_b: ElementIndex,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Coefficients {
    pub stiffness: f32,
    pub damping: f32,
}

/// Parameter values the cached coefficients were computed with.
#[derive(Copy, Clone, Debug, PartialEq)]
struct CoefficientInputs {
    num_mechanical_dynamics_iterations: usize,
    stiffness_adjustment: f32,
    spring_reduction_fraction: f32,
    spring_damping_coefficient: f32,
}

impl CoefficientInputs {
    fn from_parameters(parameters: &GameParameters) -> Self {
        CoefficientInputs {
            num_mechanical_dynamics_iterations: parameters.num_mechanical_dynamics_iterations.max(1),
            stiffness_adjustment: parameters.stiffness_adjustment,
            spring_reduction_fraction: parameters.spring_reduction_fraction,
            spring_damping_coefficient: parameters.spring_damping_coefficient,
        }
    }

    fn dt(&self) -> f32 {
        SIMULATION_STEP_TIME_DURATION / self.num_mechanical_dynamics_iterations as f32
    }
}

/// Reduced mass of a two-body system.
fn mass_factor(mass_a: f32, mass_b: f32) -> f32 {
    (mass_a * mass_b) / (mass_a + mass_b)
}

/// Stiffness coefficient for a spring between masses `mass_a` and `mass_b`.
pub fn calculate_stiffness_coefficient(
    mass_a: f32,
    mass_b: f32,
    spring_stiffness: f32,
    parameters: &GameParameters,
) -> f32 {
    stiffness_coefficient(mass_a, mass_b, spring_stiffness, &CoefficientInputs::from_parameters(parameters))
}

/// Damping coefficient for a spring between masses `mass_a` and `mass_b`.
pub fn calculate_damping_coefficient(mass_a: f32, mass_b: f32, parameters: &GameParameters) -> f32 {
    damping_coefficient(mass_a, mass_b, &CoefficientInputs::from_parameters(parameters))
}

fn stiffness_coefficient(mass_a: f32, mass_b: f32, spring_stiffness: f32, inputs: &CoefficientInputs) -> f32 {
    let dt = inputs.dt();
    inputs.spring_reduction_fraction
        * spring_stiffness
        * inputs.stiffness_adjustment
        * mass_factor(mass_a, mass_b)
        / (dt * dt)
}

fn damping_coefficient(mass_a: f32, mass_b: f32, inputs: &CoefficientInputs) -> f32 {
    inputs.spring_damping_coefficient * mass_factor(mass_a, mass_b) / inputs.dt()
}

/// All the springs of one ship.
pub struct Springs {
    container: ElementContainer,
    count: ElementCount,

    is_deleted: Buffer<bool>,
    endpoints: Buffer<Endpoints>,
    // Triangles that have this spring as one of their edges
    super_triangles_count: Buffer<ElementCount>,

    // Physical
    strength: Buffer<f32>,
    stiffness: Buffer<f32>,
    rest_length: Buffer<f32>,
    coefficients: Buffer<Coefficients>,
    characteristics: Buffer<Characteristics>,
    base_material: Buffer<MaterialId>,

    // 0.0 keeps water from crossing
    water_permeability: Buffer<f32>,

    // Tracks entering and leaving the stressed state
    is_stressed: Buffer<bool>,

    is_bomb_attached: Buffer<bool>,

    current_inputs: CoefficientInputs,

    vec2f_buffer_allocator: BufferAllocator<Vec2f>,
}

impl Springs {
    pub fn new(capacity: ElementCount, parameters: &GameParameters) -> Self {
        let container = ElementContainer::new(capacity);
        let size = container.buffer_element_count();
        let no_endpoints = Endpoints { point_a: NONE_ELEMENT_INDEX, point_b: NONE_ELEMENT_INDEX };
        Springs {
            count: 0,
            is_deleted: Buffer::new(size, capacity, true),
            endpoints: Buffer::new(size, capacity, no_endpoints),
            super_triangles_count: Buffer::new(size, capacity, 0),
            strength: Buffer::new(size, capacity, 0.0),
            stiffness: Buffer::new(size, capacity, 0.0),
            rest_length: Buffer::new(size, capacity, 1.0),
            coefficients: Buffer::new(size, capacity, Coefficients::default()),
            characteristics: Buffer::new(size, capacity, Characteristics::empty()),
            base_material: Buffer::new(size, capacity, 0),
            water_permeability: Buffer::new(size, capacity, 0.0),
            is_stressed: Buffer::new(size, capacity, false),
            is_bomb_attached: Buffer::new(size, capacity, false),
            current_inputs: CoefficientInputs::from_parameters(parameters),
            vec2f_buffer_allocator: BufferAllocator::new(size, capacity),
            container,
        }
    }

    /// Add a spring between two live points.
    ///
    /// Rest length comes from the current endpoint positions and must be at
    /// least [`MIN_REST_LENGTH`]. Strength and stiffness average the
    /// endpoint materials; the base material is the weaker of the two.
    pub fn add(
        &mut self,
        point_a: ElementIndex,
        point_b: ElementIndex,
        super_triangles_count: ElementCount,
        characteristics: Characteristics,
        points: &Points,
        materials: &MaterialDatabase,
    ) -> Result<ElementIndex, PhysicsError> {
        if self.count >= self.container.element_count() {
            return Err(PhysicsError::CapacityExceeded {
                kind: ElementKind::Spring,
                capacity: self.container.element_count(),
            });
        }
        for point in [point_a, point_b] {
            if !points.contains(point) {
                return Err(PhysicsError::ElementOutOfBounds {
                    kind: ElementKind::Point,
                    index: point,
                    count: points.added_count(),
                });
            }
            if points.is_deleted(point) {
                return Err(PhysicsError::DeletedElement { kind: ElementKind::Point, index: point });
            }
        }
        if point_a == point_b {
            return Err(PhysicsError::DegenerateSpring { point: point_a });
        }
        let rest_length = points.position(point_a).distance(points.position(point_b));
        if rest_length < MIN_REST_LENGTH {
            return Err(PhysicsError::CoincidentEndpoints { point_a, point_b });
        }

        let material_a_id = points.structural_material(point_a);
        let material_b_id = points.structural_material(point_b);
        let material_a = materials
            .structural(material_a_id)
            .ok_or(PhysicsError::InvalidMaterial { id: material_a_id })?;
        let material_b = materials
            .structural(material_b_id)
            .ok_or(PhysicsError::InvalidMaterial { id: material_b_id })?;

        let index = self.count;
        self.count += 1;

        let strength = (material_a.strength + material_b.strength) / 2.0;
        let stiffness = (material_a.stiffness + material_b.stiffness) / 2.0;
        let base_material = if material_a.strength <= material_b.strength {
            material_a_id
        } else {
            material_b_id
        };

        self.is_deleted[index] = false;
        self.endpoints[index] = Endpoints { point_a, point_b };
        self.super_triangles_count[index] = super_triangles_count;
        self.strength[index] = strength;
        self.stiffness[index] = stiffness;
        self.rest_length[index] = rest_length;
        self.coefficients[index] = Coefficients {
            stiffness: stiffness_coefficient(
                points.mass(point_a),
                points.mass(point_b),
                stiffness,
                &self.current_inputs,
            ),
            damping: damping_coefficient(points.mass(point_a), points.mass(point_b), &self.current_inputs),
        };
        self.characteristics[index] = characteristics;
        self.base_material[index] = base_material;
        self.water_permeability[index] = if characteristics.contains(Characteristics::HULL) {
            0.0
        } else {
            1.0
        };
        self.is_stressed[index] = false;
        self.is_bomb_attached[index] = false;

        Ok(index)
    }

    /// Mark a spring deleted.
    ///
    /// With `FIRE_BREAK_EVENT` the break event is queued before the spring is
    /// marked deleted. Severing the spring from its points and triangles is
    /// the ship's job, driven by the same call.
    pub fn destroy(
        &mut self,
        index: ElementIndex,
        options: DestroyOptions,
        current_time: f32,
        parameters: &GameParameters,
        points: &Points,
        events: &mut EventQueue,
    ) {
        debug_assert!(!self.is_deleted[index], "spring {} destroyed twice", index);

        if options.contains(DestroyOptions::FIRE_BREAK_EVENT) {
            let midpoint = self.midpoint_position(index, points);
            events.push(ShipEvent::SpringBroken {
                spring: index,
                material: self.base_material[index],
                is_underwater: water::is_underwater(midpoint, current_time, parameters),
                destroy_all_triangles: options.contains(DestroyOptions::DESTROY_ALL_TRIANGLES),
                time: current_time,
            });
        }

        self.is_deleted[index] = true;
        self.is_stressed[index] = false;
    }

    /// Recompute every spring's coefficients if the parameters they depend
    /// on changed. Returns whether anything was recomputed.
    pub fn update_game_parameters(&mut self, parameters: &GameParameters, points: &Points) -> bool {
        let inputs = CoefficientInputs::from_parameters(parameters);
        if inputs == self.current_inputs {
            return false;
        }
        self.current_inputs = inputs;

        let mut recomputed = 0usize;
        for index in self.container.iter() {
            if !self.is_deleted[index] {
                self.recompute_coefficients(index, points);
                recomputed += 1;
            }
        }
        log::debug!(
            "recomputed coefficients of {} springs ({} sub-iterations, stiffness x{})",
            recomputed,
            inputs.num_mechanical_dynamics_iterations,
            inputs.stiffness_adjustment
        );
        true
    }

    /// Refresh the coefficients after an endpoint's mass changed.
    pub fn on_point_mass_updated(&mut self, index: ElementIndex, points: &Points) {
        debug_assert!(index < self.container.element_count());
        self.recompute_coefficients(index, points);
    }

    fn recompute_coefficients(&mut self, index: ElementIndex, points: &Points) {
        let Endpoints { point_a, point_b } = self.endpoints[index];
        let (mass_a, mass_b) = (points.mass(point_a), points.mass(point_b));
        self.coefficients[index] = Coefficients {
            stiffness: stiffness_coefficient(mass_a, mass_b, self.stiffness[index], &self.current_inputs),
            damping: damping_coefficient(mass_a, mass_b, &self.current_inputs),
        };
    }

    /// Evaluate every live spring's strain.
    ///
    /// A spring strained past its effective strength breaks: it is destroyed
    /// with a break event and its index is appended to `broken`. Otherwise
    /// it enters the stressed state when strain exceeds the stress threshold
    /// and leaves it when strain falls back below. The break check comes
    /// first, so a strength configured below the stress threshold still
    /// breaks.
    ///
    /// Returns whether any spring broke.
    pub fn update_strains(
        &mut self,
        current_time: f32,
        parameters: &GameParameters,
        points: &Points,
        events: &mut EventQueue,
        broken: &mut AllocVec<ElementIndex>,
    ) -> bool {
        let broken_before = broken.len();

        for index in self.container.iter() {
            if self.is_deleted[index] {
                continue;
            }

            let strain = self.strain(index, points);
            let effective_strength = parameters.strength_adjustment * self.strength[index];

            if strain > effective_strength {
                self.destroy(
                    index,
                    DestroyOptions::FIRE_BREAK_EVENT,
                    current_time,
                    parameters,
                    points,
                    events,
                );
                broken.push(index);
            } else if strain > parameters.stress_threshold_fraction * effective_strength {
                if !self.is_stressed[index] {
                    self.is_stressed[index] = true;
                    let midpoint = self.midpoint_position(index, points);
                    events.push(ShipEvent::SpringStressed {
                        spring: index,
                        material: self.base_material[index],
                        is_underwater: water::is_underwater(midpoint, current_time, parameters),
                    });
                }
            } else {
                self.is_stressed[index] = false;
            }
        }

        let broke = broken.len() - broken_before;
        if broke > 0 {
            log::debug!("{} springs broke at t={}", broke, current_time);
        }
        broke > 0
    }

    /// Relative deviation of the current length from the rest length.
    pub fn strain(&self, index: ElementIndex, points: &Points) -> f32 {
        let rest_length = self.rest_length[index];
        (self.length(index, points) - rest_length).abs() / rest_length
    }

    pub fn length(&self, index: ElementIndex, points: &Points) -> f32 {
        self.point_a_position(index, points).distance(self.point_b_position(index, points))
    }

    //
    // Container
    //

    pub fn element_count(&self) -> ElementCount {
        self.container.element_count()
    }

    pub fn added_count(&self) -> ElementCount {
        self.count
    }

    pub fn is_deleted(&self, index: ElementIndex) -> bool {
        self.is_deleted[index]
    }

    pub fn live_indices(&self) -> impl Iterator<Item = ElementIndex> + '_ {
        self.container.iter().into_iter().filter(move |&i| !self.is_deleted[i])
    }

    pub fn live_count(&self) -> usize {
        self.live_indices().count()
    }

    //
    // Endpoints
    //

    pub fn endpoints(&self, index: ElementIndex) -> Endpoints {
        self.endpoints[index]
    }

    pub fn point_a_index(&self, index: ElementIndex) -> ElementIndex {
        self.endpoints[index].point_a
    }

    pub fn point_b_index(&self, index: ElementIndex) -> ElementIndex {
        self.endpoints[index].point_b
    }

    pub fn other_endpoint_index(&self, index: ElementIndex, point: ElementIndex) -> ElementIndex {
        let Endpoints { point_a, point_b } = self.endpoints[index];
        if point_b == point {
            point_a
        } else {
            point_b
        }
    }

    /// +1.0 if the spring points away from `point`, -1.0 otherwise.
    pub fn direction_from(&self, index: ElementIndex, point: ElementIndex) -> f32 {
        if point == self.endpoints[index].point_a {
            1.0
        } else {
            -1.0
        }
    }

    pub fn point_a_position(&self, index: ElementIndex, points: &Points) -> Vec2f {
        points.position(self.endpoints[index].point_a)
    }

    pub fn point_b_position(&self, index: ElementIndex, points: &Points) -> Vec2f {
        points.position(self.endpoints[index].point_b)
    }

    pub fn midpoint_position(&self, index: ElementIndex, points: &Points) -> Vec2f {
        self.point_a_position(index, points)
            .lerp(self.point_b_position(index, points), 0.5)
    }

    pub fn connected_component_id(&self, index: ElementIndex, points: &Points) -> ConnectedComponentId {
        let Endpoints { point_a, point_b } = self.endpoints[index];
        debug_assert_eq!(
            points.connected_component_id(point_a),
            points.connected_component_id(point_b)
        );
        points.connected_component_id(point_a)
    }

    //
    // Super triangles
    //

    pub fn super_triangles_count(&self, index: ElementIndex) -> ElementCount {
        self.super_triangles_count[index]
    }

    pub fn add_super_triangle(&mut self, index: ElementIndex) {
        self.super_triangles_count[index] += 1;
    }

    pub fn remove_one_super_triangle(&mut self, index: ElementIndex) {
        debug_assert!(self.super_triangles_count[index] > 0);
        self.super_triangles_count[index] -= 1;
    }

    //
    // Physical
    //

    pub fn strength(&self, index: ElementIndex) -> f32 {
        self.strength[index]
    }

    pub fn stiffness(&self, index: ElementIndex) -> f32 {
        self.stiffness[index]
    }

    pub fn rest_length(&self, index: ElementIndex) -> f32 {
        self.rest_length[index]
    }

    pub fn coefficients(&self, index: ElementIndex) -> Coefficients {
        self.coefficients[index]
    }

    pub fn stiffness_coefficient(&self, index: ElementIndex) -> f32 {
        self.coefficients[index].stiffness
    }

    pub fn damping_coefficient(&self, index: ElementIndex) -> f32 {
        self.coefficients[index].damping
    }

    pub fn base_material(&self, index: ElementIndex) -> MaterialId {
        self.base_material[index]
    }

    pub fn characteristics(&self, index: ElementIndex) -> Characteristics {
        self.characteristics[index]
    }

    pub fn is_hull(&self, index: ElementIndex) -> bool {
        self.characteristics[index].contains(Characteristics::HULL)
    }

    pub fn is_rope(&self, index: ElementIndex) -> bool {
        self.characteristics[index].contains(Characteristics::ROPE)
    }

    pub fn is_stressed(&self, index: ElementIndex) -> bool {
        self.is_stressed[index]
    }

    //
    // Water
    //

    pub fn water_permeability(&self, index: ElementIndex) -> f32 {
        self.water_permeability[index]
    }

    pub fn set_water_permeability(&mut self, index: ElementIndex, permeability: f32) {
        self.water_permeability[index] = permeability.clamp(0.0, 1.0);
    }

    //
    // Bombs
    //

    pub fn is_bomb_attached(&self, index: ElementIndex) -> bool {
        self.is_bomb_attached[index]
    }

    /// Attach a bomb, loading both endpoints with the bomb mass.
    pub fn attach_bomb(&mut self, index: ElementIndex, points: &mut Points, parameters: &GameParameters) {
        assert!(!self.is_bomb_attached[index], "bomb already attached to spring {}", index);
        self.is_bomb_attached[index] = true;

        let Endpoints { point_a, point_b } = self.endpoints[index];
        points.set_mass_offset(point_a, parameters.bomb_mass);
        points.set_mass_offset(point_b, parameters.bomb_mass);
    }

    /// Reload the endpoints of every live bomb-carrying spring with
    /// `bomb_mass`. Returns how many springs carry a bomb.
    pub fn update_bomb_masses(&self, points: &mut Points, bomb_mass: f32) -> usize {
        let mut bombs = 0;
        for index in self.container.iter() {
            if self.is_deleted[index] || !self.is_bomb_attached[index] {
                continue;
            }
            let Endpoints { point_a, point_b } = self.endpoints[index];
            points.set_mass_offset(point_a, bomb_mass);
            points.set_mass_offset(point_b, bomb_mass);
            bombs += 1;
        }
        bombs
    }

    /// Detach a bomb, restoring the endpoint masses.
    pub fn detach_bomb(&mut self, index: ElementIndex, points: &mut Points) {
        assert!(self.is_bomb_attached[index], "no bomb attached to spring {}", index);
        self.is_bomb_attached[index] = false;

        let Endpoints { point_a, point_b } = self.endpoints[index];
        points.set_mass_offset(point_a, 0.0);
        points.set_mass_offset(point_b, 0.0);
    }

    //
    // Scratch
    //

    pub fn allocate_work_buffer_vec2f(&self) -> PooledBuffer<Vec2f> {
        self.vec2f_buffer_allocator.allocate()
    }
}
