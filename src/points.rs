//! Point masses, stored as parallel per-attribute buffers.

use crate::buffer::{Buffer, BufferAllocator, PooledBuffer};
use crate::config::WATER_SATURATION;
use crate::element::{
    ConnectedComponentId, ElementContainer, ElementCount, ElementIndex, ElementIndexRange,
    NONE_CONNECTED_COMPONENT_ID,
};
use crate::error::{ElementKind, PhysicsError};
use crate::material::{MaterialDatabase, MaterialId, RgbaColor};
use crate::vec::{Vec, Vec2f};
use alloc::vec::Vec as AllocVec;

/// All the point masses of one ship.
///
/// Slots that were never added count as deleted, so iterating the container
/// and skipping deleted indices visits exactly the live points.
pub struct Points {
    container: ElementContainer,
    count: ElementCount,

    is_deleted: Buffer<bool>,

    // Mechanics
    position: Buffer<Vec2f>,
    velocity: Buffer<Vec2f>,
    force: Buffer<Vec2f>,
    material_mass: Buffer<f32>,
    mass_offset: Buffer<f32>,
    mass: Buffer<f32>,
    is_pinned: Buffer<bool>,

    // Materials
    structural_material: Buffer<MaterialId>,
    electrical_material: Buffer<Option<MaterialId>>,
    render_color: Buffer<RgbaColor>,
    is_hull: Buffer<bool>,

    // Water
    water: Buffer<f32>,
    is_leaking: Buffer<bool>,

    // Structure
    connected_component: Buffer<ConnectedComponentId>,
    connected_springs: Buffer<AllocVec<ElementIndex>>,
    connected_triangles: Buffer<AllocVec<ElementIndex>>,

    // Points whose mass changed since the ship last refreshed spring
    // coefficients.
    pending_mass_updates: AllocVec<ElementIndex>,

    float_buffer_allocator: BufferAllocator<f32>,
}

impl Points {
    pub fn new(capacity: ElementCount) -> Self {
        let container = ElementContainer::new(capacity);
        let size = container.buffer_element_count();
        Points {
            count: 0,
            is_deleted: Buffer::new(size, capacity, true),
            position: Buffer::new(size, capacity, Vec2f::zero()),
            velocity: Buffer::new(size, capacity, Vec2f::zero()),
            force: Buffer::new(size, capacity, Vec2f::zero()),
            material_mass: Buffer::new(size, capacity, 1.0),
            mass_offset: Buffer::new(size, capacity, 0.0),
            mass: Buffer::new(size, capacity, 1.0),
            is_pinned: Buffer::new(size, capacity, false),
            structural_material: Buffer::new(size, capacity, 0),
            electrical_material: Buffer::new(size, capacity, None),
            render_color: Buffer::new(size, capacity, [0.0; 4]),
            is_hull: Buffer::new(size, capacity, false),
            water: Buffer::new(size, capacity, 0.0),
            is_leaking: Buffer::new(size, capacity, false),
            connected_component: Buffer::new(size, capacity, NONE_CONNECTED_COMPONENT_ID),
            connected_springs: Buffer::new(size, capacity, AllocVec::new()),
            connected_triangles: Buffer::new(size, capacity, AllocVec::new()),
            pending_mass_updates: AllocVec::new(),
            float_buffer_allocator: BufferAllocator::new(size, capacity),
            container,
        }
    }

    /// Add a point at rest.
    pub fn add(
        &mut self,
        position: Vec2f,
        structural_material: MaterialId,
        electrical_material: Option<MaterialId>,
        materials: &MaterialDatabase,
    ) -> Result<ElementIndex, PhysicsError> {
        if self.count >= self.container.element_count() {
            return Err(PhysicsError::CapacityExceeded {
                kind: ElementKind::Point,
                capacity: self.container.element_count(),
            });
        }
        let material = materials
            .structural(structural_material)
            .ok_or(PhysicsError::InvalidMaterial { id: structural_material })?;
        if let Some(id) = electrical_material {
            materials.electrical(id).ok_or(PhysicsError::InvalidMaterial { id })?;
        }

        let index = self.count;
        self.count += 1;

        self.is_deleted[index] = false;
        self.position[index] = position;
        self.velocity[index] = Vec2f::zero();
        self.force[index] = Vec2f::zero();
        self.material_mass[index] = material.mass;
        self.mass_offset[index] = 0.0;
        self.mass[index] = material.mass;
        self.is_pinned[index] = false;
        self.structural_material[index] = structural_material;
        self.electrical_material[index] = electrical_material;
        self.render_color[index] = material.render_color;
        self.is_hull[index] = material.is_hull;
        self.water[index] = 0.0;
        self.is_leaking[index] = false;
        self.connected_component[index] = NONE_CONNECTED_COMPONENT_ID;
        self.connected_springs[index].clear();
        self.connected_triangles[index].clear();

        Ok(index)
    }

    /// Mark a point deleted. The caller must have destroyed its springs and
    /// triangles first.
    pub fn destroy(&mut self, index: ElementIndex) {
        debug_assert!(!self.is_deleted[index], "point {} destroyed twice", index);
        debug_assert!(self.connected_springs[index].is_empty());
        debug_assert!(self.connected_triangles[index].is_empty());

        self.is_deleted[index] = true;
        self.velocity[index] = Vec2f::zero();
        self.force[index] = Vec2f::zero();
        self.connected_component[index] = NONE_CONNECTED_COMPONENT_ID;
    }

    pub fn element_count(&self) -> ElementCount {
        self.container.element_count()
    }

    pub fn buffer_element_count(&self) -> ElementCount {
        self.container.buffer_element_count()
    }

    /// Number of points added so far, live or deleted.
    pub fn added_count(&self) -> ElementCount {
        self.count
    }

    pub fn is_deleted(&self, index: ElementIndex) -> bool {
        self.is_deleted[index]
    }

    pub fn contains(&self, index: ElementIndex) -> bool {
        index < self.count
    }

    /// Every slot index, live or not. Does not borrow the points, so it can
    /// drive loops that mutate them.
    pub fn container_indices(&self) -> ElementIndexRange {
        self.container.iter()
    }

    pub fn live_indices(&self) -> impl Iterator<Item = ElementIndex> + '_ {
        self.container.iter().into_iter().filter(move |&i| !self.is_deleted[i])
    }

    pub fn live_count(&self) -> usize {
        self.live_indices().count()
    }

    //
    // Mechanics
    //

    pub fn position(&self, index: ElementIndex) -> Vec2f {
        self.position[index]
    }

    pub fn set_position(&mut self, index: ElementIndex, position: Vec2f) {
        self.position[index] = position;
    }

    pub fn velocity(&self, index: ElementIndex) -> Vec2f {
        self.velocity[index]
    }

    pub fn set_velocity(&mut self, index: ElementIndex, velocity: Vec2f) {
        self.velocity[index] = velocity;
    }

    pub fn force(&self, index: ElementIndex) -> Vec2f {
        self.force[index]
    }

    pub fn add_force(&mut self, index: ElementIndex, force: Vec2f) {
        self.force[index] = self.force[index] + force;
    }

    pub fn reset_forces(&mut self) {
        self.force.fill(Vec2f::zero());
    }

    pub fn mass(&self, index: ElementIndex) -> f32 {
        self.mass[index]
    }

    pub fn mass_offset(&self, index: ElementIndex) -> f32 {
        self.mass_offset[index]
    }

    /// Change the extra mass carried by a point (e.g. an attached bomb).
    ///
    /// Springs cache coefficients derived from endpoint masses; the point is
    /// queued so the owner can refresh them before the next integration.
    pub fn set_mass_offset(&mut self, index: ElementIndex, offset: f32) {
        debug_assert!(!self.is_deleted[index]);
        self.mass_offset[index] = offset;
        self.mass[index] = self.material_mass[index] + offset;
        if !self.pending_mass_updates.contains(&index) {
            self.pending_mass_updates.push(index);
        }
    }

    pub fn has_pending_mass_updates(&self) -> bool {
        !self.pending_mass_updates.is_empty()
    }

    /// Hand over the points whose mass changed since the last call.
    pub fn take_pending_mass_updates(&mut self) -> AllocVec<ElementIndex> {
        core::mem::take(&mut self.pending_mass_updates)
    }

    pub fn is_pinned(&self, index: ElementIndex) -> bool {
        self.is_pinned[index]
    }

    /// Freeze a point in place; integration skips it.
    pub fn pin(&mut self, index: ElementIndex) {
        self.is_pinned[index] = true;
        self.velocity[index] = Vec2f::zero();
    }

    pub fn unpin(&mut self, index: ElementIndex) {
        self.is_pinned[index] = false;
    }

    //
    // Materials
    //

    pub fn structural_material(&self, index: ElementIndex) -> MaterialId {
        self.structural_material[index]
    }

    pub fn electrical_material(&self, index: ElementIndex) -> Option<MaterialId> {
        self.electrical_material[index]
    }

    pub fn render_color(&self, index: ElementIndex) -> RgbaColor {
        self.render_color[index]
    }

    pub fn is_hull(&self, index: ElementIndex) -> bool {
        self.is_hull[index]
    }

    //
    // Water
    //

    pub fn water(&self, index: ElementIndex) -> f32 {
        self.water[index]
    }

    /// Set the water held by a point, clamped to [0, saturation].
    pub fn set_water(&mut self, index: ElementIndex, water: f32) {
        self.water[index] = water.clamp(0.0, WATER_SATURATION);
    }

    pub fn is_leaking(&self, index: ElementIndex) -> bool {
        self.is_leaking[index]
    }

    pub fn set_leaking(&mut self, index: ElementIndex) {
        self.is_leaking[index] = true;
    }

    //
    // Structure
    //

    pub fn connected_component_id(&self, index: ElementIndex) -> ConnectedComponentId {
        self.connected_component[index]
    }

    pub fn set_connected_component_id(&mut self, index: ElementIndex, id: ConnectedComponentId) {
        self.connected_component[index] = id;
    }

    pub fn connected_springs(&self, index: ElementIndex) -> &[ElementIndex] {
        &self.connected_springs[index]
    }

    pub fn add_connected_spring(&mut self, index: ElementIndex, spring: ElementIndex) {
        debug_assert!(!self.connected_springs[index].contains(&spring));
        self.connected_springs[index].push(spring);
    }

    pub fn remove_connected_spring(&mut self, index: ElementIndex, spring: ElementIndex) {
        let springs = &mut self.connected_springs[index];
        let position = springs.iter().position(|&s| s == spring);
        debug_assert!(position.is_some(), "spring {} not connected to point {}", spring, index);
        if let Some(position) = position {
            springs.swap_remove(position);
        }
    }

    pub fn connected_triangles(&self, index: ElementIndex) -> &[ElementIndex] {
        &self.connected_triangles[index]
    }

    pub fn add_connected_triangle(&mut self, index: ElementIndex, triangle: ElementIndex) {
        self.connected_triangles[index].push(triangle);
    }

    pub fn remove_connected_triangle(&mut self, index: ElementIndex, triangle: ElementIndex) {
        let triangles = &mut self.connected_triangles[index];
        if let Some(position) = triangles.iter().position(|&t| t == triangle) {
            triangles.swap_remove(position);
        }
    }

    //
    // Scratch
    //

    /// A per-point `f32` scratch buffer, returned to the pool on drop.
    pub fn allocate_work_buffer_float(&self) -> PooledBuffer<f32> {
        self.float_buffer_allocator.allocate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MaterialSound, StructuralMaterial};
    use alloc::string::String;

    fn materials() -> MaterialDatabase {
        let mut db = MaterialDatabase::new();
        db.add_structural(StructuralMaterial {
            name: String::from("Steel"),
            strength: 0.5,
            mass: 2.0,
            stiffness: 1.0,
            render_color: [0.5, 0.5, 0.5, 1.0],
            is_hull: true,
            sound: MaterialSound::Metal,
        })
        .unwrap();
        db
    }

    #[test]
    fn unused_slots_count_as_deleted() {
        let db = materials();
        let mut points = Points::new(4);
        let a = points.add(Vec2f::new(1.0, 2.0), 0, None, &db).unwrap();
        assert_eq!(a, 0);
        assert!(!points.is_deleted(0));
        assert!(points.is_deleted(1));
        assert_eq!(points.live_count(), 1);
        assert_eq!(points.mass(a), 2.0);
        assert!(points.is_hull(a));
    }

    #[test]
    fn capacity_is_enforced() {
        let db = materials();
        let mut points = Points::new(1);
        points.add(Vec2f::zero(), 0, None, &db).unwrap();
        assert_eq!(
            points.add(Vec2f::zero(), 0, None, &db),
            Err(PhysicsError::CapacityExceeded { kind: ElementKind::Point, capacity: 1 })
        );
    }

    #[test]
    fn unknown_material_is_rejected() {
        let db = materials();
        let mut points = Points::new(2);
        assert_eq!(
            points.add(Vec2f::zero(), 3, None, &db),
            Err(PhysicsError::InvalidMaterial { id: 3 })
        );
    }

    #[test]
    fn mass_offset_queues_update_once() {
        let db = materials();
        let mut points = Points::new(2);
        let a = points.add(Vec2f::zero(), 0, None, &db).unwrap();
        points.set_mass_offset(a, 10.0);
        points.set_mass_offset(a, 10.0);
        assert_eq!(points.mass(a), 12.0);
        assert_eq!(points.take_pending_mass_updates(), alloc::vec![a]);
        assert!(!points.has_pending_mass_updates());
        points.set_mass_offset(a, 0.0);
        assert_eq!(points.mass(a), 2.0);
    }

    #[test]
    fn water_is_clamped_to_saturation() {
        let db = materials();
        let mut points = Points::new(1);
        let a = points.add(Vec2f::zero(), 0, None, &db).unwrap();
        points.set_water(a, 3.0);
        assert_eq!(points.water(a), WATER_SATURATION);
        points.set_water(a, -1.0);
        assert_eq!(points.water(a), 0.0);
    }

    #[test]
    fn add_force_accumulates() {
        let db = materials();
        let mut points = Points::new(1);
        let a = points.add(Vec2f::zero(), 0, None, &db).unwrap();
        points.add_force(a, Vec2f::new(1.0, 0.0));
        points.add_force(a, Vec2f::new(0.5, 2.0));
        assert_eq!(points.force(a), Vec2f::new(1.5, 2.0));
        points.reset_forces();
        assert_eq!(points.force(a), Vec2f::zero());
    }
}
