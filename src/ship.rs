//! A ship: the element containers plus the per-step orchestration.
//!
//! A step applies pending parameter and mass changes, runs the mechanical
//! sub-iterations, evaluates strains, carries out the destruction cascade
//! of every spring that broke, relabels connected components when the
//! structure changed, and finally runs the flood model. Events raised along
//! the way are queued and handed out between steps.

use crate::components::ConnectedComponentAnalyzer;
use crate::config::{GameParameters, SIMULATION_STEP_TIME_DURATION};
use crate::element::{ElementCount, ElementIndex};
use crate::error::{ElementKind, PhysicsError};
use crate::events::{EventQueue, GameEventHandler, ShipEvent};
use crate::flags::{Characteristics, DestroyOptions};
use crate::material::{MaterialDatabase, MaterialId};
use crate::observer::StepObserver;
use crate::points::Points;
use crate::render::{point_color, RenderSink};
use crate::solver;
use crate::springs::{Endpoints, Springs};
use crate::triangles::Triangles;
use crate::vec::Vec2f;
use crate::water;
use alloc::rc::Rc;
use alloc::vec::Vec as AllocVec;

pub type ShipId = u32;

/// Fixed element capacities of a ship.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShipCapacity {
    pub points: ElementCount,
    pub springs: ElementCount,
    pub triangles: ElementCount,
}

pub struct Ship {
    id: ShipId,
    materials: Rc<MaterialDatabase>,
    parameters: GameParameters,

    points: Points,
    springs: Springs,
    triangles: Triangles,

    analyzer: ConnectedComponentAnalyzer,
    // Springs were added or destroyed since the last analysis.
    is_structure_dirty: bool,

    events: EventQueue,
    broken_springs: AllocVec<ElementIndex>,
}

impl Ship {
    pub fn new(
        id: ShipId,
        capacity: ShipCapacity,
        materials: Rc<MaterialDatabase>,
        parameters: &GameParameters,
    ) -> Self {
        Ship {
            id,
            materials,
            parameters: parameters.clone(),
            points: Points::new(capacity.points),
            springs: Springs::new(capacity.springs, parameters),
            triangles: Triangles::new(capacity.triangles),
            analyzer: ConnectedComponentAnalyzer::new(),
            is_structure_dirty: true,
            events: EventQueue::new(),
            broken_springs: AllocVec::new(),
        }
    }

    pub fn id(&self) -> ShipId {
        self.id
    }

    pub fn materials(&self) -> &MaterialDatabase {
        &self.materials
    }

    pub fn parameters(&self) -> &GameParameters {
        &self.parameters
    }

    pub fn points(&self) -> &Points {
        &self.points
    }

    /// Direct point access for pinning, seeding water and similar tweaks.
    pub fn points_mut(&mut self) -> &mut Points {
        &mut self.points
    }

    pub fn springs(&self) -> &Springs {
        &self.springs
    }

    pub fn triangles(&self) -> &Triangles {
        &self.triangles
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Component count from the last analysis.
    pub fn component_count(&self) -> usize {
        self.analyzer.component_count()
    }

    //
    // Construction
    //

    pub fn add_point(
        &mut self,
        position: Vec2f,
        structural_material: MaterialId,
        electrical_material: Option<MaterialId>,
    ) -> Result<ElementIndex, PhysicsError> {
        self.points
            .add(position, structural_material, electrical_material, &self.materials)
    }

    /// Add a spring between two live points and register it on both.
    pub fn add_spring(
        &mut self,
        point_a: ElementIndex,
        point_b: ElementIndex,
        characteristics: Characteristics,
    ) -> Result<ElementIndex, PhysicsError> {
        let spring = self
            .springs
            .add(point_a, point_b, 0, characteristics, &self.points, &self.materials)?;
        self.points.add_connected_spring(point_a, spring);
        self.points.add_connected_spring(point_b, spring);
        self.is_structure_dirty = true;
        Ok(spring)
    }

    /// Add a triangle over three points and its three edge springs
    /// (A-B, B-C, C-A), bumping each edge's super-triangle count.
    pub fn add_triangle(
        &mut self,
        vertices: [ElementIndex; 3],
        springs: [ElementIndex; 3],
    ) -> Result<ElementIndex, PhysicsError> {
        for &point in &vertices {
            self.check_live_point(point)?;
        }
        for &spring in &springs {
            self.check_live_spring(spring)?;
        }

        let triangle = self.triangles.add(vertices, springs)?;
        for spring in springs {
            self.springs.add_super_triangle(spring);
        }
        for point in vertices {
            self.points.add_connected_triangle(point, triangle);
        }
        Ok(triangle)
    }

    /// Label connected components once construction is complete.
    pub fn finalize(&mut self) {
        self.analyze_components();
        log::info!(
            "ship {}: {} points, {} springs, {} triangles, {} components",
            self.id,
            self.points.live_count(),
            self.springs.live_count(),
            self.triangles.live_count(),
            self.analyzer.component_count()
        );
    }

    //
    // Simulation
    //

    /// Advance the ship by one simulation step.
    pub fn update<O: StepObserver>(
        &mut self,
        current_time: f32,
        parameters: &GameParameters,
        observer: &mut O,
    ) {
        let bomb_mass_changed = self.parameters.bomb_mass != parameters.bomb_mass;
        self.parameters.clone_from(parameters);
        self.springs.update_game_parameters(parameters, &self.points);
        if bomb_mass_changed {
            let bombs = self.springs.update_bomb_masses(&mut self.points, parameters.bomb_mass);
            if bombs > 0 {
                log::debug!("ship {}: {} bombs now weigh {}", self.id, bombs, parameters.bomb_mass);
            }
        }
        self.apply_pending_mass_updates();

        if self.is_structure_dirty {
            self.analyze_components();
        }

        solver::update_mechanical_dynamics(
            &mut self.points,
            &self.springs,
            parameters,
            current_time,
            observer,
        );

        let mut broken = core::mem::take(&mut self.broken_springs);
        broken.clear();
        self.springs
            .update_strains(current_time, parameters, &self.points, &mut self.events, &mut broken);
        for &spring in &broken {
            self.on_spring_destroyed(spring, DestroyOptions::FIRE_BREAK_EVENT);
        }
        observer.on_strains_updated(broken.len());
        self.broken_springs = broken;

        // Bombs dropped by broken springs.
        self.apply_pending_mass_updates();

        if self.is_structure_dirty {
            self.analyze_components();
            observer.on_components_updated(self.analyzer.component_count());
        }

        self.update_water(current_time);
        observer.on_water_updated();

        observer.on_step_complete();
    }

    fn update_water(&mut self, current_time: f32) {
        let parameters = &self.parameters;
        let taken_in = water::update_water_inflow(
            &mut self.points,
            parameters,
            current_time,
            SIMULATION_STEP_TIME_DURATION,
        );
        if taken_in > 0.0 {
            log::trace!("ship {}: took in {} water", self.id, taken_in);
        }

        let mut deltas = self.points.allocate_work_buffer_float();
        water::update_water_propagation(&mut self.points, &self.springs, parameters, &mut deltas);
    }

    fn apply_pending_mass_updates(&mut self) {
        if !self.points.has_pending_mass_updates() {
            return;
        }
        for point in self.points.take_pending_mass_updates() {
            for i in 0..self.points.connected_springs(point).len() {
                let spring = self.points.connected_springs(point)[i];
                self.springs.on_point_mass_updated(spring, &self.points);
            }
        }
    }

    fn analyze_components(&mut self) {
        self.analyzer.analyze(&mut self.points, &self.springs);
        self.is_structure_dirty = false;
    }

    //
    // Destruction
    //

    /// Destroy a live spring and everything that depends on it.
    pub fn destroy_spring(
        &mut self,
        spring: ElementIndex,
        options: DestroyOptions,
        current_time: f32,
    ) -> Result<(), PhysicsError> {
        self.check_live_spring(spring)?;
        self.springs.destroy(
            spring,
            options,
            current_time,
            &self.parameters,
            &self.points,
            &mut self.events,
        );
        self.on_spring_destroyed(spring, options);
        Ok(())
    }

    /// Sever an already-deleted spring from its points and triangles.
    fn on_spring_destroyed(&mut self, spring: ElementIndex, options: DestroyOptions) {
        let Endpoints { point_a, point_b } = self.springs.endpoints(spring);

        self.points.remove_connected_spring(point_a, spring);
        self.points.remove_connected_spring(point_b, spring);

        if options.contains(DestroyOptions::DESTROY_ALL_TRIANGLES) {
            for point in [point_a, point_b] {
                while let Some(&triangle) = self.points.connected_triangles(point).last() {
                    self.destroy_triangle(triangle);
                }
            }
        } else {
            // Any triangle with this edge touches both endpoints.
            let mut i = 0;
            while i < self.points.connected_triangles(point_a).len() {
                let triangle = self.points.connected_triangles(point_a)[i];
                if self.triangles.has_edge(triangle, spring) {
                    self.destroy_triangle(triangle);
                } else {
                    i += 1;
                }
            }
        }

        if self.springs.is_bomb_attached(spring) {
            self.springs.detach_bomb(spring, &mut self.points);
            self.events.push(ShipEvent::BombDetached { spring });
        }

        for point in [point_a, point_b] {
            if !self.points.is_hull(point) {
                self.points.set_leaking(point);
            }
        }

        self.is_structure_dirty = true;
    }

    fn destroy_triangle(&mut self, triangle: ElementIndex) {
        self.triangles.destroy(triangle, &mut self.springs);
        for point in self.triangles.vertices(triangle) {
            self.points.remove_connected_triangle(point, triangle);
        }
    }

    /// Destroy a live point: its springs break (with events, taking all
    /// triangles on their endpoints), then the point itself goes.
    pub fn destroy_point(&mut self, point: ElementIndex, current_time: f32) -> Result<(), PhysicsError> {
        self.check_live_point(point)?;

        while let Some(&spring) = self.points.connected_springs(point).last() {
            self.destroy_spring(
                spring,
                DestroyOptions::FIRE_BREAK_EVENT | DestroyOptions::DESTROY_ALL_TRIANGLES,
                current_time,
            )?;
        }
        while let Some(&triangle) = self.points.connected_triangles(point).last() {
            self.destroy_triangle(triangle);
        }

        self.points.destroy(point);
        self.events.push(ShipEvent::PointDestroyed { point });
        self.is_structure_dirty = true;
        log::debug!("ship {}: destroyed point {}", self.id, point);
        Ok(())
    }

    //
    // Bombs
    //

    /// Attach a bomb to a live spring. Panics if one is already attached.
    pub fn attach_bomb(&mut self, spring: ElementIndex) -> Result<(), PhysicsError> {
        self.check_live_spring(spring)?;
        self.springs.attach_bomb(spring, &mut self.points, &self.parameters);
        self.events.push(ShipEvent::BombAttached { spring });
        Ok(())
    }

    /// Detach the bomb from a live spring. Panics if none is attached.
    pub fn detach_bomb(&mut self, spring: ElementIndex) -> Result<(), PhysicsError> {
        self.check_live_spring(spring)?;
        self.springs.detach_bomb(spring, &mut self.points);
        self.events.push(ShipEvent::BombDetached { spring });
        Ok(())
    }

    //
    // Outputs
    //

    /// Take every event queued since the last drain, oldest first.
    pub fn drain_events(&mut self) -> AllocVec<ShipEvent> {
        self.events.drain().collect()
    }

    /// Drain the queued events into `handler`, resolving material ids.
    ///
    /// Spring materials are checked when springs are added, so every id in
    /// the queue resolves.
    pub fn dispatch_events<H: GameEventHandler>(&mut self, handler: &mut H) {
        let materials = &self.materials;
        for event in self.events.drain() {
            match event {
                ShipEvent::SpringBroken {
                    spring,
                    material,
                    is_underwater,
                    destroy_all_triangles,
                    time,
                } => {
                    let resolved = materials.structural(material);
                    debug_assert!(resolved.is_some(), "spring {} has unknown material {}", spring, material);
                    if let Some(material) = resolved {
                        handler.on_spring_broken(spring, material, is_underwater, destroy_all_triangles, time);
                    }
                }
                ShipEvent::SpringStressed { spring, material, is_underwater } => {
                    let resolved = materials.structural(material);
                    debug_assert!(resolved.is_some(), "spring {} has unknown material {}", spring, material);
                    if let Some(material) = resolved {
                        handler.on_spring_stressed(spring, material, is_underwater);
                    }
                }
                ShipEvent::BombAttached { spring } => handler.on_bomb_attached(spring),
                ShipEvent::BombDetached { spring } => handler.on_bomb_detached(spring),
                ShipEvent::PointDestroyed { point } => handler.on_point_destroyed(point),
            }
        }
    }

    /// Upload every live element to `sink`.
    pub fn upload_render<S: RenderSink>(&self, sink: &mut S) {
        for point in self.points.live_indices() {
            let water = self.points.water(point);
            sink.upload_point(
                point,
                self.points.position(point),
                point_color(self.points.render_color(point), water),
                water,
            );
        }

        for spring in self.springs.live_indices() {
            let Endpoints { point_a, point_b } = self.springs.endpoints(spring);
            if self.springs.is_rope(spring) {
                sink.upload_rope(point_a, point_b);
            } else {
                sink.upload_spring(point_a, point_b);
            }
            if self.springs.is_stressed(spring) {
                sink.upload_stressed_spring(point_a, point_b);
            }
        }

        for triangle in self.triangles.live_indices() {
            let vertices = self.triangles.vertices(triangle);
            sink.upload_triangle(vertices, self.points.connected_component_id(vertices[0]));
        }
    }

    //
    // Validation
    //

    fn check_live_point(&self, point: ElementIndex) -> Result<(), PhysicsError> {
        if !self.points.contains(point) {
            return Err(PhysicsError::ElementOutOfBounds {
                kind: ElementKind::Point,
                index: point,
                count: self.points.added_count(),
            });
        }
        if self.points.is_deleted(point) {
            return Err(PhysicsError::DeletedElement { kind: ElementKind::Point, index: point });
        }
        Ok(())
    }

    fn check_live_spring(&self, spring: ElementIndex) -> Result<(), PhysicsError> {
        if spring >= self.springs.added_count() {
            return Err(PhysicsError::ElementOutOfBounds {
                kind: ElementKind::Spring,
                index: spring,
                count: self.springs.added_count(),
            });
        }
        if self.springs.is_deleted(spring) {
            return Err(PhysicsError::DeletedElement { kind: ElementKind::Spring, index: spring });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MaterialSound, StructuralMaterial};
    use alloc::string::String;

    fn materials() -> Rc<MaterialDatabase> {
        let mut db = MaterialDatabase::new();
        db.add_structural(StructuralMaterial {
            name: String::from("Wood"),
            strength: 1.0,
            mass: 1.0,
            stiffness: 1.0,
            render_color: [0.6, 0.4, 0.2, 1.0],
            is_hull: false,
            sound: MaterialSound::Wood,
        })
        .unwrap();
        Rc::new(db)
    }

    fn triangle_ship() -> (Ship, [ElementIndex; 3]) {
        let capacity = ShipCapacity { points: 3, springs: 3, triangles: 1 };
        let mut ship = Ship::new(0, capacity, materials(), &GameParameters::default());
        let a = ship.add_point(Vec2f::new(0.0, 10.0), 0, None).unwrap();
        let b = ship.add_point(Vec2f::new(1.0, 10.0), 0, None).unwrap();
        let c = ship.add_point(Vec2f::new(0.0, 11.0), 0, None).unwrap();
        let ab = ship.add_spring(a, b, Characteristics::empty()).unwrap();
        let bc = ship.add_spring(b, c, Characteristics::empty()).unwrap();
        let ca = ship.add_spring(c, a, Characteristics::empty()).unwrap();
        ship.add_triangle([a, b, c], [ab, bc, ca]).unwrap();
        ship.finalize();
        (ship, [ab, bc, ca])
    }

    #[test]
    fn triangle_counts_on_its_edges() {
        let (ship, edges) = triangle_ship();
        for spring in edges {
            assert_eq!(ship.springs().super_triangles_count(spring), 1);
        }
        assert_eq!(ship.points().connected_triangles(0), &[0]);
        assert_eq!(ship.component_count(), 1);
    }

    #[test]
    fn destroying_an_edge_takes_its_triangle() {
        let (mut ship, [ab, bc, _]) = triangle_ship();
        ship.destroy_spring(ab, DestroyOptions::empty(), 0.0).unwrap();

        assert!(ship.triangles().is_deleted(0));
        assert_eq!(ship.springs().super_triangles_count(bc), 0);
        assert!(ship.points().connected_triangles(2).is_empty());
        assert!(ship.points().is_leaking(0));
        assert!(ship.events().is_empty());
    }

    #[test]
    fn destroying_a_deleted_spring_is_an_error() {
        let (mut ship, [ab, _, _]) = triangle_ship();
        ship.destroy_spring(ab, DestroyOptions::FIRE_BREAK_EVENT, 0.0).unwrap();
        assert_eq!(
            ship.destroy_spring(ab, DestroyOptions::FIRE_BREAK_EVENT, 0.0),
            Err(PhysicsError::DeletedElement { kind: ElementKind::Spring, index: ab })
        );
        assert_eq!(ship.drain_events().len(), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unknown material")]
    fn dispatching_an_unknown_material_asserts() {
        let (mut ship, [ab, _, _]) = triangle_ship();
        ship.events.push(ShipEvent::SpringStressed { spring: ab, material: 42, is_underwater: false });
        ship.dispatch_events(&mut crate::events::NoOpGameEventHandler);
    }
}
