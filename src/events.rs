//! Structural events queued during a step and handed out after it.
//!
//! Nothing is called back while a step runs. Springs and the ship append
//! [`ShipEvent`]s to an [`EventQueue`]; the owner drains the queue between
//! steps, either directly or through a [`GameEventHandler`].

use crate::element::ElementIndex;
use crate::material::{MaterialId, StructuralMaterial};
use alloc::vec::Vec as AllocVec;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShipEvent {
    /// A spring broke. Queued before the spring was marked deleted.
    SpringBroken {
        spring: ElementIndex,
        material: MaterialId,
        is_underwater: bool,
        destroy_all_triangles: bool,
        time: f32,
    },
    /// A spring entered the stressed state.
    SpringStressed {
        spring: ElementIndex,
        material: MaterialId,
        is_underwater: bool,
    },
    BombAttached { spring: ElementIndex },
    BombDetached { spring: ElementIndex },
    PointDestroyed { point: ElementIndex },
}

#[derive(Debug, Default)]
pub struct EventQueue {
    events: AllocVec<ShipEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ShipEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn as_slice(&self) -> &[ShipEvent] {
        &self.events
    }

    /// Remove and yield all queued events, oldest first.
    pub fn drain(&mut self) -> alloc::vec::Drain<'_, ShipEvent> {
        self.events.drain(..)
    }
}

/// Consumer of ship events (audio, particles, statistics).
///
/// All methods default to doing nothing.
pub trait GameEventHandler {
    fn on_spring_broken(
        &mut self,
        _spring: ElementIndex,
        _material: &StructuralMaterial,
        _is_underwater: bool,
        _destroy_all_triangles: bool,
        _time: f32,
    ) {
    }

    fn on_spring_stressed(
        &mut self,
        _spring: ElementIndex,
        _material: &StructuralMaterial,
        _is_underwater: bool,
    ) {
    }

    fn on_bomb_attached(&mut self, _spring: ElementIndex) {}

    fn on_bomb_detached(&mut self, _spring: ElementIndex) {}

    fn on_point_destroyed(&mut self, _point: ElementIndex) {}
}

/// A handler that ignores everything.
pub struct NoOpGameEventHandler;

impl GameEventHandler for NoOpGameEventHandler {}
