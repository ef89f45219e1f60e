//! Ropes between two existing points.

use crate::element::ElementIndex;
use crate::error::PhysicsError;
use crate::flags::Characteristics;
use crate::material::MaterialId;
use crate::ship::Ship;
use crate::vec::Vec;
use alloc::vec::Vec as AllocVec;

/// Join `start` and `end` with a rope of `segments` springs.
///
/// `segments - 1` intermediate points of `material` are laid out evenly on
/// the straight line between the two ends. Every segment carries the
/// `ROPE` characteristic. Returns the rope's springs, from `start` to `end`.
pub fn add_rope(
    ship: &mut Ship,
    start: ElementIndex,
    end: ElementIndex,
    segments: usize,
    material: MaterialId,
) -> Result<AllocVec<ElementIndex>, PhysicsError> {
    let segments = segments.max(1);
    let start_position = ship.points().position(start);
    let end_position = ship.points().position(end);

    let mut springs = AllocVec::with_capacity(segments);
    let mut previous = start;
    for i in 1..segments {
        let t = i as f32 / segments as f32;
        let point = ship.add_point(start_position.lerp(end_position, t), material, None)?;
        springs.push(ship.add_spring(previous, point, Characteristics::ROPE)?);
        previous = point;
    }
    springs.push(ship.add_spring(previous, end, Characteristics::ROPE)?);

    Ok(springs)
}
