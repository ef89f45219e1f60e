//! Triangles: three points and their three bounding springs.

use crate::buffer::Buffer;
use crate::element::{ElementContainer, ElementCount, ElementIndex, NONE_ELEMENT_INDEX};
use crate::error::{ElementKind, PhysicsError};
use crate::springs::Springs;

pub struct Triangles {
    container: ElementContainer,
    count: ElementCount,
    is_deleted: Buffer<bool>,
    vertices: Buffer<[ElementIndex; 3]>,
    // Edges A-B, B-C, C-A
    springs: Buffer<[ElementIndex; 3]>,
}

impl Triangles {
    pub fn new(capacity: ElementCount) -> Self {
        let container = ElementContainer::new(capacity);
        let size = container.buffer_element_count();
        Triangles {
            count: 0,
            is_deleted: Buffer::new(size, capacity, true),
            vertices: Buffer::new(size, capacity, [NONE_ELEMENT_INDEX; 3]),
            springs: Buffer::new(size, capacity, [NONE_ELEMENT_INDEX; 3]),
            container,
        }
    }

    /// Add a triangle. Bookkeeping on points and springs is up to the caller.
    pub fn add(
        &mut self,
        vertices: [ElementIndex; 3],
        springs: [ElementIndex; 3],
    ) -> Result<ElementIndex, PhysicsError> {
        if self.count >= self.container.element_count() {
            return Err(PhysicsError::CapacityExceeded {
                kind: ElementKind::Triangle,
                capacity: self.container.element_count(),
            });
        }
        let index = self.count;
        self.count += 1;
        self.is_deleted[index] = false;
        self.vertices[index] = vertices;
        self.springs[index] = springs;
        Ok(index)
    }

    /// Mark a triangle deleted and release its edges' super-triangle counts.
    pub fn destroy(&mut self, index: ElementIndex, springs: &mut Springs) {
        debug_assert!(!self.is_deleted[index], "triangle {} destroyed twice", index);
        self.is_deleted[index] = true;
        for spring in self.springs[index] {
            springs.remove_one_super_triangle(spring);
        }
    }

    pub fn element_count(&self) -> ElementCount {
        self.container.element_count()
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

    pub fn vertices(&self, index: ElementIndex) -> [ElementIndex; 3] {
        self.vertices[index]
    }

    pub fn springs(&self, index: ElementIndex) -> [ElementIndex; 3] {
        self.springs[index]
    }

    pub fn has_edge(&self, index: ElementIndex, spring: ElementIndex) -> bool {
        self.springs[index].contains(&spring)
    }
}
