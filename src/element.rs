//! Index-addressed element storage shared by points, springs and triangles.
//!
//! Every container is sized once, up front, and never resized while the
//! simulation runs. Elements are addressed by a stable [`ElementIndex`] and
//! all per-element attributes live in parallel [`Buffer`](crate::buffer::Buffer)s
//! of identical length, so the same index is valid across all of them.

/// Index of an element within its container.
pub type ElementIndex = u32;

/// Number of elements in a container.
pub type ElementCount = u32;

/// Sentinel for "no element".
pub const NONE_ELEMENT_INDEX: ElementIndex = ElementIndex::MAX;

/// Label shared by all points reachable from one another through live springs.
pub type ConnectedComponentId = u32;

/// Component id of points that belong to no component (deleted points).
pub const NONE_CONNECTED_COMPONENT_ID: ConnectedComponentId = 0;

/// Buffers are padded to a multiple of this many elements.
pub const BUFFER_ALIGNMENT: ElementCount = 4;

/// Fixed-capacity bookkeeping common to all element containers.
#[derive(Clone, Debug)]
pub struct ElementContainer {
    element_count: ElementCount,
    buffer_element_count: ElementCount,
}

impl ElementContainer {
    pub fn new(element_count: ElementCount) -> Self {
        let buffer_element_count = element_count
            .div_ceil(BUFFER_ALIGNMENT)
            .saturating_mul(BUFFER_ALIGNMENT);
        ElementContainer { element_count, buffer_element_count }
    }

    /// Number of addressable elements.
    pub fn element_count(&self) -> ElementCount {
        self.element_count
    }

    /// Size of every attribute buffer, including padding.
    pub fn buffer_element_count(&self) -> ElementCount {
        self.buffer_element_count
    }

    /// All element indices, deleted or not. The range can be iterated any
    /// number of times.
    pub fn iter(&self) -> ElementIndexRange {
        ElementIndexRange { start: 0, end: self.element_count }
    }
}

/// A lazy, restartable range of element indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ElementIndexRange {
    start: ElementIndex,
    end: ElementIndex,
}

impl ElementIndexRange {
    pub fn new(start: ElementIndex, end: ElementIndex) -> Self {
        ElementIndexRange { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl IntoIterator for ElementIndexRange {
    type Item = ElementIndex;
    type IntoIter = core::ops::Range<ElementIndex>;

    fn into_iter(self) -> Self::IntoIter {
        self.start..self.end
    }
}
