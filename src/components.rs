//! Connected-component labeling over the live spring graph.
//!
//! Two points share a label if and only if a path of live springs joins
//! them. Labels start at 1 and are assigned in point-index order of each
//! component's lowest point, so re-running on an unchanged structure yields
//! the same labels.

use crate::element::{ConnectedComponentId, ElementIndex, NONE_CONNECTED_COMPONENT_ID};
use crate::points::Points;
use crate::springs::Springs;
use alloc::collections::VecDeque;
use alloc::vec::Vec as AllocVec;

/// Breadth-first labeler. Keeps its queue between runs.
#[derive(Default)]
pub struct ConnectedComponentAnalyzer {
    queue: VecDeque<ElementIndex>,
    component_count: usize,
}

impl ConnectedComponentAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relabel every live point. Returns the number of components.
    pub fn analyze(&mut self, points: &mut Points, springs: &Springs) -> usize {
        let indices: AllocVec<ElementIndex> = points.live_indices().collect();
        for &point in &indices {
            points.set_connected_component_id(point, NONE_CONNECTED_COMPONENT_ID);
        }

        let mut next_id: ConnectedComponentId = NONE_CONNECTED_COMPONENT_ID + 1;
        for &seed in &indices {
            if points.connected_component_id(seed) != NONE_CONNECTED_COMPONENT_ID {
                continue;
            }

            points.set_connected_component_id(seed, next_id);
            self.queue.clear();
            self.queue.push_back(seed);

            while let Some(point) = self.queue.pop_front() {
                for i in 0..points.connected_springs(point).len() {
                    let spring = points.connected_springs(point)[i];
                    debug_assert!(!springs.is_deleted(spring));
                    let other = springs.other_endpoint_index(spring, point);
                    if points.connected_component_id(other) == NONE_CONNECTED_COMPONENT_ID {
                        points.set_connected_component_id(other, next_id);
                        self.queue.push_back(other);
                    }
                }
            }

            next_id += 1;
        }

        self.component_count = (next_id - 1) as usize;
        log::trace!("{} connected components", self.component_count);
        self.component_count
    }

    /// Component count found by the last run.
    pub fn component_count(&self) -> usize {
        self.component_count
    }
}

/// Whether every live spring joins two points with the same label.
pub fn springs_are_consistent(points: &Points, springs: &Springs) -> bool {
    springs.live_indices().all(|spring| {
        let endpoints = springs.endpoints(spring);
        points.connected_component_id(endpoints.point_a)
            == points.connected_component_id(endpoints.point_b)
            && points.connected_component_id(endpoints.point_a) != NONE_CONNECTED_COMPONENT_ID
    })
}
