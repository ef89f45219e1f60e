//! Step observer trait for monitoring ship simulation progress.

/// Trait for observing ship simulation steps.
///
/// Implement this trait to monitor the step (e.g., for debugging,
/// visualization, or performance profiling). All methods have default
/// no-op implementations.
pub trait StepObserver {
    /// Called after each mechanical sub-iteration has integrated all points.
    fn on_integrate(&mut self, _iteration: usize) {}

    /// Called after strains were evaluated, with the number of springs that broke.
    fn on_strains_updated(&mut self, _broken: usize) {}

    /// Called after connected components were recomputed.
    fn on_components_updated(&mut self, _component_count: usize) {}

    /// Called after the flood model ran.
    fn on_water_updated(&mut self) {}

    /// Called when a simulation step is fully complete.
    fn on_step_complete(&mut self) {}
}

/// A no-op observer that does nothing. Use as default when no observation needed.
pub struct NoOpStepObserver;

impl StepObserver for NoOpStepObserver {}
