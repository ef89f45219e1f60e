//! Global simulation parameters.
//!
//! Parameters are read at the start of every step. Changing the ones that
//! feed cached spring coefficients (sub-iteration count, stiffness
//! adjustment) makes the next step recompute those coefficients instead of
//! applying the change mid-step.

use crate::vec::Vec2f;
use serde::{Deserialize, Serialize};

/// Duration of one simulation step, in seconds.
pub const SIMULATION_STEP_TIME_DURATION: f32 = 1.0 / 60.0;

/// Water amount at which a point counts as fully flooded.
pub const WATER_SATURATION: f32 = 1.0;

/// Sinusoidal ocean surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub amplitude: f32,
    pub wavelength: f32,
    /// Phase speed in world units per second.
    pub speed: f32,
}

/// Global tunables consumed by the ship step.
///
/// # Builder Pattern
/// ```
/// use shipsim::config::GameParameters;
///
/// let parameters = GameParameters::new()
///     .with_mechanical_iterations(12)
///     .with_stiffness_adjustment(0.5)
///     .with_sea_level(-5.0);
/// assert_eq!(parameters.num_mechanical_dynamics_iterations, 12);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameParameters {
    /// Mechanical sub-iterations per step. More allow stiffer springs
    /// without blowing up. Default: 24.
    pub num_mechanical_dynamics_iterations: usize,
    /// Multiplier on material stiffness. Default: 1.0.
    pub stiffness_adjustment: f32,
    /// Multiplier on material strength. Default: 1.0.
    pub strength_adjustment: f32,
    /// Fraction of the stability limit used for spring stiffness. Default: 0.4.
    pub spring_reduction_fraction: f32,
    /// Fraction of critical damping applied along springs. Default: 0.03.
    pub spring_damping_coefficient: f32,
    /// Strain, as a fraction of effective strength, above which a spring
    /// counts as stressed. Default: 0.25.
    pub stress_threshold_fraction: f32,
    /// Velocity retained after every sub-iteration. Default: 0.9996.
    pub global_damping: f32,
    /// Gravity acceleration. Default: (0, -9.8).
    pub gravity: Vec2f,
    /// Mass added to both endpoints of a spring carrying a bomb. Default: 5000.
    pub bomb_mass: f32,
    /// Upward force on a fully submerged, dry point (one cubic meter of
    /// displaced water). Default: 9800.
    pub water_buoyancy_force: f32,
    /// Multiplier on buoyancy. Default: 1.0.
    pub buoyancy_adjustment: f32,
    /// Quadratic drag coefficient for submerged points. Default: 100.
    pub water_drag_coefficient: f32,
    /// Mass a saturated point gains from the water it holds. Default: 1000.
    pub water_mass: f32,
    /// Water taken in per second per unit of depth by a leaking point.
    /// Default: 0.5.
    pub water_intake_rate: f32,
    /// Fraction of the water difference moved across a fully permeable
    /// spring per step. Default: 0.5.
    pub water_diffusion_rate: f32,
    /// Height of the still water surface. Default: 0.
    pub sea_level: f32,
    /// Depth of the ocean floor below sea level. Default: 150.
    pub sea_depth: f32,
    /// Optional waves on top of the sea level. Default: none.
    pub waves: Option<WaveConfig>,
}

impl GameParameters {
    /// Create parameters with default values.
    pub fn new() -> Self {
        GameParameters {
            num_mechanical_dynamics_iterations: 24,
            stiffness_adjustment: 1.0,
            strength_adjustment: 1.0,
            spring_reduction_fraction: 0.4,
            spring_damping_coefficient: 0.03,
            stress_threshold_fraction: 0.25,
            global_damping: 0.9996,
            gravity: Vec2f::new(0.0, -9.8),
            bomb_mass: 5000.0,
            water_buoyancy_force: 9800.0,
            buoyancy_adjustment: 1.0,
            water_drag_coefficient: 100.0,
            water_mass: 1000.0,
            water_intake_rate: 0.5,
            water_diffusion_rate: 0.5,
            sea_level: 0.0,
            sea_depth: 150.0,
            waves: None,
        }
    }

    /// Set the number of mechanical sub-iterations per step.
    pub fn with_mechanical_iterations(mut self, iterations: usize) -> Self {
        self.num_mechanical_dynamics_iterations = iterations.max(1);
        self
    }

    pub fn with_stiffness_adjustment(mut self, adjustment: f32) -> Self {
        self.stiffness_adjustment = adjustment;
        self
    }

    pub fn with_strength_adjustment(mut self, adjustment: f32) -> Self {
        self.strength_adjustment = adjustment;
        self
    }

    pub fn with_stress_threshold_fraction(mut self, fraction: f32) -> Self {
        self.stress_threshold_fraction = fraction;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec2f) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_global_damping(mut self, damping: f32) -> Self {
        self.global_damping = damping;
        self
    }

    pub fn with_bomb_mass(mut self, mass: f32) -> Self {
        self.bomb_mass = mass;
        self
    }

    pub fn with_buoyancy_adjustment(mut self, adjustment: f32) -> Self {
        self.buoyancy_adjustment = adjustment;
        self
    }

    pub fn with_water_drag(mut self, coefficient: f32) -> Self {
        self.water_drag_coefficient = coefficient;
        self
    }

    pub fn with_water_intake_rate(mut self, rate: f32) -> Self {
        self.water_intake_rate = rate;
        self
    }

    pub fn with_water_diffusion_rate(mut self, rate: f32) -> Self {
        self.water_diffusion_rate = rate.clamp(0.0, 0.5);
        self
    }

    pub fn with_sea_level(mut self, sea_level: f32) -> Self {
        self.sea_level = sea_level;
        self
    }

    pub fn with_sea_depth(mut self, sea_depth: f32) -> Self {
        self.sea_depth = sea_depth;
        self
    }

    pub fn with_waves(mut self, waves: WaveConfig) -> Self {
        self.waves = Some(waves);
        self
    }

    /// Duration of one mechanical sub-iteration.
    pub fn mechanical_dt(&self) -> f32 {
        SIMULATION_STEP_TIME_DURATION / self.num_mechanical_dynamics_iterations.max(1) as f32
    }
}

impl Default for GameParameters {
    fn default() -> Self {
        Self::new()
    }
}
