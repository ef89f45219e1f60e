//! Breakable, floating mass-spring ships.
//!
//! `shipsim` simulates a ship as point masses joined by springs and grouped
//! into triangles, floating in a sea under gravity. Springs strain, get
//! stressed and break; broken structures fall apart into connected
//! components; breached compartments flood.
//!
//! # Features
//!
//! - **Structure-of-arrays elements**: points, springs and triangles in
//!   fixed-capacity parallel buffers, addressed by stable indices
//! - **Explicit integration**: spring-damper forces with cached,
//!   mass-dependent coefficients over fixed sub-iterations
//! - **Breakage**: strain-driven stress and break with triangle cascades and
//!   connected-component relabeling
//! - **Water**: buoyancy, quadratic drag, waves, leaking and flooding
//! - **Events, not callbacks**: structural events are queued during a step
//!   and drained afterwards
//! - **Observable**: monitor steps via the `StepObserver` trait
//! - **`no_std` compatible**: needs only `alloc`
//!
//! # Example
//! ```
//! use shipsim::{build_grid, GameParameters, HullGridConfig, MaterialDatabase, NoOpStepObserver,
//!     Ship, ShipCapacity, Vec2f};
//! use std::rc::Rc;
//!
//! let materials = MaterialDatabase::from_json_str(
//!     "inline",
//!     r##"{ "structural_materials": [
//!         { "name": "Steel", "strength": 2.0, "mass": 100.0, "render_color": "#808080",
//!           "sound_type": "Metal" }
//!     ] }"##,
//! )
//! .unwrap();
//!
//! let grid = HullGridConfig { cols: 4, rows: 3, spacing: 1.0, material: 0 };
//! let capacity = ShipCapacity {
//!     points: grid.point_count(),
//!     springs: grid.spring_count(),
//!     triangles: grid.triangle_count(),
//! };
//! let parameters = GameParameters::new();
//! let mut ship = Ship::new(1, capacity, Rc::new(materials), &parameters);
//! build_grid(&mut ship, Vec2f::new(0.0, 2.0), &grid).unwrap();
//! ship.finalize();
//!
//! ship.update(0.0, &parameters, &mut NoOpStepObserver);
//! assert_eq!(ship.component_count(), 1);
//! ```

#![no_std]

extern crate alloc;

pub mod float;
pub mod vec;
pub mod element;
pub mod buffer;
pub mod flags;
pub mod material;
pub mod config;
pub mod error;
pub mod points;
pub mod springs;
pub mod triangles;
pub mod components;
pub mod water;
pub mod solver;
pub mod events;
pub mod observer;
pub mod render;
pub mod grid;
pub mod rope;
pub mod ship;

// Re-export primary API
pub use float::Float;
pub use vec::{Vec, Vec2, Vec2f};
pub use element::{ConnectedComponentId, ElementCount, ElementIndex, NONE_CONNECTED_COMPONENT_ID};
pub use flags::{Characteristics, DestroyOptions};
pub use material::{ElectricalMaterial, MaterialDatabase, MaterialId, MaterialSound, StructuralMaterial};
pub use config::{GameParameters, WaveConfig};
pub use error::{AddMaterialError, ElementKind, MaterialError, PhysicsError};
pub use points::Points;
pub use springs::Springs;
pub use triangles::Triangles;
pub use components::ConnectedComponentAnalyzer;
pub use events::{EventQueue, GameEventHandler, NoOpGameEventHandler, ShipEvent};
pub use observer::{NoOpStepObserver, StepObserver};
pub use render::{RenderBuffers, RenderSink};
pub use grid::{build_grid, HullGrid, HullGridConfig};
pub use rope::add_rope;
pub use ship::{Ship, ShipCapacity, ShipId};
