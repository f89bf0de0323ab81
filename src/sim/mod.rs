//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame time, clamped and split into fixed substeps
//! - No I/O, no globals, no rendering or platform dependencies
//! - Missing assets (target, world geometry) mean "no effect", never an error

pub mod collision;
pub mod detect;
pub mod physics;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, EmptyWorld, GroundPlane, SpatialIndex, Sphere, Triangle, TriangleWorld};
pub use detect::{out_of_bounds, spheres_overlap, target_reached};
pub use physics::step;
pub use state::{AimSpec, BallMode, GameEvent, Projectile, TargetVolume};
pub use tick::{EventSink, GameStateMachine, LogSink};
