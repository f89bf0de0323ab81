//! Bucketball - throw a ball into a bucket
//!
//! Core modules:
//! - `sim`: Deterministic simulation (projectile physics, detectors, game state)
//! - `aim`: Input adapters that turn pointer/head/controller data into throws
//! - `tuning`: Data-driven physics constants and per-variant presets

pub mod aim;
pub mod sim;
pub mod tuning;

pub use aim::{AimSource, ControllerAim, HeadPoseAim, PointerAim, Pose, ScatterAim};
pub use tuning::{BoundsPolicy, Tuning, Variant};

use glam::Vec3;

/// Game configuration constants (observed desktop tuning)
pub mod consts {
    use glam::Vec3;

    /// Downward acceleration while airborne (units/s²)
    pub const GRAVITY: f32 = 60.0;
    /// Exponential velocity decay rate (1/s)
    pub const DAMPING_RATE: f32 = 1.5;
    /// Multiplier on the removed normal velocity component at contact
    pub const BOUNCE_COEFFICIENT: f32 = 1.5;
    /// Added to the throw direction's y before scaling ("lob")
    pub const LOB_BIAS: f32 = 0.5;

    /// Physics substeps per rendered frame
    pub const STEPS_PER_FRAME: u32 = 5;
    /// Frame time clamp before substep division (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.2;

    /// Bucket target sphere
    pub const BUCKET_POSITION: Vec3 = Vec3::new(2.0, 0.8, -6.0);
    pub const TARGET_RADIUS: f32 = 1.2;

    /// Projectile bottom below this height counts as out of bounds
    pub const FLOOR_HEIGHT: f32 = 1.0;
    /// Eye height used when respawning the player at the landing point
    pub const CAMERA_HEIGHT: f32 = 5.0;
    /// Where the player starts and returns to after a win
    pub const SPAWN_POINT: Vec3 = Vec3::new(2.0, 5.0, 5.0);
}

/// Squared distance between two points
#[inline]
pub fn distance_squared(a: Vec3, b: Vec3) -> f32 {
    (a - b).length_squared()
}

/// Closest point to `p` on the segment `a..b`
#[inline]
pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}
