//! Game state and core simulation types

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Sphere;

/// What the ball is doing this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BallMode {
    /// Ball is in hand, follows the aim source, no physics
    #[default]
    Held,
    /// Ball was thrown, physics runs every substep
    InFlight,
    /// Ball was returned to the thrower and waits to be picked up
    Resting,
}

/// The thrown ball
///
/// Created once and repositioned in place on every throw and reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub center: Vec3,
    pub radius: f32,
    pub velocity: Vec3,
    pub mode: BallMode,
}

impl Projectile {
    pub fn new(radius: f32, center: Vec3) -> Self {
        Self {
            center,
            radius,
            velocity: Vec3::ZERO,
            mode: BallMode::Held,
        }
    }

    /// Collision sphere at the current position
    #[inline]
    pub fn sphere(&self) -> Sphere {
        Sphere::new(self.center, self.radius)
    }

    /// Move to `point`, drop all velocity and enter `mode`
    pub fn place(&mut self, point: Vec3, mode: BallMode) {
        self.center = point;
        self.velocity = Vec3::ZERO;
        self.mode = mode;
    }

    #[inline]
    pub fn in_flight(&self) -> bool {
        self.mode == BallMode::InFlight
    }
}

/// The bucket: a fixed sphere the ball has to reach
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetVolume {
    pub center: Vec3,
    pub radius: f32,
}

impl TargetVolume {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn sphere(&self) -> Sphere {
        Sphere::new(self.center, self.radius)
    }
}

/// A single throw request produced by an aim source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimSpec {
    /// Release point
    pub origin: Vec3,
    /// Unit heading
    pub direction: Vec3,
    /// Launch speed
    pub speed: f32,
}

impl AimSpec {
    /// Build an aim, normalizing `direction`.
    ///
    /// Returns `None` for a zero-length or non-finite direction, or a speed
    /// that is not a finite positive number. The simulation assumes every aim
    /// it receives went through this check.
    pub fn new(origin: Vec3, direction: Vec3, speed: f32) -> Option<Self> {
        if !origin.is_finite() || !speed.is_finite() || speed <= 0.0 {
            return None;
        }
        let direction = direction.try_normalize()?;
        Some(Self {
            origin,
            direction,
            speed,
        })
    }

    /// Initial velocity with the upward bias added to the heading
    ///
    /// The biased heading is scaled without renormalizing, so a level throw
    /// at speed `s` leaves with vertical speed `lob_bias * s`.
    #[inline]
    pub fn launch_velocity(&self, lob_bias: f32) -> Vec3 {
        (self.direction + Vec3::Y * lob_bias) * self.speed
    }
}

/// Events emitted for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Ball left the hand; `attempt` is 1-based
    Thrown { attempt: u32 },
    /// Ball reached the bucket after `attempts` throws
    TargetReached { attempts: u32 },
    /// Ball dropped below the floor and was recovered
    OutOfBounds,
}
