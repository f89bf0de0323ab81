//! Target and bounds checks

use super::collision::Sphere;
use super::state::{Projectile, TargetVolume};
use crate::distance_squared;

/// Whether two spheres overlap (strictly), compared on squared distance
#[inline]
pub fn spheres_overlap(a: &Sphere, b: &Sphere) -> bool {
    let reach = a.radius + b.radius;
    distance_squared(a.center, b.center) < reach * reach
}

/// Whether the ball has reached the bucket
///
/// A target that has not loaded yet is never reached.
pub fn target_reached(target: Option<&TargetVolume>, ball: &Projectile) -> bool {
    target.is_some_and(|target| spheres_overlap(&target.sphere(), &ball.sphere()))
}

/// Whether the bottom of the ball is below `floor_height`
#[inline]
pub fn out_of_bounds(ball: &Projectile, floor_height: f32) -> bool {
    ball.center.y - ball.radius < floor_height
}
