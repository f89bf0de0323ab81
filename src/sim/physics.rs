//! Projectile integration for a single substep

use super::collision::SpatialIndex;
use super::state::Projectile;
use crate::tuning::Tuning;

/// Advance the ball by one substep of `dt` seconds
///
/// Moves the ball, resolves contact with the world (bounce plus push-out),
/// applies gravity only when airborne, then decays velocity exponentially.
/// Callers are expected to clamp `dt` and only step balls that are in flight.
pub fn step<W: SpatialIndex + ?Sized>(ball: &mut Projectile, dt: f32, world: &W, tuning: &Tuning) {
    ball.center += ball.velocity * dt;

    match world.intersect(&ball.sphere()) {
        Some(contact) => {
            // Remove the normal component and add it back amplified
            let into_surface = contact.normal.dot(ball.velocity);
            ball.velocity -= contact.normal * (into_surface * tuning.bounce_coefficient);
            ball.center += contact.normal * contact.depth;
        }
        None => {
            ball.velocity.y -= tuning.gravity * dt;
        }
    }

    let damping = (-tuning.damping_rate * dt).exp() - 1.0;
    ball.velocity += ball.velocity * damping;
}
