//! Aim sources: turn raw input state into a throw
//!
//! The simulation only sees [`AimSpec`]. Each adapter here collects the input
//! a particular build has (mouse timing, head pose, controller pose) and is
//! sampled once per throw.

use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::LOB_BIAS;
use crate::sim::AimSpec;

/// Something that can be asked for a throw
pub trait AimSource {
    /// Current aim, or `None` if the input cannot produce a usable throw
    fn sample(&mut self) -> Option<AimSpec>;
}

impl<A: AimSource + ?Sized> AimSource for Box<A> {
    fn sample(&mut self) -> Option<AimSpec> {
        (**self).sample()
    }
}

/// Position + orientation of a tracked device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose at `position` facing `target`
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let forward = (target - position).normalize_or(Vec3::NEG_Z);
        Self::new(position, Quat::from_rotation_arc(Vec3::NEG_Z, forward))
    }

    /// Devices look down their local -Z
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }
}

/// Base speed of a pointer throw
pub const POINTER_BASE_SPEED: f32 = 15.0;
/// Extra speed per millisecond the button is held
pub const POINTER_SPEED_PER_MS: f32 = 200.0 * 0.0001;
/// Hand position relative to the camera
pub const HAND_OFFSET: Vec3 = Vec3::new(0.3, -0.1, 0.0);
/// Release distance in front of the hand
pub const HAND_REACH: f32 = 0.35 * 1.5;

/// Desktop pointer-lock aiming
///
/// Throw speed grows with how long the button was held. Throws only happen
/// while the pointer is locked to the game; clicks made while unlocked (such
/// as the one that acquires the lock) are ignored.
#[derive(Debug, Clone)]
pub struct PointerAim {
    eye: Vec3,
    forward: Vec3,
    /// Upward bias applied to the hand offset direction
    lob_bias: f32,
    locked: bool,
    pressed_at_ms: Option<f64>,
    held_ms: Option<f64>,
}

impl PointerAim {
    pub fn new(eye: Vec3, forward: Vec3) -> Self {
        Self {
            eye,
            forward,
            lob_bias: LOB_BIAS,
            locked: false,
            pressed_at_ms: None,
            held_ms: None,
        }
    }

    /// Match the release point to a non-default throw lob
    pub fn with_lob_bias(mut self, lob_bias: f32) -> Self {
        self.lob_bias = lob_bias;
        self
    }

    pub fn set_camera(&mut self, eye: Vec3, forward: Vec3) {
        self.eye = eye;
        self.forward = forward;
    }

    pub fn set_locked(&mut self, locked: bool) {
        if self.locked != locked {
            log::debug!("Pointer lock {}", if locked { "acquired" } else { "released" });
            self.pressed_at_ms = None;
            self.held_ms = None;
        }
        self.locked = locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Button down at `time_ms`; ignored while unlocked
    pub fn press(&mut self, time_ms: f64) {
        if self.locked {
            self.pressed_at_ms = Some(time_ms);
        }
    }

    /// Button up at `time_ms`; arms a throw for the next [`AimSource::sample`]
    pub fn release(&mut self, time_ms: f64) {
        if !self.locked {
            return;
        }
        if let Some(pressed) = self.pressed_at_ms.take() {
            self.held_ms = Some((time_ms - pressed).max(0.0));
        }
    }

    /// Throw speed after holding the button for `held_ms`
    pub fn speed_for_hold(held_ms: f64) -> f32 {
        POINTER_BASE_SPEED + POINTER_SPEED_PER_MS * held_ms as f32
    }

    /// Hand position pushed out along the lobbed heading
    fn release_point(&self, direction: Vec3) -> Vec3 {
        self.eye + HAND_OFFSET + (direction + Vec3::Y * self.lob_bias) * HAND_REACH
    }
}

impl AimSource for PointerAim {
    fn sample(&mut self) -> Option<AimSpec> {
        if !self.locked {
            return None;
        }
        let held = self.held_ms.take()?;
        let direction = self.forward.try_normalize()?;
        AimSpec::new(self.release_point(direction), direction, Self::speed_for_hold(held))
    }
}

/// Handheld AR: throw along the view direction
#[derive(Debug, Clone)]
pub struct HeadPoseAim {
    pose: Pose,
    speed: f32,
    /// Release distance in front of the eye
    reach: f32,
    /// Release distance below the eye
    drop: f32,
}

impl HeadPoseAim {
    pub fn new(pose: Pose, speed: f32) -> Self {
        Self {
            pose,
            speed,
            reach: 0.3,
            drop: 0.1,
        }
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }
}

impl AimSource for HeadPoseAim {
    fn sample(&mut self) -> Option<AimSpec> {
        let forward = self.pose.forward();
        let origin = self.pose.position + forward * self.reach - Vec3::Y * self.drop;
        AimSpec::new(origin, forward, self.speed)
    }
}

/// Headset AR: throw along the controller ray
///
/// Produces nothing while the controller is not tracked.
#[derive(Debug, Clone)]
pub struct ControllerAim {
    grip: Option<Pose>,
    speed: f32,
    reach: f32,
}

impl ControllerAim {
    pub fn new(speed: f32) -> Self {
        Self {
            grip: None,
            speed,
            reach: 0.1,
        }
    }

    /// Latest grip pose, `None` when tracking is lost
    pub fn set_grip(&mut self, grip: Option<Pose>) {
        self.grip = grip;
    }

    pub fn grip(&self) -> Option<Pose> {
        self.grip
    }
}

impl AimSource for ControllerAim {
    fn sample(&mut self) -> Option<AimSpec> {
        let grip = self.grip?;
        let forward = grip.forward();
        AimSpec::new(grip.position + forward * self.reach, forward, self.speed)
    }
}

/// Adds seeded jitter to another source (demo/idle thrower)
#[derive(Debug, Clone)]
pub struct ScatterAim<A> {
    inner: A,
    rng: Pcg32,
    /// Max per-axis offset added to the unit direction
    spread: f32,
    /// Max relative change in speed
    speed_jitter: f32,
}

impl<A: AimSource> ScatterAim<A> {
    pub fn new(inner: A, seed: u64, spread: f32, speed_jitter: f32) -> Self {
        Self {
            inner,
            rng: Pcg32::seed_from_u64(seed),
            spread: spread.abs(),
            speed_jitter: speed_jitter.abs(),
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut A {
        &mut self.inner
    }

    fn jitter(&mut self, amount: f32) -> f32 {
        if amount > 0.0 {
            self.rng.random_range(-amount..=amount)
        } else {
            0.0
        }
    }
}

impl<A: AimSource> AimSource for ScatterAim<A> {
    fn sample(&mut self) -> Option<AimSpec> {
        let aim = self.inner.sample()?;
        let offset = Vec3::new(
            self.jitter(self.spread),
            self.jitter(self.spread),
            self.jitter(self.spread),
        );
        let speed = aim.speed * (1.0 + self.jitter(self.speed_jitter));
        // A jitter that cancels the heading or the speed falls back to the unjittered aim
        AimSpec::new(aim.origin, aim.direction + offset, speed).or(Some(aim))
    }
}
