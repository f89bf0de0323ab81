//! Frame-driven game state machine
//!
//! The host calls [`GameStateMachine::tick`] once per rendered frame. The
//! frame time is clamped and split into fixed substeps; each substep moves
//! the ball and then checks the floor and the bucket.

use glam::Vec3;

use super::collision::SpatialIndex;
use super::detect::{out_of_bounds, target_reached};
use super::physics::step;
use super::state::{AimSpec, BallMode, GameEvent, Projectile, TargetVolume};
use crate::aim::AimSource;
use crate::tuning::{BoundsPolicy, Tuning};

/// Receives game events for presentation (messages, UI, camera moves)
pub trait EventSink {
    fn on_event(&mut self, event: &GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn on_event(&mut self, event: &GameEvent) {
        self.push(*event);
    }
}

/// Writes every event to the log
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Thrown { attempt } => log::info!("Throw #{}", attempt),
            GameEvent::TargetReached { attempts } => {
                log::info!("In the bucket after {} throw(s)!", attempts)
            }
            GameEvent::OutOfBounds => log::info!("Ball out of bounds"),
        }
    }
}

/// Owns the ball and drives it through held → in flight → back in hand
#[derive(Debug, Clone)]
pub struct GameStateMachine {
    tuning: Tuning,
    ball: Projectile,
    target: Option<TargetVolume>,
    attempts: u32,
    /// Where the player starts and returns to after a win
    spawn: Vec3,
    /// Last known hand/camera position
    aim_origin: Vec3,
}

impl GameStateMachine {
    /// Create a game with the ball in hand at `spawn`
    pub fn new(tuning: Tuning, ball_radius: f32, spawn: Vec3) -> Self {
        Self {
            tuning: tuning.sanitized(),
            ball: Projectile::new(ball_radius, spawn),
            target: None,
            attempts: 0,
            spawn,
            aim_origin: spawn,
        }
    }

    pub fn projectile(&self) -> &Projectile {
        &self.ball
    }

    pub fn mode(&self) -> BallMode {
        self.ball.mode
    }

    /// Throws since the last time the bucket was hit
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn target(&self) -> Option<&TargetVolume> {
        self.target.as_ref()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn spawn_point(&self) -> Vec3 {
        self.spawn
    }

    pub fn aim_origin(&self) -> Vec3 {
        self.aim_origin
    }

    /// Bucket finished loading
    pub fn set_target(&mut self, target: TargetVolume) {
        log::debug!("Target set at {:?} (r={})", target.center, target.radius);
        self.target = Some(target);
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Track the hand/camera position; a ball that is not flying moves with it
    pub fn follow(&mut self, origin: Vec3) {
        self.aim_origin = origin;
        if !self.ball.in_flight() {
            self.ball.center = origin;
        }
    }

    /// Throw the ball in hand
    ///
    /// Ignored unless the ball is held. `aim.direction` must be a unit
    /// vector, which [`AimSpec::new`] guarantees.
    pub fn throw(&mut self, aim: &AimSpec) -> Option<GameEvent> {
        if self.ball.mode != BallMode::Held {
            log::debug!("Throw ignored while {:?}", self.ball.mode);
            return None;
        }

        self.aim_origin = aim.origin;
        self.ball.center = aim.origin;
        self.ball.velocity = aim.launch_velocity(self.tuning.lob_bias);
        self.ball.mode = BallMode::InFlight;
        self.attempts += 1;

        Some(GameEvent::Thrown {
            attempt: self.attempts,
        })
    }

    /// Sample `source` once and throw; nothing happens if the ball is not held
    /// or the source has no usable aim
    pub fn throw_from<A: AimSource + ?Sized>(&mut self, source: &mut A) -> Option<GameEvent> {
        if self.ball.mode != BallMode::Held {
            log::debug!("Throw ignored while {:?}", self.ball.mode);
            return None;
        }
        let aim = source.sample()?;
        self.throw(&aim)
    }

    /// Advance one rendered frame of `dt` seconds
    pub fn tick<W: SpatialIndex + ?Sized>(&mut self, dt: f32, world: &W) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if !self.ball.in_flight() {
            log::trace!("Tick ignored while {:?}", self.ball.mode);
            return events;
        }
        if !(dt > 0.0) {
            return events;
        }

        let steps = self.tuning.steps_per_frame;
        let sub_dt = dt.min(self.tuning.max_frame_dt) / steps as f32;

        for _ in 0..steps {
            step(&mut self.ball, sub_dt, world, &self.tuning);

            if out_of_bounds(&self.ball, self.tuning.floor_height) {
                self.recover_from_floor();
                events.push(GameEvent::OutOfBounds);
                break;
            }

            if target_reached(self.target.as_ref(), &self.ball) {
                let attempts = self.attempts;
                self.attempts = 0;
                self.settle_after_win();
                log::info!("Target reached after {} attempt(s)", attempts);
                events.push(GameEvent::TargetReached { attempts });
                break;
            }
        }

        events
    }

    /// Put the ball back in hand at `point`, which becomes the new spawn
    pub fn reset(&mut self, point: Vec3) {
        log::info!("Reset at {:?}", point);
        self.spawn = point;
        self.aim_origin = point;
        self.ball.place(point, BallMode::Held);
    }

    /// Pick up a resting ball
    pub fn rearm(&mut self) {
        if self.ball.mode == BallMode::Resting {
            self.ball.mode = BallMode::Held;
        }
    }

    /// Forward events to a presentation sink
    pub fn dispatch<S: EventSink + ?Sized>(events: &[GameEvent], sink: &mut S) {
        for event in events {
            sink.on_event(event);
        }
    }

    fn recover_from_floor(&mut self) {
        match self.tuning.bounds_policy {
            BoundsPolicy::RespawnAtContact { eye_height } => {
                let point = Vec3::new(self.ball.center.x, eye_height, self.ball.center.z);
                log::info!("Out of bounds, respawning at {:?}", point);
                self.aim_origin = point;
                self.ball.place(point, BallMode::Held);
            }
            BoundsPolicy::ReturnToThrower => {
                log::info!("Out of bounds, returning to {:?}", self.aim_origin);
                self.ball.place(self.aim_origin, BallMode::Resting);
            }
        }
    }

    fn settle_after_win(&mut self) {
        match self.tuning.bounds_policy {
            BoundsPolicy::RespawnAtContact { .. } => {
                self.aim_origin = self.spawn;
                self.ball.place(self.spawn, BallMode::Held);
            }
            BoundsPolicy::ReturnToThrower => {
                self.ball.place(self.aim_origin, BallMode::Resting);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::collision::{EmptyWorld, GroundPlane};

    const FRAME: f32 = 1.0 / 60.0;

    fn desktop_game() -> GameStateMachine {
        GameStateMachine::new(Tuning::default(), BALL_RADIUS, SPAWN_POINT)
    }

    fn aim(origin: Vec3, direction: Vec3, speed: f32) -> AimSpec {
        AimSpec::new(origin, direction, speed).unwrap()
    }

    /// Tick until something happens or `frames` run out
    fn run_until_event<W: SpatialIndex>(
        game: &mut GameStateMachine,
        world: &W,
        frames: usize,
    ) -> Vec<GameEvent> {
        let mut all = Vec::new();
        for _ in 0..frames {
            all.extend(game.tick(FRAME, world));
            if !game.projectile().in_flight() {
                break;
            }
        }
        all
    }

    #[test]
    fn test_throw_level_aim() {
        let mut game = desktop_game();
        assert_eq!(game.mode(), BallMode::Held);

        let event = game.throw(&aim(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Z, 30.0));

        assert_eq!(event, Some(GameEvent::Thrown { attempt: 1 }));
        assert_eq!(game.mode(), BallMode::InFlight);
        assert_eq!(game.attempts(), 1);
        let v = game.projectile().velocity;
        assert!((v - Vec3::new(0.0, 15.0, -30.0)).length() < 1e-4, "v = {v:?}");
        assert_eq!(game.projectile().center, Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_throw_in_flight_is_noop() {
        let mut game = desktop_game();
        game.throw(&aim(SPAWN_POINT, Vec3::NEG_Z, 30.0));
        let before = game.projectile().clone();

        assert_eq!(game.throw(&aim(SPAWN_POINT, Vec3::X, 50.0)), None);
        assert_eq!(game.projectile().velocity, before.velocity);
        assert_eq!(game.attempts(), 1);
    }

    #[test]
    fn test_tick_while_held_is_noop() {
        let mut game = desktop_game();
        let events = game.tick(FRAME, &GroundPlane { height: 100.0 });
        assert!(events.is_empty());
        assert_eq!(game.projectile().center, SPAWN_POINT);
        assert_eq!(game.mode(), BallMode::Held);
    }

    #[test]
    fn test_non_positive_dt_does_nothing() {
        let mut game = desktop_game();
        game.throw(&aim(SPAWN_POINT, Vec3::NEG_Z, 30.0));
        let before = game.projectile().center;
        assert!(game.tick(0.0, &EmptyWorld).is_empty());
        assert!(game.tick(-1.0, &EmptyWorld).is_empty());
        assert!(game.tick(f32::NAN, &EmptyWorld).is_empty());
        assert_eq!(game.projectile().center, before);
    }

    #[test]
    fn test_out_of_bounds_respawns_at_landing_point() {
        let mut game = desktop_game();
        game.throw(&aim(Vec3::new(3.0, 5.0, 0.0), Vec3::NEG_Z, 10.0));

        let events = run_until_event(&mut game, &EmptyWorld, 600);

        assert_eq!(events, vec![GameEvent::OutOfBounds]);
        assert_eq!(game.mode(), BallMode::Held);
        let center = game.projectile().center;
        assert_eq!(center.y, CAMERA_HEIGHT);
        assert!((center.x - 3.0).abs() < 1e-4);
        assert!(center.z < 0.0, "ball should land ahead of the thrower");
        assert_eq!(game.aim_origin(), center);
        assert_eq!(game.projectile().velocity, Vec3::ZERO);

        // No repeat once recovered
        for _ in 0..10 {
            assert!(game.tick(FRAME, &EmptyWorld).is_empty());
        }
        assert_eq!(game.attempts(), 1);
    }

    #[test]
    fn test_out_of_bounds_returns_to_thrower() {
        let tuning = Tuning {
            bounds_policy: BoundsPolicy::ReturnToThrower,
            ..Tuning::default()
        };
        let mut game = GameStateMachine::new(tuning, BALL_RADIUS, SPAWN_POINT);
        let hand = Vec3::new(0.0, 3.0, 1.0);
        game.throw(&aim(hand, Vec3::NEG_Z, 10.0));

        // The hand moves while the ball is flying
        let moved = Vec3::new(0.5, 3.0, 1.0);
        game.follow(moved);
        assert_ne!(game.projectile().center, moved);

        let events = run_until_event(&mut game, &EmptyWorld, 600);

        assert_eq!(events, vec![GameEvent::OutOfBounds]);
        assert_eq!(game.mode(), BallMode::Resting);
        assert_eq!(game.projectile().center, moved);

        // Resting ball cannot be thrown until picked up
        assert_eq!(game.throw(&aim(moved, Vec3::NEG_Z, 10.0)), None);
        game.rearm();
        assert_eq!(game.mode(), BallMode::Held);
        assert_eq!(
            game.throw(&aim(moved, Vec3::NEG_Z, 10.0)),
            Some(GameEvent::Thrown { attempt: 2 })
        );
    }

    #[test]
    fn test_target_reached_resets_attempts() {
        let mut game = desktop_game();
        game.set_target(TargetVolume::new(Vec3::new(0.0, 5.0, -6.0), TARGET_RADIUS));

        // Miss first: fire away from the bucket
        game.throw(&aim(Vec3::new(0.0, 5.0, 0.0), Vec3::Z, 10.0));
        assert_eq!(run_until_event(&mut game, &EmptyWorld, 600), vec![GameEvent::OutOfBounds]);

        // Then release right next to it
        game.throw(&aim(Vec3::new(0.0, 5.0, -5.0), Vec3::NEG_Z, 1.0));
        let events = game.tick(FRAME, &EmptyWorld);

        assert_eq!(events, vec![GameEvent::TargetReached { attempts: 2 }]);
        assert_eq!(game.attempts(), 0);
        assert_eq!(game.mode(), BallMode::Held);
        assert_eq!(game.projectile().center, SPAWN_POINT);
    }

    #[test]
    fn test_unloaded_target_is_never_reached() {
        let mut game = desktop_game();
        game.throw(&aim(Vec3::new(0.0, 5.0, -5.0), Vec3::NEG_Z, 1.0));
        let events = run_until_event(&mut game, &EmptyWorld, 600);
        assert_eq!(events, vec![GameEvent::OutOfBounds]);
    }

    #[test]
    fn test_target_reached_returns_to_thrower() {
        let tuning = Tuning::from_variant(crate::Variant::ControllerAr);
        let mut game = GameStateMachine::new(tuning, BALL_RADIUS, SPAWN_POINT);
        game.set_target(TargetVolume::new(Vec3::new(0.0, 2.0, -1.0), TARGET_RADIUS));
        let hand = Vec3::new(0.0, 2.0, 0.0);

        game.throw(&aim(hand, Vec3::NEG_Z, 1.0));
        let events = game.tick(FRAME, &EmptyWorld);

        assert_eq!(events, vec![GameEvent::TargetReached { attempts: 1 }]);
        assert_eq!(game.mode(), BallMode::Resting);
        assert_eq!(game.projectile().center, hand);
    }

    #[test]
    fn test_large_dt_is_clamped() {
        let mut clamped = desktop_game();
        let mut reference = desktop_game();
        let throw = aim(Vec3::new(0.0, 50.0, 0.0), Vec3::NEG_Z, 20.0);
        clamped.throw(&throw);
        reference.throw(&throw);

        clamped.tick(2.0, &EmptyWorld);
        reference.tick(MAX_FRAME_DT, &EmptyWorld);

        assert_eq!(clamped.projectile().center, reference.projectile().center);
        assert_eq!(clamped.projectile().velocity, reference.projectile().velocity);
    }

    #[test]
    fn test_ball_bounces_off_ground_above_floor() {
        // Ground above the out-of-bounds height: the ball bounces instead of leaving
        let ground = GroundPlane { height: 2.0 };
        let mut game = desktop_game();
        game.throw(&aim(Vec3::new(0.0, 2.5, 0.0), Vec3::NEG_Y, 10.0));

        let mut bounced = false;
        for _ in 0..30 {
            game.tick(FRAME, &ground);
            if game.projectile().velocity.y > 0.0 {
                bounced = true;
                break;
            }
        }

        assert!(bounced, "ball should bounce off the ground");
        assert_eq!(game.mode(), BallMode::InFlight);
    }

    #[test]
    fn test_reset_rearms_from_anywhere() {
        let mut game = desktop_game();
        game.throw(&aim(SPAWN_POINT, Vec3::NEG_Z, 30.0));
        let point = Vec3::new(1.0, 5.0, 1.0);

        game.reset(point);

        assert_eq!(game.mode(), BallMode::Held);
        assert_eq!(game.projectile().center, point);
        assert_eq!(game.projectile().velocity, Vec3::ZERO);
        assert_eq!(game.spawn_point(), point);
    }

    #[test]
    fn test_follow_moves_held_ball_only() {
        let mut game = desktop_game();
        let hand = Vec3::new(1.0, 4.0, 2.0);
        game.follow(hand);
        assert_eq!(game.projectile().center, hand);

        game.throw(&aim(hand, Vec3::NEG_Z, 30.0));
        game.follow(Vec3::ZERO);
        assert_eq!(game.projectile().center, hand);
    }

    #[test]
    fn test_dispatch_to_sink() {
        let mut game = desktop_game();
        let mut seen: Vec<GameEvent> = Vec::new();
        let thrown = game.throw(&aim(SPAWN_POINT, Vec3::NEG_Z, 10.0));
        GameStateMachine::dispatch(thrown.as_slice(), &mut seen);
        let events = run_until_event(&mut game, &EmptyWorld, 600);
        GameStateMachine::dispatch(&events, &mut seen);
        GameStateMachine::dispatch(&events, &mut LogSink);

        assert_eq!(seen, vec![GameEvent::Thrown { attempt: 1 }, GameEvent::OutOfBounds]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn free_space() -> Tuning {
            Tuning {
                floor_height: -1.0e6,
                ..Tuning::default()
            }
        }

        proptest! {
            #[test]
            fn throw_in_flight_never_changes_state(
                dx in -1.0f32..1.0, dy in -1.0f32..1.0, dz in 0.1f32..1.0,
                speed in 1.0f32..60.0,
                frames in 0usize..20,
            ) {
                let mut game = desktop_game();
                game.throw(&aim(Vec3::new(0.0, 50.0, 0.0), Vec3::NEG_Z, 30.0));
                for _ in 0..frames {
                    game.tick(FRAME, &EmptyWorld);
                }
                prop_assume!(game.projectile().in_flight());
                let velocity = game.projectile().velocity;
                let attempts = game.attempts();

                let again = aim(Vec3::ZERO, Vec3::new(dx, dy, -dz), speed);
                prop_assert_eq!(game.throw(&again), None);
                prop_assert_eq!(game.projectile().velocity, velocity);
                prop_assert_eq!(game.attempts(), attempts);
            }

            #[test]
            fn substep_count_converges(
                dx in -1.0f32..1.0, dy in -1.0f32..1.0, dz in -1.0f32..-0.1,
                speed in 1.0f32..30.0,
            ) {
                let throw = aim(Vec3::new(0.0, 100.0, 0.0), Vec3::new(dx, dy, dz), speed);
                let coarse_tuning = Tuning { steps_per_frame: 1, ..free_space() };
                let fine_tuning = Tuning { steps_per_frame: 5, ..free_space() };
                let mut coarse = GameStateMachine::new(coarse_tuning, BALL_RADIUS, Vec3::ZERO);
                let mut fine = GameStateMachine::new(fine_tuning, BALL_RADIUS, Vec3::ZERO);
                coarse.throw(&throw);
                fine.throw(&throw);

                for _ in 0..10 {
                    coarse.tick(0.01, &EmptyWorld);
                    fine.tick(0.01, &EmptyWorld);
                }

                let gap = (coarse.projectile().center - fine.projectile().center).length();
                prop_assert!(gap < 0.1, "trajectories diverged by {}", gap);
                prop_assert!(coarse.projectile().in_flight() && fine.projectile().in_flight());
            }
        }
    }
}
