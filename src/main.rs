//! Bucketball headless demo
//!
//! Runs an automated thrower against a garden floor and a bucket at 60 Hz.
//! Usage: `bucketball [VARIANT | TUNING.json]`

use glam::Vec3;

use bucketball::consts::*;
use bucketball::sim::{BallMode, GameEvent, GameStateMachine, LogSink, TargetVolume, TriangleWorld};
use bucketball::{HeadPoseAim, Pose, ScatterAim, Tuning, Variant};

const FRAME_DT: f32 = 1.0 / 60.0;
const MAX_FRAMES: usize = 60 * 120;
/// Frames before the "assets" finish loading
const LOAD_FRAMES: usize = 30;
const MAX_THROWS: u32 = 40;
const THROW_SPEED: f32 = 12.0;

/// A variant name selects its preset; anything else is a tuning file path
fn tuning_from_arg(arg: Option<&str>) -> Tuning {
    match arg {
        Some(arg) => match Variant::from_str(arg) {
            Some(variant) => {
                log::info!("Using {} preset", variant.as_str());
                Tuning::from_variant(variant)
            }
            None => Tuning::load(arg),
        },
        None => Tuning::default(),
    }
}

fn build_garden() -> TriangleWorld {
    let mut world = TriangleWorld::new();
    world.add_floor(Vec3::ZERO, 50.0);
    // Open-top bucket around the target
    let half = Vec3::new(0.5, 0.5, 0.5);
    world.add_box(BUCKET_POSITION - half, BUCKET_POSITION + half, true);
    world
}

fn main() {
    env_logger::init();
    log::info!("Bucketball (headless) starting...");

    let tuning = tuning_from_arg(std::env::args().nth(1).as_deref());
    let mut game = GameStateMachine::new(tuning, BALL_RADIUS, SPAWN_POINT);
    let mut world: Option<TriangleWorld> = None;

    let pose = Pose::looking_at(SPAWN_POINT, BUCKET_POSITION);
    let mut thrower = ScatterAim::new(HeadPoseAim::new(pose, THROW_SPEED), 42, 0.15, 0.2);

    let mut throws = 0;
    let mut wins = 0;

    for frame in 0..MAX_FRAMES {
        if frame == LOAD_FRAMES {
            world = Some(build_garden());
            game.set_target(TargetVolume::new(BUCKET_POSITION, TARGET_RADIUS));
            log::info!("Garden and bucket loaded");
        }

        match game.mode() {
            BallMode::Held if throws < MAX_THROWS => {
                let origin = game.aim_origin();
                thrower.inner_mut().set_pose(Pose::looking_at(origin, BUCKET_POSITION));
                if let Some(event) = game.throw_from(&mut thrower) {
                    throws += 1;
                    GameStateMachine::dispatch(&[event], &mut LogSink);
                }
            }
            BallMode::Resting => game.rearm(),
            BallMode::Held => break,
            BallMode::InFlight => {}
        }

        let events = game.tick(FRAME_DT, &world);
        GameStateMachine::dispatch(&events, &mut LogSink);

        for event in &events {
            if let GameEvent::TargetReached { .. } = event {
                wins += 1;
                game.reset(SPAWN_POINT);
            }
        }
    }

    log::info!("Done: {} throws, {} in the bucket", throws, wins);
    println!("{throws} throws, {wins} in the bucket");
}
