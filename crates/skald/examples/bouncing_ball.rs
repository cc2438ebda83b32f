//! Bouncing Ball: a headless run of the full frame pipeline.
//!
//! A ball with a rigid body falls onto a kinematic ground. A script logs
//! every collision and spawns a spark prefab on each bounce; sparks destroy
//! themselves after a short while. Frames render into a [`DrawList`].
//!
//! Run with: `RUST_LOG=info cargo run -p skald --example bouncing_ball`

use std::time::{Duration, Instant};

use skald::prelude::*;

const BALL_SCRIPT: &str = r#"
fn onStart() {
    this.bounces = 0;
    console.log("ball ready at", transform.y);
}

fn onCollision(other) {
    if other.name == "Ground" {
        this.bounces += 1;
        console.info("bounce", this.bounces);
        scene.spawnPrefab("Spark", transform.x, transform.y - 25.0);
    }
}
"#;

const SPARK_SCRIPT: &str = r#"
fn onStart() { this.life = 0.3; }

fn onUpdate(dt) {
    this.life -= dt;
    transform.scaleX = transform.scaleX * 0.9;
    transform.scaleY = transform.scaleY * 0.9;
    if this.life <= 0.0 {
        entity.destroy();
    }
}
"#;

fn build_scene() -> Scene {
    let mut scene = Scene::with_camera("Bouncing Ball");
    scene.add_root(
        Entity::new("Ball")
            .with_tag("player")
            .with_transform(Transform2d::from_xy(0.0, 150.0))
            .with(SpriteRenderer::new(Color::rgb(0xff, 0x8c, 0x00), ShapeKind::Circle, 50.0, 50.0).with_layer(1))
            .with(RigidBody::default().with_drag(0.0).with_bounciness(0.7))
            .with(Collider::new(50.0, 50.0))
            .with(Script::new("BallScript", BALL_SCRIPT)),
    );
    scene.add_root(
        Entity::new("Ground")
            .with_transform(Transform2d::from_xy(0.0, -100.0))
            .with(SpriteRenderer::new(Color::rgb(0x3a, 0x3a, 0x5c), ShapeKind::Rectangle, 400.0, 20.0))
            .with(Collider::new(400.0, 20.0))
            .with(RigidBody::kinematic()),
    );
    scene
}

fn build_prefabs() -> PrefabLibrary {
    let mut template = Scene::new("prefabs");
    let spark = template.add_root(
        Entity::new("Spark")
            .with(SpriteRenderer::new(Color::rgb(0xff, 0xee, 0x88), ShapeKind::Triangle, 12.0, 12.0).with_layer(2))
            .with(Script::new("SparkScript", SPARK_SCRIPT)),
    );
    let mut prefabs = PrefabLibrary::new();
    prefabs.capture(&template, spark, "Spark");
    prefabs
}

fn main() {
    env_logger::init();

    let mut game = GameLoop::new(EngineConfig::default()).with_scene(build_scene());
    game.set_prefabs(build_prefabs());
    game.set_frame_callback(|scene, time| {
        if time.frame_count() % 60 == 0 {
            log::info!(
                "t={:.2}s entities={} fps={:.0}",
                time.elapsed_secs(),
                scene.len(),
                time.fps()
            );
        }
    });

    let mut surface = DrawList::new(800.0, 600.0);
    let frame = Duration::from_millis(16);
    let mut now = Instant::now();
    let mut request = game.play(now);

    for _ in 0..300 {
        now += frame;
        surface.clear();
        match game.tick(now, request, &mut surface) {
            TickOutcome::Ran { next } => request = next,
            TickOutcome::Ignored => break,
        }
    }

    println!("last frame: {} draw commands", surface.len());
    for entry in game.console().entries() {
        println!("[{}] {}", entry.level, entry.message);
    }
    for diagnostic in game.take_diagnostics() {
        println!("diagnostic: {diagnostic}");
    }

    game.stop();
    println!("stopped; scene restored with {} entities", game.scene().len());
}
