//! Component types and scene builders shared by the benchmarks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusty_singleton::{Component, Scene, Singleton};

/// A transient singleton.
#[derive(Component, Singleton, Clone, Copy, Debug, Default)]
pub struct GameClock {
    pub elapsed: f64,
    pub delta: f32,
}

/// A singleton kept across scene transitions.
#[derive(Component, Singleton, Clone, Debug, Default)]
#[singleton(persist)]
pub struct Settings {
    pub volume: f32,
    pub fullscreen: bool,
}

/// Filler component carried by most scene objects.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Filler component carried by some scene objects.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Build a scene of `count` filler objects with a seeded random mix of components.
pub fn populated_scene(count: usize, seed: u64) -> Scene {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut scene = Scene::new();
    for i in 0..count {
        let object = scene.spawn(format!("Object {i}"));
        scene.attach(
            object,
            Position {
                x: rng.r#gen(),
                y: rng.r#gen(),
                z: rng.r#gen(),
            },
        );
        if rng.gen_bool(0.5) {
            scene.attach(object, Velocity::default());
        }
    }
    scene
}
