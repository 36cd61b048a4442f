//! Walks a singleton through its lifecycle on the reference scene.
//!
//! Run with `cargo run -p rusty_singleton --example audio_manager`.

use log::LevelFilter;
use rusty_singleton::{Access, Component, Context, Scene, Singleton, core::log as logging};

/// Survives scene transitions.
#[derive(Component, Singleton, Default)]
#[singleton(persist, name = "Audio Manager")]
struct AudioManager {
    volume: f32,
}

/// Lives only as long as the scene that created it.
#[derive(Component, Singleton, Default)]
struct LevelTimer {
    elapsed: f32,
}

fn describe<T>(label: &str, access: &Access<T>) {
    match access {
        Access::Existing(handle) => println!("{label}: existing {}", handle.object()),
        Access::Created(handle) => println!("{label}: created {}", handle.object()),
        Access::Unavailable => println!("{label}: unavailable"),
    }
}

fn main() {
    let logs = logging::init(LevelFilter::Debug).expect("no other logger installed");
    let context = Context::new();
    let mut scene = Scene::new();
    scene.watch::<AudioManager>(&context);

    // First access creates the instances
    let audio = AudioManager::instance(&context, &mut scene);
    describe("audio", &audio);
    let timer = LevelTimer::instance(&context, &mut scene);
    describe("timer", &timer);

    if let Some(manager) = audio.handle().and_then(|h| scene.get_mut::<AudioManager>(h.object())) {
        manager.volume = 0.8;
    }
    if let Some(timer) = timer.handle().and_then(|h| scene.get_mut::<LevelTimer>(h.object())) {
        timer.elapsed += 1.0 / 60.0;
    }

    // A level designer placed a second audio manager in the scene
    let stray = scene.spawn("Stray Audio");
    if !scene.attach(stray, AudioManager::default()) {
        for err in scene.take_rejections() {
            println!("rejected: {err}");
        }
    }

    // Load the next level
    let destroyed = scene.transition();
    println!("transition destroyed {} object(s)", destroyed.len());
    describe("audio", &AudioManager::instance(&context, &mut scene));
    describe("timer", &LevelTimer::instance(&context, &mut scene));

    // Shutdown: nothing new is created any more
    context.notify_quit();
    scene.transition();
    describe("timer", &LevelTimer::instance(&context, &mut scene));
    describe("audio", &AudioManager::instance(&context, &mut scene));

    for message in logs.try_iter() {
        println!("[{}] {}", message.level, message.message);
    }
}
