//! Per-type singleton instances for scene-graph components.
//!
//! A [`Singleton`](singleton::Singleton) component has at most one live instance per
//! [`Context`](core::Context). The instance is found or created on first access through the
//! context's [`Registry`](singleton::Registry), optionally survives scene transitions, and any
//! second instance attached to the scene is destroyed and reported as a
//! [`DuplicateInstance`](singleton::DuplicateInstance).
//!
//! The registry talks to the scene graph through the [`Host`](scene::Host) trait. The
//! [`Scene`](scene::Scene) type is a small reference host used by tests, demos and benchmarks.

// Lets the derive macros refer to `::rusty_singleton` from inside this crate.
extern crate self as rusty_singleton;

pub mod core;
pub mod scene;
pub mod singleton;

pub use crate::core::Context;
pub use crate::scene::{Component, Host, ObjectId, Scene};
pub use crate::singleton::{Access, DuplicateInstance, Handle, Registry, Singleton};
pub use rusty_singleton_macros::{Component, Singleton};
