//! A minimal scene graph that implements [`Host`].
//!
//! The [`Scene`] keeps a flat list of named objects, each carrying a set of
//! [`Component`]s. It models the parts of a game engine's object model that singleton management
//! depends on:
//!
//! - **Lookup**: [`Scene::find_all`] returns the live objects carrying a type, lowest index first.
//! - **Attachment**: [`Scene::attach`] adds one component of a type to an object. For types
//!   registered with [`Scene::watch`], attaching runs the registry's attachment hook, so a second
//!   instance of a singleton is destroyed as soon as it is attached.
//! - **Persistence**: objects marked with [`Scene::keep_across_loads`] survive
//!   [`Scene::transition`]; every other object is destroyed by it.
//! - **Destruction**: [`Scene::destroy`] frees the object's id. Its index is recycled with a new
//!   generation, so old ids stop resolving.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut scene = Scene::new();
//! let hud = scene.spawn("Hud");
//! scene.attach(hud, Score(0));
//!
//! let audio = scene.spawn("Audio");
//! scene.attach(audio, Mixer::default());
//! scene.keep_across_loads(audio);
//!
//! let destroyed = scene.transition();
//! assert_eq!(destroyed, vec![hud]);
//! assert!(scene.is_alive(audio));
//! ```

mod component;
mod host;
mod object;

use std::{any::TypeId, collections::HashMap, mem, sync::Arc};

use log::trace;

use crate::{
    core::Context,
    singleton::{DuplicateInstance, Singleton},
};

pub use component::{Component, Components};
pub use host::Host;
pub use object::{Allocator, Generation, ObjectId};

/// Attachment hook run by [`Scene::attach`] for a watched type.
type AttachHook = Arc<dyn Fn(&mut Scene, ObjectId) -> Result<(), DuplicateInstance> + Send + Sync>;

/// A single object in the scene.
struct Node {
    id: ObjectId,
    name: String,
    persistent: bool,
    components: Components,
}

/// The reference scene graph.
#[derive(Default)]
pub struct Scene {
    /// Allocator for object ids.
    allocator: Allocator,

    /// Objects indexed by their id's index; `None` for freed slots.
    nodes: Vec<Option<Node>>,

    /// Number of live objects.
    live: usize,

    /// Attachment hooks keyed by component type.
    hooks: HashMap<TypeId, AttachHook>,

    /// Duplicates rejected by attachment hooks, oldest first.
    rejections: Vec<DuplicateInstance>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Create a new, empty object.
    pub fn spawn(&mut self, name: impl Into<String>) -> ObjectId {
        let id = self.allocator.alloc();
        let index = id.index();
        if index >= self.nodes.len() {
            self.nodes.resize_with(index + 1, || None);
        }
        let name = name.into();
        trace!("spawned object {id} '{name}'");
        self.nodes[index] = Some(Node {
            id,
            name,
            persistent: false,
            components: Components::new(),
        });
        self.live += 1;
        id
    }

    /// Attach a component to a live object. Returns `false` if the object is not alive, already
    /// carries a component of this type, or the type's attachment hook rejected it as a
    /// duplicate (the object is then destroyed and the error kept for [`Scene::take_rejections`]).
    pub fn attach<C: Component>(&mut self, object: ObjectId, component: C) -> bool {
        let attached = self
            .node_mut(object)
            .is_some_and(|node| node.components.insert(component).is_ok());
        if !attached {
            return false;
        }
        let Some(hook) = self.hooks.get(&TypeId::of::<C>()).cloned() else {
            return true;
        };
        match hook(self, object) {
            Ok(()) => true,
            Err(err) => {
                self.rejections.push(err);
                false
            }
        }
    }

    /// Run `context`'s attachment hook for `T` whenever a `T` is attached to this scene.
    pub fn watch<T: Singleton>(&mut self, context: &Context) {
        let context = context.clone();
        let hook: AttachHook = Arc::new(move |scene: &mut Scene, object: ObjectId| {
            context
                .singletons()
                .on_attached::<T, Scene>(scene, object)
                .map(|_| ())
        });
        self.hooks.insert(TypeId::of::<T>(), hook);
    }

    /// Drain the duplicates rejected by attachment hooks since the last call.
    pub fn take_rejections(&mut self) -> Vec<DuplicateInstance> {
        mem::take(&mut self.rejections)
    }

    /// Get a component of a live object.
    pub fn get<C: Component>(&self, object: ObjectId) -> Option<&C> {
        self.node(object)?.components.get::<C>()
    }

    /// Get a mutable component of a live object.
    pub fn get_mut<C: Component>(&mut self, object: ObjectId) -> Option<&mut C> {
        self.node_mut(object)?.components.get_mut::<C>()
    }

    /// Whether the object is alive and carries a `C`.
    pub fn has<C: Component>(&self, object: ObjectId) -> bool {
        self.node(object)
            .is_some_and(|node| node.components.contains::<C>())
    }

    /// Every live object carrying a `C`, lowest index first.
    pub fn find_all<C: Component>(&self) -> Vec<ObjectId> {
        self.nodes
            .iter()
            .flatten()
            .filter(|node| node.components.contains::<C>())
            .map(|node| node.id)
            .collect()
    }

    /// The name of a live object.
    pub fn name(&self, object: ObjectId) -> Option<&str> {
        self.node(object).map(|node| node.name.as_str())
    }

    #[inline]
    pub fn is_alive(&self, object: ObjectId) -> bool {
        self.node(object).is_some()
    }

    /// Mark an object as surviving scene transitions.
    pub fn keep_across_loads(&mut self, object: ObjectId) {
        if let Some(node) = self.node_mut(object) {
            node.persistent = true;
        }
    }

    /// Whether an object is live and marked as surviving scene transitions.
    pub fn is_persistent(&self, object: ObjectId) -> bool {
        self.node(object).is_some_and(|node| node.persistent)
    }

    /// Destroy an object and its components.
    pub fn destroy(&mut self, object: ObjectId) -> bool {
        if !self.is_alive(object) {
            return false;
        }
        self.nodes[object.index()] = None;
        self.allocator.free(object);
        self.live -= 1;
        trace!("destroyed object {object}");
        true
    }

    /// Change the active scene: destroy every object not kept across loads.
    ///
    /// Returns the ids of the destroyed objects in index order.
    pub fn transition(&mut self) -> Vec<ObjectId> {
        let doomed: Vec<ObjectId> = self
            .nodes
            .iter()
            .flatten()
            .filter(|node| !node.persistent)
            .map(|node| node.id)
            .collect();
        for object in &doomed {
            self.destroy(*object);
        }
        trace!("scene transition destroyed {} objects", doomed.len());
        doomed
    }

    fn node(&self, object: ObjectId) -> Option<&Node> {
        self.nodes
            .get(object.index())?
            .as_ref()
            .filter(|node| node.id == object)
    }

    fn node_mut(&mut self, object: ObjectId) -> Option<&mut Node> {
        self.nodes
            .get_mut(object.index())?
            .as_mut()
            .filter(|node| node.id == object)
    }
}

impl Host for Scene {
    fn find_all<C: Component>(&self) -> Vec<ObjectId> {
        Scene::find_all::<C>(self)
    }

    fn spawn(&mut self, name: &str) -> ObjectId {
        Scene::spawn(self, name)
    }

    fn attach<C: Component>(&mut self, object: ObjectId, component: C) -> bool {
        Scene::attach(self, object, component)
    }

    fn has<C: Component>(&self, object: ObjectId) -> bool {
        Scene::has::<C>(self, object)
    }

    fn keep_across_loads(&mut self, object: ObjectId) {
        Scene::keep_across_loads(self, object)
    }

    fn destroy(&mut self, object: ObjectId) -> bool {
        Scene::destroy(self, object)
    }

    fn is_alive(&self, object: ObjectId) -> bool {
        Scene::is_alive(self, object)
    }

    fn name(&self, object: ObjectId) -> Option<&str> {
        Scene::name(self, object)
    }
}
