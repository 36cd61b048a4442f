//! The per-type slot registry behind singleton access.
//!
//! [`Registry`] maps each singleton type to a slot holding the [`ObjectId`] of its instance.
//! Slots are created on first use and never removed, except by [`Registry::reset`].
//!
//! # Locking
//!
//! The slot map is a `DashMap`, so looking up a slot never blocks other types. Each slot has
//! its own re-entrant lock, held for the whole check-and-create sequence of
//! [`Registry::get_or_create`] and for the adopt-or-reject decision of
//! [`Registry::on_attached`]. Two threads racing to access the same type therefore create at
//! most one instance, while a host that fires the attachment hook from inside `attach` can
//! re-enter the slot on the same thread. The slot's `Arc` is cloned out of the map before
//! locking so no map shard is held while the host is called.
//!
//! # Stale instances
//!
//! A cached id whose object the host has since destroyed (for example by a scene transition of
//! a non-persistent instance) is treated as an empty slot and cleared on the next access.

use std::{
    any::{self, TypeId},
    cell::Cell,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use dashmap::DashMap;
use log::{debug, error, warn};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use crate::scene::{Host, ObjectId};

use super::{Access, DuplicateInstance, Handle, Singleton};

/// Storage for one singleton type.
struct Slot {
    /// Full type name, used in logs and errors.
    type_name: &'static str,

    /// The cached instance, if any.
    instance: ReentrantMutex<Cell<Option<ObjectId>>>,
}

impl Slot {
    fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            instance: ReentrantMutex::new(Cell::new(None)),
        }
    }

    #[inline]
    fn lock(&self) -> ReentrantMutexGuard<'_, Cell<Option<ObjectId>>> {
        self.instance.lock()
    }

    /// The cached instance if the host still has it alive. Clears a stale instance.
    fn live<H: Host>(&self, instance: &Cell<Option<ObjectId>>, host: &H) -> Option<ObjectId> {
        let object = instance.get()?;
        if host.is_alive(object) {
            return Some(object);
        }
        debug!("{} instance {object} was destroyed, clearing slot", self.type_name);
        instance.set(None);
        None
    }

    /// Destroy `rejected`, a second instance next to `existing`, and describe it.
    fn reject<H: Host>(
        &self,
        host: &mut H,
        existing: ObjectId,
        rejected: ObjectId,
    ) -> DuplicateInstance {
        let description = format!(
            "{} ({})",
            host.name(rejected).unwrap_or("<unnamed>"),
            self.type_name
        );
        host.destroy(rejected);
        let err = DuplicateInstance::new(self.type_name, existing, rejected, description);
        warn!("{err}");
        err
    }
}

/// Registry of singleton instances, one slot per concrete type.
///
/// A registry also carries the quitting flag: once [`Registry::is_quitting`] is true, access no
/// longer creates instances.
#[derive(Default)]
pub struct Registry {
    /// Slots keyed by the singleton's Rust type.
    slots: DashMap<TypeId, Arc<Slot>>,

    /// Set once the application starts shutting down.
    quitting: AtomicBool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the live instance of `T`, finding or creating it if needed.
    ///
    /// In order:
    /// 1. A cached, live instance is returned as [`Access::Existing`].
    /// 2. While quitting, nothing is created and [`Access::Unavailable`] is returned.
    /// 3. The first object in the host already carrying `T` is adopted as
    ///    [`Access::Existing`]. Any further carriers are destroyed as duplicates.
    /// 4. Otherwise a new object named [`Singleton::name`] is spawned with `T::default()`
    ///    attached, and returned as [`Access::Created`]. If the host runs the attachment hook
    ///    from `attach`, the hook adopts the new object first; the result is the same.
    ///
    /// Adopted and created instances are kept across loads when
    /// [`Singleton::PERSIST_BETWEEN_SCENES`] is set.
    pub fn get_or_create<T: Singleton, H: Host>(&self, host: &mut H) -> Access<T> {
        let slot = self.slot::<T>();
        let instance = slot.lock();

        if let Some(object) = slot.live(&instance, host) {
            return Access::Existing(Handle::new(object));
        }

        if self.is_quitting() {
            debug!("quitting, not creating {}", slot.type_name);
            return Access::Unavailable;
        }

        let mut carriers = host.find_all::<T>().into_iter();
        if let Some(object) = carriers.next() {
            Self::apply_persistence::<T, H>(host, object);
            instance.set(Some(object));
            debug!("adopted existing {} instance {object}", slot.type_name);
            for extra in carriers {
                slot.reject(host, object, extra);
            }
            return Access::Existing(Handle::new(object));
        }

        let object = host.spawn(&T::name());
        if !host.attach(object, T::default()) {
            error!(
                "host refused to attach {} to new object {object}",
                slot.type_name
            );
            host.destroy(object);
            instance.set(None);
            return Access::Unavailable;
        }
        Self::apply_persistence::<T, H>(host, object);
        instance.set(Some(object));
        debug!("created {} instance {object}", slot.type_name);
        Access::Created(Handle::new(object))
    }

    /// Get the live instance of `T` without finding or creating one.
    pub fn get<T: Singleton, H: Host>(&self, host: &H) -> Option<Handle<T>> {
        let slot = self.slots.get(&TypeId::of::<T>())?.value().clone();
        let instance = slot.lock();
        slot.live(&instance, host).map(Handle::new)
    }

    /// Attachment hook: a `T` has become active on `object`.
    ///
    /// The first live instance is adopted (and kept across loads if configured). Reporting the
    /// registered instance again is a no-op. A distinct second instance is destroyed, together
    /// with its object, and reported as [`DuplicateInstance`]; the registered instance is left
    /// untouched.
    ///
    /// Returns `Ok(None)` without touching the slot if `object` is not alive or does not carry
    /// a `T`.
    pub fn on_attached<T: Singleton, H: Host>(
        &self,
        host: &mut H,
        object: ObjectId,
    ) -> Result<Option<Handle<T>>, DuplicateInstance> {
        if !host.has::<T>(object) {
            debug!(
                "ignoring attachment of {} to {object}, component not present",
                any::type_name::<T>()
            );
            return Ok(None);
        }
        let slot = self.slot::<T>();
        let instance = slot.lock();

        match slot.live(&instance, host) {
            None => {
                Self::apply_persistence::<T, H>(host, object);
                instance.set(Some(object));
                debug!("registered {} instance {object}", slot.type_name);
                Ok(Some(Handle::new(object)))
            }
            Some(existing) if existing == object => Ok(Some(Handle::new(object))),
            Some(existing) => Err(slot.reject(host, existing, object)),
        }
    }

    /// Whether a live-or-stale instance of `T` is cached. Use [`Registry::get`] to check liveness.
    pub fn contains<T: Singleton>(&self) -> bool {
        self.slots
            .get(&TypeId::of::<T>())
            .map(|slot| Arc::clone(slot.value()))
            .is_some_and(|slot| slot.lock().get().is_some())
    }

    /// Number of slots currently holding an instance.
    pub fn len(&self) -> usize {
        // Slot locks are taken outside the map's shard locks
        let slots: Vec<Arc<Slot>> = self.slots.iter().map(|slot| Arc::clone(slot.value())).collect();
        slots
            .iter()
            .filter(|slot| slot.lock().get().is_some())
            .count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_quitting(&self) -> bool {
        self.quitting.load(Ordering::Acquire)
    }

    /// Raise the quitting flag. Returns `true` if it was not already raised.
    pub(crate) fn set_quitting(&self) -> bool {
        !self.quitting.swap(true, Ordering::AcqRel)
    }

    /// Forget every cached instance and lower the quitting flag.
    ///
    /// Objects in the host are left alone; they will be adopted again on the next access.
    pub fn reset(&self) {
        self.slots.clear();
        self.quitting.store(false, Ordering::Release);
    }

    /// Get or create the slot for `T`.
    fn slot<T: Singleton>(&self) -> Arc<Slot> {
        let key = TypeId::of::<T>();
        // Fast path: the slot already exists
        if let Some(slot) = self.slots.get(&key) {
            return Arc::clone(slot.value());
        }
        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| Arc::new(Slot::new(any::type_name::<T>())));
        Arc::clone(slot.value())
    }

    fn apply_persistence<T: Singleton, H: Host>(host: &mut H, object: ObjectId) {
        if T::PERSIST_BETWEEN_SCENES {
            host.keep_across_loads(object);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Barrier, Mutex},
        thread,
    };

    use rusty_singleton_macros::{Component, Singleton};

    use super::*;
    use crate::{
        core::Context,
        scene::{Component, Scene},
    };

    #[derive(Component, Singleton, Default, Debug)]
    struct Mixer {
        volume: u8,
    }

    #[derive(Component, Singleton, Default, Debug)]
    #[singleton(persist, name = "Save System")]
    struct SaveSystem;

    #[derive(Component, Singleton, Default, Debug)]
    struct Input;

    #[test]
    fn creates_instance_when_scene_is_empty() {
        // Given
        let registry = Registry::new();
        let mut scene = Scene::new();

        // When
        let access = registry.get_or_create::<Mixer, _>(&mut scene);

        // Then
        let handle = access.handle().unwrap();
        assert!(access.is_created());
        assert!(scene.has::<Mixer>(handle.object()));
        assert_eq!(scene.name(handle.object()), Some(any::type_name::<Mixer>()));
        assert!(!scene.is_persistent(handle.object()));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn repeated_access_returns_same_instance() {
        // Given
        let registry = Registry::new();
        let mut scene = Scene::new();
        let first = registry.get_or_create::<Mixer, _>(&mut scene);

        // When
        let second = registry.get_or_create::<Mixer, _>(&mut scene);

        // Then
        assert_eq!(second, Access::Existing(first.handle().unwrap()));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn adopts_instance_already_in_scene() {
        // Given
        let registry = Registry::new();
        let mut scene = Scene::new();
        let placed = scene.spawn("Placed Mixer");
        scene.attach(placed, Mixer { volume: 7 });

        // When
        let access = registry.get_or_create::<Mixer, _>(&mut scene);

        // Then
        assert_eq!(access, Access::Existing(Handle::new(placed)));
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.get::<Mixer>(placed).unwrap().volume, 7);
    }

    /// Scene that never accepts a component.
    struct RefusingHost(Scene);

    impl Host for RefusingHost {
        fn find_all<C: Component>(&self) -> Vec<ObjectId> {
            self.0.find_all::<C>()
        }

        fn spawn(&mut self, name: &str) -> ObjectId {
            self.0.spawn(name)
        }

        fn attach<C: Component>(&mut self, _object: ObjectId, _component: C) -> bool {
            false
        }

        fn has<C: Component>(&self, object: ObjectId) -> bool {
            self.0.has::<C>(object)
        }

        fn keep_across_loads(&mut self, object: ObjectId) {
            self.0.keep_across_loads(object)
        }

        fn destroy(&mut self, object: ObjectId) -> bool {
            self.0.destroy(object)
        }

        fn is_alive(&self, object: ObjectId) -> bool {
            self.0.is_alive(object)
        }

        fn name(&self, object: ObjectId) -> Option<&str> {
            self.0.name(object)
        }
    }

    #[test]
    fn adopts_first_carrier_and_destroys_the_rest() {
        // Given
        let registry = Registry::new();
        let mut scene = Scene::new();
        let first = scene.spawn("First Mixer");
        let second = scene.spawn("Second Mixer");
        scene.attach(first, Mixer { volume: 1 });
        scene.attach(second, Mixer { volume: 2 });

        // When
        let access = registry.get_or_create::<Mixer, _>(&mut scene);

        // Then
        assert_eq!(access, Access::Existing(Handle::new(first)));
        assert!(scene.is_alive(first));
        assert!(!scene.is_alive(second));
        assert_eq!(scene.find_all::<Mixer>(), vec![first]);
    }

    #[test]
    fn refused_attachment_leaves_nothing_behind() {
        // Given
        let registry = Registry::new();
        let mut host = RefusingHost(Scene::new());

        // When
        let access = registry.get_or_create::<Mixer, _>(&mut host);

        // Then
        assert_eq!(access, Access::Unavailable);
        assert!(host.0.is_empty());
        assert!(!registry.contains::<Mixer>());
        assert_eq!(registry.get::<Mixer, _>(&host), None);
    }

    #[test]
    fn creation_through_hook_firing_scene() {
        // Given - The scene reports every Mixer attachment back to the registry
        let context = Context::new();
        let mut scene = Scene::new();
        scene.watch::<Mixer>(&context);
        scene.watch::<SaveSystem>(&context);

        // When
        let mixer = context.singletons().get_or_create::<Mixer, _>(&mut scene);
        let saves = context
            .singletons()
            .get_or_create::<SaveSystem, _>(&mut scene);

        // Then
        let object = mixer.handle().unwrap().object();
        assert!(mixer.is_created());
        assert!(saves.is_created());
        assert!(scene.is_persistent(saves.handle().unwrap().object()));
        assert_eq!(scene.len(), 2);
        assert!(scene.take_rejections().is_empty());
        assert_eq!(
            context.singletons().get_or_create::<Mixer, _>(&mut scene),
            Access::Existing(Handle::new(object))
        );
    }

    #[test]
    fn quitting_without_instance_creates_nothing() {
        // Given
        let registry = Registry::new();
        let mut scene = Scene::new();
        registry.set_quitting();

        // When
        let access = registry.get_or_create::<Mixer, _>(&mut scene);

        // Then
        assert_eq!(access, Access::Unavailable);
        assert!(scene.is_empty());
        assert!(!registry.contains::<Mixer>());
    }

    #[test]
    fn quitting_still_returns_cached_instance() {
        // Given
        let registry = Registry::new();
        let mut scene = Scene::new();
        let created = registry.get_or_create::<Mixer, _>(&mut scene);

        // When
        registry.set_quitting();
        let access = registry.get_or_create::<Mixer, _>(&mut scene);

        // Then
        assert_eq!(access.handle(), created.handle());
        assert!(!access.is_created());
    }

    #[test]
    fn quitting_does_not_adopt_placed_instance() {
        let registry = Registry::new();
        let mut scene = Scene::new();
        let placed = scene.spawn("Placed");
        scene.attach(placed, Mixer::default());
        registry.set_quitting();

        assert_eq!(
            registry.get_or_create::<Mixer, _>(&mut scene),
            Access::Unavailable
        );
    }

    #[test]
    fn persistent_instance_survives_transition() {
        // Given
        let registry = Registry::new();
        let mut scene = Scene::new();
        let created = registry.get_or_create::<SaveSystem, _>(&mut scene);
        let object = created.handle().unwrap().object();

        // When
        let destroyed = scene.transition();

        // Then
        assert!(destroyed.is_empty());
        assert_eq!(scene.name(object), Some("Save System"));
        assert_eq!(
            registry.get_or_create::<SaveSystem, _>(&mut scene),
            Access::Existing(Handle::new(object))
        );
    }

    #[test]
    fn transient_instance_is_recreated_after_transition() {
        // Given
        let registry = Registry::new();
        let mut scene = Scene::new();
        let before = registry.get_or_create::<Mixer, _>(&mut scene);

        // When
        scene.transition();

        // Then - The stale instance is dropped and a new one created
        assert_eq!(registry.get::<Mixer, _>(&scene), None);
        let after = registry.get_or_create::<Mixer, _>(&mut scene);
        assert!(after.is_created());
        assert_ne!(after.handle(), before.handle());
    }

    #[test]
    fn get_does_not_create() {
        let registry = Registry::new();
        let mut scene = Scene::new();

        assert_eq!(registry.get::<Mixer, _>(&scene), None);
        assert!(scene.is_empty());

        let created = registry.get_or_create::<Mixer, _>(&mut scene);
        assert_eq!(registry.get::<Mixer, _>(&scene), created.handle());
    }

    #[test]
    fn on_attached_adopts_first_instance() {
        // Given
        let registry = Registry::new();
        let mut scene = Scene::new();
        let placed = scene.spawn("Saves");
        scene.attach(placed, SaveSystem);

        // When
        let handle = registry.on_attached::<SaveSystem, _>(&mut scene, placed);

        // Then
        assert_eq!(handle, Ok(Some(Handle::new(placed))));
        assert!(scene.is_persistent(placed));
        assert_eq!(
            registry.get_or_create::<SaveSystem, _>(&mut scene),
            Access::Existing(Handle::new(placed))
        );
    }

    #[test]
    fn on_attached_ignores_object_without_component() {
        // Given
        let registry = Registry::new();
        let mut scene = Scene::new();
        let bare = scene.spawn("Bare");

        // When
        let result = registry.on_attached::<Mixer, _>(&mut scene, bare);

        // Then
        assert_eq!(result, Ok(None));
        assert!(scene.is_alive(bare));
        assert!(!registry.contains::<Mixer>());
    }

    #[test]
    fn on_attached_is_idempotent_for_registered_instance() {
        let registry = Registry::new();
        let mut scene = Scene::new();
        let created = registry.get_or_create::<Mixer, _>(&mut scene);
        let object = created.handle().unwrap().object();

        let again = registry.on_attached::<Mixer, _>(&mut scene, object);

        assert_eq!(again, Ok(Some(Handle::new(object))));
        assert!(scene.is_alive(object));
    }

    #[test]
    fn on_attached_destroys_duplicate() {
        // Given
        let registry = Registry::new();
        let mut scene = Scene::new();
        let first = registry
            .get_or_create::<Mixer, _>(&mut scene)
            .handle()
            .unwrap();
        let extra = scene.spawn("Extra Mixer");
        scene.attach(extra, Mixer { volume: 3 });

        // When
        let result = registry.on_attached::<Mixer, _>(&mut scene, extra);

        // Then
        let err = result.unwrap_err();
        assert_eq!(err.type_name(), any::type_name::<Mixer>());
        assert_eq!(err.existing(), first.object());
        assert_eq!(err.rejected(), extra);
        assert_eq!(
            err.description(),
            format!("Extra Mixer ({})", any::type_name::<Mixer>())
        );
        assert!(!scene.is_alive(extra));
        assert_eq!(
            registry.get_or_create::<Mixer, _>(&mut scene),
            Access::Existing(first)
        );
    }

    #[test]
    fn on_attached_replaces_stale_instance() {
        // Given
        let registry = Registry::new();
        let mut scene = Scene::new();
        let first = registry
            .get_or_create::<Mixer, _>(&mut scene)
            .handle()
            .unwrap();
        scene.destroy(first.object());
        let replacement = scene.spawn("Replacement");
        scene.attach(replacement, Mixer::default());

        // When
        let result = registry.on_attached::<Mixer, _>(&mut scene, replacement);

        // Then
        assert_eq!(result, Ok(Some(Handle::new(replacement))));
    }

    #[test]
    fn types_have_independent_slots() {
        // Given
        let registry = Registry::new();
        let mut scene = Scene::new();
        let shared = scene.spawn("Shared");
        scene.attach(shared, Mixer::default());
        scene.attach(shared, Input);

        // When
        let mixer = registry.on_attached::<Mixer, _>(&mut scene, shared);
        let input = registry.on_attached::<Input, _>(&mut scene, shared);

        // Then - Neither registration collides with the other
        assert!(mixer.is_ok());
        assert!(input.is_ok());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn reset_clears_slots_and_quitting() {
        // Given
        let registry = Registry::new();
        let mut scene = Scene::new();
        registry.get_or_create::<Mixer, _>(&mut scene);
        registry.set_quitting();

        // When
        registry.reset();

        // Then
        assert!(registry.is_empty());
        assert!(!registry.is_quitting());
        // The object is still in the scene and gets adopted again
        assert!(!registry.get_or_create::<Mixer, _>(&mut scene).is_created());
    }

    #[test]
    fn set_quitting_reports_first_transition_only() {
        let registry = Registry::new();

        assert!(registry.set_quitting());
        assert!(!registry.set_quitting());
        assert!(registry.is_quitting());
    }

    #[test]
    fn concurrent_access_creates_one_instance() {
        // Given
        let registry = Arc::new(Registry::new());
        let scene = Arc::new(Mutex::new(Scene::new()));
        let barrier = Arc::new(Barrier::new(8));

        // When
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let scene = Arc::clone(&scene);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let mut scene = scene.lock().unwrap();
                    registry.get_or_create::<Mixer, _>(&mut *scene)
                })
            })
            .collect();
        let handles: Vec<_> = threads
            .into_iter()
            .map(|thread| thread.join().unwrap())
            .collect();

        // Then
        let created = handles.iter().filter(|access| access.is_created()).count();
        assert_eq!(created, 1);
        assert!(handles.windows(2).all(|w| w[0].handle() == w[1].handle()));
        assert_eq!(scene.lock().unwrap().len(), 1);
    }
}
