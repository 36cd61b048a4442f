use super::{Component, ObjectId};

/// The scene-graph operations the singleton registry relies on.
///
/// A host owns objects, lets components be attached to them, can exempt objects from
/// scene-transition destruction and can destroy them. The registry never holds references into
/// the host; it only keeps [`ObjectId`]s and re-validates them with [`Host::is_alive`].
pub trait Host {
    /// Every live object carrying a component of type `C` in the active scene, in a stable
    /// order. The first one is the instance adopted by the registry.
    fn find_all<C: Component>(&self) -> Vec<ObjectId>;

    /// Create a new, empty object.
    fn spawn(&mut self, name: &str) -> ObjectId;

    /// Attach `component` to `object`.
    ///
    /// Returns `false` if the object is not alive or already carries a `C`, or if an attachment
    /// hook rejected the component. A host may run [`Registry::on_attached`] from here, including
    /// while the registry is creating the instance.
    ///
    /// [`Registry::on_attached`]: crate::singleton::Registry::on_attached
    fn attach<C: Component>(&mut self, object: ObjectId, component: C) -> bool;

    /// Whether `object` is alive and carries a `C`.
    fn has<C: Component>(&self, object: ObjectId) -> bool;

    /// Exempt `object` from destruction when the active scene changes.
    fn keep_across_loads(&mut self, object: ObjectId);

    /// Destroy `object` and everything attached to it. Returns `false` if it was not alive.
    fn destroy(&mut self, object: ObjectId) -> bool;

    /// Whether `object` still names a live object.
    fn is_alive(&self, object: ObjectId) -> bool;

    /// The name of a live object.
    fn name(&self, object: ObjectId) -> Option<&str>;
}
