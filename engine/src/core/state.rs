/// Lifecycle state of an application context.
#[derive(PartialEq)]
#[derive(Debug)]
#[derive(Copy, Clone)]
pub enum State {
    /// Normal operation; singleton access may create instances.
    Running,
    /// The host signalled shutdown; singleton access no longer creates instances.
    Quitting,
}
