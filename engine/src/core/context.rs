use std::sync::Arc;

use log::info;

use super::state::State;
use crate::singleton::Registry;

/// The application context handed to subsystems that need singleton access.
///
/// Cloning a context is cheap and every clone shares the same [`Registry`], so a context is the
/// unit of "one instance per type": two independent contexts never see each other's instances.
#[derive(Clone, Default)]
pub struct Context {
    singletons: Arc<Registry>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// The singleton registry of this context.
    #[inline]
    pub fn singletons(&self) -> &Registry {
        &self.singletons
    }

    pub fn state(&self) -> State {
        if self.singletons.is_quitting() {
            State::Quitting
        } else {
            State::Running
        }
    }

    #[inline]
    pub fn is_quitting(&self) -> bool {
        self.singletons.is_quitting()
    }

    /// Shutdown hook: the host is quitting. Stops singleton auto-creation for good.
    pub fn notify_quit(&self) {
        if self.singletons.set_quitting() {
            info!("application quitting, singleton creation disabled");
        }
    }
}
