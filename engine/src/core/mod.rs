pub mod context;
pub mod log;
mod state;

pub use context::Context;
pub use state::State;
