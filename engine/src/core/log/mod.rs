//! Log sinks for hosts embedding the registry.
//!
//! The crate logs through the `log` facade. Lifecycle events use these levels:
//!
//! - `trace`: scene object spawn/destroy and transitions
//! - `debug`: singleton adoption, creation and stale-slot clearing
//! - `info`: the quit notification
//! - `warn`: a rejected duplicate instance
//! - `error`: the host refused to attach an auto-created instance

mod channel;

use crossbeam::channel::Receiver;
use log::{LevelFilter, SetLoggerError};

pub use channel::{ChannelLogger, LogMessage};

/// Install a [`ChannelLogger`] as the global logger and return the receiving end.
///
/// Fails if a global logger is already installed.
pub fn init(level: LevelFilter) -> Result<Receiver<LogMessage>, SetLoggerError> {
    let (logger, receiver) = ChannelLogger::with_receiver(level);
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(receiver)
}
