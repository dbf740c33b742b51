//! The Elm Architecture (TEA) pattern implementation for the intention view
//!
//! This module provides the explicit state container: a `Model`, the `Message`s
//! that change it, a pure `update` function, and `Command`s for the side effects.

pub mod command;
pub mod message;
pub mod model;
pub mod session;
pub mod update;

pub use command::{Command, CommandExecutor, RemoteCommand};
pub use message::Message;
pub use model::{FormFields, Model, RequestSeq, Slot};
pub use session::Session;
pub use update::update;

/// Result of processing a TEA update cycle
pub struct UpdateResult<M> {
    pub model: M,
    pub commands: Vec<Command>,
}

impl<M> UpdateResult<M> {
    pub fn just_model(model: M) -> Self {
        Self { model, commands: Vec::new() }
    }

    pub fn with_command(model: M, command: Command) -> Self {
        Self { model, commands: vec![command] }
    }
}
