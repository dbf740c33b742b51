//! Central message type for the view session following TEA pattern
//!
//! User input, lifecycle events and remote call completions all flow through
//! this message system so every state change happens in `update`.

use crate::api::{BroadcastResponse, FieldType, HealingCode, SoulArchiveEntry};
use crate::error::ApiError;
use crate::tea::model::RequestSeq;

/// Main session message type
#[derive(Debug, Clone)]
pub enum Message {
    /// Session lifecycle messages
    System(SystemMessage),

    /// Live form edits
    Form(FormMessage),

    /// Intention broadcast messages
    Broadcast(BroadcastMessage),

    /// Healing code search messages
    Codes(CodesMessage),

    /// Soul archive messages
    Archive(ArchiveMessage),
}

/// Session lifecycle
#[derive(Debug, Clone)]
pub enum SystemMessage {
    /// View mounted; triggers the one automatic archive load
    Initialize,

    /// View torn down; late completions are ignored afterwards
    Shutdown,
}

/// Keystroke/toggle level form updates
#[derive(Debug, Clone)]
pub enum FormMessage {
    IntentionChanged(String),
    FrequencyChanged(String),
    FieldTypeSelected(FieldType),
    AmplifyToggled(bool),
    MultiplierChanged(String),
    CodeQueryChanged(String),
}

#[derive(Debug, Clone)]
pub enum BroadcastMessage {
    /// Submit the current form as a broadcast
    Submit,

    /// Broadcast completed
    Completed(RequestSeq, BroadcastResponse),

    /// Broadcast failed
    Failed(RequestSeq, ApiError),
}

#[derive(Debug, Clone)]
pub enum CodesMessage {
    /// Search with the current code query
    Search,

    /// Search results arrived
    Completed(RequestSeq, Vec<HealingCode>),

    /// Search failed
    Failed(RequestSeq, ApiError),
}

#[derive(Debug, Clone)]
pub enum ArchiveMessage {
    /// Load all archive entries
    Load,

    /// Entries loaded successfully
    Loaded(RequestSeq, Vec<SoulArchiveEntry>),

    /// Archive loading failed
    Failed(RequestSeq, ApiError),
}

impl From<SystemMessage> for Message {
    fn from(msg: SystemMessage) -> Self {
        Message::System(msg)
    }
}

impl From<FormMessage> for Message {
    fn from(msg: FormMessage) -> Self {
        Message::Form(msg)
    }
}

impl From<BroadcastMessage> for Message {
    fn from(msg: BroadcastMessage) -> Self {
        Message::Broadcast(msg)
    }
}

impl From<CodesMessage> for Message {
    fn from(msg: CodesMessage) -> Self {
        Message::Codes(msg)
    }
}

impl From<ArchiveMessage> for Message {
    fn from(msg: ArchiveMessage) -> Self {
        Message::Archive(msg)
    }
}
