//! Command system for TEA pattern
//!
//! Commands represent side effects requested by `update`. The executor runs
//! them on the tokio runtime and feeds resulting messages back to the loop.

use crate::api::{HealingApi, IntentionRequest};
use crate::error::{ApiError, ApiResult};
use crate::tea::message::{ArchiveMessage, BroadcastMessage, CodesMessage, Message};
use crate::tea::model::RequestSeq;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Command that can be executed to perform side effects
#[derive(Debug)]
pub enum Command {
    /// Send a message back to the update loop
    SendMessage(Message),

    /// Execute an async task
    Task(TaskCommand),

    /// Call the healing service
    Remote(RemoteCommand),
}

/// Async task command
#[derive(Debug)]
pub struct TaskCommand {
    pub id: String,
    pub name: String,
    pub task: Box<dyn AsyncTask>,
}

/// Trait for async tasks
#[async_trait::async_trait]
pub trait AsyncTask: Send + Sync + std::fmt::Debug {
    /// Execute the task and return messages to send
    async fn execute(&self) -> Vec<Message>;
}

/// Remote operations, each tagged with the sequence number of its slot
#[derive(Debug, Clone)]
pub enum RemoteCommand {
    Broadcast {
        seq: RequestSeq,
        request: IntentionRequest,
    },
    SearchCodes {
        seq: RequestSeq,
        query: String,
    },
    LoadArchives {
        seq: RequestSeq,
    },
}

impl RemoteCommand {
    pub fn name(&self) -> &'static str {
        match self {
            RemoteCommand::Broadcast { .. } => "broadcast_intention",
            RemoteCommand::SearchCodes { .. } => "search_healing_codes",
            RemoteCommand::LoadArchives { .. } => "load_soul_archives",
        }
    }

    /// Failure message for the slot this command writes
    pub fn failed(&self, error: ApiError) -> Message {
        match self {
            RemoteCommand::Broadcast { seq, .. } => BroadcastMessage::Failed(*seq, error).into(),
            RemoteCommand::SearchCodes { seq, .. } => CodesMessage::Failed(*seq, error).into(),
            RemoteCommand::LoadArchives { seq } => ArchiveMessage::Failed(*seq, error).into(),
        }
    }
}

/// A remote command bound to the API it runs against
pub struct RemoteTask {
    api: Arc<dyn HealingApi>,
    command: RemoteCommand,
}

impl RemoteTask {
    pub fn new(api: Arc<dyn HealingApi>, command: RemoteCommand) -> Self {
        Self { api, command }
    }
}

impl std::fmt::Debug for RemoteTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteTask")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl AsyncTask for RemoteTask {
    async fn execute(&self) -> Vec<Message> {
        let outcome: ApiResult<Message> = match &self.command {
            RemoteCommand::Broadcast { seq, request } => self
                .api
                .broadcast_intention(request)
                .await
                .map(|response| BroadcastMessage::Completed(*seq, response).into()),
            RemoteCommand::SearchCodes { seq, query } => self
                .api
                .search_healing_codes(query)
                .await
                .map(|codes| CodesMessage::Completed(*seq, codes).into()),
            RemoteCommand::LoadArchives { seq } => self
                .api
                .load_soul_archives()
                .await
                .map(|entries| ArchiveMessage::Loaded(*seq, entries).into()),
        };

        let message = match outcome {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("{} failed: {}", self.command.name(), e);
                self.command.failed(e)
            }
        };

        vec![message]
    }
}

/// Command executor that processes commands asynchronously
pub struct CommandExecutor {
    api: Arc<dyn HealingApi>,
    message_sender: mpsc::UnboundedSender<Message>,
}

impl CommandExecutor {
    /// Create a new command executor
    pub fn new(api: Arc<dyn HealingApi>, message_sender: mpsc::UnboundedSender<Message>) -> Self {
        Self { api, message_sender }
    }

    /// Execute a command
    ///
    /// Tasks are spawned, so this returns before any network call finishes.
    pub fn execute(&self, command: Command) -> Option<JoinHandle<()>> {
        match command {
            Command::SendMessage(message) => {
                if let Err(e) = self.message_sender.send(message) {
                    tracing::error!("Failed to send message: {}", e);
                }
                None
            }
            Command::Task(task_command) => Some(self.spawn_task(task_command)),
            Command::Remote(remote) => {
                let name = remote.name().to_string();
                let task = RemoteTask::new(Arc::clone(&self.api), remote.clone());
                let Some(handle) = self.execute(Command::task(name.clone(), task)) else {
                    return None;
                };
                Some(self.watch_remote(name, remote, handle))
            }
        }
    }

    /// Run a task in the background and forward its messages
    fn spawn_task(&self, task_command: TaskCommand) -> JoinHandle<()> {
        let sender = self.message_sender.clone();

        tokio::spawn(async move {
            tracing::debug!("Executing task: {} ({})", task_command.name, task_command.id);

            let messages = task_command.task.execute().await;

            for message in messages {
                // Receiver is gone once the session has been dropped
                if sender.send(message).is_err() {
                    tracing::debug!("Session closed, dropping result of {}", task_command.name);
                }
            }
        })
    }
}

impl CommandExecutor {
    /// Report a remote task that ended without a message as a failure of its slot
    fn watch_remote(&self, name: String, remote: RemoteCommand, handle: JoinHandle<()>) -> JoinHandle<()> {
        let sender = self.message_sender.clone();

        tokio::spawn(async move {
            if let Err(e) = handle.await {
                tracing::error!("Task {} aborted: {}", name, e);
                let error = ApiError::transport(format!("{} aborted: {}", name, e));
                let _ = sender.send(remote.failed(error));
            }
        })
    }
}

/// Helper functions for creating common commands
impl Command {
    /// Create a command to send a message
    pub fn message(msg: Message) -> Self {
        Command::SendMessage(msg)
    }

    /// Create a task command
    pub fn task<T>(name: String, task: T) -> Self
    where
        T: AsyncTask + 'static,
    {
        Command::Task(TaskCommand {
            id: Uuid::new_v4().to_string(),
            name,
            task: Box::new(task),
        })
    }

    /// Create a remote call command
    pub fn remote(command: RemoteCommand) -> Self {
        Command::Remote(command)
    }
}
