//! Runtime driving the TEA loop for one view session

use crate::api::{HealingApi, HealingClient};
use crate::config::ClientConfig;
use crate::error::ApiResult;
use crate::tea::message::SystemMessage;
use crate::tea::{update, CommandExecutor, Message, Model};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A live view session: model, command executor and the completion channel
///
/// Must be used from within a tokio runtime since remote calls are spawned.
pub struct Session {
    model: Model,
    executor: CommandExecutor,
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl Session {
    /// Create a session over any [`HealingApi`] implementation
    pub fn new(config: ClientConfig, api: Arc<dyn HealingApi>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            model: Model::new(config),
            executor: CommandExecutor::new(api, sender),
            receiver,
        }
    }

    /// Create a session backed by the HTTP client
    pub fn from_config(config: ClientConfig) -> ApiResult<Self> {
        let client = HealingClient::new(&config)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Mount the view; issues the automatic archive load
    pub fn start(&mut self) {
        self.dispatch(SystemMessage::Initialize.into());
    }

    /// Tear the view down; outstanding completions will be ignored
    pub fn shutdown(&mut self) {
        self.dispatch(SystemMessage::Shutdown.into());
    }

    /// Apply one message and start the commands it produced
    pub fn dispatch(&mut self, message: Message) {
        let model = std::mem::take(&mut self.model);
        let result = update(model, message);
        self.model = result.model;

        for command in result.commands {
            self.executor.execute(command);
        }
    }

    /// Wait for the next queued message and apply it; false if the channel closed
    pub async fn next(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(message) => {
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    /// Process messages until no remote call is outstanding
    pub async fn settle(&mut self) {
        loop {
            while let Ok(message) = self.receiver.try_recv() {
                self.dispatch(message);
            }

            if !self.model.has_pending() {
                break;
            }

            if !self.next().await {
                break;
            }
        }
    }
}
