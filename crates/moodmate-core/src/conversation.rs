//! Session lifecycle and the single-flight reply queue.
//!
//! A [`Conversation`] owns one [`Session`]. [`ConversationHandle::spawn`]
//! moves it onto a worker task that drains inputs one at a time, so replies
//! come back exactly once and in submission order no matter how fast lines
//! are submitted during the pacing delay.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::dialogue::{JokePicker, Output, Session, WELCOME};
use crate::history::HistoryStore;
use crate::store::KeyValueStore;

pub struct Conversation<S> {
    session: Session<S>,
    jokes: Box<dyn JokePicker>,
}

impl<S: KeyValueStore> Conversation<S> {
    pub fn new(history: HistoryStore<S>, jokes: Box<dyn JokePicker>) -> Self {
        Self {
            session: Session::new(history),
            jokes,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Begin a fresh session: wipe persisted state and greet.
    pub fn start(&mut self) -> Vec<Output> {
        self.session.restart();
        vec![Output::bot(WELCOME)]
    }

    pub fn submit(&mut self, input: &str) -> Vec<Output> {
        self.session.advance(input, self.jokes.as_mut())
    }
}

/// Outputs produced for one queued command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub outputs: Vec<Output>,
    /// Set when this reply opens a fresh session. Anything shown before it
    /// belongs to the old one.
    pub restarted: bool,
}

enum Command {
    Input(String),
    Restart,
}

/// Sender side of a running conversation worker.
#[derive(Clone)]
pub struct ConversationHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl ConversationHandle {
    /// Start the worker. The first [`Reply`] is the welcome line.
    ///
    /// The worker stops when every handle is dropped or the reply receiver
    /// is closed.
    pub fn spawn<S>(
        conversation: Conversation<S>,
        reply_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Reply>)
    where
        S: KeyValueStore + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        // Queued ahead of any input
        let _ = tx.send(Command::Restart);
        tokio::spawn(run_worker(conversation, reply_delay, rx, reply_tx));
        (Self { tx }, reply_rx)
    }

    pub fn submit(&self, input: impl Into<String>) -> Result<()> {
        self.tx
            .send(Command::Input(input.into()))
            .map_err(|_| anyhow::anyhow!("conversation worker has stopped"))
    }

    /// Wipe the session and greet again, after any inputs already queued.
    pub fn restart(&self) -> Result<()> {
        self.tx
            .send(Command::Restart)
            .map_err(|_| anyhow::anyhow!("conversation worker has stopped"))
    }
}

async fn run_worker<S: KeyValueStore>(
    mut conversation: Conversation<S>,
    reply_delay: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
    reply_tx: mpsc::UnboundedSender<Reply>,
) {
    while let Some(command) = rx.recv().await {
        let (outputs, restarted) = match command {
            Command::Input(text) => {
                if !reply_delay.is_zero() {
                    tokio::time::sleep(reply_delay).await;
                }
                (conversation.submit(&text), false)
            }
            Command::Restart => {
                info!("Starting fresh session");
                (conversation.start(), true)
            }
        };
        if reply_tx.send(Reply { outputs, restarted }).is_err() {
            break;
        }
    }
    debug!("Conversation worker stopped");
}
