// SPDX-License-Identifier: GPL-3.0-only

//! Async driver for the booth context
//!
//! One task owns the [`PhotoBooth`] and feeds it messages strictly one at a
//! time, whether they come from a [`BoothHandle`] or from a delayed [`Task`]
//! coming due. Delayed messages live in a [`JoinSet`] so shutting down can
//! abort every pending timer at once.

use super::PhotoBooth;
use super::state::{Message, Task};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// The booth task has ended and no longer accepts messages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("photo booth has shut down")]
pub struct BoothClosed;

/// Cloneable sender of booth messages
#[derive(Debug, Clone)]
pub struct MessageSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl MessageSender {
    pub fn send(&self, message: Message) -> Result<(), BoothClosed> {
        self.tx.send(message).map_err(|_| BoothClosed)
    }
}

/// Handle to a running booth
///
/// Dropping every handle and sender shuts the booth down.
#[derive(Debug)]
pub struct BoothHandle {
    sender: MessageSender,
    task: JoinHandle<PhotoBooth>,
}

impl BoothHandle {
    pub fn send(&self, message: Message) -> Result<(), BoothClosed> {
        self.sender.send(message)
    }

    /// Another sender for the same booth
    pub fn sender(&self) -> MessageSender {
        self.sender.clone()
    }

    /// Ask the booth to shut down and wait for it
    ///
    /// Returns the booth after its stream was released and its timers aborted.
    pub async fn shutdown(self) -> Result<PhotoBooth, JoinError> {
        // Already closed is fine: the task is ending anyway
        let _ = self.sender.send(Message::Shutdown);
        drop(self.sender);
        self.task.await
    }
}

/// Run `booth` on its own task
pub fn spawn(booth: PhotoBooth) -> BoothHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(booth, rx));
    BoothHandle {
        sender: MessageSender { tx },
        task,
    }
}

async fn run(mut booth: PhotoBooth, mut rx: mpsc::UnboundedReceiver<Message>) -> PhotoBooth {
    info!("Photo booth runtime started");
    let mut timers: JoinSet<Message> = JoinSet::new();

    loop {
        let message = tokio::select! {
            incoming = rx.recv() => match incoming {
                Some(message) => message,
                None => {
                    debug!("All booth handles dropped");
                    break;
                }
            },
            Some(fired) = timers.join_next(), if !timers.is_empty() => match fired {
                Ok(message) => message,
                Err(err) => {
                    if !err.is_cancelled() {
                        warn!(error = %err, "Booth timer failed");
                    }
                    continue;
                }
            },
        };

        let shutting_down = matches!(message, Message::Shutdown);
        match booth.update(message).await {
            Task::None => {}
            Task::Delay { after, message } => {
                timers.spawn(async move {
                    tokio::time::sleep(after).await;
                    message
                });
            }
        }

        if shutting_down {
            break;
        }
    }

    if !timers.is_empty() {
        debug!(pending = timers.len(), "Aborting pending booth timers");
    }
    timers.abort_all();
    booth.shutdown();
    info!("Photo booth runtime stopped");
    booth
}
