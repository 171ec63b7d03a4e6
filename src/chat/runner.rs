//! Background request runner
//!
//! Each submitted prompt runs on its own tokio task and produces exactly
//! one [`ChatReply`] on a channel owned by the runner. A semaphore caps how
//! many requests hit the LLM at once; requests beyond the cap wait for a
//! permit. Replies carry the sequence number assigned at submit time so the
//! consumer can choose between arrival order and send order.

use crate::providers::{get_llm_response, LlmClient};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// Delivery order for replies to concurrent requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOrdering {
    /// Deliver replies as soon as they complete
    #[default]
    Arrival,
    /// Hold early replies until every earlier request has been delivered
    SendOrder,
}

/// Result of one LLM request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Sequence number assigned by [`RequestRunner::submit`]
    pub seq: u64,
    /// Session the request belongs to
    pub session_id: String,
    /// Reply text, or an error sentinel
    pub text: String,
}

/// Runs LLM requests off the caller's task
pub struct RequestRunner {
    client: Arc<dyn LlmClient>,
    permits: Arc<Semaphore>,
    ordering: ReplyOrdering,
    tx: mpsc::UnboundedSender<ChatReply>,
    rx: mpsc::UnboundedReceiver<ChatReply>,
    next_seq: u64,
    next_release: u64,
    held: BTreeMap<u64, ChatReply>,
    outstanding: usize,
}

impl RequestRunner {
    /// Create a runner allowing `max_concurrent` requests in flight
    pub fn new(client: Arc<dyn LlmClient>, max_concurrent: usize, ordering: ReplyOrdering) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            ordering,
            tx,
            rx,
            next_seq: 0,
            next_release: 0,
            held: BTreeMap::new(),
            outstanding: 0,
        }
    }

    /// Dispatch a prompt; returns its sequence number immediately
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, session_id: impl Into<String>, prompt: String) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.outstanding += 1;

        let session_id = session_id.into();
        let client = Arc::clone(&self.client);
        let permits = Arc::clone(&self.permits);
        let tx = self.tx.clone();

        tracing::debug!(seq, session_id = %session_id, "Dispatching LLM request");

        tokio::spawn(async move {
            let text = match permits.acquire_owned().await {
                Ok(_permit) => get_llm_response(client.as_ref(), &prompt).await,
                Err(e) => format!("{} {}]", crate::providers::LLM_ERROR_PREFIX, e),
            };
            if tx
                .send(ChatReply {
                    seq,
                    session_id,
                    text,
                })
                .is_err()
            {
                tracing::debug!(seq, "Reply receiver dropped");
            }
        });

        seq
    }

    /// Number of submitted requests whose reply has not been returned yet
    pub fn pending(&self) -> usize {
        self.outstanding
    }

    /// Wait for the next deliverable reply
    ///
    /// Returns `None` immediately when nothing is pending.
    pub async fn next_reply(&mut self) -> Option<ChatReply> {
        if self.outstanding == 0 {
            return None;
        }

        let reply = match self.ordering {
            ReplyOrdering::Arrival => self.rx.recv().await?,
            ReplyOrdering::SendOrder => loop {
                if let Some(reply) = self.held.remove(&self.next_release) {
                    break reply;
                }
                let reply = self.rx.recv().await?;
                if reply.seq == self.next_release {
                    break reply;
                }
                self.held.insert(reply.seq, reply);
            },
        };

        if self.ordering == ReplyOrdering::SendOrder {
            self.next_release += 1;
        }
        self.outstanding -= 1;
        tracing::debug!(seq = reply.seq, pending = self.outstanding, "Reply delivered");
        Some(reply)
    }
}
