//! One inbound event end to end: load the session, step it, save it, reply.

use std::future::Future;

use tracing::{debug, info, warn};

use super::controller::{Inbound, step};
use super::reply::Reply;
use super::{BotMode, Session, echo};
use crate::store::StoreError;

/// Per-conversation persistence.
pub trait ProfileStore {
    /// Load a conversation's session; unknown ids yield an empty one.
    fn load(&self, chat_id: i64) -> Result<Session, StoreError>;
    fn save(&self, chat_id: i64, session: &Session) -> Result<(), StoreError>;
}

/// Where replies go.
pub trait ReplySink {
    fn send_reply(&self, chat_id: i64, reply: &Reply) -> impl Future<Output = Result<(), String>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Send(String),
}

/// What happened to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Replied,
    /// Nothing matched; the catch-all reply (if configured) was sent.
    Unmatched,
    /// Nothing matched and nothing was sent.
    Dropped,
}

/// Drives conversations: owns the store and the reply sink.
pub struct SessionManager<S, R> {
    store: S,
    sink: R,
    mode: BotMode,
    unmatched_reply: Option<String>,
}

impl<S: ProfileStore, R: ReplySink> SessionManager<S, R> {
    pub fn new(store: S, sink: R, mode: BotMode) -> Self {
        Self { store, sink, mode, unmatched_reply: None }
    }

    /// Reply with `text` to messages nothing else handles, instead of staying silent.
    pub fn with_unmatched_reply(mut self, text: Option<String>) -> Self {
        self.unmatched_reply = text;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub async fn handle(&self, chat_id: i64, event: &Inbound) -> Result<Handled, SessionError> {
        let reply = match self.mode {
            BotMode::Echo => echo::respond(event),
            BotMode::Budget => self.step_budget(chat_id, event)?,
        };

        match reply {
            Some(reply) => {
                self.sink.send_reply(chat_id, &reply).await.map_err(SessionError::Send)?;
                Ok(Handled::Replied)
            }
            None => self.unmatched(chat_id, event).await,
        }
    }

    /// Step the stored session; it is only written back when something matched.
    fn step_budget(&self, chat_id: i64, event: &Inbound) -> Result<Option<Reply>, SessionError> {
        let mut session = self.store.load(chat_id)?;
        let before = session.state;
        let Some(reply) = step(&mut session, event) else {
            debug!("Chat {chat_id}: no transition for {event:?} in {before:?}");
            return Ok(None);
        };
        self.store.save(chat_id, &session)?;
        if before != session.state {
            info!("Chat {chat_id}: {before:?} -> {:?}", session.state);
        }
        Ok(Some(reply))
    }

    async fn unmatched(&self, chat_id: i64, event: &Inbound) -> Result<Handled, SessionError> {
        let (Some(text), Inbound::Text(_)) = (&self.unmatched_reply, event) else {
            return Ok(Handled::Dropped);
        };
        if let Err(e) = self.sink.send_reply(chat_id, &Reply::text(text.clone())).await {
            warn!("Chat {chat_id}: catch-all reply failed: {e}");
            return Err(SessionError::Send(e));
        }
        Ok(Handled::Unmatched)
    }
}
