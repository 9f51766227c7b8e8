//! Dialogue module - the conversation state machine and the session loop around it.

pub mod controller;
pub mod echo;
pub mod profile;
pub mod reply;
pub mod session;
pub mod state;


use serde::Deserialize;

pub use controller::{Inbound, step};
pub use profile::UserProfile;
pub use reply::{Menu, Reply};
pub use session::{Handled, ProfileStore, ReplySink, SessionError, SessionManager};
pub use state::{ConversationState, Fact};

/// Everything stored for one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// `None` once the conversation has ended (or before it started).
    pub state: Option<ConversationState>,
    pub profile: UserProfile,
}

/// Which bot the process runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotMode {
    /// The finance-facts dialogue.
    #[default]
    Budget,
    /// Greets and mirrors messages, nothing stored.
    Echo,
}
