//! Conversation states and the facts the bot collects.

use serde::{Deserialize, Serialize};

/// Where a conversation currently is. `None` in a [`Session`](super::Session)
/// means the conversation has ended and only `/start` re-enters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// First contact, waiting for the user's age.
    NewUser,
    Savings,
    Budget,
    SavingsGoal,
    AgeGoal,
    /// Menu shown, waiting for a fact label.
    Choosing,
    /// Waiting for the value of the pending choice.
    TypingReply,
    /// Like `Choosing`, but any free text names the fact.
    TypingChoice,
}

impl ConversationState {
    /// Onboarding states treat every non-command message as data, "Done" included.
    pub fn is_onboarding(self) -> bool {
        matches!(
            self,
            Self::NewUser | Self::Savings | Self::Budget | Self::SavingsGoal | Self::AgeGoal
        )
    }
}

/// The five facts asked during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fact {
    Age,
    Savings,
    Budget,
    SavingsGoal,
    AgeGoal,
}

impl Fact {
    /// Onboarding order, also the order facts are rendered in.
    pub const ALL: [Fact; 5] = [
        Fact::Age,
        Fact::Savings,
        Fact::Budget,
        Fact::SavingsGoal,
        Fact::AgeGoal,
    ];

    /// Key the fact is stored under.
    pub fn key(self) -> &'static str {
        match self {
            Fact::Age => "age",
            Fact::Savings => "savings",
            Fact::Budget => "budget",
            Fact::SavingsGoal => "savings_goal",
            Fact::AgeGoal => "age_goal",
        }
    }

    /// Button label on the menu keyboard.
    pub fn label(self) -> &'static str {
        match self {
            Fact::Age => "Age",
            Fact::Savings => "Current Savings",
            Fact::Budget => "Monthly Budget",
            Fact::SavingsGoal => "Savings Goal",
            Fact::AgeGoal => "Age Goal",
        }
    }

    /// Exact, case-sensitive label match (what a menu button press sends).
    pub fn from_label(text: &str) -> Option<Fact> {
        Self::ALL.into_iter().find(|f| f.label() == text)
    }

    /// Case-insensitive match against labels and storage keys, for typed choices.
    pub fn from_typed(text: &str) -> Option<Fact> {
        let text = text.trim();
        Self::ALL.into_iter().find(|f| {
            f.label().eq_ignore_ascii_case(text) || f.key().eq_ignore_ascii_case(text)
        })
    }

    pub fn position(key: &str) -> Option<usize> {
        Self::ALL.iter().position(|f| f.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_is_case_sensitive() {
        assert_eq!(Fact::from_label("Current Savings"), Some(Fact::Savings));
        assert_eq!(Fact::from_label("current savings"), None);
        assert_eq!(Fact::from_label("Done"), None);
    }

    #[test]
    fn test_from_typed_accepts_labels_and_keys() {
        assert_eq!(Fact::from_typed("monthly budget"), Some(Fact::Budget));
        assert_eq!(Fact::from_typed("  AGE GOAL "), Some(Fact::AgeGoal));
        assert_eq!(Fact::from_typed("savings_goal"), Some(Fact::SavingsGoal));
        assert_eq!(Fact::from_typed("favourite colour"), None);
    }

    #[test]
    fn test_onboarding_states() {
        assert!(ConversationState::NewUser.is_onboarding());
        assert!(ConversationState::AgeGoal.is_onboarding());
        assert!(!ConversationState::Choosing.is_onboarding());
        assert!(!ConversationState::TypingReply.is_onboarding());
        assert!(!ConversationState::TypingChoice.is_onboarding());
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&ConversationState::TypingReply).unwrap();
        assert_eq!(json, "\"typing_reply\"");
    }
}
