//! The transition table: (state, message) -> (profile change, reply, next state).

use tracing::{debug, info};

use super::reply::{DONE, Reply};
use super::state::{ConversationState, Fact};
use super::Session;
use crate::commands::help_text;

/// An incoming event, already told apart from commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Start { display_name: String },
    ShowData,
    Help,
    /// Anything that is not a known command. Unknown `/commands` land here too.
    Text(String),
}

const ALL_SET: &str = "Great! You're all set.\n\
I will keep track of your expenses and savings for you. \
You can always check your current status by typing /show_data.";

/// Onboarding steps: the state, the fact it stores, the state after it and the next prompt.
const ONBOARDING: [(ConversationState, Fact, ConversationState, &str); 5] = [
    (ConversationState::NewUser, Fact::Age, ConversationState::Savings, "Enter your savings."),
    (ConversationState::Savings, Fact::Savings, ConversationState::Budget, "Enter your monthly budget."),
    (ConversationState::Budget, Fact::Budget, ConversationState::SavingsGoal, "Enter your savings goal."),
    (
        ConversationState::SavingsGoal,
        Fact::SavingsGoal,
        ConversationState::AgeGoal,
        "By what age do you want to achieve this goal?",
    ),
    (ConversationState::AgeGoal, Fact::AgeGoal, ConversationState::TypingChoice, ALL_SET),
];

/// A fact the user picked, as stored and as spoken back to them.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Choice {
    key: String,
    spoken: String,
}

impl Choice {
    fn known(fact: Fact) -> Self {
        Self { key: fact.key().to_string(), spoken: fact.label().to_lowercase() }
    }

    fn typed(text: &str) -> Self {
        match Fact::from_typed(text) {
            Some(fact) => Self::known(fact),
            None => {
                let name = text.trim().to_lowercase();
                Self { key: name.clone(), spoken: name }
            }
        }
    }
}

/// Handler a text message is routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Onboarding { fact: Fact, next: ConversationState, prompt: &'static str },
    Choose(Choice),
    StoreAnswer,
    Done,
}

fn is_command(text: &str) -> bool {
    text.starts_with('/')
}

/// Pick the handler for `text` in `state`. "Done" is checked before any
/// state pattern, except during onboarding where it is an ordinary answer.
fn route(state: ConversationState, text: &str) -> Option<Route> {
    if is_command(text) {
        return None;
    }
    if !state.is_onboarding() && text == DONE {
        return Some(Route::Done);
    }
    match state {
        ConversationState::Choosing => Fact::from_label(text).map(|f| Route::Choose(Choice::known(f))),
        ConversationState::TypingChoice => Some(Route::Choose(Choice::typed(text))),
        ConversationState::TypingReply => Some(Route::StoreAnswer),
        onboarding => ONBOARDING
            .iter()
            .find(|(s, ..)| *s == onboarding)
            .map(|&(_, fact, next, prompt)| Route::Onboarding { fact, next, prompt }),
    }
}

fn greeting(display_name: &str) -> String {
    format!(
        "Hi {display_name}! My name is Budget Billy.\n\
         I'm here to help you track your expenses and savings.\n\
         I can also help you with budgeting and financial planning.\n"
    )
}

/// Apply one event to a session. Returns `None` when nothing matches, in
/// which case the session is left untouched.
pub fn step(session: &mut Session, event: &Inbound) -> Option<Reply> {
    match event {
        Inbound::ShowData => Some(Reply::text(format!(
            "This is what you already told me: {}",
            session.profile.summary()
        ))),
        Inbound::Help => Some(Reply::text(help_text())),
        Inbound::Start { display_name } => start(session, display_name),
        Inbound::Text(text) => {
            let state = session.state?;
            let route = route(state, text)?;
            debug!("{state:?} + {text:?} -> {route:?}");
            apply(session, route, text)
        }
    }
}

fn start(session: &mut Session, display_name: &str) -> Option<Reply> {
    if session.state.is_some() {
        // Already inside a conversation; /start only re-enters an ended one.
        return None;
    }
    info!("User {display_name} started the conversation.");
    let mut text = greeting(display_name);
    if session.profile.is_empty() {
        text.push_str("\nTo start, why don't you tell me more about yourself? What is your age?");
        session.state = Some(ConversationState::NewUser);
        Some(Reply::text(text))
    } else {
        text.push_str("\nSelect one of the options below to view your current status.");
        session.state = Some(ConversationState::Choosing);
        Some(Reply::with_menu(text))
    }
}

fn apply(session: &mut Session, route: Route, text: &str) -> Option<Reply> {
    let profile = &mut session.profile;
    match route {
        Route::Onboarding { fact, next, prompt } => {
            info!("Onboarding {}: {text}", fact.key());
            profile.set(fact.key(), text);
            session.state = Some(next);
            if next == ConversationState::TypingChoice {
                Some(Reply::with_menu(prompt))
            } else {
                Some(Reply::text(prompt))
            }
        }
        Route::Choose(choice) => {
            info!("Chose: {}", choice.key);
            let reply = match profile.get(&choice.key) {
                Some(value) => format!("You already told me your {}. It is {value}.", choice.spoken),
                None => format!("Enter your {}.", choice.spoken),
            };
            profile.set_choice(choice.key);
            session.state = Some(ConversationState::TypingReply);
            Some(Reply::text(reply))
        }
        Route::StoreAnswer => {
            let key = profile.take_choice()?;
            info!("Stored {key}: {text}");
            profile.set(key, text.to_lowercase());
            session.state = Some(ConversationState::Choosing);
            Some(Reply::with_menu(format!(
                "Here is what you told me so far: {}.",
                profile.summary()
            )))
        }
        Route::Done => Some(done(session)),
    }
}

fn done(session: &mut Session) -> Reply {
    session.profile.take_choice();
    session.state = None;
    Reply::removing_menu(format!(
        "I learned these facts about you: {}\nUntil next time!",
        session.profile.summary()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_done_before_state_patterns() {
        assert_eq!(route(ConversationState::Choosing, "Done"), Some(Route::Done));
        assert_eq!(route(ConversationState::TypingReply, "Done"), Some(Route::Done));
        assert_eq!(route(ConversationState::TypingChoice, "Done"), Some(Route::Done));
    }

    #[test]
    fn test_route_done_is_data_during_onboarding() {
        assert!(matches!(
            route(ConversationState::Budget, "Done"),
            Some(Route::Onboarding { fact: Fact::Budget, .. })
        ));
    }

    #[test]
    fn test_route_done_is_case_sensitive() {
        assert_eq!(route(ConversationState::Choosing, "done"), None);
        assert!(matches!(route(ConversationState::TypingReply, "done"), Some(Route::StoreAnswer)));
    }

    #[test]
    fn test_route_ignores_commands() {
        assert_eq!(route(ConversationState::NewUser, "/expense"), None);
        assert_eq!(route(ConversationState::TypingChoice, "/start"), None);
        assert_eq!(route(ConversationState::TypingReply, "/anything"), None);
    }

    #[test]
    fn test_choice_typed_custom_fact() {
        assert_eq!(
            Choice::typed("Rent Amount"),
            Choice { key: "rent amount".to_string(), spoken: "rent amount".to_string() }
        );
        assert_eq!(Choice::typed("current savings"), Choice::known(Fact::Savings));
    }

    #[test]
    fn test_onboarding_table_is_a_chain() {
        for pair in ONBOARDING.windows(2) {
            assert_eq!(pair[0].2, pair[1].0);
        }
        assert_eq!(ONBOARDING[0].0, ConversationState::NewUser);
        assert_eq!(ONBOARDING[4].2, ConversationState::TypingChoice);
    }
}
