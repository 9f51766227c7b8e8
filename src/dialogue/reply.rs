//! Outgoing replies.

use super::state::Fact;

/// Label that ends the conversation from the menu.
pub const DONE: &str = "Done";

/// Placeholder shown in the input field while the menu keyboard is up.
pub const MENU_PLACEHOLDER: &str = "What do you want to tell me?";

/// What to do with the reply keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Menu {
    /// Leave whatever keyboard the client shows.
    Unchanged,
    /// Show a keyboard with these rows of button labels.
    Show(Vec<Vec<String>>),
    /// Hide the keyboard.
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub menu: Menu,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), menu: Menu::Unchanged }
    }

    pub fn with_menu(text: impl Into<String>) -> Self {
        Self { text: text.into(), menu: fact_menu() }
    }

    pub fn removing_menu(text: impl Into<String>) -> Self {
        Self { text: text.into(), menu: Menu::Remove }
    }
}

/// The fact labels on one row, "Done" on its own row below.
pub fn fact_menu() -> Menu {
    Menu::Show(vec![
        Fact::ALL.iter().map(|f| f.label().to_string()).collect(),
        vec![DONE.to_string()],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_menu_layout() {
        let Menu::Show(rows) = fact_menu() else {
            panic!("expected a keyboard");
        };
        assert_eq!(
            rows,
            vec![
                vec!["Age", "Current Savings", "Monthly Budget", "Savings Goal", "Age Goal"],
                vec!["Done"],
            ]
        );
    }
}
