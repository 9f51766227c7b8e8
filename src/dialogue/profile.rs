//! Per-conversation fact store.

use std::collections::BTreeMap;

use super::state::Fact;

/// Facts a user told the bot, plus the fact their next message will fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    facts: BTreeMap<String, String>,
    /// Pending choice. Never rendered and not counted as a fact.
    choice: Option<String>,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(facts: BTreeMap<String, String>, choice: Option<String>) -> Self {
        Self { facts, choice }
    }

    pub fn into_parts(self) -> (BTreeMap<String, String>, Option<String>) {
        (self.facts, self.choice)
    }

    /// True when no fact has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.facts.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.facts.insert(name.into(), value.into());
    }

    pub fn choice(&self) -> Option<&str> {
        self.choice.as_deref()
    }

    pub fn set_choice(&mut self, name: impl Into<String>) {
        self.choice = Some(name.into());
    }

    pub fn take_choice(&mut self) -> Option<String> {
        self.choice.take()
    }

    /// Facts in display order: the onboarding facts first, then anything
    /// the user added by name, alphabetically.
    pub fn facts(&self) -> Vec<(&str, &str)> {
        let mut facts: Vec<(&str, &str)> = self
            .facts
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        facts.sort_by_key(|(k, _)| (Fact::position(k).unwrap_or(Fact::ALL.len()), *k));
        facts
    }

    /// One-line rendering used in every summary reply.
    pub fn summary(&self) -> String {
        if self.facts.is_empty() {
            return "nothing yet".to_string();
        }
        self.facts()
            .into_iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_does_not_count_as_fact() {
        let mut profile = UserProfile::new();
        profile.set_choice("age");
        assert!(profile.is_empty());
        assert_eq!(profile.summary(), "nothing yet");
    }

    #[test]
    fn test_summary_orders_known_facts_first() {
        let mut profile = UserProfile::new();
        profile.set("pet", "cat");
        profile.set("budget", "900");
        profile.set("age", "34");
        profile.set("car", "none");
        assert_eq!(profile.summary(), "age: 34, budget: 900, car: none, pet: cat");
    }

    #[test]
    fn test_set_overwrites() {
        let mut profile = UserProfile::new();
        profile.set("savings", "100");
        profile.set("savings", "250");
        assert_eq!(profile.get("savings"), Some("250"));
        assert_eq!(profile.facts().len(), 1);
    }

    #[test]
    fn test_take_choice_clears() {
        let mut profile = UserProfile::new();
        profile.set_choice("budget");
        assert_eq!(profile.take_choice().as_deref(), Some("budget"));
        assert_eq!(profile.choice(), None);
    }
}
