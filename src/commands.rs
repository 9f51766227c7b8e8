//! Bot commands recognised as commands rather than data.

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "start, or pick up where we left off.")]
    Start,
    #[command(description = "show everything you told me so far.")]
    ShowData,
    #[command(description = "display this text.")]
    Help,
}

/// Help text listing every command.
pub fn help_text() -> String {
    Command::descriptions().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "billy_bot").ok(), Some(Command::Start));
        assert_eq!(Command::parse("/show_data", "billy_bot").ok(), Some(Command::ShowData));
        assert_eq!(Command::parse("/help", "billy_bot").ok(), Some(Command::Help));
    }

    #[test]
    fn test_parse_addressed_command() {
        assert_eq!(
            Command::parse("/show_data@billy_bot", "billy_bot").ok(),
            Some(Command::ShowData)
        );
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert!(Command::parse("Current Savings", "billy_bot").is_err());
        assert!(Command::parse("/expense", "billy_bot").is_err());
    }

    #[test]
    fn test_help_lists_commands() {
        let help = help_text();
        assert!(help.contains("/start"));
        assert!(help.contains("/show_data"));
    }
}
