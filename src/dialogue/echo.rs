//! Echo mode: greet on `/start`, mirror every other message back.

use super::controller::Inbound;
use super::reply::Reply;

pub fn respond(event: &Inbound) -> Option<Reply> {
    match event {
        Inbound::Start { display_name } => Some(Reply::text(format!(
            "Hi {display_name}! I'm an echo bot. Send me anything and I'll send it back."
        ))),
        Inbound::Text(text) if !text.starts_with('/') => Some(Reply::text(text.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greets_on_start() {
        let reply = respond(&Inbound::Start { display_name: "Ana".to_string() }).unwrap();
        assert!(reply.text.starts_with("Hi Ana!"));
    }

    #[test]
    fn test_echoes_text() {
        let reply = respond(&Inbound::Text("hello there".to_string())).unwrap();
        assert_eq!(reply, Reply::text("hello there"));
    }

    #[test]
    fn test_ignores_commands() {
        assert!(respond(&Inbound::ShowData).is_none());
        assert!(respond(&Inbound::Text("/unknown".to_string())).is_none());
    }
}
