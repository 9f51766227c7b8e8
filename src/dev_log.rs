//! Tracing layer that forwards warnings and errors to a developer chat.

use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Telegram caps messages at 4096 chars.
const MAX_LOG_CHARS: usize = 4000;

pub struct DevLogLayer {
    tx: mpsc::UnboundedSender<String>,
}

impl DevLogLayer {
    /// Spawns the sender task; must be called inside a tokio runtime.
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                if let Err(e) = bot.send_message(chat_id, clip(&text)).await {
                    // Not traced: a failing send would feed back into this layer.
                    eprintln!("Failed to send log to developer chat: {e}");
                }
            }
        });

        Self { tx }
    }
}

fn clip(text: &str) -> String {
    if text.chars().count() > MAX_LOG_CHARS {
        let truncated: String = text.chars().take(MAX_LOG_CHARS).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

/// Line sent for an event, or `None` for levels below WARN.
fn render(level: Level, target: &str, message: &str) -> Option<String> {
    let prefix = match level {
        Level::ERROR => "❌",
        Level::WARN => "⚠️",
        _ => return None,
    };
    Some(format!("{prefix} [{target}] {message}"))
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else if self.message.is_empty() {
            self.message = format!("{} = {:?}", field.name(), value);
        } else {
            self.message
                .push_str(&format!(", {} = {:?}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for DevLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() > Level::WARN {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if let Some(line) = render(*metadata.level(), metadata.target(), &visitor.message)
            && self.tx.send(line).is_err()
        {
            eprintln!("Log channel closed, message dropped");
        }
    }
}
