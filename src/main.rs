use std::process::ExitCode;
use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;

use budget_billy::commands::Command;
use budget_billy::config::Config;
use budget_billy::dev_log::DevLogLayer;
use budget_billy::dialogue::{Handled, SessionManager};
use budget_billy::store::Store;
use budget_billy::telegram::{TelegramClient, inbound_from_message};

type Sessions = SessionManager<Store, TelegramClient>;

/// The bot's own username, needed to parse `/cmd@botname`.
#[derive(Clone)]
struct BotUsername(String);

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "budget_billy.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().init();
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let bot = Bot::new(&config.telegram_bot_token);

    // Setup logging
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("budget_billy.log"))
    {
        Ok(file) => file,
        Err(e) => {
            tracing_subscriber::fmt().init();
            error!("Failed to open log file in {:?}: {e}", log_dir);
            return ExitCode::FAILURE;
        }
    };
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    let registry = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        );

    if let Some(chat_id) = config.developer_chat_id {
        registry.with(DevLogLayer::new(bot.clone(), chat_id)).init();
    } else {
        registry.init();
    }

    info!("Starting Budget Billy...");
    info!("Loaded config from {config_path} (mode: {:?})", config.mode);

    let store = match Store::open(&config.sessions_path()) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open session store: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Authenticate up front so a bad token stops startup.
    let username = match bot.get_me().await {
        Ok(me) => {
            info!("Bot user ID: {}, username: @{}", me.id, me.username());
            me.username().to_string()
        }
        Err(e) => {
            error!("Failed to authenticate with Telegram: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {e}");
    }

    let sessions: Arc<Sessions> = Arc::new(
        SessionManager::new(store, TelegramClient::new(bot.clone()), config.mode)
            .with_unmatched_reply(config.unmatched_reply.clone()),
    );

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![sessions, BotUsername(username)])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Budget Billy stopped");
    ExitCode::SUCCESS
}

async fn handle_message(msg: Message, sessions: Arc<Sessions>, me: BotUsername) -> ResponseResult<()> {
    let Some(event) = inbound_from_message(&msg, &me.0) else {
        return Ok(());
    };

    let chat_id = msg.chat.id.0;
    match sessions.handle(chat_id, &event).await {
        Ok(Handled::Dropped) => info!("Chat {chat_id}: ignored {event:?}"),
        Ok(_) => {}
        Err(e) => warn!("Chat {chat_id}: failed to handle message: {e}"),
    }

    Ok(())
}
