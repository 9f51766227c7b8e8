//! Budget Billy - a Telegram bot that collects and recalls personal finance facts.

pub mod commands;
pub mod config;
pub mod dev_log;
pub mod dialogue;
pub mod store;
pub mod telegram;
