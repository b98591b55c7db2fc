use std::sync::Arc;

use chrono::Local;
use teloxide::{
    prelude::Requester, types::Message, utils::command::BotCommands, Bot,
};

use crate::{
    engine::QuizEngine,
    registry::{UserRecord, UserRegistry},
    runner, HandlerResult,
};

#[derive(Debug, Clone, BotCommands)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "start the quiz.")]
    Start,
    #[command(description = "display help.")]
    Help,
    #[command(description = "show registered users (admin only).", hide)]
    Usinfo,
    #[command(description = "message every registered user (admin only).", hide)]
    Broadcast(String),
}

pub(crate) async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// Registers the user on first contact, deals a fresh shuffle cycle and
/// sends the first question. A failed registry flush is logged but never
/// interrupts the quiz flow.
pub(crate) async fn start(
    bot: Bot,
    msg: Message,
    engine: Arc<QuizEngine>,
    registry: Arc<UserRegistry>,
) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let record = UserRecord {
        id: user.id.0,
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()),
        joined: Local::now().format("%Y-%m-%d %H:%M").to_string(),
    };

    match registry.add_if_absent(record) {
        Ok(true) => log::info!("registered new user {}", user.id),
        Ok(false) => {}
        Err(e) => log::error!("failed to persist user {}: {e}", user.id),
    }

    engine.start_session(user.id.0);
    log::info!("{} started a quiz session", user.id);

    runner::send_question(&bot, &engine, user.id.0, msg.chat.id).await
}
