use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    dptree,
    types::{Message, Update},
    Bot,
};
use tracing::instrument;

use crate::{
    admin,
    commands::{help, start, Command},
    runner, HandlerResult,
};

use teloxide::prelude::Requester;

/// The dispatch tree: bot commands and answer-button callbacks, with a
/// fallback for anything else.
pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(start))
        .branch(case![Command::Help].endpoint(help))
        .branch(case![Command::Usinfo].endpoint(admin::usinfo))
        .branch(case![Command::Broadcast(text)].endpoint(admin::broadcast));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .endpoint(invalid_state);

    let callback_handler = Update::filter_callback_query().endpoint(runner::take_answer);

    dptree::entry()
        .branch(message_handler)
        .branch(callback_handler)
}

#[instrument(level = "info")]
async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    log::info!("unhandled message {:?} in chat {}", msg.text(), msg.chat.id);
    bot.send_message(
        msg.chat.id,
        "Unable to handle the message. Enter /help to see usages.",
    )
    .await?;
    Ok(())
}
