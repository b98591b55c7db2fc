use std::sync::Arc;
use std::time::Duration;

use teloxide::{
    payloads::{EditMessageTextSetters, SendMessageSetters},
    prelude::Requester,
    types::{CallbackQuery, ChatId, ParseMode},
    Bot,
};
use tracing::instrument;

use crate::{
    engine::{QuizEngine, QuizError},
    keyboard::options_keyboard,
    HandlerResult,
};

/// Pause between showing the graded result and sending the next question.
/// Pacing only; suspends just this user's handler.
pub(crate) const RESULT_DELAY: Duration = Duration::from_millis(2500);

/// Sends the next question of the user's session as a new message with an
/// inline keyboard. An empty question bank degrades to a friendly notice.
pub(crate) async fn send_question(
    bot: &Bot,
    engine: &QuizEngine,
    user_id: u64,
    chat_id: ChatId,
) -> HandlerResult {
    match engine.next_question(user_id) {
        Ok(prompt) => {
            bot.send_message(chat_id, prompt.text)
                .reply_markup(options_keyboard(&prompt.options))
                .await?;
        }
        Err(QuizError::NoQuestions) => {
            bot.send_message(chat_id, "No questions are available right now. Try again later.")
                .await?;
        }
        // Nothing to serve without a session; the user restarts with /start.
        Err(QuizError::NoSession(_)) => {}
    }

    Ok(())
}

/// Handles a pressed answer button: acknowledge the callback, grade the
/// chosen position, edit the question message into the result (which also
/// drops the keyboard), wait out the pacing delay and send the next
/// question. Stale or foreign callbacks end after the acknowledge.
#[instrument(level = "info", skip(bot, engine))]
pub(crate) async fn take_answer(
    bot: Bot,
    q: CallbackQuery,
    engine: Arc<QuizEngine>,
) -> HandlerResult {
    // Telegram shows a spinner on the button until the callback query is
    // answered, so this comes first on every path.
    bot.answer_callback_query(&q.id).await?;

    let Some(chosen) = q.data.as_deref().and_then(|data| data.parse::<usize>().ok()) else {
        return Ok(());
    };

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    let user_id = q.from.id.0;
    let graded = match engine.grade_answer(user_id, chosen) {
        Ok(graded) => graded,
        Err(QuizError::NoSession(_)) | Err(QuizError::NoQuestions) => return Ok(()),
    };

    log::info!(
        "{} answered '{}' at position {}: {}",
        q.from.id,
        graded.question_text,
        chosen,
        if graded.is_correct { "correct" } else { "wrong" }
    );

    let verdict = if graded.is_correct {
        "✔ <b>Correct!</b>"
    } else {
        "❌ <b>Wrong</b>"
    };
    let result_text = format!(
        "{}\n\n{}\n\nRight answer:\n{}",
        graded.question_text, verdict, graded.correct_text
    );

    bot.edit_message_text(chat_id, message.id(), result_text)
        .parse_mode(ParseMode::Html)
        .await?;

    tokio::time::sleep(RESULT_DELAY).await;

    send_question(&bot, &engine, user_id, chat_id).await
}
