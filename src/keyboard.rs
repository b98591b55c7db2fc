use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// One button per option. The callback data carries the option's position in
/// the rendered order, not its text, so identical option texts stay
/// distinguishable when grading.
pub(crate) fn options_keyboard(options: &[String]) -> InlineKeyboardMarkup {
    let keyboard: Vec<Vec<InlineKeyboardButton>> = options
        .iter()
        .enumerate()
        .map(|(position, text)| {
            vec![InlineKeyboardButton::callback(
                text.clone(),
                position.to_string(),
            )]
        })
        .collect();

    InlineKeyboardMarkup::new(keyboard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_carry_positions_as_callback_data() {
        let markup = options_keyboard(&["same".to_string(), "same".to_string()]);

        assert_eq!(markup.inline_keyboard.len(), 2);
        for (position, row) in markup.inline_keyboard.iter().enumerate() {
            assert_eq!(row.len(), 1);
            assert_eq!(row[0].text, "same");
            match &row[0].kind {
                teloxide::types::InlineKeyboardButtonKind::CallbackData(data) => {
                    assert_eq!(data, &position.to_string());
                }
                other => panic!("unexpected button kind: {other:?}"),
            }
        }
    }
}
