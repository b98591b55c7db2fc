use std::path::Path;

use serde::Deserialize;

/// A single multiple-choice question as it appears in the question file.
#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    question: String,
    options: Vec<String>,
    correct: usize,
}

impl Question {
    pub fn new(question: String, options: Vec<String>, correct: usize) -> Self {
        Self {
            question,
            options,
            correct,
        }
    }

    pub fn text(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn correct_text(&self) -> &str {
        &self.options[self.correct]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QuestionStoreError {
    #[error("failed to read question file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse question file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question file contains no questions")]
    Empty,
    #[error("question #{index}: {reason}")]
    BadRecord { index: usize, reason: String },
}

/// The question bank. Loaded once at startup, read-only afterwards.
#[derive(Debug)]
pub struct QuestionStore {
    questions: Vec<Question>,
}

impl QuestionStore {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Reads and validates the question file. Any problem here is fatal:
    /// the bot must not start without a usable question bank.
    pub fn load(path: &Path) -> Result<Self, QuestionStoreError> {
        let raw = std::fs::read_to_string(path)?;
        let questions: Vec<Question> = serde_json::from_str(&raw)?;

        if questions.is_empty() {
            return Err(QuestionStoreError::Empty);
        }

        for (index, question) in questions.iter().enumerate() {
            if question.options.len() < 2 {
                return Err(QuestionStoreError::BadRecord {
                    index,
                    reason: format!(
                        "expected at least 2 options, got {}",
                        question.options.len()
                    ),
                });
            }
            if question.correct >= question.options.len() {
                return Err(QuestionStoreError::BadRecord {
                    index,
                    reason: format!(
                        "correct index {} out of range for {} options",
                        question.correct,
                        question.options.len()
                    ),
                });
            }
        }

        Ok(Self { questions })
    }

    pub fn get(&self, index: usize) -> &Question {
        &self.questions[index]
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_a_valid_file() {
        let file = write_temp(
            r#"[{"question": "2+2?", "options": ["3", "4", "5"], "correct": 1}]"#,
        );

        let store = QuestionStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).text(), "2+2?");
        assert_eq!(store.get(0).correct_text(), "4");
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = QuestionStore::load(Path::new("does-not-exist.json"));
        assert!(matches!(result, Err(QuestionStoreError::Io(_))));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let file = write_temp("not json at all");
        let result = QuestionStore::load(file.path());
        assert!(matches!(result, Err(QuestionStoreError::Parse(_))));
    }

    #[test]
    fn empty_list_is_an_error() {
        let file = write_temp("[]");
        let result = QuestionStore::load(file.path());
        assert!(matches!(result, Err(QuestionStoreError::Empty)));
    }

    #[test]
    fn correct_index_out_of_range_is_an_error() {
        let file = write_temp(
            r#"[{"question": "2+2?", "options": ["3", "4"], "correct": 2}]"#,
        );
        let result = QuestionStore::load(file.path());
        assert!(matches!(
            result,
            Err(QuestionStoreError::BadRecord { index: 0, .. })
        ));
    }

    #[test]
    fn single_option_is_an_error() {
        let file = write_temp(
            r#"[{"question": "2+2?", "options": ["4"], "correct": 0}]"#,
        );
        let result = QuestionStore::load(file.path());
        assert!(matches!(
            result,
            Err(QuestionStoreError::BadRecord { index: 0, .. })
        ));
    }
}
