use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::questions::QuestionStore;

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("no questions available")]
    NoQuestions,
    #[error("no active session for user {0}")]
    NoSession(u64),
}

/// Transient quiz progress of one user. Lives only in process memory;
/// a restart drops it and the user begins again with /start.
#[derive(Debug, Default)]
struct Session {
    remaining_order: Vec<usize>,
    current_question: Option<usize>,
    current_options: Vec<String>,
    correct_position: Option<usize>,
}

/// A question as rendered to one user: options already shuffled, with the
/// position of the correct one in the rendered order.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub text: String,
    pub options: Vec<String>,
    pub correct_position: usize,
}

/// The outcome of grading one answer.
#[derive(Debug, Clone)]
pub struct Graded {
    pub is_correct: bool,
    pub question_text: String,
    pub correct_text: String,
}

/// The quiz state machine. Owns the per-user session map and hands out
/// questions in shuffled, non-repeating cycles.
pub struct QuizEngine {
    questions: Arc<QuestionStore>,
    sessions: Mutex<HashMap<u64, Session>>,
}

impl QuizEngine {
    pub fn new(questions: Arc<QuestionStore>) -> Self {
        Self {
            questions,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Discards any previous session of the user and deals a fresh shuffle
    /// cycle over the whole question bank.
    pub fn start_session(&self, user_id: u64) {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(
            user_id,
            Session {
                remaining_order: self.shuffled_order(),
                ..Default::default()
            },
        );
    }

    /// Picks the next question for the user. Within one cycle every question
    /// index is served exactly once; an exhausted cycle is refilled with a
    /// fresh independent shuffle, so repeats only happen across cycles.
    pub fn next_question(&self, user_id: u64) -> Result<Prompt, QuizError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(&user_id)
            .ok_or(QuizError::NoSession(user_id))?;

        if session.remaining_order.is_empty() {
            session.remaining_order = self.shuffled_order();
        }

        let question_index = match session.remaining_order.pop() {
            Some(index) => index,
            None => return Err(QuizError::NoQuestions),
        };

        let question = self.questions.get(question_index);
        let (options, correct_position) =
            shuffle_options(question.options(), question.correct());

        session.current_question = Some(question_index);
        session.current_options = options.clone();
        session.correct_position = Some(correct_position);

        Ok(Prompt {
            text: question.text().to_string(),
            options,
            correct_position,
        })
    }

    /// Grades the chosen position against the pending question. Positional
    /// comparison only: two options may carry identical text. Out-of-range
    /// positions come from stale or foreign keyboards and are reported the
    /// same way as a missing session. Grading never mutates the session.
    pub fn grade_answer(&self, user_id: u64, chosen: usize) -> Result<Graded, QuizError> {
        let sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get(&user_id)
            .ok_or(QuizError::NoSession(user_id))?;

        let question_index = session
            .current_question
            .ok_or(QuizError::NoSession(user_id))?;
        let correct_position = session
            .correct_position
            .ok_or(QuizError::NoSession(user_id))?;

        if chosen >= session.current_options.len() {
            return Err(QuizError::NoSession(user_id));
        }

        let question = self.questions.get(question_index);
        Ok(Graded {
            is_correct: chosen == correct_position,
            question_text: question.text().to_string(),
            correct_text: question.correct_text().to_string(),
        })
    }

    fn shuffled_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.questions.len()).collect();
        order.shuffle(&mut thread_rng());
        order
    }
}

/// Shuffles option texts for display. Produces a permutation of the
/// `(original_index, text)` pairs and derives the new position of the
/// designated correct option by search, so the caller can grade by
/// position no matter where the shuffle put the right answer.
pub fn shuffle_options(options: &[String], correct: usize) -> (Vec<String>, usize) {
    let mut indexed: Vec<(usize, &String)> = options.iter().enumerate().collect();
    indexed.shuffle(&mut thread_rng());

    let correct_position = indexed
        .iter()
        .position(|(original, _)| *original == correct)
        .expect("correct index must point into options");

    let rendered = indexed.into_iter().map(|(_, text)| text.clone()).collect();
    (rendered, correct_position)
}
