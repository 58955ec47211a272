//! Interactive quiz flow. Scoring happens entirely on the client by comparing
//! the chosen option's `isCorrect` flag.

use crate::analyze::{Quiz, QuizQuestion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    /// Rationale of the chosen option.
    pub rationale: String,
    /// Index of the right option, so the UI can highlight it.
    pub correct_option: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz: Quiz,
    current: usize,
    answers: Vec<Option<usize>>,
}

impl QuizSession {
    pub fn new(quiz: Quiz) -> Self {
        let answers = vec![None; quiz.questions.len()];
        Self {
            quiz,
            current: 0,
            answers,
        }
    }

    pub fn title(&self) -> &str {
        &self.quiz.title
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.quiz.questions.get(self.current)
    }

    pub fn hint(&self) -> Option<&str> {
        self.current_question()
            .map(|q| q.hint.as_str())
            .filter(|h| !h.trim().is_empty())
    }

    /// Records the answer to the current question. Each question can be
    /// answered once; later calls and out-of-range options return `None`.
    pub fn answer(&mut self, option: usize) -> Option<Feedback> {
        let question = self.quiz.questions.get(self.current)?;
        let chosen = question.answer_options.get(option)?;
        let slot = self.answers.get_mut(self.current)?;
        if slot.is_some() {
            return None;
        }
        *slot = Some(option);

        let correct_option = question
            .answer_options
            .iter()
            .position(|o| o.is_correct)
            .unwrap_or(option);
        Some(Feedback {
            correct: chosen.is_correct,
            rationale: chosen.rationale.clone(),
            correct_option,
        })
    }

    /// Moves to the next question once the current one is answered.
    pub fn next(&mut self) -> bool {
        let answered = self.answers.get(self.current).is_some_and(Option::is_some);
        if answered && self.current + 1 < self.quiz.questions.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// `(question number, total)`, 1-based for display.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.quiz.questions.len();
        ((self.current + 1).min(total), total)
    }

    pub fn is_finished(&self) -> bool {
        self.answers.iter().all(Option::is_some)
    }

    pub fn score(&self) -> Score {
        let correct = self
            .quiz
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| {
                a.and_then(|i| q.answer_options.get(i))
                    .is_some_and(|o| o.is_correct)
            })
            .count();
        Score {
            correct,
            total: self.quiz.questions.len(),
        }
    }
}
