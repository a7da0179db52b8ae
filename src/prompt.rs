//! Confirmation capability handed to every interactive step.
use crate::configs::error::{ConfigError, Result};
use inquire::{Confirm, CustomType};

/// Answers the yes/no and numeric questions the flows ask.
pub trait Prompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;

    /// Ask for a non-negative number. Range checking is the caller's job.
    fn number(&mut self, question: &str) -> Result<usize>;
}

/// Prompts on the terminal.
#[derive(Default)]
pub struct Interactive;

impl Prompter for Interactive {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        Confirm::new(question)
            .with_default(default)
            .prompt()
            .map_err(|err| ConfigError::Prompt(err.to_string()))
    }

    fn number(&mut self, question: &str) -> Result<usize> {
        CustomType::<usize>::new(question)
            .with_error_message("Please type a number")
            .prompt()
            .map_err(|err| ConfigError::Prompt(err.to_string()))
    }
}

#[cfg(test)]
pub use self::scripted::{Answer, Scripted};

#[cfg(test)]
mod scripted {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Clone, Debug)]
    pub enum Answer {
        Yes,
        No,
        Number(usize),
    }

    /// Replays pre-programmed answers in order and records every question asked.
    #[derive(Default)]
    pub struct Scripted {
        answers: VecDeque<Answer>,
        pub asked: Vec<String>,
    }

    impl Scripted {
        pub fn new(answers: Vec<Answer>) -> Scripted {
            Scripted {
                answers: answers.into(),
                asked: Vec::new(),
            }
        }

        pub fn exhausted(&self) -> bool {
            self.answers.is_empty()
        }

        fn next(&mut self, question: &str) -> Result<Answer> {
            self.asked.push(question.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| ConfigError::Prompt(format!("unexpected question: {}", question)))
        }
    }

    impl Prompter for Scripted {
        fn confirm(&mut self, question: &str, _default: bool) -> Result<bool> {
            match self.next(question)? {
                Answer::Yes => Ok(true),
                Answer::No => Ok(false),
                other => Err(ConfigError::Prompt(format!("expected y/n, scripted {:?}", other))),
            }
        }

        fn number(&mut self, question: &str) -> Result<usize> {
            match self.next(question)? {
                Answer::Number(n) => Ok(n),
                other => Err(ConfigError::Prompt(format!("expected number, scripted {:?}", other))),
            }
        }
    }
}
