//! Interactive confirmation.
use std::io::{BufRead as _, Write as _};

use anyhow::{Context as _, Result};

/// Asks the user a yes/no question.
#[cfg_attr(test, mockall::automock)]
pub trait Prompt: Send + Sync {
    /// Return `true` if the user agreed to `question`.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be written to or read from.
    fn confirm(&self, question: &str) -> Result<bool>;
}

/// Prompt on stderr, answer read from stdin.
///
/// Only `y` and `yes` (any case) count as agreement; an empty line or end
/// of input is a refusal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str) -> Result<bool> {
        let mut stderr = std::io::stderr().lock();
        write!(stderr, "{question} [y/N] ").context("write prompt")?;
        stderr.flush().context("flush prompt")?;
        let mut answer = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut answer)
            .context("read answer")?;
        Ok(is_yes(&answer))
    }
}

/// Answers every question with yes (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Prompt for AutoConfirm {
    fn confirm(&self, question: &str) -> Result<bool> {
        tracing::debug!("auto-confirmed: {question}");
        Ok(true)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
