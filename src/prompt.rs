use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// A normalized answer to a prompt.
///
/// Input is trimmed and lowercased; `y` and `n` are recognized, anything else
/// (including an empty line or end of input) is kept verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Other(String),
}

impl Answer {
    pub fn parse(input: &str) -> Self {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            "y" => Answer::Yes,
            "n" => Answer::No,
            _ => Answer::Other(normalized),
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Answer::Yes)
    }

    /// The normalized text of the answer.
    pub fn as_str(&self) -> &str {
        match self {
            Answer::Yes => "y",
            Answer::No => "n",
            Answer::Other(text) => text,
        }
    }
}

/// Source of answers for every question the installer asks.
pub trait Prompter {
    fn ask(&mut self, question: &str) -> Result<Answer>;
}

/// Reads one line per question from `input`, echoing the question to `output`.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, question: &str) -> Result<Answer> {
        writeln!(self.output, "{question}").context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .context("Failed to read answer from standard input")?;
        Ok(Answer::parse(&line))
    }
}

/// Replays a fixed list of answers and records every question asked.
///
/// Once the script runs out, further questions are answered with an empty
/// `Other`, which is what a closed standard input produces.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> Result<Answer> {
        self.asked.push(question.to_string());
        let answer = self.answers.pop_front().unwrap_or_default();
        Ok(Answer::parse(&answer))
    }
}
