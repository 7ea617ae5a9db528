//! Set input collection.
//!
//! The engine never talks to a terminal directly. It asks an [`InputSource`]
//! for lines of text and parses them here, re-prompting on anything that is
//! not a number. A closed or cancelled source surfaces as
//! [`Error::InputAborted`].

use crate::{Error, Result};
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// Line-oriented source of operator input
pub trait InputSource {
    /// Show `prompt` and return one line of answer (without the trailing newline)
    fn ask(&mut self, prompt: &str) -> Result<String>;

    /// Show an informational message that needs no answer
    fn notify(&mut self, _message: &str) -> Result<()> {
        Ok(())
    }
}

/// Input source over any reader/writer pair (stdin/stdout in the CLI)
pub struct LineInput<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LineInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> InputSource for LineInput<R, W> {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.writer, "{} ", prompt)?;
        self.writer.flush()?;

        let mut raw = Vec::new();
        if self.reader.read_until(b'\n', &mut raw)? == 0 {
            // End of input means the operator is gone
            writeln!(self.writer)?;
            return Err(Error::InputAborted);
        }
        // Undecodable bytes become U+FFFD, which never parses, so the caller re-prompts
        let line = String::from_utf8_lossy(&raw);
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "{}", message)?;
        Ok(())
    }
}

/// Pre-recorded answers; runs out with `InputAborted`
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
    prompts: Vec<String>,
    notices: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Every prompt shown so far, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl InputSource for ScriptedInput {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or(Error::InputAborted)
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        self.notices.push(message.to_string());
        Ok(())
    }
}

/// How many times a single value is asked for before giving up
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    #[default]
    Unbounded,
    Limited(u32),
}

impl RetryPolicy {
    pub fn from_max_attempts(max_attempts: Option<u32>) -> Self {
        match max_attempts {
            Some(n) => RetryPolicy::Limited(n.max(1)),
            None => RetryPolicy::Unbounded,
        }
    }

    fn allows(&self, attempt: u32) -> bool {
        match self {
            RetryPolicy::Unbounded => true,
            RetryPolicy::Limited(max) => attempt < *max,
        }
    }
}

/// Parses numbers and choices out of an [`InputSource`]
pub struct SetCollector<'a> {
    source: &'a mut dyn InputSource,
    policy: RetryPolicy,
}

impl<'a> SetCollector<'a> {
    pub fn new(source: &'a mut dyn InputSource, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    /// Rep count for one set
    pub fn reps(&mut self, exercise: &str, set: u32) -> Result<i32> {
        let prompt = format!("Input details for {}:\nSet {} - Enter reps:", exercise, set);
        self.parse_until_valid(&prompt, |reps: &i32| *reps >= 0)
    }

    /// Weight for one set
    pub fn weight(&mut self, exercise: &str, set: u32) -> Result<f64> {
        let prompt = format!("Input details for {}:\nSet {} - Enter weight:", exercise, set);
        self.parse_until_valid(&prompt, |weight: &f64| weight.is_finite())
    }

    /// Pick one of `options`, by 1-based number or exact name
    pub fn choose(&mut self, title: &str, options: &[&str]) -> Result<usize> {
        let mut prompt = String::from(title);
        for (i, option) in options.iter().enumerate() {
            prompt.push_str(&format!("\n  {}. {}", i + 1, option));
        }
        prompt.push_str("\n>");

        let mut attempt = 0;
        loop {
            let answer = self.source.ask(&prompt)?;
            let answer = answer.trim();
            let picked = answer
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=options.len()).contains(n))
                .map(|n| n - 1)
                .or_else(|| options.iter().position(|o| o.eq_ignore_ascii_case(answer)));

            if let Some(index) = picked {
                return Ok(index);
            }

            attempt += 1;
            tracing::debug!("Invalid choice {:?} (attempt {})", answer, attempt);
            if !self.policy.allows(attempt) {
                return Err(Error::MalformedInput(format!(
                    "'{}' is not one of the options",
                    answer
                )));
            }
        }
    }

    pub fn notify(&mut self, message: &str) -> Result<()> {
        self.source.notify(message)
    }

    fn parse_until_valid<T, F>(&mut self, prompt: &str, accept: F) -> Result<T>
    where
        T: FromStr,
        F: Fn(&T) -> bool,
    {
        let mut attempt = 0;
        loop {
            let answer = self.source.ask(prompt)?;
            // Accept a decimal comma for weights typed on a Nordic keyboard
            let normalized = answer.trim().replace(',', ".");
            match normalized.parse::<T>().ok().filter(|v| accept(v)) {
                Some(value) => return Ok(value),
                None => {
                    attempt += 1;
                    tracing::debug!("Could not parse {:?} (attempt {})", answer, attempt);
                    if !self.policy.allows(attempt) {
                        return Err(Error::MalformedInput(format!(
                            "'{}' is not a number",
                            answer.trim()
                        )));
                    }
                }
            }
        }
    }
}
