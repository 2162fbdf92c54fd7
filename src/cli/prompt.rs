//! Interactive stdin prompts.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - prompts cover the "just run it and answer questions" UX
//!
//! Prompts are generic over the reader/writer so validation loops can be
//! driven from tests.

use std::io::{self, BufRead, Write};

use crate::error::AppError;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask until the answer parses as a number and passes `validate`.
    ///
    /// `parse_hint` is printed for non-numeric answers; the validator's message
    /// is printed for out-of-range ones.
    pub fn ask_number<F>(&mut self, prompt: &str, parse_hint: &str, validate: F) -> Result<f64, AppError>
    where
        F: Fn(f64) -> Result<f64, String>,
    {
        loop {
            let line = self.read_answer(prompt)?;
            let value = match line.trim().parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    self.say(parse_hint)?;
                    continue;
                }
            };
            match validate(value) {
                Ok(v) => return Ok(v),
                Err(msg) => self.say(&msg)?,
            }
        }
    }

    /// `true` only for the exact answer `yes`.
    pub fn ask_yes_no(&mut self, prompt: &str) -> Result<bool, AppError> {
        let line = self.read_answer(prompt)?;
        Ok(line.trim() == "yes")
    }

    pub fn say(&mut self, message: &str) -> Result<(), AppError> {
        writeln!(self.output, "{message}")
            .map_err(|e| AppError::usage(format!("Failed to write prompt: {e}")))
    }

    fn read_answer(&mut self, prompt: &str) -> Result<String, AppError> {
        write!(self.output, "{prompt}")
            .and_then(|_| self.output.flush())
            .map_err(|e| AppError::usage(format!("Failed to write prompt: {e}")))?;

        let mut line = String::new();
        let bytes = self
            .input
            .read_line(&mut line)
            .map_err(|e| AppError::usage(format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::usage("No input received (end of input)."));
        }
        Ok(line)
    }
}
