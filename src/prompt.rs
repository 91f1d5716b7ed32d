use std::io::{self, BufRead, StdinLock, Stdout, Write};

use anyhow::{bail, Context, Result};

/// Line-oriented questions on a terminal (or anything readable/writable).
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Trimmed answer. Closed input is an error so loops cannot spin forever.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read answer")?;
        if read == 0 {
            bail!("Input closed while waiting for: {}", question.trim());
        }
        Ok(line.trim().to_string())
    }

    /// Empty answer keeps `current`.
    pub fn ask_or(&mut self, question: &str, current: &str) -> Result<String> {
        let question = if current.is_empty() {
            format!("{question}: ")
        } else {
            format!("{question} [{current}]: ")
        };
        let answer = self.ask(&question)?;
        Ok(if answer.is_empty() {
            current.to_string()
        } else {
            answer
        })
    }

    /// Only `y`/`yes` count as yes.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{question} (y/n): "))?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    /// Digits give a limit, anything else means "no limit".
    pub fn ask_limit(&mut self, question: &str) -> Result<Option<usize>> {
        let answer = self.ask(question)?;
        if answer.is_empty() || !answer.chars().all(|c| c.is_ascii_digit()) {
            return Ok(None);
        }
        Ok(answer.parse().ok())
    }

    pub fn say(&mut self, line: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "{}", line.as_ref())?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
