use crate::estimate::Direction;
use crate::units::SizeUnit;
use anyhow::Result;
use crossterm::tty::IsTty;
use log::{debug, warn};
use std::collections::VecDeque;
use std::io::{self, BufRead, Read, StdinLock, Write};

/// What the user asked to estimate from the prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptedEstimate {
    pub direction: Direction,
    pub size: f64,
    pub unit: SizeUnit,
}

/// Asks the estimate questions, either from piped answers or a terminal.
///
/// Piped answers are consumed in order without echoing the questions.
pub struct Prompter<R, W> {
    preanswers: Option<VecDeque<String>>,
    input: R,
    out: W,
}

impl Prompter<StdinLock<'static>, io::Stdout> {
    /// Read stdin up front when it is not a terminal.
    pub fn from_stdin() -> Result<Self> {
        let stdin = io::stdin();
        let mut preanswers = None;
        if !stdin.is_tty() {
            let mut data = String::new();
            stdin.lock().read_to_string(&mut data)?;
            if !data.is_empty() {
                debug!("using {} piped answer line(s)", data.lines().count());
                preanswers = Some(data.lines().map(str::to_string).collect());
            }
        }
        Ok(Prompter::new(preanswers, stdin.lock(), io::stdout()))
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(preanswers: Option<Vec<String>>, input: R, out: W) -> Self {
        Self {
            preanswers: preanswers.map(VecDeque::from),
            input,
            out,
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Next trimmed answer, or `None` once input is exhausted.
    fn answer(&mut self, question: &str) -> Result<Option<String>> {
        if let Some(answers) = self.preanswers.as_mut() {
            return Ok(answers.pop_front().map(|a| a.trim().to_string()));
        }

        write!(self.out, "{question}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Like [`Self::answer`] but an absent or blank reply becomes `default`.
    fn answer_or(&mut self, question: &str, default: &str) -> Result<String> {
        Ok(self
            .answer(question)?
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// Walk the estimate questions. `None` when the user declines or input runs dry.
    pub fn ask_estimate(&mut self) -> Result<Option<PromptedEstimate>> {
        let want = self
            .answer_or("\nWould you like to estimate a transfer time now? [y/N]: ", "n")?
            .to_ascii_lowercase();
        if want != "y" && want != "yes" {
            return Ok(None);
        }

        let direction = loop {
            let reply = self.answer_or("Direction (download/upload/both) [download]: ", "download")?;
            match Direction::parse(&reply) {
                Some(direction) => break direction,
                None => writeln!(self.out, "Please enter 'download', 'upload', or 'both'.")?,
            }
        };

        let size = loop {
            let Some(reply) = self.answer("Enter size (numeric, e.g. 1.5): ")? else {
                warn!("no size supplied, skipping estimate");
                return Ok(None);
            };
            match reply.parse::<f64>() {
                Ok(size) if !size.is_finite() => writeln!(self.out, "Invalid number, try again.")?,
                Ok(size) if size <= 0.0 => writeln!(self.out, "Enter a positive number.")?,
                Ok(size) => break size,
                Err(_) => writeln!(self.out, "Invalid number, try again.")?,
            }
        };

        let unit = self.answer_or("Unit (GB/MB/KB) [GB]: ", "GB")?;
        let unit = SizeUnit::parse(&unit).unwrap_or(SizeUnit::Gb);

        Ok(Some(PromptedEstimate { direction, size, unit }))
    }
}
