//! Line-oriented user interaction.

use std::io::{self, BufRead, Write};

/// Prompt/answer channel used by the interactive menu.
pub trait UserIo {
    /// Shows `prompt` and reads one line without its terminator.
    ///
    /// Returns `None` once input is exhausted.
    fn read_input(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn write_output(&mut self, message: &str) -> io::Result<()>;
}

/// `UserIo` over any reader/writer pair; stdin/stdout in the binary.
pub struct ConsoleIo<R, W> {
    input: R,
    output: W,
}

impl ConsoleIo<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleIo<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> UserIo for ConsoleIo<R, W> {
    fn read_input(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    fn write_output(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }
}

/// Replays canned answers and records everything written.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedIo {
    answers: std::collections::VecDeque<String>,
    pub prompts: Vec<String>,
    pub output: Vec<String>,
}

#[cfg(test)]
impl ScriptedIo {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Whole transcript of written lines, newline-joined.
    pub fn transcript(&self) -> String {
        self.output.join("\n")
    }
}

#[cfg(test)]
impl UserIo for ScriptedIo {
    fn read_input(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }

    fn write_output(&mut self, message: &str) -> io::Result<()> {
        self.output.push(message.to_string());
        Ok(())
    }
}
