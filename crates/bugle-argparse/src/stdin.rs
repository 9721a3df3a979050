//! The process stdin seam.
//!
//! The engine never touches `std::io::stdin` directly; it goes
//! through [`InputSource`], so tests can simulate a piped stream and
//! the at-most-once claim stays an explicit field of the parse state
//! instead of hidden global mutation.

use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Read};

/// Where option values piped via the `-` placeholder come from, and
/// where later interactive reads go once the pipe has been drained.
pub trait InputSource {
    /// Whether standard input is an interactive terminal. When it is,
    /// the `-` placeholder stays a literal value and no claim happens.
    fn is_terminal(&self) -> bool;

    /// Drain the stream: all lines, trailing whitespace trimmed,
    /// empty lines dropped. Called at most once per parse; the engine
    /// enforces that.
    fn claim_lines(&mut self) -> io::Result<Vec<String>>;

    /// Read one line for interactive use (e.g. a confirmation prompt
    /// issued after parsing). After a claim this must not re-consume
    /// the drained pipe.
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

fn split_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// The real process stdin. After a claim, interactive reads are
/// redirected to the controlling terminal so prompts never hit the
/// already-drained pipe.
#[derive(Default)]
pub struct ProcessInput {
    tty: Option<BufReader<File>>,
}

impl ProcessInput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputSource for ProcessInput {
    fn is_terminal(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn claim_lines(&mut self) -> io::Result<Vec<String>> {
        let mut raw = String::new();
        io::stdin().lock().read_to_string(&mut raw)?;
        self.tty = File::open("/dev/tty").ok().map(BufReader::new);
        Ok(split_lines(&raw))
    }

    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        match &mut self.tty {
            Some(tty) => tty.read_line(buf),
            None => io::stdin().lock().read_line(buf),
        }
    }
}

/// A non-interactive stream with fixed contents, for tests and for
/// embedding the engine behind something other than a real pipe.
pub struct PipedInput {
    data: Option<String>,
}

impl PipedInput {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
        }
    }
}

impl InputSource for PipedInput {
    fn is_terminal(&self) -> bool {
        false
    }

    fn claim_lines(&mut self) -> io::Result<Vec<String>> {
        Ok(self.data.take().map(|raw| split_lines(&raw)).unwrap_or_default())
    }

    fn read_line(&mut self, _buf: &mut String) -> io::Result<usize> {
        Ok(0)
    }
}

/// An interactive terminal with nothing to pipe.
pub struct TerminalInput;

impl InputSource for TerminalInput {
    fn is_terminal(&self) -> bool {
        true
    }

    fn claim_lines(&mut self) -> io::Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn read_line(&mut self, _buf: &mut String) -> io::Result<usize> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piped_input_trims_and_drops_empty_lines() {
        let mut input = PipedInput::new("12 \n\n  \n34\n");
        assert!(!input.is_terminal());
        assert_eq!(input.claim_lines().unwrap(), vec!["12", "34"]);
        // A drained pipe yields nothing further.
        assert_eq!(input.claim_lines().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn terminal_input_reports_interactive() {
        assert!(TerminalInput.is_terminal());
    }
}
