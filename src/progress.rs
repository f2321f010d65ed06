use crate::config::Verbosity;

use std::io::{self, Write};

const CLEAR_TO_END: &str = "\x1b[K";

/// Single overwritable status line of running counts. The row total is never
/// known up front. Dry runs print one diagnostic line per row instead.
pub struct ProgressReporter<W: Write> {
    out: W,
    verbosity: Verbosity,
    // a status line was written and not yet ended with a newline
    open_line: bool,
}

impl ProgressReporter<io::Stdout> {
    pub fn stdout(verbosity: Verbosity) -> Self {
        Self::new(io::stdout(), verbosity)
    }
}

impl<W: Write> ProgressReporter<W> {
    pub fn new(out: W, verbosity: Verbosity) -> Self {
        Self {
            out,
            verbosity,
            open_line: false,
        }
    }

    pub fn report(&mut self, counters: &[(u64, &str)], done: bool) -> io::Result<()> {
        if self.verbosity < Verbosity::Info {
            return Ok(());
        }

        let status = counters
            .iter()
            .map(|(count, label)| format!("{} {}", count, label))
            .collect::<Vec<_>>()
            .join(" | ");

        write!(self.out, "\r{} {}", status, CLEAR_TO_END)?;
        self.open_line = !done;
        if done {
            writeln!(self.out, "| Done!")?;
        }
        self.out.flush()
    }

    /// Writes the dry-run verdict for the row on `line`.
    pub fn diagnostic(&mut self, line: u64, message: &str) -> io::Result<()> {
        if self.verbosity < Verbosity::Info {
            return Ok(());
        }
        writeln!(self.out, "Line {} {}", line, message)?;
        self.out.flush()
    }

    /// Ends a status line left open by a run that stopped early, so later
    /// output starts on a fresh line.
    pub fn interrupt(&mut self) -> io::Result<()> {
        if !self.open_line {
            return Ok(());
        }
        self.open_line = false;
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
