//! Line oriented reporting of PASS/FAIL results.

use std::fmt;
use std::io::Write;

/// Destination for result lines.
pub trait Output {
    /// Write one formatted line.
    fn print_fmt(&mut self, args: fmt::Arguments<'_>);

    /// Write one line verbatim.
    fn print_line(&mut self, line: &str);

    /// Write an advisory line that is not a result.
    fn print_warning(&mut self, line: &str) {
        self.print_line(line);
    }
}

/// Writes each result line to stdout as soon as it is produced. Warnings go
/// to stderr.
#[derive(Debug, Default)]
pub struct ConsoleOutput;

impl ConsoleOutput {
    fn write(&self, args: fmt::Arguments<'_>) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{args}").and_then(|_| stdout.flush()) {
            tracing::debug!(error = %e, "failed to write to stdout");
        }
    }
}

impl Output for ConsoleOutput {
    fn print_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.write(args);
    }

    fn print_line(&mut self, line: &str) {
        self.write(format_args!("{line}"));
    }

    fn print_warning(&mut self, line: &str) {
        if let Err(e) = writeln!(std::io::stderr().lock(), "{line}") {
            tracing::debug!(error = %e, "failed to write to stderr");
        }
    }
}

/// Collects lines in memory.
#[derive(Debug, Default, Clone)]
pub struct BufferedOutput {
    lines: Vec<String>,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl Output for BufferedOutput {
    fn print_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.lines.push(args.to_string());
    }

    fn print_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
