use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use crate::filesystem::ScanFailure;
use crate::output::SerializeError;

const PROMPT: &str = "Enter the folder path to scan: ";

/// Operator-facing input and output. Log records go through `tracing`; this
/// is only the prompt and the outcome lines.
pub struct Console<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    pub fn new(input: &'a mut R, output: &'a mut W) -> Self {
        Self { input, output }
    }

    /// Reads one line, without its line terminator. End of input reads as an
    /// empty line.
    pub fn prompt_root(&mut self) -> io::Result<String> {
        write!(self.output, "{PROMPT}")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let trimmed = line
            .strip_suffix('\n')
            .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
            .unwrap_or(&line);
        Ok(trimmed.to_string())
    }

    pub fn missing_root(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", "The specified folder does not exist!".red())
    }

    pub fn scan_failure(&mut self, failure: &ScanFailure) -> io::Result<()> {
        writeln!(self.output, "{}", failure.to_string().yellow())
    }

    pub fn saved(&mut self, output: &Path) -> io::Result<()> {
        let message = format!("Folder structure saved to {}", output.display());
        writeln!(self.output, "{}", message.green())
    }

    pub fn save_failed(&mut self, error: &SerializeError) -> io::Result<()> {
        let message = format!("Error saving JSON file: {error}");
        writeln!(self.output, "{}", message.red())
    }
}
