// Continuum shell transcript

use serde::Serialize;

pub const BANNER: &str = "Zenith Continuum Shell v7.5";
const ASK_PREFIX: &str = "ask ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Sys,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub kind: LineKind,
    pub text: String,
}

/// What the host should do after a line was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    None,
    /// Send the prompt to remote text generation
    Ask(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct TerminalState {
    lines: Vec<Line>,
}

impl TerminalState {
    pub fn new() -> Self {
        Self {
            lines: vec![Line {
                kind: LineKind::Sys,
                text: BANNER.to_string(),
            }],
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn submit(&mut self, input: &str) -> ShellCommand {
        let input = input.trim();
        if input.is_empty() {
            return ShellCommand::None;
        }
        self.push(LineKind::User, format!("> {}", input));
        self.push(LineKind::Sys, format!("Processing: {}", input));

        match input.strip_prefix(ASK_PREFIX).map(str::trim) {
            Some(prompt) if !prompt.is_empty() => ShellCommand::Ask(prompt.to_string()),
            _ => ShellCommand::None,
        }
    }

    /// Append output that arrived asynchronously.
    pub fn print(&mut self, text: impl Into<String>) {
        self.push(LineKind::Sys, text.into());
    }

    fn push(&mut self, kind: LineKind, text: String) {
        self.lines.push(Line { kind, text });
    }
}

impl Default for TerminalState {
    fn default() -> Self {
        Self::new()
    }
}
