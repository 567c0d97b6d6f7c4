//! Per-row run outcomes

use std::fmt;
use std::io::IsTerminal;

use colored::Colorize;

use crate::errors::RowError;

/// Outcome severity tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Err,
}

impl Severity {
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Err => "ERR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// What happened to a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Upgrade submitted
    Scheduled,
    /// Device already runs the target version
    AlreadyCurrent,
    /// Abort submitted
    Aborted,
    /// Row continues, part of the request was ignored
    Warning,
    /// Row or value rejected
    Failed,
}

/// One reported line of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub row: Option<usize>,
    pub serial_number: String,
    pub severity: Severity,
    pub kind: OutcomeKind,
    pub message: String,
}

impl Outcome {
    pub fn new(
        row: Option<usize>,
        serial_number: &str,
        kind: OutcomeKind,
        message: impl Into<String>,
    ) -> Self {
        let severity = match kind {
            OutcomeKind::Scheduled | OutcomeKind::AlreadyCurrent | OutcomeKind::Aborted => {
                Severity::Info
            }
            OutcomeKind::Warning => Severity::Warn,
            OutcomeKind::Failed => Severity::Err,
        };
        Self {
            row,
            serial_number: serial_number.to_string(),
            severity,
            kind,
            message: message.into(),
        }
    }

    pub fn failed(row: Option<usize>, serial_number: &str, err: &RowError) -> Self {
        Self::new(row, serial_number, OutcomeKind::Failed, err.to_string())
    }

    fn body(&self) -> String {
        match self.row {
            Some(row) => format!("[CSV Row {}] {}", row, self.message),
            None => self.message.clone(),
        }
    }

    fn colored_tag(&self) -> String {
        let tag = format!("{}:", self.severity);
        match self.severity {
            Severity::Info => tag.green().to_string(),
            Severity::Warn => tag.yellow().to_string(),
            Severity::Err => tag.red().to_string(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.body())
    }
}

/// Ordered outcome log of a run
#[derive(Debug, Default)]
pub struct OutcomeLog {
    outcomes: Vec<Outcome>,
    echo: bool,
}

impl OutcomeLog {
    /// Log that only records
    pub fn new() -> Self {
        Self::default()
    }

    /// Log that also prints every outcome to stdout as it is recorded
    pub fn printing() -> Self {
        Self {
            outcomes: Vec::new(),
            echo: true,
        }
    }

    pub fn push(&mut self, outcome: Outcome) {
        if self.echo {
            if std::io::stdout().is_terminal() {
                println!("{} {}", outcome.colored_tag(), outcome.body());
            } else {
                println!("{}", outcome);
            }
        }
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.outcomes.iter().filter(|o| o.kind == kind).count()
    }

    pub fn error_count(&self) -> usize {
        self.count(OutcomeKind::Failed)
    }

    /// Outcomes reported for one manifest row
    pub fn for_row(&self, row: usize) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(move |o| o.row == Some(row))
    }
}
